// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Pre-HME and the three HME levels (§4.2). Pixel-domain SAD search is a
//! scalar reference implementation; SIMD kernels are out of scope (§1).

use crate::me::task::{MotionVector, MvCandidate};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecimationMode {
    /// Nearest-neighbour drop.
    Decimated,
    /// Low-pass + drop.
    Filtered,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PreHmeLevel {
    Off,
    Level1,
    Level2,
}

#[derive(Copy, Clone, Debug)]
pub struct SearchArea {
    pub width: u16,
    pub height: u16,
}

/// Level-0 HME region layout: the picture split into
/// `regions_in_width` x `regions_in_height` regions, each with a nominal
/// and a maximum search area.
#[derive(Copy, Clone, Debug)]
pub struct Hme0Params {
    pub regions_in_width: u8,
    pub regions_in_height: u8,
    pub nominal_area: SearchArea,
    pub max_area: SearchArea,
    /// Divisor applied to the nominal area for stationary content or low
    /// HME SAD (§4.2 HME level 0).
    pub shrink_divisor: u8,
}

impl Default for Hme0Params {
    fn default() -> Self {
        Self {
            regions_in_width: 2,
            regions_in_height: 2,
            nominal_area: SearchArea { width: 48, height: 32 },
            max_area: SearchArea { width: 96, height: 64 },
            shrink_divisor: 4,
        }
    }
}

impl Hme0Params {
    /// Total HME level-0 search-area width when there is a single region
    /// (§8 boundary behavior): equals that single region's width.
    pub fn total_search_area_width(&self) -> u32 {
        self.nominal_area.width as u32 * self.regions_in_width as u32
    }

    pub fn shrink(&self, stationary_or_low_sad: bool) -> SearchArea {
        if stationary_or_low_sad {
            SearchArea {
                width: (self.nominal_area.width / self.shrink_divisor as u16).max(1),
                height: (self.nominal_area.height / self.shrink_divisor as u16).max(1),
            }
        } else {
            self.nominal_area
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Hme1Params {
    pub enabled: bool,
    pub window: SearchArea,
}

impl Default for Hme1Params {
    fn default() -> Self {
        Self {
            enabled: true,
            window: SearchArea { width: 16, height: 16 },
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Hme2Params {
    pub enabled: bool,
    pub window: SearchArea,
}

impl Default for Hme2Params {
    fn default() -> Self {
        Self {
            enabled: true,
            window: SearchArea { width: 8, height: 3 },
        }
    }
}

fn luma_sad(cur: &[u8], cur_stride: usize, ref_plane: &[u8], ref_stride: usize, width: usize, height: usize, dx: i32, dy: i32, ref_width: i32, ref_height: i32) -> u32 {
    let mut sad: u64 = 0;
    for row in 0..height {
        let ref_row = row as i32 + dy;
        if ref_row < 0 || ref_row >= ref_height {
            return u32::MAX;
        }
        for col in 0..width {
            let ref_col = col as i32 + dx;
            if ref_col < 0 || ref_col >= ref_width {
                return u32::MAX;
            }
            let c = cur[row * cur_stride + col] as i32;
            let r = ref_plane[ref_row as usize * ref_stride + ref_col as usize] as i32;
            sad += (c - r).unsigned_abs() as u64;
        }
    }
    sad.min(u32::MAX as u64) as u32
}

/// Orthogonal one-dimensional pre-HME search: a vertical-oriented pass then
/// a horizontal-oriented pass, each bounded by `(sa_min, sa_max)` (§4.2
/// Pre-HME).
pub fn pre_hme_search(
    cur: &[u8],
    cur_stride: usize,
    block_w: usize,
    block_h: usize,
    ref_plane: &[u8],
    ref_stride: usize,
    ref_w: i32,
    ref_h: i32,
    sa_min: i32,
    sa_max: i32,
) -> MvCandidate {
    let mut best = MvCandidate {
        mv: MotionVector::ZERO,
        sad: u32::MAX,
        variance: 0,
    };

    // Vertical-oriented: vary dy only.
    for dy in sa_min..=sa_max {
        let sad = luma_sad(cur, cur_stride, ref_plane, ref_stride, block_w, block_h, 0, dy, ref_w, ref_h);
        if sad < best.sad {
            best = MvCandidate {
                mv: MotionVector { row: dy as i16, col: 0 },
                sad,
                variance: 0,
            };
        }
    }

    // Horizontal-oriented: vary dx only, starting from the vertical winner's row.
    let seed_row = best.mv.row as i32;
    for dx in sa_min..=sa_max {
        let sad = luma_sad(cur, cur_stride, ref_plane, ref_stride, block_w, block_h, dx, seed_row, ref_w, ref_h);
        if sad < best.sad {
            best = MvCandidate {
                mv: MotionVector { row: seed_row as i16, col: dx as i16 },
                sad,
                variance: 0,
            };
        }
    }

    best
}

/// Full-search over a rectangular window, used by HME levels 0-2 at their
/// respective resolutions.
pub fn window_search(
    cur: &[u8],
    cur_stride: usize,
    block_w: usize,
    block_h: usize,
    ref_plane: &[u8],
    ref_stride: usize,
    ref_w: i32,
    ref_h: i32,
    seed: MotionVector,
    area: SearchArea,
) -> MvCandidate {
    let mut best = MvCandidate {
        mv: seed,
        sad: u32::MAX,
        variance: 0,
    };

    let half_w = area.width as i32 / 2;
    let half_h = area.height as i32 / 2;

    for dy in -half_h..=half_h {
        for dx in -half_w..=half_w {
            let mv_row = seed.row as i32 + dy;
            let mv_col = seed.col as i32 + dx;
            let sad = luma_sad(cur, cur_stride, ref_plane, ref_stride, block_w, block_h, mv_col, mv_row, ref_w, ref_h);
            if sad < best.sad {
                best = MvCandidate {
                    mv: MotionVector { row: mv_row as i16, col: mv_col as i16 },
                    sad,
                    variance: 0,
                };
            }
        }
    }

    best
}
