// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! First-pass ME (§4.2): always uses the smallest search budget, decimated
//! 1/16 downscale, and produces only ZZ-SSD-like residual statistics
//! consumed by the first-pass rate model.

use crate::me::hme::SearchArea;

pub const FIRST_PASS_SEARCH_AREA: SearchArea = SearchArea { width: 16, height: 16 };

/// Per-block zero-zero sum-of-squared-differences and best-match SSD,
/// matching the residual statistics a first-pass rate model consumes.
#[derive(Copy, Clone, Debug, Default)]
pub struct FirstPassBlockStats {
    pub zz_ssd: u32,
    pub best_ssd: u32,
    pub intra_ssd: u32,
}

fn ssd(
    cur: &[u8],
    cur_stride: usize,
    width: usize,
    height: usize,
    other: &[u8],
    other_stride: usize,
    other_width: i32,
    other_height: i32,
    dx: i32,
    dy: i32,
) -> u32 {
    let mut acc: u64 = 0;
    for row in 0..height {
        let orow = row as i32 + dy;
        if orow < 0 || orow >= other_height {
            return u32::MAX;
        }
        for col in 0..width {
            let ocol = col as i32 + dx;
            if ocol < 0 || ocol >= other_width {
                return u32::MAX;
            }
            let c = cur[row * cur_stride + col] as i32;
            let o = other[orow as usize * other_stride + ocol as usize] as i32;
            let d = c - o;
            acc += (d * d) as u64;
        }
    }
    acc.min(u32::MAX as u64) as u32
}

/// Computes zero-motion SSD against the reference (no search) and the
/// best-match SSD within [`FIRST_PASS_SEARCH_AREA`], always on the
/// decimated 1/16 plane. `ref_width`/`ref_height` bound the reference plane
/// so off-plane offsets are rejected rather than read out of bounds.
pub fn compute_block_stats(
    cur: &[u8],
    cur_stride: usize,
    width: usize,
    height: usize,
    ref_plane: &[u8],
    ref_stride: usize,
    ref_width: i32,
    ref_height: i32,
) -> FirstPassBlockStats {
    let zz = ssd(cur, cur_stride, width, height, ref_plane, ref_stride, ref_width, ref_height, 0, 0);

    let mut best = zz;
    let half_w = FIRST_PASS_SEARCH_AREA.width as i32 / 2;
    let half_h = FIRST_PASS_SEARCH_AREA.height as i32 / 2;
    for dy in -half_h..=half_h {
        for dx in -half_w..=half_w {
            let candidate = ssd(cur, cur_stride, width, height, ref_plane, ref_stride, ref_width, ref_height, dx, dy);
            if candidate < best {
                best = candidate;
            }
        }
    }

    FirstPassBlockStats {
        zz_ssd: zz,
        best_ssd: best,
        intra_ssd: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_blocks_have_zero_zz_ssd() {
        let cur = vec![5u8; 16];
        let stats = compute_block_stats(&cur, 4, 4, 4, &cur, 4, 4, 4);
        assert_eq!(stats.zz_ssd, 0);
        assert_eq!(stats.best_ssd, 0);
    }

    #[test]
    fn best_ssd_never_exceeds_zz_ssd() {
        let cur = vec![5u8; 16];
        let mut ref_plane = vec![5u8; 64];
        // Shift a brighter patch near the block so a nonzero MV matches better.
        for i in 0..16 {
            ref_plane[i] = 9;
        }
        let stats = compute_block_stats(&cur, 4, 4, 4, &ref_plane, 8, 8, 8);
        assert!(stats.best_ssd <= stats.zz_ssd);
    }
}
