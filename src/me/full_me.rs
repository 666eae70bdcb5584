// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Full ME (§4.2): per-SB search within `[search_area_width,
//! search_area_height]` around the HME seed, plus ME-candidate pruning.

use crate::me::hme::SearchArea;
use crate::me::task::{MotionVector, MvCandidate, SearchMethod};

#[derive(Copy, Clone, Debug)]
pub struct FullMeParams {
    pub search_area: SearchArea,
    pub max_search_area: SearchArea,
    pub method: SearchMethod,
}

fn sad_at(
    cur: &[u8],
    cur_stride: usize,
    width: usize,
    height: usize,
    ref_plane: &[u8],
    ref_stride: usize,
    ref_w: i32,
    ref_h: i32,
    dx: i32,
    dy: i32,
    method: SearchMethod,
) -> u32 {
    let row_step = match method {
        SearchMethod::FullSad => 1,
        SearchMethod::SubSad => 2,
    };

    let mut sad: u64 = 0;
    let mut row = 0;
    while row < height {
        let ref_row = row as i32 + dy;
        if ref_row < 0 || ref_row >= ref_h {
            return u32::MAX;
        }
        for col in 0..width {
            let ref_col = col as i32 + dx;
            if ref_col < 0 || ref_col >= ref_w {
                return u32::MAX;
            }
            let c = cur[row * cur_stride + col] as i32;
            let r = ref_plane[ref_row as usize * ref_stride + ref_col as usize] as i32;
            sad += (c - r).unsigned_abs() as u64;
        }
        row += row_step;
    }
    // Rescale SUB_SAD so it is comparable with FULL_SAD despite skipping
    // every other row.
    if method == SearchMethod::SubSad {
        sad *= 2;
    }
    sad.min(u32::MAX as u64) as u32
}

/// Exhaustive per-SB search centered on `seed` within `params.search_area`,
/// clamped to `params.max_search_area`.
pub fn full_me_search(
    cur: &[u8],
    cur_stride: usize,
    width: usize,
    height: usize,
    ref_plane: &[u8],
    ref_stride: usize,
    ref_w: i32,
    ref_h: i32,
    seed: MotionVector,
    params: FullMeParams,
) -> MvCandidate {
    let sa_w = params.search_area.width.min(params.max_search_area.width) as i32;
    let sa_h = params.search_area.height.min(params.max_search_area.height) as i32;

    let mut best = MvCandidate {
        mv: seed,
        sad: u32::MAX,
        variance: 0,
    };

    for dy in -(sa_h / 2)..=(sa_h / 2) {
        for dx in -(sa_w / 2)..=(sa_w / 2) {
            let mv_row = seed.row as i32 + dy;
            let mv_col = seed.col as i32 + dx;
            let sad = sad_at(
                cur, cur_stride, width, height, ref_plane, ref_stride, ref_w, ref_h, mv_col, mv_row, params.method,
            );
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

/// ME-candidate pruning (§4.2): drops candidates whose SAD exceeds the best
/// by more than `threshold_percent` before mode decision.
pub fn prune_candidates(candidates: &mut Vec<MvCandidate>, threshold_percent: u32) {
    let Some(best_sad) = candidates.iter().map(|c| c.sad).min() else {
        return;
    };
    let limit = best_sad + (best_sad as u64 * threshold_percent as u64 / 100) as u32;
    candidates.retain(|c| c.sad <= limit);
}

/// Resolution/preset-dependent ME-candidate pruning threshold (§4.2).
pub fn candidate_pruning_threshold(enc_mode: u8, luma_samples: u64) -> u32 {
    let base = if luma_samples > 1920 * 1080 { 10 } else { 20 };
    let speed_penalty = (enc_mode as u32 * 2).min(30);
    base.saturating_sub(speed_penalty / 3).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pruning_keeps_only_within_threshold() {
        let mut candidates = vec![
            MvCandidate { mv: MotionVector::ZERO, sad: 100, variance: 0 },
            MvCandidate { mv: MotionVector::ZERO, sad: 105, variance: 0 },
            MvCandidate { mv: MotionVector::ZERO, sad: 200, variance: 0 },
        ];
        prune_candidates(&mut candidates, 10);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn sub_sad_is_rescaled_to_match_full_sad_on_uniform_blocks() {
        let cur = vec![10u8; 16];
        let ref_plane = vec![20u8; 16];
        let full = sad_at(&cur, 4, 4, 4, &ref_plane, 4, 4, 4, 0, 0, SearchMethod::FullSad);
        let sub = sad_at(&cur, 4, 4, 4, &ref_plane, 4, 4, 4, 0, 0, SearchMethod::SubSad);
        assert_eq!(full, sub);
    }
}
