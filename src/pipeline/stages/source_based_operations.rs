// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Source-Based Operations / TPL (§2 stage 6): temporal prediction
//! lookahead, propagating per-block intra/inter cost estimates backward
//! through the mini-GOP to bias downstream quantizer selection.

use crate::data_model::ppcs::ParentPictureControlSet;
use crate::pipeline::segmentation::PictureBarrier;

/// One block's TPL cost sample, produced by a cheap low-resolution
/// intra/inter cost estimate (the real per-block transform-cost model is
/// SIMD-kernel detail, §1).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TplBlockCost {
    pub intra_cost: u32,
    pub inter_cost: u32,
}

/// Propagates TPL costs for one frame into its PPCS's `tpl` accumulator and
/// joins on `barrier` once done, matching §5's "explicit per-picture
/// barrier... before TPL-me-done" join point.
pub fn propagate(ppcs: &mut ParentPictureControlSet, costs: &[TplBlockCost], barrier: &PictureBarrier) {
    ppcs.tpl.intra_cost = costs.iter().map(|c| c.intra_cost).collect();
    ppcs.tpl.inter_cost = costs.iter().map(|c| c.inter_cost).collect();
    barrier.arrive();
    if barrier.is_complete() {
        ppcs.tpl.mv_projection_done = true;
    }
}

/// The per-block importance weight TPL derives: inter cost relative to
/// intra cost, clamped so a block whose temporal prediction is free
/// (inter_cost == 0) doesn't produce an unbounded weight.
pub fn importance_weight(cost: TplBlockCost) -> f64 {
    if cost.intra_cost == 0 {
        return 1.0;
    }
    (cost.inter_cost as f64 / cost.intra_cost as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::ppcs::SliceType;
    use crate::data_model::sb::{SbGrid, SB_SIZE_LARGE};
    use crate::picture::{FrameMetadata, Resolution};

    fn make_ppcs() -> ParentPictureControlSet {
        let grid = SbGrid::new(SB_SIZE_LARGE, SB_SIZE_LARGE, SB_SIZE_LARGE);
        ParentPictureControlSet::new(
            FrameMetadata { picture_number: 0, timestamp: 0, force_keyframe: false },
            Resolution { width: SB_SIZE_LARGE, height: SB_SIZE_LARGE },
            grid,
            SliceType::P,
        )
    }

    #[test]
    fn propagate_stores_costs_and_marks_projection_done_on_last_arrival() {
        let mut ppcs = make_ppcs();
        let barrier = PictureBarrier::new(1);
        let costs = vec![TplBlockCost { intra_cost: 100, inter_cost: 40 }];
        propagate(&mut ppcs, &costs, &barrier);
        assert_eq!(ppcs.tpl.intra_cost, vec![100]);
        assert!(ppcs.tpl.mv_projection_done);
    }

    #[test]
    fn importance_weight_caps_at_one() {
        let weight = importance_weight(TplBlockCost { intra_cost: 10, inter_cost: 40 });
        assert_eq!(weight, 1.0);
    }

    #[test]
    fn zero_intra_cost_is_full_weight() {
        let weight = importance_weight(TplBlockCost { intra_cost: 0, inter_cost: 40 });
        assert_eq!(weight, 1.0);
    }
}
