// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Parent Picture Control Set: the per-picture envelope (§3). Owned
//! exclusively by whichever stage holds it; pool-allocated, returned on
//! release; must outlive all downstream stages reading it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::data_model::reference::FrameType;
use crate::data_model::sb::SbGrid;
use crate::me::task::MotionEstimationResult;
use crate::picture::{FrameMetadata, Resolution};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SliceType {
    I,
    P,
    B,
}

/// Number of canonical reference slots carried on every PPCS (§4.3 global
/// motion setup operates over exactly these seven).
pub const CANONICAL_REF_SLOT_COUNT: usize = 7;

#[derive(Copy, Clone, Debug, Default)]
pub struct ReferenceListDescriptor {
    pub slots: [Option<u32>; CANONICAL_REF_SLOT_COUNT],
}

/// Minimal AV1 frame-header fields MDC/ME need to agree on; full
/// syntax-element packing is out of scope (§1).
#[derive(Clone, Copy, Debug)]
pub struct FrameHeaderParams {
    pub base_q_idx: u8,
    pub error_resilient_mode: bool,
    pub allow_warped_motion: bool,
    pub allow_high_precision_mv: bool,
    pub allow_screen_content_tools: bool,
}

impl Default for FrameHeaderParams {
    fn default() -> Self {
        Self {
            base_q_idx: 32,
            error_resilient_mode: false,
            allow_warped_motion: false,
            allow_high_precision_mv: false,
            allow_screen_content_tools: false,
        }
    }
}

/// Per-picture TPL accumulation (§4.1 stage 6, consumed by MDC's importance
/// weighting; propagation math itself lives in `pipeline::stages::source_based_operations`).
#[derive(Clone, Debug, Default)]
pub struct TplData {
    pub intra_cost: Vec<u32>,
    pub inter_cost: Vec<u32>,
    pub mv_projection_done: bool,
}

/// Milestones a PPCS must reach before downstream stages may observe it,
/// enforced by Picture Manager (§3 invariant).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReferenceMilestone {
    NotReady,
    Decoded,
    Available,
}

/// Per-picture envelope carrying everything picture-scoped (§3).
pub struct ParentPictureControlSet {
    pub meta: FrameMetadata,
    pub decode_order: u64,
    pub slice_type: SliceType,
    pub temporal_layer: u8,
    pub reference_list_0: ReferenceListDescriptor,
    pub reference_list_1: ReferenceListDescriptor,
    pub frame_header: FrameHeaderParams,
    pub resolution: Resolution,
    pub sb_grid: SbGrid,

    /// Per-SB motion-estimation results, one entry per SB, sized at pool
    /// construction to the maximum active-reference count (§3).
    pub me_results: Vec<MotionEstimationResult>,

    /// Global-motion parameters per reference list/index, populated by ME
    /// (`global_motion_estimation`) and rescaled by MDC (§4.3).
    pub global_motion_estimation: [[crate::me::global_motion::GlobalMotionParams; CANONICAL_REF_SLOT_COUNT]; 2],

    pub tpl: TplData,
    pub segmentation_enabled: bool,

    /// Joined-barrier counter for whole-picture steps (global motion, MFMV
    /// setup, TPL-done) — incremented by each completing segment worker,
    /// compared against `sb_total_count` (§4.1, §5).
    pub me_processed_sb_count: AtomicUsize,
    pub sb_total_count: usize,

    /// Picture-wide accumulators updated under this mutex (§5
    /// Shared-resource policy), e.g. TF/TPL running sums.
    pub accumulators: Mutex<PictureAccumulators>,

    pub reference_milestone: ReferenceMilestone,
    pub primary_ref_frame: Option<usize>,
}

#[derive(Debug, Default)]
pub struct PictureAccumulators {
    pub tf_weight_sum: f64,
    pub tpl_distortion_sum: u64,
}

impl ParentPictureControlSet {
    pub fn new(meta: FrameMetadata, resolution: Resolution, sb_grid: SbGrid, slice_type: SliceType) -> Self {
        let sb_total_count = sb_grid.sb_total_count();
        Self {
            meta,
            decode_order: 0,
            slice_type,
            temporal_layer: 0,
            reference_list_0: ReferenceListDescriptor::default(),
            reference_list_1: ReferenceListDescriptor::default(),
            frame_header: FrameHeaderParams::default(),
            resolution,
            sb_grid,
            me_results: Vec::new(),
            global_motion_estimation: Default::default(),
            tpl: TplData::default(),
            segmentation_enabled: false,
            me_processed_sb_count: AtomicUsize::new(0),
            sb_total_count,
            accumulators: Mutex::new(PictureAccumulators::default()),
            reference_milestone: ReferenceMilestone::NotReady,
            primary_ref_frame: None,
        }
    }

    /// Called by an ME segment worker on completion. Returns true exactly
    /// once, for the worker whose increment lands on `sb_total_count`
    /// (§4.2 Global motion estimation "last-worker-wins" barrier).
    pub fn segment_done(&self) -> bool {
        let prior = self.me_processed_sb_count.fetch_add(1, Ordering::AcqRel);
        prior + 1 == self.sb_total_count
    }

    pub fn frame_type(&self) -> FrameType {
        match self.slice_type {
            SliceType::I if self.decode_order == 0 => FrameType::Key,
            SliceType::I => FrameType::IntraOnly,
            _ => FrameType::Inter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::sb::{SbGrid, SB_SIZE_LARGE};

    fn make_ppcs(sb_count_side: u32) -> ParentPictureControlSet {
        let grid = SbGrid::new(sb_count_side * SB_SIZE_LARGE, sb_count_side * SB_SIZE_LARGE, SB_SIZE_LARGE);
        ParentPictureControlSet::new(
            FrameMetadata {
                picture_number: 0,
                timestamp: 0,
                force_keyframe: false,
            },
            Resolution {
                width: sb_count_side * SB_SIZE_LARGE,
                height: sb_count_side * SB_SIZE_LARGE,
            },
            grid,
            SliceType::P,
        )
    }

    #[test]
    fn segment_barrier_fires_exactly_once_on_last() {
        let ppcs = make_ppcs(2);
        assert_eq!(ppcs.sb_total_count, 4);
        assert!(!ppcs.segment_done());
        assert!(!ppcs.segment_done());
        assert!(!ppcs.segment_done());
        assert!(ppcs.segment_done());
        // A further, erroneous call would not refire (count now exceeds total).
        assert!(!ppcs.segment_done());
    }

    #[test]
    fn key_frame_only_at_decode_order_zero() {
        let mut ppcs = make_ppcs(1);
        ppcs.slice_type = SliceType::I;
        ppcs.decode_order = 0;
        assert_eq!(ppcs.frame_type(), FrameType::Key);
        ppcs.decode_order = 8;
        assert_eq!(ppcs.frame_type(), FrameType::IntraOnly);
    }
}
