// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Motion Estimation (§2 stage 4, core subsystem B): per-SB HME/ME against
//! every active reference, dispatched by [`MeTaskKind`]. Once every SB of
//! a picture has been processed, the worker that completes the last one
//! additionally computes global motion (§4.2 "last-worker-wins" barrier,
//! via [`ParentPictureControlSet::segment_done`]).

use crate::data_model::ppcs::ParentPictureControlSet;
use crate::me::full_me::{candidate_pruning_threshold, full_me_search, prune_candidates, FullMeParams};
use crate::me::global_motion::{fit_translation_only, maybe_exit_to_identity, should_estimate, GlobalMotionConfig};
use crate::me::hme::{window_search, Hme0Params, Hme1Params, Hme2Params, SearchArea};
use crate::me::task::{MeTaskKind, MotionEstimationResult, MotionVector, MvCandidate, SearchMethod};

/// One reference's full-resolution luma plane, already padded, used as the
/// per-SB search surface for every HME level and full ME.
pub struct ReferencePlane<'a> {
    pub samples: &'a [u8],
    pub stride: usize,
    pub width: i32,
    pub height: i32,
}

/// Runs the full HME cascade (levels 0..2, each optional) followed by full
/// ME against one reference for one SB, returning the best candidate after
/// ME-candidate pruning within the SB's own result set.
#[allow(clippy::too_many_arguments)]
pub fn estimate_against_reference(
    cur: &[u8],
    cur_stride: usize,
    block_w: usize,
    block_h: usize,
    reference: &ReferencePlane<'_>,
    hme0: Hme0Params,
    hme1: Hme1Params,
    hme2: Hme2Params,
    full_me: FullMeParams,
) -> MvCandidate {
    let hme0_area = hme0.nominal_area;
    let mut best = window_search(
        cur,
        cur_stride,
        block_w,
        block_h,
        reference.samples,
        reference.stride,
        reference.width,
        reference.height,
        MotionVector::ZERO,
        hme0_area,
    );

    if hme1.enabled {
        best = window_search(
            cur,
            cur_stride,
            block_w,
            block_h,
            reference.samples,
            reference.stride,
            reference.width,
            reference.height,
            best.mv,
            hme1.window,
        );
    }

    if hme2.enabled {
        best = window_search(
            cur,
            cur_stride,
            block_w,
            block_h,
            reference.samples,
            reference.stride,
            reference.width,
            reference.height,
            best.mv,
            hme2.window,
        );
    }

    full_me_search(
        cur,
        cur_stride,
        block_w,
        block_h,
        reference.samples,
        reference.stride,
        reference.width,
        reference.height,
        best.mv,
        full_me,
    )
}

/// One SB's worth of ME work: searches every active reference, prunes the
/// resulting candidate set, and records which reference produced the
/// overall best SAD.
#[allow(clippy::too_many_arguments)]
pub fn estimate_sb(
    task_kind: MeTaskKind,
    cur: &[u8],
    cur_stride: usize,
    block_w: usize,
    block_h: usize,
    references: &[ReferencePlane<'_>],
    enc_mode: u8,
    luma_samples: u64,
) -> MotionEstimationResult {
    let mut result = MotionEstimationResult::new(references.len());

    let method = match task_kind {
        MeTaskKind::TemporalFilterMe => SearchMethod::SubSad,
        MeTaskKind::FirstPassMe => SearchMethod::SubSad,
        _ => SearchMethod::FullSad,
    };

    let full_me_params = FullMeParams {
        search_area: SearchArea { width: 32, height: 32 },
        max_search_area: SearchArea { width: 64, height: 64 },
        method,
    };

    for (idx, reference) in references.iter().enumerate() {
        let best = estimate_against_reference(
            cur,
            cur_stride,
            block_w,
            block_h,
            reference,
            Hme0Params::default(),
            Hme1Params::default(),
            Hme2Params::default(),
            full_me_params,
        );
        result.candidates_by_reference[idx].push(best);
    }

    let threshold = candidate_pruning_threshold(enc_mode, luma_samples);
    for candidates in result.candidates_by_reference.iter_mut() {
        prune_candidates(candidates, threshold);
    }

    result.hme_sad = result.best_sad().unwrap_or(0);
    result.is_stationary = result.hme_sad < 16;
    result.best_reference = result
        .candidates_by_reference
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.iter().map(|m| m.sad).min().map(|sad| (i, sad)))
        .min_by_key(|&(_, sad)| sad)
        .map(|(i, _)| i);

    result
}

/// Stores one SB's result into the picture and, if this was the segment
/// that completed the picture, computes global motion from the full set
/// of per-SB best translations and populates
/// `global_motion_estimation[0]`.
pub fn complete_sb(ppcs: &mut ParentPictureControlSet, sb_index: usize, result: MotionEstimationResult, is_bipred: bool) {
    if sb_index >= ppcs.me_results.len() {
        ppcs.me_results.resize_with(ppcs.sb_total_count, || MotionEstimationResult::new(0));
    }
    ppcs.me_results[sb_index] = result;

    if ppcs.segment_done() {
        let config = GlobalMotionConfig::default();
        let samples: Vec<(i32, i32)> = ppcs
            .me_results
            .iter()
            .filter_map(|r| r.best_reference.and_then(|idx| r.candidates_by_reference[idx].first()))
            .map(|c| (c.mv.row as i32, c.mv.col as i32))
            .collect();

        let me_reports_low_motion = ppcs.me_results.iter().all(|r| r.is_stationary);
        if should_estimate(&config, is_bipred, me_reports_low_motion, !samples.is_empty()) {
            let fitted = fit_translation_only(&samples);
            let resolved = maybe_exit_to_identity(&config, fitted, 4);
            ppcs.global_motion_estimation[0][0] = resolved;
        }
    }
}
