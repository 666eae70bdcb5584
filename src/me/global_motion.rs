// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Global motion estimation (§4.2): once all SBs of a picture finish ME, a
//! single worker computes per-reference global-motion warps under a
//! rotzoom or affine model.

use log::trace;

/// AV1 warp-model precision, matching the AV1 spec's `WARPEDMODEL_PREC_BITS`.
pub const WARPEDMODEL_PREC_BITS: i32 = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GlobalMotionModel {
    Identity,
    RotZoom,
    Affine,
}

/// Six-parameter warp matrix, AV1-spec layout: `[tx, ty, a, b, c, d]` where
/// `(a, d)` (indices 2 and 5) default to `1 << WARPEDMODEL_PREC_BITS` for
/// identity and `(tx, ty)` (indices 0 and 1) carry the translation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlobalMotionParams {
    pub model: GlobalMotionModel,
    pub wmmat: [i32; 6],
    pub is_global_motion: bool,
}

impl Default for GlobalMotionParams {
    fn default() -> Self {
        Self::identity()
    }
}

impl GlobalMotionParams {
    pub fn identity() -> Self {
        Self {
            model: GlobalMotionModel::Identity,
            wmmat: [0, 0, 1 << WARPEDMODEL_PREC_BITS, 0, 0, 1 << WARPEDMODEL_PREC_BITS],
            is_global_motion: false,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.wmmat == Self::identity().wmmat
    }
}

#[derive(Copy, Clone, Debug)]
pub struct GlobalMotionConfig {
    /// Fast path: if the best-fit warp is within epsilon of identity, skip
    /// it (§4.2 "identity-exit fast path").
    pub identity_exit_enabled: bool,
    /// Only estimate global motion for bipredictive pictures.
    pub bipred_only: bool,
    /// Skip estimation entirely when ME already reports low motion
    /// (§4.2 "ME-based bypass").
    pub me_based_bypass: bool,
    pub stationary_block_presence_required: bool,
}

impl Default for GlobalMotionConfig {
    fn default() -> Self {
        Self {
            identity_exit_enabled: true,
            bipred_only: false,
            me_based_bypass: true,
            stationary_block_presence_required: false,
        }
    }
}

/// A minimal least-squares-style fit stand-in: given a set of (src, dst)
/// point correspondences (e.g. SB-center MVs from ME) estimate a
/// translation-only RotZoom model. A full 6-parameter affine solve belongs
/// to a numerics crate outside this spec's scope; this produces the
/// translation components MDC then rescales and clamps (§4.3).
pub fn fit_translation_only(mv_samples: &[(i32, i32)]) -> GlobalMotionParams {
    if mv_samples.is_empty() {
        return GlobalMotionParams::identity();
    }

    let n = mv_samples.len() as i64;
    let sum_row: i64 = mv_samples.iter().map(|(r, _)| *r as i64).sum();
    let sum_col: i64 = mv_samples.iter().map(|(_, c)| *c as i64).sum();

    let avg_row = (sum_row / n) as i32;
    let avg_col = (sum_col / n) as i32;

    GlobalMotionParams {
        model: GlobalMotionModel::RotZoom,
        wmmat: [
            avg_col,
            avg_row,
            1 << WARPEDMODEL_PREC_BITS,
            0,
            0,
            1 << WARPEDMODEL_PREC_BITS,
        ],
        is_global_motion: true,
    }
}

/// Decide whether to run the estimator at all for this reference, honoring
/// the identity-exit / bipred-only / ME-based-bypass / stationary-presence
/// gates (§4.2).
pub fn should_estimate(
    config: &GlobalMotionConfig,
    is_bipred: bool,
    me_reports_low_motion: bool,
    has_stationary_block: bool,
) -> bool {
    if config.bipred_only && !is_bipred {
        return false;
    }
    if config.me_based_bypass && me_reports_low_motion {
        return false;
    }
    if config.stationary_block_presence_required && !has_stationary_block {
        return false;
    }
    true
}

pub fn maybe_exit_to_identity(config: &GlobalMotionConfig, fitted: GlobalMotionParams, epsilon: i32) -> GlobalMotionParams {
    if !config.identity_exit_enabled {
        return fitted;
    }
    let identity = GlobalMotionParams::identity();
    let close = fitted
        .wmmat
        .iter()
        .zip(identity.wmmat.iter())
        .all(|(a, b)| (a - b).abs() <= epsilon);

    if close {
        trace!("global motion model chosen: identity (fit within epsilon {epsilon})");
        identity
    } else {
        trace!("global motion model chosen: {:?}", fitted.model);
        fitted
    }
}
