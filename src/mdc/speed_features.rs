// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Speed-tool switches (§4.3): derives the per-picture feature toggles
//! (filter-intra, high-precision MV, warped motion, switchable motion mode,
//! OBMC, HBD mode-decision, palette, intra-BC) from the preset (speed
//! level), resolution, q-idx and frame type.

use crate::data_model::reference::FrameType;
use crate::picture::Resolution;

/// Resolutions at or below this luma sample count are eligible for
/// high-precision MV, matching the sub-480p restriction in §4.3.
const HIGH_PRECISION_MV_MAX_LUMA_SAMPLES: u64 = 720 * 480;
/// High-precision MV is further gated on base q-idx being below this
/// threshold (low-QP content benefits most from the extra precision).
const HIGH_PRECISION_MV_MAX_Q_IDX: u8 = 180;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObmcLevel {
    Off,
    Level1,
    Level2,
    Level3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HbdModeDecision {
    EightBitOnly,
    Mixed,
    FullHbd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpeedFeatures {
    pub filter_intra: bool,
    pub allow_high_precision_mv: bool,
    pub allow_warped_motion: bool,
    pub switchable_motion_mode: bool,
    pub obmc_level: ObmcLevel,
    pub hbd_mode_decision: HbdModeDecision,
    pub bypass_cost_table_generation: bool,
    pub palette_mode: bool,
    pub intra_bc_hashing: bool,
}

fn obmc_level_for_speed(speed_level: u8) -> ObmcLevel {
    match speed_level {
        0 => ObmcLevel::Level3,
        1 => ObmcLevel::Level2,
        2..=3 => ObmcLevel::Level1,
        _ => ObmcLevel::Off,
    }
}

fn hbd_mode_decision_for_speed(speed_level: u8) -> HbdModeDecision {
    match speed_level {
        0 => HbdModeDecision::FullHbd,
        1..=2 => HbdModeDecision::Mixed,
        _ => HbdModeDecision::EightBitOnly,
    }
}

/// Warped motion is disabled on key frames, intra-only frames,
/// error-resilient pictures and when superres is active, matching §4.3's
/// invariant that all key/intra-only frames carry `allow_warped_motion ==
/// false`.
fn warped_motion_allowed(
    frame_type: FrameType,
    error_resilient_mode: bool,
    superres_active: bool,
    speed_level: u8,
) -> bool {
    if matches!(frame_type, FrameType::Key | FrameType::IntraOnly) {
        return false;
    }
    if error_resilient_mode || superres_active {
        return false;
    }
    speed_level <= 3
}

fn high_precision_mv_allowed(resolution: Resolution, base_q_idx: u8) -> bool {
    resolution.luma_samples() <= HIGH_PRECISION_MV_MAX_LUMA_SAMPLES
        && base_q_idx < HIGH_PRECISION_MV_MAX_Q_IDX
}

pub struct SpeedFeatureInputs {
    pub speed_level: u8,
    pub frame_type: FrameType,
    pub resolution: Resolution,
    pub base_q_idx: u8,
    pub error_resilient_mode: bool,
    pub superres_active: bool,
    pub screen_content_mode: bool,
}

/// Derives the full set of per-picture speed-tool switches.
pub fn select_speed_features(inputs: &SpeedFeatureInputs) -> SpeedFeatures {
    let allow_warped_motion = warped_motion_allowed(
        inputs.frame_type,
        inputs.error_resilient_mode,
        inputs.superres_active,
        inputs.speed_level,
    );

    SpeedFeatures {
        filter_intra: inputs.speed_level <= 2,
        allow_high_precision_mv: high_precision_mv_allowed(inputs.resolution, inputs.base_q_idx),
        allow_warped_motion,
        switchable_motion_mode: allow_warped_motion,
        obmc_level: obmc_level_for_speed(inputs.speed_level),
        hbd_mode_decision: hbd_mode_decision_for_speed(inputs.speed_level),
        bypass_cost_table_generation: inputs.speed_level >= 5,
        palette_mode: inputs.screen_content_mode && inputs.speed_level <= 4,
        intra_bc_hashing: inputs.screen_content_mode,
    }
}
