// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Mode-Decision Configuration (§2 stage 8, core subsystem C): the final
//! per-picture setup pass before mode decision proper. Wires the
//! already-derived `mdc::*` building blocks — quantizer/quality-matrix
//! tables, rate estimation, CDF-update mode, speed-tool switches and the
//! global-motion slot table — into a single per-picture pass over one
//! PPCS, and stamps the resulting scalar flags onto its frame header.

use crate::data_model::ppcs::{ParentPictureControlSet, CANONICAL_REF_SLOT_COUNT};
use crate::data_model::tables::speed_level_for_enc_mode;
use crate::error::MdcResult;
use crate::me::global_motion::GlobalMotionParams;
use crate::mdc::cdf_control::{select_cdf_control, CdfControl};
use crate::mdc::frame_context::{init_frame_context, FrameContext};
use crate::mdc::global_motion_setup::{build_slot_table, SearchDomain};
use crate::mdc::quality_matrix::QualityMatrixTable;
use crate::mdc::quantizer::QuantizerTable;
use crate::mdc::rate_estimation::{build_rate_estimation_tables, RateEstimationTables};
use crate::mdc::speed_features::{select_speed_features, SpeedFeatureInputs, SpeedFeatures};

/// Tables that are a pure function of their own shape, not of any picture:
/// built once per session and referenced by every picture's MDC pass
/// rather than rebuilt each time.
pub struct MdcSharedTables {
    pub quantizer: QuantizerTable,
    pub quality_matrix: QualityMatrixTable,
}

impl MdcSharedTables {
    pub fn build() -> Self {
        Self {
            quantizer: QuantizerTable::build(),
            quality_matrix: QualityMatrixTable::build(),
        }
    }
}

/// Everything MDC derives for one picture that the PPCS has no field of its
/// own for. The scalar feature flags this carries are additionally copied
/// onto `ppcs.frame_header`, since downstream mode decision (out of scope,
/// §1) reads them from there rather than from this transient struct.
pub struct PictureMdcConfig {
    pub cdf_control: CdfControl,
    pub speed_features: SpeedFeatures,
    pub frame_context: FrameContext,
    pub rate_estimation: RateEstimationTables,
    pub global_motion_slots: [GlobalMotionParams; CANONICAL_REF_SLOT_COUNT],
}

/// Per-picture input this stage cannot derive from the PPCS alone: entropy
/// contexts carried by already-decoded references, the base q-idx the rate
/// controller (out of scope, §1) selected for this picture, and a handful
/// of session-scoped flags.
pub struct MdcPictureInputs<'a> {
    pub reference_contexts: &'a [FrameContext],
    pub base_q_idx: u8,
    pub screen_content_mode: bool,
    pub superres_active: bool,
    pub enc_mode: u8,
    pub is_first_pass: bool,
}

/// Runs the full per-picture MDC pass for `ppcs`: derives CDF-update mode,
/// speed-tool switches, the frame entropy context, rate-estimation tables,
/// and the rescaled global-motion slot table; writes the scalar flags back
/// onto `ppcs.frame_header` and `ppcs.global_motion_estimation[0]`.
///
/// Only reference-list 0's global-motion estimate is rescaled here; a
/// second call with list-1 estimates handles bipredictive slots (§9 open
/// question: this spec does not require both lists to be configured in one
/// pass).
pub fn configure(
    ppcs: &mut ParentPictureControlSet,
    inputs: &MdcPictureInputs<'_>,
) -> MdcResult<PictureMdcConfig> {
    let speed_level = speed_level_for_enc_mode(inputs.enc_mode) as u8;
    let frame_type = ppcs.frame_type();

    let cdf_control = select_cdf_control(speed_level, ppcs.slice_type);

    let speed_feature_inputs = SpeedFeatureInputs {
        speed_level,
        frame_type,
        resolution: ppcs.resolution,
        base_q_idx: inputs.base_q_idx,
        error_resilient_mode: ppcs.frame_header.error_resilient_mode,
        superres_active: inputs.superres_active,
        screen_content_mode: inputs.screen_content_mode,
    };
    let speed_features = select_speed_features(&speed_feature_inputs);

    let frame_context = init_frame_context(ppcs.primary_ref_frame, inputs.reference_contexts, inputs.base_q_idx)?;
    let rate_estimation = build_rate_estimation_tables(&frame_context, inputs.is_first_pass);

    let domain = if inputs.superres_active {
        SearchDomain::Sixteenth
    } else {
        SearchDomain::Quarter
    };
    let estimated = ppcs.global_motion_estimation[0][0];
    let global_motion_slots = build_slot_table(&[(0, estimated, domain)]);

    ppcs.frame_header.base_q_idx = inputs.base_q_idx;
    ppcs.frame_header.allow_warped_motion = speed_features.allow_warped_motion;
    ppcs.frame_header.allow_high_precision_mv = speed_features.allow_high_precision_mv;
    ppcs.frame_header.allow_screen_content_tools = inputs.screen_content_mode;
    ppcs.global_motion_estimation[0] = global_motion_slots;

    Ok(PictureMdcConfig {
        cdf_control,
        speed_features,
        frame_context,
        rate_estimation,
        global_motion_slots,
    })
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
            SliceType::I,
        )
    }

    fn inputs(enc_mode: u8) -> MdcPictureInputs<'static> {
        MdcPictureInputs {
            reference_contexts: &[],
            base_q_idx: 60,
            screen_content_mode: false,
            superres_active: false,
            enc_mode,
            is_first_pass: false,
        }
    }

    #[test]
    fn key_frame_never_updates_mv_cdf_and_never_allows_warped_motion() {
        let mut ppcs = make_ppcs();
        let config = configure(&mut ppcs, &inputs(0)).unwrap();
        assert!(!config.cdf_control.update_mv());
        assert!(!config.speed_features.allow_warped_motion);
        assert!(!ppcs.frame_header.allow_warped_motion);
    }

    #[test]
    fn configure_stamps_base_q_idx_onto_frame_header() {
        let mut ppcs = make_ppcs();
        configure(&mut ppcs, &inputs(4)).unwrap();
        assert_eq!(ppcs.frame_header.base_q_idx, 60);
    }

    #[test]
    fn no_primary_ref_builds_default_frame_context_at_base_q() {
        let mut ppcs = make_ppcs();
        let config = configure(&mut ppcs, &inputs(4)).unwrap();
        assert!(!config.frame_context.copied_from_primary_ref);
        assert_eq!(config.frame_context.coef_probs.seeded_from_q_idx, 60);
    }

    #[test]
    fn out_of_range_primary_ref_is_propagated_as_fatal() {
        let mut ppcs = make_ppcs();
        ppcs.primary_ref_frame = Some(9);
        let result = configure(&mut ppcs, &inputs(4));
        assert!(result.is_err());
    }

    #[test]
    fn first_pass_skips_mv_rate_table() {
        let mut ppcs = make_ppcs();
        ppcs.slice_type = SliceType::P;
        let mut cfg = inputs(4);
        cfg.is_first_pass = true;
        let config = configure(&mut ppcs, &cfg).unwrap();
        assert!(config.rate_estimation.mv.is_none());
    }

    #[test]
    fn identity_estimate_produces_identity_slot_table() {
        let mut ppcs = make_ppcs();
        let config = configure(&mut ppcs, &inputs(4)).unwrap();
        assert!(config.global_motion_slots[0].is_identity());
    }

    #[test]
    fn shared_tables_build_without_panicking() {
        let tables = MdcSharedTables::build();
        assert!(tables.quantizer.entry(0, 0).quant[0] > 0);
        assert!(tables.quality_matrix.entry(0, 0, 0).gqmatrix.is_some());
    }
}
