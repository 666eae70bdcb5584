// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Global-motion field setup (§4.3): initializes each of the seven
//! canonical reference slots to IDENTITY, then for each slot marked
//! `is_global_motion`, copies the ME-produced warp and rescales its
//! translation components by 2x (`GM_DOWN`) or 4x (`GM_DOWN16`) to
//! compensate for the downsampled search; clamps to the legal range.

use crate::data_model::ppcs::CANONICAL_REF_SLOT_COUNT;
use crate::me::global_motion::{GlobalMotionParams, WARPEDMODEL_PREC_BITS};

/// Downscale factor used when the ME warp was estimated against the 1/4
/// luma plane.
pub const GM_DOWN: i32 = 2;
/// Downscale factor used when the ME warp was estimated against the 1/16
/// luma plane.
pub const GM_DOWN16: i32 = 4;

const GM_TRANS_PREC_BITS: i32 = 6;
const GM_ABS_TRANS_BITS: i32 = 12;
pub const GM_TRANS_MAX: i32 = 1 << GM_ABS_TRANS_BITS;
pub const GM_TRANS_MIN: i32 = -GM_TRANS_MAX;
pub const GM_TRANS_DECODE_FACTOR: i32 = 1 << (WARPEDMODEL_PREC_BITS - GM_TRANS_PREC_BITS);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchDomain {
    Quarter,
    Sixteenth,
}

fn downscale_factor(domain: SearchDomain) -> i32 {
    match domain {
        SearchDomain::Quarter => GM_DOWN,
        SearchDomain::Sixteenth => GM_DOWN16,
    }
}

fn clamp_translation(value: i32) -> i32 {
    value.clamp(GM_TRANS_MIN * GM_TRANS_DECODE_FACTOR, GM_TRANS_MAX * GM_TRANS_DECODE_FACTOR)
}

/// Initialize all seven canonical reference slots to IDENTITY.
pub fn init_identity() -> [GlobalMotionParams; CANONICAL_REF_SLOT_COUNT] {
    std::array::from_fn(|_| GlobalMotionParams::identity())
}

/// Rescale and clamp the ME-produced warp for one reference slot marked
/// `is_global_motion`. Translation components (indices 0 and 1 of `wmmat`)
/// are scaled by the downsample factor implied by the search domain the
/// estimate was produced against; the diagonal rotation/zoom components
/// (indices 2 and 5) are unaffected since they are scale-invariant ratios.
pub fn rescale_for_slot(estimated: GlobalMotionParams, domain: SearchDomain) -> GlobalMotionParams {
    if !estimated.is_global_motion {
        return GlobalMotionParams::identity();
    }

    let factor = downscale_factor(domain);
    let mut wmmat = estimated.wmmat;
    wmmat[0] = clamp_translation(wmmat[0] * factor);
    wmmat[1] = clamp_translation(wmmat[1] * factor);

    GlobalMotionParams {
        model: estimated.model,
        wmmat,
        is_global_motion: true,
    }
}

/// Build the full per-slot global-motion table for one reference list:
/// identity everywhere, except the slots named in `global_motion_slots`
/// which get the rescaled ME estimate.
pub fn build_slot_table(
    estimates: &[(usize, GlobalMotionParams, SearchDomain)],
) -> [GlobalMotionParams; CANONICAL_REF_SLOT_COUNT] {
    let mut slots = init_identity();
    for &(slot, estimate, domain) in estimates {
        if slot < CANONICAL_REF_SLOT_COUNT {
            slots[slot] = rescale_for_slot(estimate, domain);
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::me::global_motion::GlobalMotionModel;

    #[test]
    fn non_global_motion_slots_are_identity() {
        let slots = init_identity();
        for slot in slots.iter() {
            assert!(slot.is_identity());
            assert!(!slot.is_global_motion);
        }
    }

    #[test]
    fn rescale_applies_downscale_factor_to_translation_only() {
        let estimate = GlobalMotionParams {
            model: GlobalMotionModel::RotZoom,
            wmmat: [100, -50, 1 << WARPEDMODEL_PREC_BITS, 0, 0, 1 << WARPEDMODEL_PREC_BITS],
            is_global_motion: true,
        };
        let rescaled = rescale_for_slot(estimate, SearchDomain::Quarter);
        assert_eq!(rescaled.wmmat[0], 200);
        assert_eq!(rescaled.wmmat[1], -100);
        assert_eq!(rescaled.wmmat[2], 1 << WARPEDMODEL_PREC_BITS);
    }

    #[test]
    fn translation_clamps_to_legal_range() {
        let estimate = GlobalMotionParams {
            model: GlobalMotionModel::RotZoom,
            wmmat: [i32::MAX / 2, 0, 1 << WARPEDMODEL_PREC_BITS, 0, 0, 1 << WARPEDMODEL_PREC_BITS],
            is_global_motion: true,
        };
        let rescaled = rescale_for_slot(estimate, SearchDomain::Sixteenth);
        assert_eq!(rescaled.wmmat[0], GM_TRANS_MAX * GM_TRANS_DECODE_FACTOR);
    }

    #[test]
    fn slots_not_named_in_estimates_stay_identity() {
        let slots = build_slot_table(&[]);
        for slot in slots.iter() {
            assert!(slot.is_identity());
        }
    }
}
