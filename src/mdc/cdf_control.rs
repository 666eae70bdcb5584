// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! CDF-update control (§4.3): derives one of four update modes from the
//! preset (speed level) and slice type. I-slices never update the MV CDF
//! model, since they carry no motion vectors.

use bitflags::bitflags;

use crate::data_model::ppcs::SliceType;

bitflags! {
    /// Update-mode selector, one bit per CDF family this stage can
    /// independently gate.
    ///
    /// * `NONE` — no CDF updates at all (fastest, highest-speed presets only).
    /// * `ALL` — update MV, syntax-element (SE) and coefficient CDFs.
    /// * `SE_AND_COEF` — update SE and coefficient CDFs, skip MV.
    /// * `SE_ONLY` — update SE CDFs only.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct CdfControl: u8 {
        const MV = 0b001;
        const SE = 0b010;
        const COEF = 0b100;

        const NONE = 0;
        const ALL = Self::MV.bits() | Self::SE.bits() | Self::COEF.bits();
        const SE_AND_COEF = Self::SE.bits() | Self::COEF.bits();
        const SE_ONLY = Self::SE.bits();
    }
}

impl CdfControl {
    pub fn update_mv(self) -> bool {
        self.contains(Self::MV)
    }

    pub fn update_se(self) -> bool {
        self.contains(Self::SE)
    }

    pub fn update_coef(self) -> bool {
        self.contains(Self::COEF)
    }
}

/// Mirrors the four update modes as a plain numeric mode, for callers that
/// want to log or serialize the choice rather than destructure the flags.
pub fn mode_number(ctrl: CdfControl) -> u8 {
    if ctrl == CdfControl::ALL {
        1
    } else if ctrl == CdfControl::SE_AND_COEF {
        2
    } else if ctrl == CdfControl::SE_ONLY {
        3
    } else {
        0
    }
}

/// Speed levels at or above this value disable CDF updates entirely.
const DISABLE_ALL_UPDATES_SPEED: u8 = 5;
/// Speed levels at or above this value (but below the disable-all
/// threshold) drop MV-CDF updates even on inter slices.
const DROP_MV_UPDATES_SPEED: u8 = 3;
/// Speed levels at or above this value drop coefficient-CDF updates too,
/// leaving only syntax-element updates.
const SE_ONLY_SPEED: u8 = 4;

/// Derives the CDF-update mode for one picture. I-slices (`SliceType::I`)
/// never update MV CDFs regardless of speed, since there is no
/// motion-vector CDF to update on an intra-only frame.
pub fn select_cdf_control(speed_level: u8, slice_type: SliceType) -> CdfControl {
    if speed_level >= DISABLE_ALL_UPDATES_SPEED {
        return CdfControl::NONE;
    }

    let is_intra = matches!(slice_type, SliceType::I);

    if speed_level >= SE_ONLY_SPEED {
        return CdfControl::SE_ONLY;
    }

    if is_intra || speed_level >= DROP_MV_UPDATES_SPEED {
        return CdfControl::SE_AND_COEF;
    }

    CdfControl::ALL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i_slices_never_update_mv() {
        for speed in 0..=5u8 {
            let ctrl = select_cdf_control(speed, SliceType::I);
            assert!(!ctrl.update_mv(), "speed={speed}");
        }
    }

    #[test]
    fn high_speed_disables_all_updates() {
        let ctrl = select_cdf_control(DISABLE_ALL_UPDATES_SPEED, SliceType::B);
        assert_eq!(ctrl, CdfControl::NONE);
    }

    #[test]
    fn low_speed_inter_slice_updates_everything() {
        let ctrl = select_cdf_control(0, SliceType::B);
        assert_eq!(ctrl, CdfControl::ALL);
    }

    #[test]
    fn mode_number_round_trips_known_modes() {
        assert_eq!(mode_number(CdfControl::NONE), 0);
        assert_eq!(mode_number(CdfControl::ALL), 1);
        assert_eq!(mode_number(CdfControl::SE_AND_COEF), 2);
        assert_eq!(mode_number(CdfControl::SE_ONLY), 3);
    }
}
