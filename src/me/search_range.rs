// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Search-range adaptation, levels 0-3 (§4.2). After HME, the ME search
//! range is scaled down when HME SAD falls below a stationary or
//! low-HME-SAD absolute threshold; additionally scaled by reference
//! distance at level >= 2.

use log::trace;

/// Default absolute SAD threshold below which content is considered
/// stationary.
pub const STATIONARY_HME_SAD_ABS_TH_DEFAULT: u32 = 250;
/// Default absolute SAD threshold below which the ME search range is
/// reduced for "low HME SAD" content (looser than the stationary one).
pub const REDUCE_ME_SR_BASED_ON_HME_SAD_ABS_TH_DEFAULT: u32 = 600;

pub const STATIONARY_SHRINK_FACTOR: u32 = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HmeLevelsEnabled {
    pub level0: bool,
    pub level1: bool,
    pub level2: bool,
}

/// Stationary/low-HME-SAD thresholds are automatically divided by 4
/// (level-1-only disabled) or 16 (level-0-only disabled) when HME levels
/// are disabled (§4.2).
pub fn adjusted_thresholds(levels: HmeLevelsEnabled) -> (u32, u32) {
    let divisor = if !levels.level0 {
        16
    } else if !levels.level1 {
        4
    } else {
        1
    };

    (
        STATIONARY_HME_SAD_ABS_TH_DEFAULT / divisor,
        REDUCE_ME_SR_BASED_ON_HME_SAD_ABS_TH_DEFAULT / divisor,
    )
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RangeDecision {
    Full,
    /// Scaled down by [`STATIONARY_SHRINK_FACTOR`].
    Stationary,
    /// Scaled down, with an additional level>=2 reference-distance factor.
    LowHmeSad { distance_factor: u32 },
}

/// Decide the search-range scaling for this reference given the picture's
/// HME SAD, the adaptation level (0..3, 0 = off), and the reference's
/// temporal distance (used only at level >= 2).
pub fn decide_range(hme_sad: u32, level: u8, reference_distance: u32, levels: HmeLevelsEnabled) -> RangeDecision {
    if level == 0 {
        return RangeDecision::Full;
    }

    let (stationary_th, low_sad_th) = adjusted_thresholds(levels);

    if hme_sad <= stationary_th {
        trace!("search range decision: stationary (hme_sad={hme_sad} <= {stationary_th})");
        return RangeDecision::Stationary;
    }

    if hme_sad <= low_sad_th {
        let distance_factor = if level >= 2 {
            reference_distance.clamp(1, 4)
        } else {
            1
        };
        trace!("search range decision: low-hme-sad (hme_sad={hme_sad} <= {low_sad_th}, distance_factor={distance_factor})");
        return RangeDecision::LowHmeSad { distance_factor };
    }

    trace!("search range decision: full (hme_sad={hme_sad})");
    RangeDecision::Full
}

pub fn apply(range: u16, decision: RangeDecision) -> u16 {
    match decision {
        RangeDecision::Full => range,
        RangeDecision::Stationary => (range / STATIONARY_SHRINK_FACTOR as u16).max(1),
        RangeDecision::LowHmeSad { distance_factor } => {
            (range / (STATIONARY_SHRINK_FACTOR as u16 / distance_factor.max(1) as u16).max(1)).max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabling_level0_divides_thresholds_by_16() {
        let (stationary, low_sad) = adjusted_thresholds(HmeLevelsEnabled {
            level0: false,
            level1: true,
            level2: true,
        });
        assert_eq!(stationary, STATIONARY_HME_SAD_ABS_TH_DEFAULT / 16);
        assert_eq!(low_sad, REDUCE_ME_SR_BASED_ON_HME_SAD_ABS_TH_DEFAULT / 16);
    }

    #[test]
    fn disabling_level1_only_divides_thresholds_by_4() {
        let (stationary, _) = adjusted_thresholds(HmeLevelsEnabled {
            level0: true,
            level1: false,
            level2: true,
        });
        assert_eq!(stationary, STATIONARY_HME_SAD_ABS_TH_DEFAULT / 4);
    }

    #[test]
    fn level_zero_never_shrinks() {
        let levels = HmeLevelsEnabled { level0: true, level1: true, level2: true };
        assert_eq!(decide_range(0, 0, 1, levels), RangeDecision::Full);
    }

    #[test]
    fn low_stationary_sad_shrinks_range() {
        let levels = HmeLevelsEnabled { level0: true, level1: true, level2: true };
        let decision = decide_range(10, 2, 1, levels);
        assert_eq!(decision, RangeDecision::Stationary);
        assert_eq!(apply(64, decision), 8);
    }
}
