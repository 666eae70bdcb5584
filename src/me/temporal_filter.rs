// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Temporal-filter ME (§4.2): a separate task kind with dedicated HME/ME
//! parameter tables, wider coarse search, no ref-pruning, no SR
//! adjustment, FULL_SAD at HME and SUB_SAD at ME. TF is disabled for
//! low-delay structures and for pass-1.

use crate::me::hme::SearchArea;
use crate::me::task::SearchMethod;

pub const TF_LEVELS: usize = 7;

/// `tf_set_me_hme_params_oq`-equivalent table: wider HME0 search per level
/// than the picture-ME defaults, since TF only needs coarse alignment
/// before weighted accumulation.
pub const TF_HME0_SEARCH_AREA: [SearchArea; TF_LEVELS] = [
    SearchArea { width: 128, height: 96 },
    SearchArea { width: 112, height: 80 },
    SearchArea { width: 96, height: 64 },
    SearchArea { width: 80, height: 56 },
    SearchArea { width: 64, height: 48 },
    SearchArea { width: 48, height: 32 },
    SearchArea { width: 32, height: 24 },
];

pub const TF_ME_SEARCH_AREA: [SearchArea; TF_LEVELS] = [
    SearchArea { width: 64, height: 64 },
    SearchArea { width: 56, height: 56 },
    SearchArea { width: 48, height: 48 },
    SearchArea { width: 40, height: 40 },
    SearchArea { width: 32, height: 32 },
    SearchArea { width: 24, height: 24 },
    SearchArea { width: 16, height: 16 },
];

pub const TF_HME_METHOD: SearchMethod = SearchMethod::FullSad;
pub const TF_ME_METHOD: SearchMethod = SearchMethod::SubSad;

#[derive(Copy, Clone, Debug)]
pub struct TemporalFilterParams {
    pub level: u8,
    pub hme0_search_area: SearchArea,
    pub me_search_area: SearchArea,
}

/// §8 scenario 4: TF is bypassed entirely when `tf_level == 0`.
pub fn is_enabled(tf_level: i32, is_low_delay: bool, is_first_pass: bool) -> bool {
    if is_low_delay || is_first_pass {
        return false;
    }
    tf_level != 0
}

pub fn params_for_level(tf_level: u8) -> TemporalFilterParams {
    let level = (tf_level as usize).min(TF_LEVELS - 1);
    TemporalFilterParams {
        level: level as u8,
        hme0_search_area: TF_HME0_SEARCH_AREA[level],
        me_search_area: TF_ME_SEARCH_AREA[level],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tf_disabled_for_low_delay_regardless_of_level() {
        assert!(!is_enabled(3, true, false));
    }

    #[test]
    fn tf_disabled_for_first_pass() {
        assert!(!is_enabled(3, false, true));
    }

    #[test]
    fn tf_level_zero_disables_tf() {
        assert!(!is_enabled(0, false, false));
    }

    #[test]
    fn tf_enabled_for_random_access_nonzero_level() {
        assert!(is_enabled(3, false, false));
    }

    #[test]
    fn search_area_shrinks_as_level_increases() {
        let low = params_for_level(0);
        let high = params_for_level(6);
        assert!(low.hme0_search_area.width > high.hme0_search_area.width);
    }
}
