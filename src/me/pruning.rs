// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! HME/ME reference pruning, levels 0-6 (§4.2). After HME level 0, refs
//! whose best SAD deviates from the minimum by more than a per-level
//! threshold are dropped from ME; at higher levels an additional ME-SAD
//! deviation threshold drops refs after ME. Level >= 1 protects the
//! temporally closest references from pruning.

use log::trace;

pub const PRUNING_LEVELS: usize = 7;

/// Percentage deviation from the minimum HME-level-0 SAD above which a
/// reference is dropped before full ME, per level 0..6.
pub const HME_DEVIATION_THRESHOLD_PERCENT: [u32; PRUNING_LEVELS] = [0, 10, 20, 30, 50, 75, 100];

/// Percentage deviation from the minimum ME SAD above which a reference is
/// dropped after full ME, per level 0..6. Level 0 performs no post-ME
/// pruning.
pub const ME_DEVIATION_THRESHOLD_PERCENT: [u32; PRUNING_LEVELS] = [0, 0, 15, 25, 40, 60, 80];

#[derive(Copy, Clone, Debug)]
pub struct ReferenceCandidate {
    pub reference_index: usize,
    /// Signed temporal distance to the current picture; used to protect
    /// the temporally closest references at level >= 1.
    pub distance: i32,
    pub hme_sad: u32,
    pub me_sad: Option<u32>,
}

fn is_temporally_closest(candidates: &[ReferenceCandidate], index: usize) -> bool {
    let this = candidates[index].distance.abs();
    candidates
        .iter()
        .enumerate()
        .all(|(i, c)| i == index || c.distance.abs() >= this)
}

/// Apply HME-stage pruning: returns the indices (into `candidates`) that
/// survive for full ME.
pub fn prune_after_hme(candidates: &[ReferenceCandidate], level: usize) -> Vec<usize> {
    let level = level.min(PRUNING_LEVELS - 1);
    if level == 0 {
        return (0..candidates.len()).collect();
    }

    let Some(min_sad) = candidates.iter().map(|c| c.hme_sad).min() else {
        return vec![];
    };
    let threshold = HME_DEVIATION_THRESHOLD_PERCENT[level];

    let survivors: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            if level >= 1 && is_temporally_closest(candidates, *i) {
                return true;
            }
            let limit = min_sad + (min_sad as u64 * threshold as u64 / 100) as u32;
            c.hme_sad <= limit
        })
        .map(|(i, _)| i)
        .collect();
    trace!(
        "hme pruning level {level}: {}/{} references survive",
        survivors.len(),
        candidates.len()
    );
    survivors
}

/// Apply post-ME pruning on top of the surviving set from
/// [`prune_after_hme`]. Levels 0 and 1 perform no post-ME pruning (§4.2).
pub fn prune_after_me(candidates: &[ReferenceCandidate], surviving: &[usize], level: usize) -> Vec<usize> {
    let level = level.min(PRUNING_LEVELS - 1);
    if level < 2 {
        return surviving.to_vec();
    }

    let min_sad = surviving
        .iter()
        .filter_map(|&i| candidates[i].me_sad)
        .min();

    let Some(min_sad) = min_sad else {
        return surviving.to_vec();
    };
    let threshold = ME_DEVIATION_THRESHOLD_PERCENT[level];

    let survivors: Vec<usize> = surviving
        .iter()
        .copied()
        .filter(|&i| {
            if is_temporally_closest(candidates, i) {
                return true;
            }
            match candidates[i].me_sad {
                None => true,
                Some(sad) => sad <= min_sad + (min_sad as u64 * threshold as u64 / 100) as u32,
            }
        })
        .collect();
    trace!(
        "me pruning level {level}: {}/{} references survive",
        survivors.len(),
        surviving.len()
    );
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<ReferenceCandidate> {
        vec![
            ReferenceCandidate { reference_index: 0, distance: -1, hme_sad: 100, me_sad: Some(100) },
            ReferenceCandidate { reference_index: 1, distance: -2, hme_sad: 500, me_sad: Some(480) },
            ReferenceCandidate { reference_index: 2, distance: -8, hme_sad: 130, me_sad: Some(900) },
        ]
    }

    #[test]
    fn level_zero_keeps_everything() {
        let survivors = prune_after_hme(&candidates(), 0);
        assert_eq!(survivors.len(), 3);
    }

    #[test]
    fn higher_level_drops_far_deviating_refs_but_protects_closest() {
        let cands = candidates();
        let survivors = prune_after_hme(&cands, 2);
        // Index 0 is closest (distance -1), always protected.
        assert!(survivors.contains(&0));
        // Index 1 deviates far above threshold and is not closest: dropped.
        assert!(!survivors.contains(&1));
    }

    #[test]
    fn low_levels_do_not_prune_after_me() {
        let cands = candidates();
        let all = vec![0, 1, 2];
        assert_eq!(prune_after_me(&cands, &all, 1), all);
    }

    #[test]
    fn higher_level_prunes_after_me_but_protects_closest() {
        let cands = candidates();
        let all = vec![0, 1, 2];
        let survivors = prune_after_me(&cands, &all, 4);
        assert!(survivors.contains(&0));
    }
}
