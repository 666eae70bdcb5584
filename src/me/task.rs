// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Task-kind dispatch (§9 "Task-kind dispatch"): the ME stage handles four
//! task kinds through a tag on the message. Expressed here as a sum type
//! rather than an integer switch, as the redesign note recommends.

/// Tag distinguishing the four kinds of ME work a segment task can carry
/// (§4.1 Fifos).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeTaskKind {
    PictureMe,
    TemporalFilterMe,
    FirstPassMe,
    TplMe,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MotionVector {
    pub row: i16,
    pub col: i16,
}

impl MotionVector {
    pub const ZERO: MotionVector = MotionVector { row: 0, col: 0 };

    pub fn scale(&self, numerator: i32, denominator: i32) -> MotionVector {
        MotionVector {
            row: ((self.row as i32 * numerator) / denominator.max(1)) as i16,
            col: ((self.col as i32 * numerator) / denominator.max(1)) as i16,
        }
    }
}

/// One ranked motion-vector candidate against a single reference, at a
/// given partition size (§4.2 Responsibility).
#[derive(Copy, Clone, Debug, Default)]
pub struct MvCandidate {
    pub mv: MotionVector,
    pub sad: u32,
    pub variance: u32,
}

/// Search-method selection for full ME (§4.2 Full ME).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchMethod {
    /// Rows skipped.
    SubSad,
    FullSad,
}

/// Per-SB, per-reference ranked candidate set plus SAD/variance stats,
/// sized at pool construction to the maximum active-reference count (§3).
#[derive(Clone, Debug, Default)]
pub struct MotionEstimationResult {
    /// Indexed by reference slot (0..active_reference_count).
    pub candidates_by_reference: Vec<Vec<MvCandidate>>,
    pub best_reference: Option<usize>,
    pub hme_sad: u32,
    pub is_stationary: bool,
}

impl MotionEstimationResult {
    pub fn new(active_reference_count: usize) -> Self {
        Self {
            candidates_by_reference: vec![Vec::new(); active_reference_count],
            best_reference: None,
            hme_sad: 0,
            is_stationary: false,
        }
    }

    pub fn best_sad(&self) -> Option<u32> {
        self.candidates_by_reference
            .iter()
            .flat_map(|c| c.iter())
            .map(|c| c.sad)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_sad_is_minimum_across_references() {
        let mut result = MotionEstimationResult::new(2);
        result.candidates_by_reference[0].push(MvCandidate {
            mv: MotionVector::ZERO,
            sad: 400,
            variance: 0,
        });
        result.candidates_by_reference[1].push(MvCandidate {
            mv: MotionVector::ZERO,
            sad: 120,
            variance: 0,
        });
        assert_eq!(result.best_sad(), Some(120));
    }

    #[test]
    fn mv_scale_halves_and_quarters() {
        let mv = MotionVector { row: 8, col: -8 };
        assert_eq!(mv.scale(1, 2), MotionVector { row: 4, col: -4 });
    }
}
