// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Picture Manager (§2 stage 7): the sole writer of reference counts (§5
//! Shared-resource policy); enforces reference availability before a
//! picture is released to MDC, and gates decode-order-enforced sessions.

use std::collections::VecDeque;

use crate::data_model::ppcs::{ParentPictureControlSet, ReferenceMilestone};
use crate::data_model::reference::ReferenceObject;

/// Tracks which decoded references are available and, in decode-order-
/// enforced sessions, serializes release to MDC strictly by
/// `picture_number` (§5 Ordering guarantees).
#[derive(Default)]
pub struct PictureManager {
    decode_order_enforced: bool,
    next_decode_order: u64,
    pending: VecDeque<Box<ParentPictureControlSet>>,
}

impl PictureManager {
    pub fn new(decode_order_enforced: bool) -> Self {
        Self { decode_order_enforced, next_decode_order: 0, pending: VecDeque::new() }
    }

    /// True once every reference slot `ppcs`'s reference lists name is at
    /// least [`ReferenceMilestone::Available`] (§3 invariant: "the PPCS of
    /// picture P cannot advance past MDC until all reference PPCSes it
    /// depends on have reached at least the reference-available
    /// milestone").
    pub fn references_ready(&self, ppcs: &ParentPictureControlSet, reference_milestones: &[ReferenceMilestone]) -> bool {
        let wanted_slots = ppcs
            .reference_list_0
            .slots
            .iter()
            .chain(ppcs.reference_list_1.slots.iter())
            .flatten();

        wanted_slots
            .filter_map(|&slot| reference_milestones.get(slot as usize))
            .all(|&m| m >= ReferenceMilestone::Available)
    }

    /// Admits `ppcs` for release to MDC, honoring decode-order enforcement:
    /// when enforced, pictures are buffered and released strictly in
    /// ascending `decode_order`, even if a later picture's references
    /// become ready first.
    pub fn admit(&mut self, ppcs: Box<ParentPictureControlSet>) -> Vec<Box<ParentPictureControlSet>> {
        if !self.decode_order_enforced {
            return vec![ppcs];
        }

        self.pending.push_back(ppcs);
        let mut ready = Vec::new();
        loop {
            let Some(front_order) = self.pending.front().map(|p| p.decode_order) else {
                break;
            };
            if front_order != self.next_decode_order {
                break;
            }
            ready.push(self.pending.pop_front().unwrap());
            self.next_decode_order += 1;
        }
        ready
    }

    /// Decrements the reference count of every decoded reference no longer
    /// named by any in-flight picture and returns the ones that reached
    /// zero, for release back to their pool.
    pub fn release_unreferenced(&self, references: &[ReferenceObject]) -> Vec<usize> {
        references
            .iter()
            .enumerate()
            .filter(|(_, r)| r.ref_count.get() <= 0)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::ppcs::SliceType;
    use crate::data_model::reference::FrameType;
    use crate::data_model::sb::{SbGrid, SB_SIZE_LARGE};
    use crate::picture::{FrameMetadata, Resolution};

    fn ppcs(decode_order: u64) -> Box<ParentPictureControlSet> {
        let grid = SbGrid::new(SB_SIZE_LARGE, SB_SIZE_LARGE, SB_SIZE_LARGE);
        let mut p = ParentPictureControlSet::new(
            FrameMetadata { picture_number: decode_order, timestamp: 0, force_keyframe: false },
            Resolution { width: SB_SIZE_LARGE, height: SB_SIZE_LARGE },
            grid,
            SliceType::P,
        );
        p.decode_order = decode_order;
        Box::new(p)
    }

    #[test]
    fn unenforced_mode_releases_immediately() {
        let mut manager = PictureManager::new(false);
        let released = manager.admit(ppcs(5));
        assert_eq!(released.len(), 1);
    }

    #[test]
    fn enforced_mode_buffers_out_of_order_arrivals() {
        let mut manager = PictureManager::new(true);
        assert!(manager.admit(ppcs(1)).is_empty());
        assert!(manager.admit(ppcs(2)).is_empty());
        let released = manager.admit(ppcs(0));
        assert_eq!(released.len(), 3);
        assert_eq!(released[0].decode_order, 0);
        assert_eq!(released[2].decode_order, 2);
    }

    #[test]
    fn references_ready_requires_every_named_slot_available() {
        let manager = PictureManager::new(false);
        let mut p = ppcs(0);
        p.reference_list_0.slots[0] = Some(0);
        let milestones = vec![ReferenceMilestone::Decoded];
        assert!(!manager.references_ready(&p, &milestones));

        let milestones = vec![ReferenceMilestone::Available];
        assert!(manager.references_ready(&p, &milestones));
    }

    #[test]
    fn release_unreferenced_finds_zero_count_slots() {
        let manager = PictureManager::new(false);
        let refs = vec![
            ReferenceObject::new(0, FrameType::Inter, 1, 1),
            ReferenceObject::new(1, FrameType::Inter, 1, 1),
        ];
        refs[1].ref_count.acquire();
        let zeroed = manager.release_unreferenced(&refs);
        assert_eq!(zeroed, vec![0]);
    }
}
