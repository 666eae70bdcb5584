// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Picture segmentation (§4.1): ME and post-ME stages split each picture
//! into a rows × cols grid of segments so multiple workers cooperate on one
//! picture, joining on a segment counter for picture-wide steps.
//!
//! [`PictureBarrier`] implements the cleaner of the two equivalent forms
//! discussed in the design notes: post every segment task up front, then
//! await the counter reaching the total on a dedicated thread, rather than
//! letting whichever worker happens to finish last silently take on the
//! picture-wide work. [`ParentPictureControlSet::segment_done`] still
//! implements the historical last-worker-wins form for the specific case
//! of global motion; this type is for stages (TPL join, TF accumulation)
//! built fresh against this design.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;

/// A segment's position in the rows × cols grid a stage was configured
/// with at init.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SegmentId {
    pub row: usize,
    pub col: usize,
}

/// The segment grid a stage partitions each picture into. Distinct from
/// [`crate::data_model::sb::SbGrid`]: a stage's segment grid groups many
/// SBs per segment and is typically much coarser.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SegmentGrid {
    pub rows: usize,
    pub cols: usize,
}

impl SegmentGrid {
    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| SegmentId { row, col }))
    }
}

/// A single-use, picture-scoped join point: every segment task calls
/// [`PictureBarrier::arrive`] once when done; a dedicated awaiting thread
/// (or the orchestrator) calls [`PictureBarrier::wait`] to block until all
/// of them have.
pub struct PictureBarrier {
    total: usize,
    arrived: AtomicUsize,
}

impl PictureBarrier {
    pub fn new(total: usize) -> Self {
        Self { total, arrived: AtomicUsize::new(0) }
    }

    /// Call once per completed segment. Never blocks.
    pub fn arrive(&self) {
        let arrived = self.arrived.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("picture barrier arrival {arrived}/{}", self.total);
    }

    /// True once every segment has arrived.
    pub fn is_complete(&self) -> bool {
        self.arrived.load(Ordering::Acquire) >= self.total
    }

    /// Busy-polls until complete, yielding between checks. Segment counts
    /// are small (tens to low hundreds) and segments finish within
    /// milliseconds of each other, so a spin-with-yield is preferable to
    /// the overhead of a condvar for this join.
    pub fn wait(&self) {
        while !self.is_complete() {
            std::thread::yield_now();
        }
        trace!("picture barrier complete ({} segments)", self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn grid_enumerates_every_segment_exactly_once() {
        let grid = SegmentGrid { rows: 3, cols: 4 };
        let ids: Vec<_> = grid.ids().collect();
        assert_eq!(ids.len(), grid.total());
        assert_eq!(ids[0], SegmentId { row: 0, col: 0 });
        assert_eq!(ids[ids.len() - 1], SegmentId { row: 2, col: 3 });
    }

    #[test]
    fn barrier_completes_only_after_every_segment_arrives() {
        let barrier = PictureBarrier::new(4);
        for _ in 0..3 {
            barrier.arrive();
            assert!(!barrier.is_complete());
        }
        barrier.arrive();
        assert!(barrier.is_complete());
    }

    #[test]
    fn wait_unblocks_once_all_workers_arrive() {
        let barrier = Arc::new(PictureBarrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = barrier.clone();
                std::thread::spawn(move || barrier.arrive())
            })
            .collect();
        barrier.wait();
        for h in handles {
            h.join().unwrap();
        }
        assert!(barrier.is_complete());
    }
}
