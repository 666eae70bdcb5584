// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Reference objects (§3). The decoded [`ReferenceObject`] and the
//! source-domain [`PictureAnalysisReferenceObject`] are distinct pools with
//! separately tracked lifetimes; only [`crate::pipeline::stages::picture_manager`]
//! mutates their reference counts (§5 Shared-resource policy).

use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameType {
    Key,
    IntraOnly,
    Inter,
    Switch,
}

/// A downscaled luma plane (1/4 or 1/16 of full resolution).
#[derive(Clone, Debug, Default)]
pub struct DownscaledLuma {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
}

/// Reference-count wrapper shared by both reference object kinds.
/// Incremented/decremented only by Picture Manager (§5, §9 "Cyclic
/// ownership" redesign note: an arena/index scheme rather than raw
/// pointers).
#[derive(Debug, Default)]
pub struct RefCount(AtomicI32);

impl RefCount {
    pub fn new(initial: i32) -> Self {
        Self(AtomicI32::new(initial))
    }

    pub fn acquire(&self) -> i32 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn release(&self) -> i32 {
        self.0.fetch_sub(1, Ordering::AcqRel) - 1
    }

    pub fn get(&self) -> i32 {
        self.0.load(Ordering::Acquire)
    }
}

/// A reconstructed reference frame plus its downsampled variants, used by
/// mode decision and by MDC's global-motion/MFMV derivation.
#[derive(Debug)]
pub struct ReferenceObject {
    pub order_hint: u32,
    pub frame_type: FrameType,
    pub luma_quarter: DownscaledLuma,
    pub luma_sixteenth: DownscaledLuma,
    /// Stored forward motion-vector field at 1/2 resolution, consumed by
    /// MFMV projection (§4.3).
    pub mv_field: Vec<(i16, i16)>,
    pub mv_field_width: u32,
    pub mv_field_height: u32,
    /// Self-guided-filter end-points carried forward for the MDC reference
    /// seed (§4.3).
    pub sg_frame_ep: [i8; 2],
    pub ref_count: RefCount,
}

impl ReferenceObject {
    pub fn new(order_hint: u32, frame_type: FrameType, mv_grid_width: u32, mv_grid_height: u32) -> Self {
        Self {
            order_hint,
            frame_type,
            luma_quarter: DownscaledLuma::default(),
            luma_sixteenth: DownscaledLuma::default(),
            mv_field: vec![(0, 0); (mv_grid_width * mv_grid_height) as usize],
            mv_field_width: mv_grid_width,
            mv_field_height: mv_grid_height,
            sg_frame_ep: [-1, -1],
            ref_count: RefCount::new(0),
        }
    }
}

/// Padded source-domain picture and its 1/4 and 1/16 luma downscales, used
/// by ME. Distinct from the decoded reference object.
#[derive(Debug)]
pub struct PictureAnalysisReferenceObject {
    pub picture_number: u64,
    pub padded_luma: Vec<u8>,
    pub padded_width: u32,
    pub padded_height: u32,
    pub luma_quarter: DownscaledLuma,
    pub luma_sixteenth: DownscaledLuma,
    pub ref_count: RefCount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_count_tracks_acquire_release() {
        let rc = RefCount::new(0);
        assert_eq!(rc.acquire(), 1);
        assert_eq!(rc.acquire(), 2);
        assert_eq!(rc.release(), 1);
        assert_eq!(rc.get(), 1);
    }

    #[test]
    fn new_reference_object_is_identity_sized() {
        let r = ReferenceObject::new(4, FrameType::Inter, 8, 6);
        assert_eq!(r.mv_field.len(), 48);
        assert_eq!(r.sg_frame_ep, [-1, -1]);
    }
}
