// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Picture Decision (§2 stage 3): groups frames into mini-GOPs and assigns
//! slice type, temporal layer, reference lists, and decode order.

use crate::data_model::ppcs::{ParentPictureControlSet, ReferenceListDescriptor, SliceType};

/// Assigns the decode-order-relative slice type/temporal layer for one
/// picture position within a mini-GOP of `mini_gop_size` (a power of two,
/// §8 boundary: `hierarchical_levels=0` gives `mini_gop_size=1`, base-layer
/// only). `position_in_gop == 0` is always the mini-GOP's I/P anchor.
pub fn classify(position_in_gop: u32, mini_gop_size: u32, is_stream_start: bool) -> (SliceType, u8) {
    if is_stream_start {
        return (SliceType::I, 0);
    }
    if position_in_gop == 0 {
        return (SliceType::P, 0);
    }

    // Dyadic hierarchical B-structure: temporal layer is the position of
    // the lowest set bit counted from the top of the GOP, matching a
    // standard hierarchical-B mini-GOP's layer assignment.
    let mut layer = 0u8;
    let mut half = mini_gop_size;
    let mut pos = position_in_gop;
    while half > 1 {
        let mid = half / 2;
        if pos == mid {
            break;
        }
        if pos > mid {
            pos -= mid;
        }
        half = mid;
        layer += 1;
    }

    (SliceType::B, layer)
}

/// Assigns decode order for a full mini-GOP given display order, using the
/// canonical hierarchical split-in-half decode order: anchor first, then
/// recursively the midpoint of each remaining half.
pub fn decode_order_for_gop(mini_gop_size: u32) -> Vec<u32> {
    if mini_gop_size <= 1 {
        return vec![0];
    }

    let mut order = vec![0u32, mini_gop_size];
    let mut frontier = vec![(0u32, mini_gop_size)];
    while let Some((lo, hi)) = frontier.pop() {
        if hi - lo <= 1 {
            continue;
        }
        let mid = lo + (hi - lo) / 2;
        order.push(mid);
        frontier.push((lo, mid));
        frontier.push((mid, hi));
    }

    // De-duplicate the GOP boundary endpoint and clip to [0, mini_gop_size).
    order.retain(|&p| p < mini_gop_size);
    order.sort_unstable();
    order.dedup();
    order
}

/// Stamps slice type, temporal layer and decode order onto `ppcs` for its
/// position within the current mini-GOP, and clears its reference-list
/// descriptors to be filled in by the reference-list construction pass
/// (out of scope here: the exact DPB reference-picture selection algorithm
/// is bitstream detail, §1).
pub fn decide(
    ppcs: &mut ParentPictureControlSet,
    position_in_gop: u32,
    mini_gop_size: u32,
    decode_order: u64,
    is_stream_start: bool,
) {
    let (slice_type, temporal_layer) = classify(position_in_gop, mini_gop_size, is_stream_start);
    ppcs.slice_type = slice_type;
    ppcs.temporal_layer = temporal_layer;
    ppcs.decode_order = decode_order;
    ppcs.reference_list_0 = ReferenceListDescriptor::default();
    ppcs.reference_list_1 = ReferenceListDescriptor::default();
}
