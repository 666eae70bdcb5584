// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Child Picture Control Set: block-level encoding state (§3), one-to-one
//! with a PPCS for its encoding lifetime. Mode decision / EncDec itself is
//! external to this spec; CPCS here only carries the state MDC populates
//! or that a conformant mode-decision consumer would read.

use crate::mdc::rate_estimation::RateEstimationTables;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum IntraMode {
    #[default]
    DcPred,
    VPred,
    HPred,
    SmoothPred,
    PaethPred,
    Directional(u8),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReferenceType {
    #[default]
    Intra,
    SingleRef(u8),
    CompoundRef(u8, u8),
}

/// Per-4x4 neighbor context arrays, indexed in raster-scan order across a
/// picture's 4x4 grid.
#[derive(Clone, Debug, Default)]
pub struct NeighborArrays {
    pub intra_mode: Vec<IntraMode>,
    pub partition_context: Vec<u8>,
    pub coefficient_context: Vec<u8>,
    pub reference_type: Vec<ReferenceType>,
    pub transform_context: Vec<u8>,
}

impl NeighborArrays {
    pub fn new(grid_4x4_count: usize) -> Self {
        Self {
            intra_mode: vec![IntraMode::default(); grid_4x4_count],
            partition_context: vec![0; grid_4x4_count],
            coefficient_context: vec![0; grid_4x4_count],
            reference_type: vec![ReferenceType::default(); grid_4x4_count],
            transform_context: vec![0; grid_4x4_count],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionDecision {
    None,
    Horz,
    Vert,
    Split,
}

/// Per-tile CDEF/restoration scratch; filter parameter *search* is external
/// (§1), but MDC seeds the reference end-points consumed by that search
/// (§4.3 "Reference self-guided-filter seed").
#[derive(Clone, Debug, Default)]
pub struct TileFilterScratch {
    pub cdef_strength: Vec<u8>,
    pub restoration_unit_types: Vec<u8>,
}

pub struct ChildPictureControlSet {
    pub neighbors: NeighborArrays,
    pub rate_tables: RateEstimationTables,
    pub tile_filter_scratch: Vec<TileFilterScratch>,
    pub sb_partition_decisions: Vec<PartitionDecision>,
}

impl ChildPictureControlSet {
    pub fn new(grid_4x4_count: usize, sb_count: usize, tile_count: usize, rate_tables: RateEstimationTables) -> Self {
        Self {
            neighbors: NeighborArrays::new(grid_4x4_count),
            rate_tables,
            tile_filter_scratch: vec![TileFilterScratch::default(); tile_count],
            sb_partition_decisions: vec![PartitionDecision::None; sb_count],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_arrays_sized_to_grid() {
        let arrays = NeighborArrays::new(16);
        assert_eq!(arrays.intra_mode.len(), 16);
        assert_eq!(arrays.reference_type.len(), 16);
    }
}
