// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Motion-field projection / MFMV (§4.3): projects up to five canonical
//! source references' stored motion vectors into the current frame's 8x8
//! temporal MV grid, scaling by the ratio of the current-to-reference
//! distance over the reference-to-its-source distance, and rejects any
//! projection whose offset falls outside the representable range.

use crate::me::task::MotionVector;

/// Largest representable frame-distance delta (order-hint modular
/// arithmetic wraps beyond this).
pub const MAX_FRAME_DISTANCE: i32 = 31;
/// Canonical number of source references eligible for projection.
pub const MAX_MFMV_SOURCES: usize = 5;
/// Temporal MV grid granularity: one entry per 8x8 luma block.
pub const MOTION_FIELD_BLOCK_SIZE: u32 = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MotionFieldGrid {
    pub cols: u32,
    pub rows: u32,
}

impl MotionFieldGrid {
    pub fn for_resolution(width: u32, height: u32) -> Self {
        Self {
            cols: width.div_ceil(MOTION_FIELD_BLOCK_SIZE),
            rows: height.div_ceil(MOTION_FIELD_BLOCK_SIZE),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MotionFieldEntry {
    pub mv: MotionVector,
    pub ref_frame_offset: i32,
}

/// Order-hint modular distance (`get_relative_dist`): signed distance from
/// `b` to `a` under a power-of-two order-hint wraparound, matching AV1's
/// reference distance semantics.
pub fn relative_dist(a: u32, b: u32, order_hint_bits: u32) -> i32 {
    if order_hint_bits == 0 {
        return 0;
    }
    let diff = (a as i64) - (b as i64);
    let m = 1i64 << (order_hint_bits - 1);
    (((diff + m) & ((1i64 << order_hint_bits) - 1)) - m) as i32
}

/// Source-reference projection input: the reference's stored MV field
/// plus the order hints needed to compute the scaling ratio.
pub struct SourceReference<'a> {
    pub mvs: &'a [MotionVector],
    pub grid: MotionFieldGrid,
    pub ref_order_hint: u32,
    pub ref_to_source_order_hint: u32,
}

/// Computes the block position a source reference's stored MV projects to
/// in the current frame's grid, or `None` if it falls outside the grid
/// (the §8 invariant: when this returns `None`, no slot is written).
fn get_block_position(col: i32, row: i32, grid: MotionFieldGrid) -> Option<(u32, u32)> {
    if col < 0 || row < 0 || col as u32 >= grid.cols || row as u32 >= grid.rows {
        return None;
    }
    Some((col as u32, row as u32))
}

/// Projects one source reference's motion field into `out`, which must be
/// sized `grid.cell_count()`. `current_order_hint` and `ref_order_hint`
/// give the distance from the current frame to the reference; entries
/// whose resulting `ref_frame_offset` would fall outside `(0,
/// MAX_FRAME_DISTANCE]` are skipped rather than written, per §8.
pub fn project_motion_field(
    source: &SourceReference<'_>,
    current_order_hint: u32,
    order_hint_bits: u32,
    out_grid: MotionFieldGrid,
    out: &mut [Option<MotionFieldEntry>],
) {
    assert_eq!(out.len(), out_grid.cell_count());

    let current_to_ref = relative_dist(current_order_hint, source.ref_order_hint, order_hint_bits);
    let ref_to_source = relative_dist(source.ref_order_hint, source.ref_to_source_order_hint, order_hint_bits);

    if ref_to_source == 0 || current_to_ref <= 0 || current_to_ref > MAX_FRAME_DISTANCE {
        return;
    }

    for row in 0..source.grid.rows {
        for col in 0..source.grid.cols {
            let idx = row as usize * source.grid.cols as usize + col as usize;
            let stored = source.mvs[idx];
            if stored == MotionVector::ZERO {
                continue;
            }

            let scaled_row = (stored.row as i32 * current_to_ref) / ref_to_source;
            let scaled_col = (stored.col as i32 * current_to_ref) / ref_to_source;

            let projected_col = col as i32 + scaled_col / MOTION_FIELD_BLOCK_SIZE as i32;
            let projected_row = row as i32 + scaled_row / MOTION_FIELD_BLOCK_SIZE as i32;

            let Some((out_col, out_row)) = get_block_position(projected_col, projected_row, out_grid) else {
                continue;
            };

            let out_idx = out_row as usize * out_grid.cols as usize + out_col as usize;
            out[out_idx] = Some(MotionFieldEntry {
                mv: MotionVector { row: scaled_row as i16, col: scaled_col as i16 },
                ref_frame_offset: current_to_ref,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions_round_up_to_block_size() {
        let grid = MotionFieldGrid::for_resolution(65, 9);
        assert_eq!(grid.cols, 9);
        assert_eq!(grid.rows, 2);
    }

    #[test]
    fn relative_dist_wraps_symmetrically() {
        let bits = 5;
        assert_eq!(relative_dist(1, 0, bits), 1);
        assert_eq!(relative_dist(0, 1, bits), -1);
    }

    #[test]
    fn zero_motion_entries_are_skipped() {
        let grid = MotionFieldGrid::for_resolution(16, 16);
        let mvs = vec![MotionVector::ZERO; grid.cell_count()];
        let source = SourceReference { mvs: &mvs, grid, ref_order_hint: 2, ref_to_source_order_hint: 0 };
        let mut out = vec![None; grid.cell_count()];
        project_motion_field(&source, 4, 5, grid, &mut out);
        assert!(out.iter().all(|e| e.is_none()));
    }

    #[test]
    fn out_of_range_offset_projects_nothing() {
        let grid = MotionFieldGrid::for_resolution(16, 16);
        let mvs = vec![MotionVector { row: 4, col: 4 }; grid.cell_count()];
        // current_to_ref computed from order hints will be 0 here (equal hints), which is rejected.
        let source = SourceReference { mvs: &mvs, grid, ref_order_hint: 10, ref_to_source_order_hint: 2 };
        let mut out = vec![None; grid.cell_count()];
        project_motion_field(&source, 10, 5, grid, &mut out);
        assert!(out.iter().all(|e| e.is_none()));
    }

    #[test]
    fn written_slot_offset_is_within_valid_range() {
        let grid = MotionFieldGrid::for_resolution(32, 32);
        let mvs = vec![MotionVector { row: 2, col: 2 }; grid.cell_count()];
        let source = SourceReference { mvs: &mvs, grid, ref_order_hint: 2, ref_to_source_order_hint: 0 };
        let mut out = vec![None; grid.cell_count()];
        project_motion_field(&source, 6, 5, grid, &mut out);
        for entry in out.iter().flatten() {
            assert!(entry.ref_frame_offset > 0 && entry.ref_frame_offset <= MAX_FRAME_DISTANCE);
        }
    }
}
