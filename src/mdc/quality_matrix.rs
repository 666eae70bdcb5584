// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Quality matrices (§4.3): for `NUM_QM_LEVELS x 3 planes x TX_SIZES_ALL`,
//! point `gqmatrix`/`giqmatrix` at shared reference tables. The last level
//! is off (null matrices). Sizes sharing a matrix with a larger size (via
//! `av1_get_adjusted_tx_size`) reuse the same pointer.

use std::rc::Rc;

pub const NUM_QM_LEVELS: usize = 16;
/// Quality matrices are off at the last level.
pub const QM_LEVEL_OFF: usize = NUM_QM_LEVELS - 1;
pub const NUM_PLANES: usize = 3;

/// AV1 transform-size enumeration, `TX_SIZES_ALL` entries. Kept as a plain
/// index type since the actual per-size geometry is owned by mode decision
/// (out of scope); only the adjacency needed for matrix reuse lives here.
pub const TX_SIZES_ALL: usize = 19;

/// Maps a transform size to the (possibly smaller) size whose quality
/// matrix it shares, matching `av1_get_adjusted_tx_size`'s behavior of
/// capping very large transforms to the matrix table's largest tabulated
/// entry.
pub fn adjusted_tx_size(tx_size: usize) -> usize {
    // Sizes 0..=15 are square/rectangular transforms up to 32x32 and all
    // have their own matrix; 16..=18 (64-wide variants) share the 32-wide
    // equivalent matrix, three steps back in the canonical ordering used
    // by this table.
    if tx_size >= 16 {
        tx_size - 3
    } else {
        tx_size
    }
}

pub type Matrix = Rc<[u8]>;

#[derive(Clone, Debug, Default)]
pub struct QuantMatrixEntry {
    pub gqmatrix: Option<Matrix>,
    pub giqmatrix: Option<Matrix>,
}

pub struct QualityMatrixTable {
    /// `[level][plane][tx_size]`.
    entries: Vec<[[QuantMatrixEntry; TX_SIZES_ALL]; NUM_PLANES]>,
}

fn synth_matrix(level: usize, plane: usize, size: usize) -> Matrix {
    // A monotone synthetic matrix standing in for the real per-coefficient
    // weighting tables: values grow with level (more aggressive flattening
    // at low levels) and vary smoothly across the transform's raster
    // position, which is the shape MDC's consumers rely on.
    let len = 16usize << (size.min(6));
    let base = 32 + level as u32 * 4 + plane as u32 * 2;
    (0..len).map(|i| (base + (i as u32 % 32)).min(255) as u8).collect()
}

impl QualityMatrixTable {
    pub fn build() -> Self {
        let mut entries = Vec::with_capacity(NUM_QM_LEVELS);

        for level in 0..NUM_QM_LEVELS {
            let mut per_plane: [[QuantMatrixEntry; TX_SIZES_ALL]; NUM_PLANES] = Default::default();

            if level == QM_LEVEL_OFF {
                entries.push(per_plane);
                continue;
            }

            // Build matrices only for the canonical (non-reused) sizes per
            // plane, then point every size at the canonical one it adjusts to.
            for plane in 0..NUM_PLANES {
                let mut canonical_matrices: Vec<Option<Matrix>> = vec![None; TX_SIZES_ALL];
                for size in 0..TX_SIZES_ALL {
                    let canon = adjusted_tx_size(size);
                    if canonical_matrices[canon].is_none() {
                        canonical_matrices[canon] = Some(synth_matrix(level, plane, canon));
                    }
                    let m = canonical_matrices[canon].clone();
                    per_plane[plane][size] = QuantMatrixEntry {
                        gqmatrix: m.clone(),
                        giqmatrix: m,
                    };
                }
            }

            entries.push(per_plane);
        }

        Self { entries }
    }

    pub fn entry(&self, level: usize, plane: usize, tx_size: usize) -> &QuantMatrixEntry {
        &self.entries[level.min(NUM_QM_LEVELS - 1)][plane][tx_size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_level_has_null_matrices() {
        let table = QualityMatrixTable::build();
        let entry = table.entry(QM_LEVEL_OFF, 0, 5);
        assert!(entry.gqmatrix.is_none());
        assert!(entry.giqmatrix.is_none());
    }

    #[test]
    fn sizes_sharing_adjusted_tx_size_share_pointer() {
        let table = QualityMatrixTable::build();
        let large = table.entry(0, 1, 17);
        let canon = table.entry(0, 1, adjusted_tx_size(17));
        assert!(Rc::ptr_eq(
            large.gqmatrix.as_ref().unwrap(),
            canon.gqmatrix.as_ref().unwrap()
        ));
    }

    #[test]
    fn non_off_level_has_matrices() {
        let table = QualityMatrixTable::build();
        let entry = table.entry(0, 0, 0);
        assert!(entry.gqmatrix.is_some());
    }
}
