// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Lambda assignment (§4.2): derived from picture QP and temporal layer via
//! one of the fixed RA/LD lambda tables, applied per ME task before search.

use crate::data_model::ppcs::SliceType;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LambdaTable {
    RandomAccessBase,
    RandomAccessLayer1,
    RandomAccessLayer3Plus,
    LowDelayBase,
    LowDelayOther,
}

/// Mirrors how real AV1 encoders derive a Lagrangian lambda from qindex:
/// lambda grows geometrically with QP, scaled by a table-specific constant
/// that captures how aggressively a temporal layer should be penalized for
/// bit cost relative to distortion.
fn lambda_from_qp(qp: u8, scale_numerator: u32, scale_denominator: u32) -> u32 {
    let qp = qp.min(63) as u32;
    // Base geometric growth matches the well-known pow(2, qp/6) relationship
    // between QP and "ideal" quantization step used throughout this family
    // of encoders, rescaled per table.
    let growth = 1u64 << (qp / 6);
    let remainder = qp % 6;
    // Linear-interpolate between consecutive powers of two for the
    // fractional part rather than jumping in steps of 6.
    let interpolated = growth * (64 + (remainder as u64 * 64) / 6) / 64;
    ((interpolated * scale_numerator as u64) / scale_denominator as u64) as u32
}

pub fn select_table(is_random_access: bool, slice_type: SliceType, temporal_layer: u8) -> LambdaTable {
    if is_random_access {
        match (slice_type, temporal_layer) {
            (SliceType::B, layer) if layer >= 3 => LambdaTable::RandomAccessLayer3Plus,
            (SliceType::B, 1) => LambdaTable::RandomAccessLayer1,
            _ => LambdaTable::RandomAccessBase,
        }
    } else if temporal_layer == 0 {
        LambdaTable::LowDelayBase
    } else {
        LambdaTable::LowDelayOther
    }
}

pub fn lambda_for(table: LambdaTable, qp: u8) -> u32 {
    let (num, den) = match table {
        LambdaTable::RandomAccessBase => (88, 100),
        LambdaTable::RandomAccessLayer1 => (100, 100),
        LambdaTable::RandomAccessLayer3Plus => (140, 100),
        LambdaTable::LowDelayBase => (95, 100),
        LambdaTable::LowDelayOther => (120, 100),
    };
    lambda_from_qp(qp, num, den).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_grows_with_qp() {
        let low = lambda_for(LambdaTable::LowDelayBase, 10);
        let high = lambda_for(LambdaTable::LowDelayBase, 50);
        assert!(high > low);
    }

    #[test]
    fn higher_temporal_layers_get_larger_lambda_scale() {
        let base = lambda_for(LambdaTable::RandomAccessBase, 32);
        let layer3 = lambda_for(LambdaTable::RandomAccessLayer3Plus, 32);
        assert!(layer3 > base);
    }

    #[test]
    fn table_selection_follows_structure_and_layer() {
        assert_eq!(
            select_table(false, SliceType::P, 0),
            LambdaTable::LowDelayBase
        );
        assert_eq!(
            select_table(false, SliceType::B, 2),
            LambdaTable::LowDelayOther
        );
        assert_eq!(
            select_table(true, SliceType::B, 3),
            LambdaTable::RandomAccessLayer3Plus
        );
        assert_eq!(
            select_table(true, SliceType::B, 1),
            LambdaTable::RandomAccessLayer1
        );
    }
}
