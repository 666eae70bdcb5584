// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Sequence Control Set: immutable-after-init session-scoped configuration
//! (§3). Read-only after construction, so it needs no locking (§9).

use crate::config::{BitDepth, ColorFormat, EncoderConfig, RateControlMode};
use crate::data_model::sb::{SbGrid, SB_SIZE_LARGE};
use crate::picture::Resolution;

/// Derived pool and fifo capacities, computed once at init from core count,
/// resolution class, hierarchical depth, look-ahead distance, and whether
/// overlays/TPL are enabled (§4.1 Pools). Sized to the minimum needed to
/// sustain the configured reference graph plus look-ahead slack.
#[derive(Clone, Copy, Debug)]
pub struct PoolCapacities {
    pub input_buffers: usize,
    pub ppcs: usize,
    pub cpcs: usize,
    pub me_results: usize,
    pub decoded_references: usize,
    pub pa_references: usize,
    pub overlay_inputs: usize,
    pub output_stream_buffers: usize,
    pub recon_buffers: usize,
}

impl PoolCapacities {
    pub fn derive(scs: &SequenceControlSetInit) -> Self {
        let mini_gop = 1usize << scs.hierarchical_levels;
        let lad = scs.look_ahead_distance as usize;
        let core_slack = scs.worker_count.max(1);

        // Enough PPCS/CPCS to hold one full mini-GOP of in-flight reference
        // scaffolding plus the configured look-ahead plus per-core slack so
        // concurrent workers are never starved (invariant in §3: pools are
        // non-empty at steady state).
        let ppcs = mini_gop * 2 + lad + core_slack;
        let cpcs = core_slack * 2;
        let decoded_references = mini_gop + 2;
        let pa_references = lad + mini_gop + 1;
        let overlay_inputs = if scs.enable_tpl { mini_gop } else { 1 };
        let recon_buffers = if scs.recon_enabled { core_slack } else { 0 };

        Self {
            input_buffers: lad + core_slack,
            ppcs,
            cpcs,
            me_results: cpcs,
            decoded_references,
            pa_references,
            overlay_inputs,
            output_stream_buffers: core_slack * 2,
            recon_buffers,
        }
    }
}

/// Subset of [`EncoderConfig`] needed to derive pool capacities, kept
/// separate so capacity derivation can be unit-tested without building a
/// full `SequenceControlSet`.
#[derive(Clone, Copy, Debug)]
pub struct SequenceControlSetInit {
    pub hierarchical_levels: u8,
    pub look_ahead_distance: u32,
    pub worker_count: usize,
    pub enable_tpl: bool,
    pub recon_enabled: bool,
}

/// Immutable-after-init session configuration (§3). One per encode
/// session; lifetime = session.
#[derive(Clone, Debug)]
pub struct SequenceControlSet {
    pub resolution: Resolution,
    pub bit_depth: BitDepth,
    pub color_format: ColorFormat,
    pub max_hierarchical_levels: u8,
    pub tile_rows_log2: u8,
    pub tile_columns_log2: u8,
    pub enc_mode: u8,
    pub target_bitrate_bps: u32,
    pub rate_control_mode: RateControlMode,
    pub mini_gop_size: u32,
    pub look_ahead_distance: u32,
    pub screen_content_mode: bool,
    pub enable_tpl: bool,
    pub two_pass: bool,

    pub sb_grid: SbGrid,
    pub pool_capacities: PoolCapacities,

    /// Single-worker or rate-control configurations force MDC admission to
    /// strict decode order (§4.1 Decode-order gate).
    pub decode_order_enforced: bool,
    pub worker_count: usize,
}

impl SequenceControlSet {
    pub fn from_config(config: &EncoderConfig, worker_count: usize) -> Self {
        let sb_size = SB_SIZE_LARGE;
        let sb_grid = SbGrid::new(config.width, config.height, sb_size);
        let look_ahead_distance = config.effective_look_ahead_distance();

        let init = SequenceControlSetInit {
            hierarchical_levels: config.hierarchical_levels,
            look_ahead_distance,
            worker_count,
            enable_tpl: config.enable_tpl,
            recon_enabled: config.recon_enabled,
        };

        Self {
            resolution: Resolution {
                width: config.width,
                height: config.height,
            },
            bit_depth: config.bit_depth,
            color_format: config.color_format,
            max_hierarchical_levels: config.hierarchical_levels,
            tile_rows_log2: config.tile_rows_log2,
            tile_columns_log2: config.tile_columns_log2,
            enc_mode: config.enc_mode,
            target_bitrate_bps: config.target_bitrate_bps,
            rate_control_mode: config.rate_control_mode,
            mini_gop_size: config.mini_gop_size(),
            look_ahead_distance,
            screen_content_mode: config.screen_content_mode,
            enable_tpl: config.enable_tpl,
            two_pass: config.two_pass,
            sb_grid,
            pool_capacities: PoolCapacities::derive(&init),
            // §8 boundary: logical_processors=1 forces decode-order mode.
            decode_order_enforced: worker_count <= 1,
            worker_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() -> SequenceControlSetInit {
        SequenceControlSetInit {
            hierarchical_levels: 3,
            look_ahead_distance: 40,
            worker_count: 4,
            enable_tpl: true,
            recon_enabled: false,
        }
    }

    #[test]
    fn pools_are_never_empty_at_steady_state() {
        let caps = PoolCapacities::derive(&init());
        assert!(caps.ppcs > 0);
        assert!(caps.cpcs > 0);
        assert!(caps.decoded_references >= init().hierarchical_levels as usize);
        assert!(caps.pa_references > 0);
    }

    #[test]
    fn recon_pool_is_empty_when_disabled() {
        let mut i = init();
        i.recon_enabled = false;
        assert_eq!(PoolCapacities::derive(&i).recon_buffers, 0);
    }

    #[test]
    fn single_worker_forces_decode_order() {
        let config = EncoderConfig::default();
        let scs = SequenceControlSet::from_config(&config, 1);
        assert!(scs.decode_order_enforced);

        let scs = SequenceControlSet::from_config(&config, 4);
        assert!(!scs.decode_order_enforced);
    }
}
