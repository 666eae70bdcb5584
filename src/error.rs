// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

use thiserror::Error;

/// Rejected at [`crate::session::Session::set_parameter`] time. The session
/// is never started when this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("resolution {width}x{height} is invalid: width/height must be even and >= 64")]
    InvalidResolution { width: u32, height: u32 },

    #[error("qp {0} out of range [0..63]")]
    QpOutOfRange(u8),

    #[error("hierarchical_levels {0} exceeds maximum of 5")]
    HierarchicalLevelsOutOfRange(u8),

    #[error("intra_period_length {0} is invalid for rate_control_mode {1:?}")]
    InvalidIntraPeriod(i32, crate::config::RateControlMode),

    #[error("search dimensions invalid: {0}")]
    InvalidSearchDimensions(&'static str),

    #[error("profile/bit-depth/color-format mismatch: {0}")]
    ProfileMismatch(&'static str),

    #[error("tile_rows_log2={rows} tile_columns_log2={cols} exceed AV1 annex-A limits")]
    TileCountOutOfRange { rows: u8, cols: u8 },

    #[error("superres_mode is not allowed in 2-pass encodes")]
    SuperresIn2Pass,
}

/// Returned synchronously by [`crate::session::Session::enc_init`] when pool
/// allocation fails. Insufficient-resources taxonomy (§7).
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("failed to reserve {requested} objects for pool {pool}: {source}")]
    ExhaustedAtInit {
        pool: &'static str,
        requested: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Runtime-fatal errors (§7): a worker could not make progress and the
/// session must be torn down. Converted into a zero-size output packet
/// whose `flags` carry a nonzero code rather than propagated as a panic.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("worker for stage {stage} panicked: {reason}")]
    WorkerPanicked { stage: &'static str, reason: String },

    #[error("fifo between stages disconnected unexpectedly")]
    FifoDisconnected,

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Motion estimation cannot fail substantively (§4.2); this exists only for
/// the bookkeeping errors a caller of the ME API can hit (bad segment
/// geometry, picture not yet admitted to the ME stage).
#[derive(Error, Debug)]
pub enum MeError {
    #[error("segment grid {rows}x{cols} does not evenly cover sb grid of {sb_count} SBs")]
    InvalidSegmentGrid {
        rows: usize,
        cols: usize,
        sb_count: usize,
    },

    #[error("reference slot {0} is not active for this picture")]
    InactiveReference(usize),
}

/// MDC is pure derivation (§4.3); the only failure is a hard invariant
/// violation, which is fatal to the session.
#[derive(Error, Debug)]
pub enum MdcError {
    #[error("primary reference frame index {0} out of range")]
    PrimaryReferenceOutOfRange(usize),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type PoolResult<T> = Result<T, PoolError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
pub type MeResult<T> = Result<T, MeError>;
pub type MdcResult<T> = Result<T, MdcError>;
