// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Pipeline orchestration (§2, §5): bounded fifos and typed object pools
//! connecting one worker thread per system-overview stage, plus the
//! orchestrator that wires them into a session.

pub mod fifo;
pub mod orchestrator;
pub mod pool;
pub mod segmentation;
pub mod stage;
pub mod stages;

pub use fifo::{bounded_fifo, FifoReceiver, FifoSender, Message};
pub use orchestrator::{PipelineOrchestrator, ReconPicture};
pub use pool::{Pool, PooledGuard};
