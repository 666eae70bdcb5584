// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! The session API of §6: `init_handle` / `set_parameter` / `enc_init` /
//! `stream_header` / `send_picture` / `get_packet` / `release_out_buffer` /
//! `get_recon` / `enc_deinit`, expressed as one state-checked Rust type
//! rather than an opaque handle plus free functions — the calling
//! convention those abstract names describe, not their C shape.

use log::{debug, warn};
use thiserror::Error;

use crate::config::EncoderConfig;
use crate::error::{ConfigResult, PipelineResult};
use crate::picture::{FrameMetadata, InputPixelStorage};
use crate::pipeline::orchestrator::OutputPacket;
use crate::pipeline::stages::resource_coordination::IncomingPicture;
use crate::pipeline::{Message, PipelineOrchestrator, ReconPicture};

/// A coded sequence header placeholder (§1 Non-goals: AV1 OBU bit packing
/// is out of scope). Carries the scalar fields a real `stream_header` call
/// would encode into the SPS/sequence-header OBU, for a caller that wants
/// to inspect negotiated parameters without a bitstream parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth_bits: u8,
    pub profile: u8,
}

/// One encoder session, following the order-of-use contract of §6.
/// States are enforced at runtime: calling an operation out of order
/// returns a [`SessionError`] rather than panicking or silently no-opping.
pub struct Session {
    config: Option<EncoderConfig>,
    orchestrator: Option<PipelineOrchestrator>,
    eos_signaled: bool,
}

/// Session-state misuse (§7): calling an operation the order-of-use
/// contract does not allow in the session's current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("set_parameter must be called before enc_init")]
    NotConfigured,
    #[error("enc_init must be called before this operation")]
    NotInitialized,
    #[error("enc_init has already been called for this session")]
    AlreadyInitialized,
    #[error("failed to allocate pools at enc_init: {0}")]
    AllocationFailed(String),
    #[error("pipeline fifo error: {0}")]
    Pipeline(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl Session {
    /// `init_handle`: creates an unconfigured session. The `app_callback`
    /// of the abstract contract is not modeled — callers drain packets by
    /// polling [`Session::get_packet`] instead of receiving a push
    /// callback, matching how this pipeline's output fifo already works.
    pub fn init_handle() -> Self {
        Self { config: None, orchestrator: None, eos_signaled: false }
    }

    /// `set_parameter`: validates `config` and freezes it into this
    /// session. Returns the first violated [`crate::error::ConfigError`]
    /// rule per §6; the session remains unconfigured on failure.
    pub fn set_parameter(&mut self, config: EncoderConfig) -> ConfigResult<()> {
        config.validate()?;
        debug!("session configured: {}x{} enc_mode={}", config.width, config.height, config.enc_mode);
        self.config = Some(config);
        Ok(())
    }

    /// `enc_init`: allocates every pool and spawns one worker thread per
    /// stage. `worker_count` sizes pool/fifo capacity (§5); it does not
    /// change with thread-affinity options (`logical_processors`,
    /// `target_socket`, `unpin`), which this pipeline does not act on
    /// (§1 Non-goals: OS scheduling policy).
    pub fn enc_init(&mut self, worker_count: usize) -> SessionResult<()> {
        if self.orchestrator.is_some() {
            return Err(SessionError::AlreadyInitialized);
        }
        let config = self.config.as_ref().ok_or(SessionError::NotConfigured)?;
        let orchestrator = PipelineOrchestrator::new(config, worker_count)
            .map_err(|e| SessionError::AllocationFailed(e.to_string()))?;
        self.orchestrator = Some(orchestrator);
        Ok(())
    }

    /// `stream_header`: returns the scalar fields a coded sequence header
    /// would carry. Callable only after [`Session::enc_init`].
    pub fn stream_header(&self) -> SessionResult<StreamHeader> {
        let orchestrator = self.orchestrator.as_ref().ok_or(SessionError::NotInitialized)?;
        let scs = orchestrator.sequence_control_set();
        Ok(StreamHeader {
            width: scs.resolution.width,
            height: scs.resolution.height,
            bit_depth_bits: 8,
            profile: 0,
        })
    }

    /// `send_picture`: submits one application input buffer to Resource
    /// Coordination. Submitting an empty buffer with `eos` set signals
    /// end-of-stream (§7 user-visible behavior); subsequent calls are
    /// rejected once EOS has been signaled.
    pub fn send_picture(&mut self, meta: FrameMetadata, buffer: InputPixelStorage, eos: bool) -> SessionResult<()> {
        let orchestrator = self.orchestrator.as_ref().ok_or(SessionError::NotInitialized)?;
        if self.eos_signaled {
            warn!("send_picture called after EOS was already signaled; ignoring");
            return Ok(());
        }
        orchestrator
            .submit(IncomingPicture { meta, buffer })
            .map_err(|e| SessionError::Pipeline(e.to_string()))?;
        if eos {
            self.signal_eos()?;
        }
        Ok(())
    }

    /// Signals end-of-stream without submitting a final picture (§7: "the
    /// application submits a null or zero-length input with an EOS flag").
    pub fn signal_eos(&mut self) -> SessionResult<()> {
        let orchestrator = self.orchestrator.as_ref().ok_or(SessionError::NotInitialized)?;
        if !self.eos_signaled {
            orchestrator.signal_eos().map_err(|e| SessionError::Pipeline(e.to_string()))?;
            self.eos_signaled = true;
        }
        Ok(())
    }

    /// `get_packet`: non-blocking pull. `Ok(None)` is the empty-queue case
    /// (§7), not an error; `Ok(Some(packet))` with `packet.flags` carrying
    /// `FLAG_EOS`/`FLAG_FATAL` surfaces the terminal states.
    pub fn get_packet(&self) -> SessionResult<Option<OutputPacket>> {
        let orchestrator = self.orchestrator.as_ref().ok_or(SessionError::NotInitialized)?;
        Ok(match orchestrator.try_recv_output() {
            Some(Message::Item(packet)) => Some(packet),
            Some(Message::Eos) => Some(OutputPacket { picture_number: 0, flags: crate::pipeline::orchestrator::FLAG_EOS }),
            None => None,
        })
    }

    /// `release_out_buffer`: a no-op here since [`OutputPacket`] owns no
    /// pool-backed storage the way a C-ABI output buffer would — kept as a
    /// named call so callers following the abstract order-of-use contract
    /// have something to invoke symmetrically with `get_packet`.
    pub fn release_out_buffer(&self, _packet: OutputPacket) {}

    /// `get_recon`: optional reconstructed-picture readback, only
    /// meaningful when [`EncoderConfig::recon_enabled`] was set.
    pub fn get_recon(&self) -> SessionResult<Option<ReconPicture>> {
        let orchestrator = self.orchestrator.as_ref().ok_or(SessionError::NotInitialized)?;
        let recon_enabled = self.config.as_ref().map(|c| c.recon_enabled).unwrap_or(false);
        if !recon_enabled {
            return Ok(None);
        }
        Ok(orchestrator.take_recon())
    }

    /// `enc_deinit`: signals EOS if not already signaled and joins every
    /// stage thread. `deinit_handle` is just dropping the `Session`
    /// afterwards — there is no separate handle to release.
    pub fn enc_deinit(mut self) -> PipelineResult<()> {
        if let Some(orchestrator) = self.orchestrator.take() {
            if !self.eos_signaled {
                orchestrator.signal_eos()?;
            }
            orchestrator.join()?;
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::init_handle()
    }
}
