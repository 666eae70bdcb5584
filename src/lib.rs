// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! `av1e-core`: pipeline orchestration, hierarchical motion estimation and
//! mode-decision configuration for a software AV1 encoder.
//!
//! This crate is a library, not a standalone encoder: it owns the
//! pipeline's threading, pooling and per-picture HME/ME/MDC derivation
//! (§2-§4), but not entropy coding, bitstream packetization, or rate
//! control beyond the initial lookahead pass (§1 Non-goals). A host
//! application drives a session through [`session::Session`].
//!
//! ```no_run
//! use av1e_core::config::EncoderConfig;
//! use av1e_core::session::Session;
//!
//! let mut session = Session::init_handle();
//! session.set_parameter(EncoderConfig::default())?;
//! session.enc_init(4)?;
//! session.enc_deinit()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod data_model;
pub mod error;
pub mod mdc;
pub mod me;
pub mod picture;
pub mod pipeline;
pub mod session;
