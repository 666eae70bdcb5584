// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Mode-decision configuration (§4.3): per-picture setup that derives the
//! quantizer tables, quality-matrix tables, rate-estimation tables,
//! temporal motion-field projection, global-motion upscaling, and the
//! speed/quality flags that parameterize downstream block-level decisions.

pub mod cdf_control;
pub mod frame_context;
pub mod global_motion_setup;
pub mod intra_bc_hash;
pub mod motion_field;
pub mod quality_matrix;
pub mod quantizer;
pub mod rate_estimation;
pub mod speed_features;
