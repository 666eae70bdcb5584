// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Hierarchical motion estimation (§4.2): pre-HME, three HME levels, full
//! ME, reference pruning, search-range adaptation, and global-motion
//! estimation.

pub mod first_pass;
pub mod full_me;
pub mod global_motion;
pub mod hme;
pub mod lambda;
pub mod pruning;
pub mod search_range;
pub mod task;
pub mod temporal_filter;

pub use task::{MeTaskKind, MotionEstimationResult, MotionVector};
