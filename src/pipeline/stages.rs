// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! One module per system-overview stage (§2), in pipeline order.

pub mod resource_coordination;
pub mod picture_analysis;
pub mod picture_decision;
pub mod motion_estimation;
pub mod initial_rate_control;
pub mod source_based_operations;
pub mod picture_manager;
pub mod mode_decision_configuration;
