// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! The typed data model of §3: one module per object kind. Lifetimes are
//! documented on each type; nothing here owns threading — that is
//! [`crate::pipeline`]'s job.

pub mod cpcs;
pub mod ppcs;
pub mod reference;
pub mod scs;
pub mod sb;
pub mod tables;

pub use cpcs::ChildPictureControlSet;
pub use ppcs::ParentPictureControlSet;
pub use reference::{PictureAnalysisReferenceObject, ReferenceObject};
pub use scs::SequenceControlSet;
pub use sb::SbParams;
