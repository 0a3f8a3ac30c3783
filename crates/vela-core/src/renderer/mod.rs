// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provides the public, backend-agnostic rendering contracts for Vela.
//!
//! This module defines the "common language" for all rendering operations: the
//! [`RenderBackend`] trait every backend plugin implements, the descriptor and
//! handle types it consumes and produces, the command-buffer state machine, the
//! resource-barrier model and the error taxonomy.
//!
//! The 'how' lives elsewhere: concrete backends (the software reference backend,
//! the validation layer, native plugins) implement these traits, and the
//! `vela-sdk` facade forwards application calls to them.

pub mod api;
pub mod error;
pub mod sync;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{GraphicsError, GraphicsResult, ValidationError};
pub use self::sync::{
    coalesce_barriers, BarrierResource, FrameTracker, ResourceBarrier, ResourceState,
    ResourceStateTracker, SubmissionIndex, SubresourceRange,
};
pub use self::traits::RenderBackend;
