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

//! Command recording: pass descriptors, copy locations and the command buffer
//! state machine.

pub mod copy;
pub mod pass;
pub mod tracker;

pub use self::copy::*;
pub use self::pass::*;
pub use self::tracker::*;

use crate::renderer::api::resource::CommandBufferId;

/// A handle to a command buffer owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandBuffer {
    /// The generation-checked key of the command buffer.
    pub id: CommandBufferId,
}
