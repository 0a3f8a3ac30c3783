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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`core`]**: Backend selection, configuration and capability reporting.
//! - **[`resource`]**: Opaque handles, their descriptors and generation-checked pools.
//! - **[`pipeline`]**: Static pipeline state and pipeline descriptors.
//! - **[`command`]**: Render pass, copy and draw arguments plus the command-buffer state machine.
//! - **[`swapchain`]**: Presentation surfaces and their back buffers.
//! - **[`util`]**: Shared enums such as texture formats and sample counts.

pub mod command;
pub mod core;
pub mod pipeline;
pub mod resource;
pub mod swapchain;
pub mod util;

pub use self::command::*;
pub use self::core::*;
pub use self::pipeline::*;
pub use self::resource::*;
pub use self::swapchain::*;
pub use self::util::{IndexFormat, SampleCount, ShaderStage, TextureFormat};
