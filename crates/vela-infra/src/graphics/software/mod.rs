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

//! A CPU reference backend.
//!
//! Every resource lives in host memory and submitted work is executed in order
//! by a worker thread. It is always available, which makes it the fallback of
//! the registry and the device used by the test suites.

mod command;
mod device;
mod executor;
mod memory;
mod queue;
mod swapchain;

pub use self::device::{SoftwareDevice, DEFAULT_MEMORY_BUDGET};
pub use self::executor::SoftwareStats;
