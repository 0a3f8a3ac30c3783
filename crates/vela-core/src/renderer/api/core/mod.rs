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

//! Backend selection, configuration and capability reporting.

/// The default bound on submitted-but-not-retired command buffers.
pub const DEFAULT_MAX_FRAMES_IN_FLIGHT: u32 = 2;

/// The largest frames-in-flight value a configuration may request.
pub const MAX_FRAMES_IN_FLIGHT_LIMIT: u32 = 8;

pub mod backend;
pub mod config;
pub mod info;

pub use self::backend::*;
pub use self::config::*;
pub use self::info::*;
