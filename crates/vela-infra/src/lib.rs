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

//! # Vela Infra
//!
//! Concrete implementations of the contracts defined in `vela-core`: the CPU
//! software reference backend, the validation layer that can wrap any backend,
//! and the process-wide registry backends are resolved through.

#![warn(missing_docs)]

pub mod graphics;

pub use graphics::registry::{
    create_backend, is_backend_available, register_backend, unload_backend, BackendFactory,
    BackendRegistry, SoftwareBackendFactory,
};
pub use graphics::software::{SoftwareDevice, SoftwareStats};
pub use graphics::validation::ValidationLayer;
