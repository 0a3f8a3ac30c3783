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

use serde::{Deserialize, Serialize};

/// Selects the native graphics API a facade is bound to.
///
/// Chosen once when the facade is constructed and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Pick the best available backend for this platform, falling back to `Software`.
    #[default]
    Auto,
    /// Vulkan API.
    Vulkan,
    /// Apple's Metal API.
    Metal,
    /// OpenGL API.
    OpenGl,
    /// Microsoft's DirectX API.
    DirectX,
    /// The CPU reference backend, always available.
    Software,
}

impl BackendType {
    /// Every concrete backend type, in declaration order.
    pub const CONCRETE: [BackendType; 5] = [
        BackendType::Vulkan,
        BackendType::Metal,
        BackendType::OpenGl,
        BackendType::DirectX,
        BackendType::Software,
    ];

    /// Returns a human-readable name for the backend.
    pub fn name(&self) -> &'static str {
        match self {
            BackendType::Auto => "Auto",
            BackendType::Vulkan => "Vulkan",
            BackendType::Metal => "Metal",
            BackendType::OpenGl => "OpenGL",
            BackendType::DirectX => "DirectX",
            BackendType::Software => "Software",
        }
    }

    /// Returns `true` for APIs where the application manages resource states and
    /// synchronization itself, so resource barriers translate to native barriers.
    pub fn is_explicit(&self) -> bool {
        matches!(
            self,
            BackendType::Vulkan | BackendType::Metal | BackendType::DirectX
        )
    }

    /// The native backends worth trying on this platform, best first.
    ///
    /// `Software` is not part of the list; it is the fallback when all of these fail.
    pub fn platform_preference() -> &'static [BackendType] {
        if cfg!(target_os = "windows") {
            &[BackendType::Vulkan, BackendType::DirectX, BackendType::OpenGl]
        } else if cfg!(target_os = "macos") {
            &[BackendType::Metal, BackendType::Vulkan, BackendType::OpenGl]
        } else if cfg!(target_os = "linux") {
            &[BackendType::Vulkan, BackendType::OpenGl]
        } else {
            &[BackendType::OpenGl]
        }
    }
}
