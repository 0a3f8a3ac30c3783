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

//! Device capabilities reported by a backend.

use super::backend::BackendType;
use super::DEFAULT_MAX_FRAMES_IN_FLIGHT;

bitflags::bitflags! {
    /// Optional capabilities a backend may advertise.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BackendFeatures: u32 {
        /// Compute pipelines and dispatch.
        const COMPUTE = 1 << 0;
        /// Hardware ray tracing.
        const RAY_TRACING = 1 << 1;
        /// Mesh and task shaders.
        const MESH_SHADERS = 1 << 2;
        /// Distinct command buffers may be recorded on different threads concurrently.
        const MULTITHREADED_RECORDING = 1 << 3;
        /// A submitted command buffer may be begun again without being recreated.
        const COMMAND_BUFFER_RESET = 1 << 4;
        /// Resource barriers translate to native barriers rather than being no-ops.
        const EXPLICIT_BARRIERS = 1 << 5;
        /// GPU timestamp queries.
        const TIMESTAMP_QUERIES = 1 << 6;
    }
}

/// The physical type of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    /// A GPU integrated into the CPU.
    IntegratedGpu,
    /// A discrete, dedicated GPU.
    DiscreteGpu,
    /// A virtualized GPU.
    VirtualGpu,
    /// A renderer running on the CPU.
    Cpu,
    /// An unknown or unsupported device type.
    #[default]
    Unknown,
}

/// Hard limits of a device, used by the facade to validate descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendLimits {
    /// Largest width or height of a 2D texture.
    pub max_texture_size: u32,
    /// Largest depth or array layer count of a texture.
    pub max_texture_array_layers: u32,
    /// Maximum number of color attachments in a render pass.
    pub max_color_attachments: u32,
    /// Maximum number of vertex buffer slots.
    pub max_vertex_buffers: u32,
    /// Maximum number of texture binding slots.
    pub max_texture_bindings: u32,
    /// Maximum number of uniform buffer binding slots.
    pub max_uniform_buffer_bindings: u32,
    /// Largest buffer size in bytes.
    pub max_buffer_size: u64,
    /// Largest workgroup count per dispatch dimension.
    pub max_compute_workgroups: u32,
}

impl Default for BackendLimits {
    fn default() -> Self {
        Self {
            max_texture_size: 8192,
            max_texture_array_layers: 256,
            max_color_attachments: 8,
            max_vertex_buffers: 8,
            max_texture_bindings: 16,
            max_uniform_buffer_bindings: 12,
            max_buffer_size: 256 << 20,
            max_compute_workgroups: 65535,
        }
    }
}

/// A read-only snapshot of the device a backend is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendInfo {
    /// The API the backend drives.
    pub backend_type: BackendType,
    /// The adapter name (e.g. "NVIDIA GeForce RTX 4090").
    pub device_name: String,
    /// The physical type of the adapter.
    pub device_type: DeviceType,
    /// Device limits.
    pub limits: BackendLimits,
    /// Optional capabilities.
    pub features: BackendFeatures,
    /// Upper bound on submitted-but-not-retired command buffers.
    pub max_frames_in_flight: u32,
}

impl Default for BackendInfo {
    fn default() -> Self {
        Self {
            backend_type: BackendType::Software,
            device_name: String::new(),
            device_type: DeviceType::Unknown,
            limits: BackendLimits::default(),
            features: BackendFeatures::empty(),
            max_frames_in_flight: DEFAULT_MAX_FRAMES_IN_FLIGHT,
        }
    }
}

impl BackendInfo {
    /// Whether every feature in `features` is advertised.
    pub fn supports(&self, features: BackendFeatures) -> bool {
        self.features.contains(features)
    }

    /// Whether compute pipelines can be created.
    pub fn supports_compute(&self) -> bool {
        self.supports(BackendFeatures::COMPUTE)
    }

    /// Whether ray tracing is available.
    pub fn supports_ray_tracing(&self) -> bool {
        self.supports(BackendFeatures::RAY_TRACING)
    }

    /// Whether a submitted command buffer may be begun again.
    pub fn supports_command_buffer_reset(&self) -> bool {
        self.supports(BackendFeatures::COMMAND_BUFFER_RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_requires_all_flags() {
        let info = BackendInfo {
            features: BackendFeatures::COMPUTE | BackendFeatures::COMMAND_BUFFER_RESET,
            ..BackendInfo::default()
        };
        assert!(info.supports_compute());
        assert!(info.supports_command_buffer_reset());
        assert!(!info.supports_ray_tracing());
        assert!(!info.supports(BackendFeatures::COMPUTE | BackendFeatures::MESH_SHADERS));
    }
}
