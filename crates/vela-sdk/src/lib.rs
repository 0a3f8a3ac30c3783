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

//! # Vela SDK
//!
//! The public face of the Vela graphics layer. Applications create a
//! [`GraphicsBackend`] from a [`BackendConfig`](vela_core::renderer::BackendConfig)
//! and drive any backend through it: the registry picks the implementation,
//! the facade validates every call, and the backend does the work.
//!
//! Most programs only need the [`prelude`].

#![warn(missing_docs)]

mod graphics;
mod validate;

pub use graphics::GraphicsBackend;
pub use vela_core;
pub use vela_infra;

/// The types most programs use, in one import.
pub mod prelude {
    pub use crate::GraphicsBackend;
    pub use vela_core::math::{Extent2D, Extent3D, LinearRgba, Origin3D};
    pub use vela_core::platform::{VelaWindowHandle, WindowHandle};
    pub use vela_core::renderer::{
        BackendConfig, BackendFeatures, BackendInfo, BackendType, BlendState, Buffer,
        BufferDescriptor, BufferTextureLayout, BufferUsage, ColorAttachment,
        ColorTargetDescriptor, CommandBuffer, CommandBufferState, ComputePipelineDescriptor,
        DepthAttachment, DepthStencilState, DepthTargetDescriptor, GraphicsError, GraphicsResult,
        IndexFormat, LoadOp, Operations, Pipeline, PipelineDescriptor, PrimitiveTopology,
        RasterizerState, RenderPassDescriptor, RenderTarget, RenderTargetDescriptor,
        ResourceBarrier, ResourceRef, ResourceState, SampleCount, Sampler, SamplerDescriptor,
        ScissorRect, Shader, ShaderDescriptor, ShaderSource, ShaderStage, StoreOp, SwapChain,
        SwapChainDescriptor, Texture, TextureCopyLocation, TextureDescriptor, TextureFormat,
        TextureRegion, TextureUsage, ValidationError, VertexAttribute, VertexFormat,
        VertexLayout, Viewport,
    };
}
