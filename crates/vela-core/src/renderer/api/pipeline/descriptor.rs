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

//! Pipeline descriptors and the pipeline handle.

use super::state::*;
use crate::renderer::api::resource::{PipelineId, Shader};
use crate::renderer::api::util::SampleCount;
use std::borrow::Cow;

/// A complete description of a graphics pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The vertex stage; must be a vertex shader.
    pub vertex_shader: Shader,
    /// The fragment stage, if any; must be a fragment shader.
    pub fragment_shader: Option<Shader>,
    /// One layout per vertex buffer slot.
    pub vertex_layouts: Cow<'a, [VertexLayout<'a>]>,
    /// Primitive assembly and rasterization.
    pub rasterizer: RasterizerState,
    /// The color targets the pipeline writes.
    pub color_targets: Cow<'a, [ColorTargetDescriptor]>,
    /// The depth target, if depth testing is used.
    pub depth_target: Option<DepthTargetDescriptor>,
    /// Samples per pixel of every target.
    pub sample_count: SampleCount,
}

impl<'a> PipelineDescriptor<'a> {
    /// A pipeline with no vertex buffers, writing one color target.
    pub fn new(vertex_shader: Shader, fragment_shader: Option<Shader>, color_target: ColorTargetDescriptor) -> Self {
        Self {
            label: None,
            vertex_shader,
            fragment_shader,
            vertex_layouts: Cow::Borrowed(&[]),
            rasterizer: RasterizerState::default(),
            color_targets: Cow::Owned(vec![color_target]),
            depth_target: None,
            sample_count: SampleCount::X1,
        }
    }
}

/// A description of a compute pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputePipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The compute stage; must be a compute shader.
    pub shader: Shader,
}

/// Whether a pipeline is used for drawing or for dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Bound inside render passes for draws.
    Graphics,
    /// Bound outside render passes for dispatches.
    Compute,
}

/// A handle to a compiled pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pipeline {
    /// The generation-checked key of the pipeline.
    pub id: PipelineId,
    /// Graphics or compute.
    pub kind: PipelineKind,
    /// Samples per pixel the pipeline renders with; always one sample for compute.
    pub sample_count: SampleCount,
}
