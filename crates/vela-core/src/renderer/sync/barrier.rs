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

//! Declarative resource barriers.

use crate::renderer::api::resource::{Buffer, ResourceRef, Texture};

/// The way a resource is being used, as far as synchronization is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Contents are undefined. As a barrier source it means "discard contents".
    Undefined,
    /// A general state every use tolerates; buffers start here.
    Common,
    /// Bound as a vertex buffer.
    VertexBuffer,
    /// Bound as an index buffer.
    IndexBuffer,
    /// Bound as a uniform buffer.
    UniformBuffer,
    /// Sampled or read from a shader.
    ShaderResource,
    /// Read and written from a shader.
    UnorderedAccess,
    /// Rendered to as a color attachment.
    RenderTarget,
    /// Written as a depth attachment.
    DepthWrite,
    /// Read as a depth attachment.
    DepthRead,
    /// The source of a copy.
    CopySrc,
    /// The destination of a copy.
    CopyDst,
    /// Read by indirect draws or dispatches.
    IndirectArgument,
    /// Handed to the presentation engine.
    Present,
}

impl ResourceState {
    /// Whether the state allows the GPU to write the resource.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ResourceState::UnorderedAccess
                | ResourceState::RenderTarget
                | ResourceState::DepthWrite
                | ResourceState::CopyDst
        )
    }
}

/// The resource a barrier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierResource {
    /// A texture.
    Texture(Texture),
    /// A buffer.
    Buffer(Buffer),
}

impl BarrierResource {
    /// The key identifying the resource.
    pub fn resource_ref(&self) -> ResourceRef {
        match self {
            BarrierResource::Texture(texture) => ResourceRef::Texture(texture.id),
            BarrierResource::Buffer(buffer) => ResourceRef::Buffer(buffer.id),
        }
    }
}

/// The mip levels and array layers a texture barrier covers. Ignored for buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubresourceRange {
    /// The first mip level.
    pub base_mip_level: u32,
    /// The number of mip levels, or `None` for all remaining levels.
    pub mip_level_count: Option<u32>,
    /// The first array layer.
    pub base_array_layer: u32,
    /// The number of array layers, or `None` for all remaining layers.
    pub array_layer_count: Option<u32>,
}

impl SubresourceRange {
    /// Every mip level and array layer.
    pub const ALL: Self = Self {
        base_mip_level: 0,
        mip_level_count: None,
        base_array_layer: 0,
        array_layer_count: None,
    };

    /// Whether the range covers the whole resource.
    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

impl Default for SubresourceRange {
    fn default() -> Self {
        Self::ALL
    }
}

/// A transition of one resource from one state to another.
///
/// Barriers are declarative: they describe what the caller knows about its own
/// usage and are consumed when recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceBarrier {
    /// The resource transitioned.
    pub resource: BarrierResource,
    /// The state the resource is in before the barrier.
    pub old_state: ResourceState,
    /// The state the resource is in after the barrier.
    pub new_state: ResourceState,
    /// The part of the resource transitioned.
    pub subresource_range: SubresourceRange,
}

impl ResourceBarrier {
    /// A whole-texture transition.
    pub fn texture(texture: Texture, old_state: ResourceState, new_state: ResourceState) -> Self {
        Self {
            resource: BarrierResource::Texture(texture),
            old_state,
            new_state,
            subresource_range: SubresourceRange::ALL,
        }
    }

    /// A buffer transition.
    pub fn buffer(buffer: Buffer, old_state: ResourceState, new_state: ResourceState) -> Self {
        Self {
            resource: BarrierResource::Buffer(buffer),
            old_state,
            new_state,
            subresource_range: SubresourceRange::ALL,
        }
    }

    fn chains_into(&self, next: &ResourceBarrier) -> bool {
        self.resource.resource_ref() == next.resource.resource_ref()
            && self.subresource_range == next.subresource_range
            && self.new_state == next.old_state
    }
}

/// Merges adjacent barriers on the same resource and range.
///
/// `A -> B` followed by `B -> C` becomes `A -> C`, and a transition that ends
/// where it started disappears. Only neighbours within one batch are merged, so
/// no barrier moves across a recorded command. Order is otherwise preserved.
pub fn coalesce_barriers(barriers: &[ResourceBarrier]) -> Vec<ResourceBarrier> {
    let mut merged: Vec<ResourceBarrier> = Vec::with_capacity(barriers.len());
    for barrier in barriers {
        match merged.last_mut() {
            Some(last) if last.chains_into(barrier) => {
                last.new_state = barrier.new_state;
                if last.old_state == last.new_state {
                    merged.pop();
                }
            }
            _ => merged.push(*barrier),
        }
    }
    merged
}
