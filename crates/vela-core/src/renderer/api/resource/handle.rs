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

//! Generation-checked resource keys.
//!
//! Every key carries a slot index and a generation. Destroying a resource bumps
//! the generation of its slot, so a stale key can never resolve to whatever
//! resource reuses the slot later.

use slotmap::Key;

slotmap::new_key_type! {
    /// Key of a texture.
    pub struct TextureId;
    /// Key of a buffer.
    pub struct BufferId;
    /// Key of a shader module.
    pub struct ShaderId;
    /// Key of a graphics or compute pipeline.
    pub struct PipelineId;
    /// Key of a render target.
    pub struct RenderTargetId;
    /// Key of a sampler.
    pub struct SamplerId;
    /// Key of a command buffer.
    pub struct CommandBufferId;
}

/// A reference to any object a backend owns, used for debug naming and
/// liveness bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    /// A texture.
    Texture(TextureId),
    /// A buffer.
    Buffer(BufferId),
    /// A shader module.
    Shader(ShaderId),
    /// A pipeline.
    Pipeline(PipelineId),
    /// A render target.
    RenderTarget(RenderTargetId),
    /// A sampler.
    Sampler(SamplerId),
    /// A command buffer.
    CommandBuffer(CommandBufferId),
}

impl ResourceRef {
    /// The kind of object referenced, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceRef::Texture(_) => "texture",
            ResourceRef::Buffer(_) => "buffer",
            ResourceRef::Shader(_) => "shader",
            ResourceRef::Pipeline(_) => "pipeline",
            ResourceRef::RenderTarget(_) => "render target",
            ResourceRef::Sampler(_) => "sampler",
            ResourceRef::CommandBuffer(_) => "command buffer",
        }
    }

    /// Whether the reference holds the null key.
    pub fn is_null(&self) -> bool {
        match self {
            ResourceRef::Texture(id) => id.is_null(),
            ResourceRef::Buffer(id) => id.is_null(),
            ResourceRef::Shader(id) => id.is_null(),
            ResourceRef::Pipeline(id) => id.is_null(),
            ResourceRef::RenderTarget(id) => id.is_null(),
            ResourceRef::Sampler(id) => id.is_null(),
            ResourceRef::CommandBuffer(id) => id.is_null(),
        }
    }
}

macro_rules! impl_from_id {
    ($($id:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$id> for ResourceRef {
                fn from(id: $id) -> Self {
                    ResourceRef::$variant(id)
                }
            }
        )*
    };
}

impl_from_id!(
    TextureId => Texture,
    BufferId => Buffer,
    ShaderId => Shader,
    PipelineId => Pipeline,
    RenderTargetId => RenderTarget,
    SamplerId => Sampler,
    CommandBufferId => CommandBuffer,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_are_null() {
        assert!(TextureId::default().is_null());
        assert!(ResourceRef::from(BufferId::default()).is_null());
    }

    #[test]
    fn resource_ref_reports_kind() {
        assert_eq!(ResourceRef::from(SamplerId::default()).kind(), "sampler");
        assert_eq!(
            ResourceRef::from(CommandBufferId::default()).kind(),
            "command buffer"
        );
    }
}
