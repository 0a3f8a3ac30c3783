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

//! Per-resource state tracking in recording order.

use super::barrier::{ResourceBarrier, ResourceState};
use crate::renderer::api::resource::{BufferId, ResourceRef, TextureId};
use crate::renderer::error::{GraphicsError, GraphicsResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tracked {
    state: ResourceState,
    // Buffers sit in an implicit `Common` until their first barrier.
    implicit: bool,
}

/// Tracks the current [`ResourceState`] of every known texture and buffer.
///
/// States are tracked per whole resource. Textures start `Undefined`, or
/// `ShaderResource` when created with initial data. Buffers start `Common`,
/// which satisfies any buffer use until the buffer is explicitly transitioned.
#[derive(Debug, Clone, Default)]
pub struct ResourceStateTracker {
    states: HashMap<ResourceRef, Tracked>,
}

impl ResourceStateTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a texture.
    pub fn register_texture(&mut self, id: TextureId, has_initial_data: bool) {
        let state = if has_initial_data {
            ResourceState::ShaderResource
        } else {
            ResourceState::Undefined
        };
        self.states.insert(
            ResourceRef::Texture(id),
            Tracked {
                state,
                implicit: false,
            },
        );
    }

    /// Starts tracking a buffer in the implicit `Common` state.
    pub fn register_buffer(&mut self, id: BufferId) {
        self.states.insert(
            ResourceRef::Buffer(id),
            Tracked {
                state: ResourceState::Common,
                implicit: true,
            },
        );
    }

    /// Discards the contents of a tracked texture, as happens to a back buffer
    /// when it is acquired.
    pub fn discard(&mut self, id: TextureId) {
        self.register_texture(id, false);
    }

    /// Stops tracking a resource.
    pub fn forget(&mut self, resource: ResourceRef) {
        self.states.remove(&resource);
    }

    /// The tracked state of `resource`, if known.
    pub fn state(&self, resource: ResourceRef) -> Option<ResourceState> {
        self.states.get(&resource).map(|tracked| tracked.state)
    }

    /// Applies a batch of barriers in order.
    ///
    /// Each barrier's `old_state` must match the state left by everything
    /// recorded before it, unless it is `Undefined`. The batch is applied
    /// entirely or not at all.
    pub fn apply_barriers(&mut self, barriers: &[ResourceBarrier]) -> GraphicsResult<()> {
        let mut pending: HashMap<ResourceRef, ResourceState> = HashMap::new();
        for barrier in barriers {
            let resource = barrier.resource.resource_ref();
            let current = match pending.get(&resource) {
                Some(state) => *state,
                None => self.tracked(resource)?.state,
            };
            if barrier.old_state != ResourceState::Undefined && barrier.old_state != current {
                return Err(GraphicsError::InvalidOperation(format!(
                    "barrier on {} expects {:?} but the resource is in {:?}",
                    resource.kind(),
                    barrier.old_state,
                    current
                )));
            }
            pending.insert(resource, barrier.new_state);
        }
        for (resource, state) in pending {
            self.states.insert(
                resource,
                Tracked {
                    state,
                    implicit: false,
                },
            );
        }
        Ok(())
    }

    /// Checks that `resource` is in `required` for a use described by `usage`.
    pub fn require(
        &self,
        resource: ResourceRef,
        required: ResourceState,
        usage: &str,
    ) -> GraphicsResult<()> {
        self.require_any(resource, &[required], usage)
    }

    /// Checks that `resource` is in one of `accepted` for a use described by `usage`.
    pub fn require_any(
        &self,
        resource: ResourceRef,
        accepted: &[ResourceState],
        usage: &str,
    ) -> GraphicsResult<()> {
        let tracked = self.tracked(resource)?;
        if tracked.implicit || accepted.contains(&tracked.state) {
            return Ok(());
        }
        Err(GraphicsError::InvalidOperation(format!(
            "{usage} needs the {} in {accepted:?} but it is in {:?}",
            resource.kind(),
            tracked.state
        )))
    }

    /// Checks an attachment of a render pass. An `Undefined` attachment is
    /// accepted when the pass clears it, and then holds `state`.
    pub fn use_attachment(
        &mut self,
        id: TextureId,
        state: ResourceState,
        cleared: bool,
        usage: &str,
    ) -> GraphicsResult<()> {
        let resource = ResourceRef::Texture(id);
        let tracked = self.tracked(resource)?;
        if cleared && tracked.state == ResourceState::Undefined {
            self.states.insert(
                resource,
                Tracked {
                    state,
                    implicit: false,
                },
            );
            return Ok(());
        }
        self.require(resource, state, usage)
    }

    /// The number of tracked resources.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn tracked(&self, resource: ResourceRef) -> GraphicsResult<Tracked> {
        self.states.get(&resource).copied().ok_or_else(|| {
            GraphicsError::InvalidOperation(format!(
                "{} is not tracked; it was never created or has been destroyed",
                resource.kind()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Extent3D;
    use crate::renderer::api::resource::{Buffer, BufferUsage, Texture, TextureDimension, TextureUsage};
    use crate::renderer::api::util::{SampleCount, TextureFormat};
    use slotmap::KeyData;

    fn texture() -> Texture {
        Texture {
            id: TextureId::from(KeyData::from_ffi(1 | (1 << 32))),
            size: Extent3D::new_2d(8, 8),
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::all(),
            dimension: TextureDimension::D2,
            mip_level_count: 1,
            sample_count: SampleCount::X1,
        }
    }

    fn buffer() -> Buffer {
        Buffer {
            id: BufferId::from(KeyData::from_ffi(2 | (1 << 32))),
            size: 64,
            usage: BufferUsage::all(),
        }
    }

    #[test]
    fn initial_states() {
        let mut tracker = ResourceStateTracker::new();
        let tex = texture();
        tracker.register_texture(tex.id, true);
        assert_eq!(
            tracker.state(ResourceRef::Texture(tex.id)),
            Some(ResourceState::ShaderResource)
        );
        tracker.register_texture(tex.id, false);
        assert_eq!(
            tracker.state(ResourceRef::Texture(tex.id)),
            Some(ResourceState::Undefined)
        );
    }

    #[test]
    fn barriers_in_recording_order_are_accepted() {
        let mut tracker = ResourceStateTracker::new();
        let tex = texture();
        tracker.register_texture(tex.id, false);

        tracker
            .apply_barriers(&[ResourceBarrier::texture(
                tex,
                ResourceState::Undefined,
                ResourceState::CopyDst,
            )])
            .unwrap();
        tracker
            .apply_barriers(&[ResourceBarrier::texture(
                tex,
                ResourceState::CopyDst,
                ResourceState::ShaderResource,
            )])
            .unwrap();
        tracker
            .require(
                ResourceRef::Texture(tex.id),
                ResourceState::ShaderResource,
                "bind_texture",
            )
            .unwrap();
    }

    #[test]
    fn out_of_order_barrier_is_rejected_and_batch_discarded() {
        let mut tracker = ResourceStateTracker::new();
        let tex = texture();
        tracker.register_texture(tex.id, false);

        let result = tracker.apply_barriers(&[
            ResourceBarrier::texture(tex, ResourceState::Undefined, ResourceState::CopyDst),
            ResourceBarrier::texture(tex, ResourceState::ShaderResource, ResourceState::CopySrc),
        ]);
        assert!(matches!(result, Err(GraphicsError::InvalidOperation(_))));
        assert_eq!(
            tracker.state(ResourceRef::Texture(tex.id)),
            Some(ResourceState::Undefined)
        );
    }

    #[test]
    fn buffers_are_implicitly_compatible_until_transitioned() {
        let mut tracker = ResourceStateTracker::new();
        let buf = buffer();
        let resource = ResourceRef::Buffer(buf.id);
        tracker.register_buffer(buf.id);
        tracker
            .require(resource, ResourceState::VertexBuffer, "bind_vertex_buffer")
            .unwrap();
        tracker
            .require(resource, ResourceState::CopyDst, "copy_buffer")
            .unwrap();

        tracker
            .apply_barriers(&[ResourceBarrier::buffer(
                buf,
                ResourceState::Common,
                ResourceState::CopyDst,
            )])
            .unwrap();
        assert!(tracker
            .require(resource, ResourceState::VertexBuffer, "bind_vertex_buffer")
            .is_err());
    }

    #[test]
    fn cleared_attachment_may_start_undefined() {
        let mut tracker = ResourceStateTracker::new();
        let tex = texture();
        tracker.register_texture(tex.id, false);

        assert!(tracker
            .use_attachment(tex.id, ResourceState::RenderTarget, false, "begin_render_pass")
            .is_err());
        tracker
            .use_attachment(tex.id, ResourceState::RenderTarget, true, "begin_render_pass")
            .unwrap();
        assert_eq!(
            tracker.state(ResourceRef::Texture(tex.id)),
            Some(ResourceState::RenderTarget)
        );
    }

    #[test]
    fn untracked_resources_are_rejected() {
        let tracker = ResourceStateTracker::new();
        let tex = texture();
        assert!(tracker
            .require(
                ResourceRef::Texture(tex.id),
                ResourceState::ShaderResource,
                "bind_texture"
            )
            .is_err());
    }
}
