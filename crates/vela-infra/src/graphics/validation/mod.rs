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

//! A [`RenderBackend`] wrapper that checks object lifetimes and resource states.
//!
//! The layer keeps its own record of every live object and of the state of
//! every texture and buffer in recording order. A call that uses a destroyed
//! handle, or a barrier whose source state does not match what was recorded
//! before it, is logged and rejected with [`GraphicsError::InvalidOperation`]
//! before it reaches the wrapped backend.

use std::collections::HashSet;
use std::ops::Range;
use vela_core::math::Extent3D;
use vela_core::renderer::{
    BackendInfo, Buffer, BufferDescriptor, BufferTextureLayout, CommandBuffer,
    ComputePipelineDescriptor, GraphicsError, GraphicsResult, IndexFormat, Pipeline,
    PipelineDescriptor, RenderBackend, RenderPassDescriptor, RenderTarget, RenderTargetDescriptor,
    ResourceBarrier, ResourceRef, ResourceState, ResourceStateTracker, Sampler, SamplerDescriptor,
    ScissorRect, Shader, ShaderDescriptor, SwapChain, SwapChainDescriptor, Texture,
    TextureCopyLocation, TextureDescriptor, TextureId, TextureRegion, Viewport,
};

/// Validates lifetimes and resource states in front of another backend.
#[derive(Debug)]
pub struct ValidationLayer {
    inner: Box<dyn RenderBackend>,
    live: HashSet<ResourceRef>,
    states: ResourceStateTracker,
    back_buffers: HashSet<TextureId>,
    current_back_buffer: Option<Texture>,
    violations: u64,
}

impl ValidationLayer {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn RenderBackend>) -> Self {
        Self {
            inner,
            live: HashSet::new(),
            states: ResourceStateTracker::new(),
            back_buffers: HashSet::new(),
            current_back_buffer: None,
            violations: 0,
        }
    }

    /// The number of violations reported so far.
    pub fn violations(&self) -> u64 {
        self.violations
    }

    /// The tracked state of a texture or buffer.
    pub fn state(&self, resource: ResourceRef) -> Option<ResourceState> {
        self.states.state(resource)
    }

    /// Unwraps the inner backend.
    pub fn into_inner(self) -> Box<dyn RenderBackend> {
        self.inner
    }

    fn report(&mut self, error: GraphicsError) -> GraphicsError {
        self.violations += 1;
        log::error!("Validation: {error}");
        error
    }

    fn check<T>(&mut self, result: GraphicsResult<T>) -> GraphicsResult<T> {
        result.map_err(|e| self.report(e))
    }

    fn live(&mut self, object: ResourceRef, operation: &str) -> GraphicsResult<()> {
        if object.is_null() || !self.live.contains(&object) {
            let error = GraphicsError::InvalidOperation(format!(
                "{operation} uses a {} that was never created or has been destroyed",
                object.kind()
            ));
            return Err(self.report(error));
        }
        Ok(())
    }

    fn command_buffer(&mut self, command_buffer: &CommandBuffer, operation: &str) -> GraphicsResult<()> {
        self.live(ResourceRef::CommandBuffer(command_buffer.id), operation)
    }

    fn require(
        &mut self,
        resource: ResourceRef,
        accepted: &[ResourceState],
        operation: &str,
    ) -> GraphicsResult<()> {
        self.live(resource, operation)?;
        let result = self.states.require_any(resource, accepted, operation);
        self.check(result)
    }

    fn write_texture(&mut self, texture: &Texture, state: ResourceState, operation: &str) -> GraphicsResult<()> {
        self.live(ResourceRef::Texture(texture.id), operation)?;
        let result = self.states.use_attachment(texture.id, state, true, operation);
        self.check(result)
    }

    fn track_texture(&mut self, texture: &Texture, has_initial_data: bool) {
        self.live.insert(ResourceRef::Texture(texture.id));
        self.states.register_texture(texture.id, has_initial_data);
    }

    fn untrack(&mut self, object: ResourceRef) {
        self.live.remove(&object);
        self.states.forget(object);
    }

    fn use_attachments(&mut self, descriptor: &RenderPassDescriptor<'_>) -> GraphicsResult<()> {
        for attachment in descriptor.color_attachments {
            self.live(ResourceRef::Texture(attachment.target.id), "begin_render_pass")?;
            let result = self.states.use_attachment(
                attachment.target.id,
                ResourceState::RenderTarget,
                attachment.ops.load.is_clear(),
                "color attachment",
            );
            self.check(result)?;
            if let Some(resolve) = &attachment.resolve_target {
                self.write_texture(resolve, ResourceState::RenderTarget, "resolve target")?;
            }
        }
        if let Some(depth) = &descriptor.depth_attachment {
            self.live(ResourceRef::Texture(depth.target.id), "begin_render_pass")?;
            let cleared = depth.depth_ops.is_some_and(|ops| ops.load.is_clear());
            let result = self.states.use_attachment(
                depth.target.id,
                ResourceState::DepthWrite,
                cleared,
                "depth attachment",
            );
            self.check(result)?;
        }
        Ok(())
    }

    fn drop_back_buffers(&mut self) {
        for id in self.back_buffers.drain().collect::<Vec<_>>() {
            self.untrack(ResourceRef::Texture(id));
        }
        self.current_back_buffer = None;
    }
}

impl RenderBackend for ValidationLayer {
    fn info(&self) -> &BackendInfo {
        self.inner.info()
    }

    fn shutdown(&mut self) -> GraphicsResult<()> {
        self.inner.shutdown()?;
        if self.violations > 0 {
            log::warn!("Validation: {} violation(s) reported during this session", self.violations);
        }
        self.live.clear();
        self.states = ResourceStateTracker::new();
        self.back_buffers.clear();
        self.current_back_buffer = None;
        Ok(())
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Texture> {
        let texture = self.inner.create_texture(descriptor, initial_data)?;
        self.track_texture(&texture, initial_data.is_some());
        Ok(texture)
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Buffer> {
        let buffer = self.inner.create_buffer(descriptor, initial_data)?;
        self.live.insert(ResourceRef::Buffer(buffer.id));
        self.states.register_buffer(buffer.id);
        Ok(buffer)
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor<'_>) -> GraphicsResult<Shader> {
        let shader = self.inner.create_shader(descriptor)?;
        self.live.insert(ResourceRef::Shader(shader.id));
        Ok(shader)
    }

    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> GraphicsResult<Pipeline> {
        self.live(ResourceRef::Shader(descriptor.vertex_shader.id), "create_pipeline")?;
        if let Some(fragment) = &descriptor.fragment_shader {
            self.live(ResourceRef::Shader(fragment.id), "create_pipeline")?;
        }
        let pipeline = self.inner.create_pipeline(descriptor)?;
        self.live.insert(ResourceRef::Pipeline(pipeline.id));
        Ok(pipeline)
    }

    fn create_compute_pipeline(
        &mut self,
        descriptor: &ComputePipelineDescriptor<'_>,
    ) -> GraphicsResult<Pipeline> {
        self.live(ResourceRef::Shader(descriptor.shader.id), "create_compute_pipeline")?;
        let pipeline = self.inner.create_compute_pipeline(descriptor)?;
        self.live.insert(ResourceRef::Pipeline(pipeline.id));
        Ok(pipeline)
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> GraphicsResult<RenderTarget> {
        let target = self.inner.create_render_target(descriptor)?;
        self.live.insert(ResourceRef::RenderTarget(target.id));
        self.track_texture(&target.color, false);
        if let Some(depth) = &target.depth {
            self.track_texture(depth, false);
        }
        Ok(target)
    }

    fn create_sampler(&mut self, descriptor: &SamplerDescriptor<'_>) -> GraphicsResult<Sampler> {
        let sampler = self.inner.create_sampler(descriptor)?;
        self.live.insert(ResourceRef::Sampler(sampler.id));
        Ok(sampler)
    }

    fn update_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        self.live(ResourceRef::Buffer(buffer.id), "update_buffer")?;
        self.inner.update_buffer(buffer, offset, data)
    }

    fn update_texture(
        &mut self,
        texture: &Texture,
        region: &TextureRegion,
        data: &[u8],
    ) -> GraphicsResult<()> {
        self.live(ResourceRef::Texture(texture.id), "update_texture")?;
        self.inner.update_texture(texture, region, data)
    }

    fn read_buffer(&mut self, buffer: &Buffer, offset: u64, size: u64) -> GraphicsResult<Vec<u8>> {
        self.live(ResourceRef::Buffer(buffer.id), "read_buffer")?;
        self.inner.read_buffer(buffer, offset, size)
    }

    fn destroy_texture(&mut self, texture: &Texture) -> GraphicsResult<()> {
        self.live(ResourceRef::Texture(texture.id), "destroy_texture")?;
        self.inner.destroy_texture(texture)?;
        self.untrack(ResourceRef::Texture(texture.id));
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: &Buffer) -> GraphicsResult<()> {
        self.live(ResourceRef::Buffer(buffer.id), "destroy_buffer")?;
        self.inner.destroy_buffer(buffer)?;
        self.untrack(ResourceRef::Buffer(buffer.id));
        Ok(())
    }

    fn destroy_shader(&mut self, shader: &Shader) -> GraphicsResult<()> {
        self.live(ResourceRef::Shader(shader.id), "destroy_shader")?;
        self.inner.destroy_shader(shader)?;
        self.untrack(ResourceRef::Shader(shader.id));
        Ok(())
    }

    fn destroy_pipeline(&mut self, pipeline: &Pipeline) -> GraphicsResult<()> {
        self.live(ResourceRef::Pipeline(pipeline.id), "destroy_pipeline")?;
        self.inner.destroy_pipeline(pipeline)?;
        self.untrack(ResourceRef::Pipeline(pipeline.id));
        Ok(())
    }

    fn destroy_render_target(&mut self, target: &RenderTarget) -> GraphicsResult<()> {
        self.live(ResourceRef::RenderTarget(target.id), "destroy_render_target")?;
        self.inner.destroy_render_target(target)?;
        self.untrack(ResourceRef::RenderTarget(target.id));
        self.untrack(ResourceRef::Texture(target.color.id));
        if let Some(depth) = &target.depth {
            self.untrack(ResourceRef::Texture(depth.id));
        }
        Ok(())
    }

    fn destroy_sampler(&mut self, sampler: &Sampler) -> GraphicsResult<()> {
        self.live(ResourceRef::Sampler(sampler.id), "destroy_sampler")?;
        self.inner.destroy_sampler(sampler)?;
        self.untrack(ResourceRef::Sampler(sampler.id));
        Ok(())
    }

    fn destroy_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "destroy_command_buffer")?;
        self.inner.destroy_command_buffer(command_buffer)?;
        self.untrack(ResourceRef::CommandBuffer(command_buffer.id));
        Ok(())
    }

    fn create_command_buffer(&mut self) -> GraphicsResult<CommandBuffer> {
        let command_buffer = self.inner.create_command_buffer()?;
        self.live.insert(ResourceRef::CommandBuffer(command_buffer.id));
        Ok(command_buffer)
    }

    fn begin_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "begin_command_buffer")?;
        self.inner.begin_command_buffer(command_buffer)
    }

    fn end_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "end_command_buffer")?;
        self.inner.end_command_buffer(command_buffer)
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "submit_command_buffer")?;
        self.inner.submit_command_buffer(command_buffer)
    }

    fn begin_render_pass(
        &mut self,
        command_buffer: &CommandBuffer,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "begin_render_pass")?;
        let snapshot = self.states.clone();
        let checked = self.use_attachments(descriptor);
        let result = checked.and_then(|()| self.inner.begin_render_pass(command_buffer, descriptor));
        if result.is_err() {
            self.states = snapshot;
        }
        result
    }

    fn end_render_pass(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "end_render_pass")?;
        self.inner.end_render_pass(command_buffer)
    }

    fn set_viewport(
        &mut self,
        command_buffer: &CommandBuffer,
        viewport: &Viewport,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "set_viewport")?;
        self.inner.set_viewport(command_buffer, viewport)
    }

    fn set_scissor(&mut self, command_buffer: &CommandBuffer, rect: &ScissorRect) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "set_scissor")?;
        self.inner.set_scissor(command_buffer, rect)
    }

    fn bind_pipeline(&mut self, command_buffer: &CommandBuffer, pipeline: &Pipeline) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "bind_pipeline")?;
        self.live(ResourceRef::Pipeline(pipeline.id), "bind_pipeline")?;
        self.inner.bind_pipeline(command_buffer, pipeline)
    }

    fn bind_vertex_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "bind_vertex_buffer")?;
        self.require(
            ResourceRef::Buffer(buffer.id),
            &[ResourceState::VertexBuffer, ResourceState::Common],
            "bind_vertex_buffer",
        )?;
        self.inner.bind_vertex_buffer(command_buffer, slot, buffer, offset)
    }

    fn bind_index_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        buffer: &Buffer,
        offset: u64,
        format: IndexFormat,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "bind_index_buffer")?;
        self.require(
            ResourceRef::Buffer(buffer.id),
            &[ResourceState::IndexBuffer, ResourceState::Common],
            "bind_index_buffer",
        )?;
        self.inner.bind_index_buffer(command_buffer, buffer, offset, format)
    }

    fn bind_uniform_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "bind_uniform_buffer")?;
        self.require(
            ResourceRef::Buffer(buffer.id),
            &[ResourceState::UniformBuffer, ResourceState::Common],
            "bind_uniform_buffer",
        )?;
        self.inner.bind_uniform_buffer(command_buffer, slot, buffer, offset)
    }

    fn bind_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        texture: &Texture,
        sampler: Option<&Sampler>,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "bind_texture")?;
        self.require(
            ResourceRef::Texture(texture.id),
            &[
                ResourceState::ShaderResource,
                ResourceState::UnorderedAccess,
                ResourceState::Common,
            ],
            "bind_texture",
        )?;
        if let Some(sampler) = sampler {
            self.live(ResourceRef::Sampler(sampler.id), "bind_texture")?;
        }
        self.inner.bind_texture(command_buffer, slot, texture, sampler)
    }

    fn draw(
        &mut self,
        command_buffer: &CommandBuffer,
        vertices: Range<u32>,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "draw")?;
        self.inner.draw(command_buffer, vertices, instances)
    }

    fn draw_indexed(
        &mut self,
        command_buffer: &CommandBuffer,
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "draw_indexed")?;
        self.inner
            .draw_indexed(command_buffer, indices, base_vertex, instances)
    }

    fn dispatch(&mut self, command_buffer: &CommandBuffer, x: u32, y: u32, z: u32) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "dispatch")?;
        self.inner.dispatch(command_buffer, x, y, z)
    }

    fn copy_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &Buffer,
        source_offset: u64,
        destination: &Buffer,
        destination_offset: u64,
        size: u64,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "copy_buffer")?;
        self.require(
            ResourceRef::Buffer(source.id),
            &[ResourceState::CopySrc, ResourceState::Common],
            "copy_buffer source",
        )?;
        self.require(
            ResourceRef::Buffer(destination.id),
            &[ResourceState::CopyDst, ResourceState::Common],
            "copy_buffer destination",
        )?;
        self.inner.copy_buffer(
            command_buffer,
            source,
            source_offset,
            destination,
            destination_offset,
            size,
        )
    }

    fn copy_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "copy_texture")?;
        self.require(
            ResourceRef::Texture(source.texture.id),
            &[ResourceState::CopySrc, ResourceState::Common],
            "copy_texture source",
        )?;
        self.require(
            ResourceRef::Texture(destination.texture.id),
            &[ResourceState::CopyDst],
            "copy_texture destination",
        )?;
        self.inner
            .copy_texture(command_buffer, source, destination, size)
    }

    fn copy_buffer_to_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &Buffer,
        layout: &BufferTextureLayout,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "copy_buffer_to_texture")?;
        self.require(
            ResourceRef::Buffer(source.id),
            &[ResourceState::CopySrc, ResourceState::Common],
            "copy_buffer_to_texture source",
        )?;
        self.require(
            ResourceRef::Texture(destination.texture.id),
            &[ResourceState::CopyDst],
            "copy_buffer_to_texture destination",
        )?;
        self.inner
            .copy_buffer_to_texture(command_buffer, source, layout, destination, size)
    }

    fn copy_texture_to_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &Buffer,
        layout: &BufferTextureLayout,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "copy_texture_to_buffer")?;
        self.require(
            ResourceRef::Texture(source.texture.id),
            &[ResourceState::CopySrc, ResourceState::Common],
            "copy_texture_to_buffer source",
        )?;
        self.require(
            ResourceRef::Buffer(destination.id),
            &[ResourceState::CopyDst, ResourceState::Common],
            "copy_texture_to_buffer destination",
        )?;
        self.inner
            .copy_texture_to_buffer(command_buffer, source, destination, layout, size)
    }

    fn resource_barrier(
        &mut self,
        command_buffer: &CommandBuffer,
        barriers: &[ResourceBarrier],
    ) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "resource_barrier")?;
        for barrier in barriers {
            self.live(barrier.resource.resource_ref(), "resource_barrier")?;
        }
        let snapshot = self.states.clone();
        let applied = self.states.apply_barriers(barriers);
        self.check(applied)?;
        let result = self.inner.resource_barrier(command_buffer, barriers);
        if result.is_err() {
            self.states = snapshot;
        }
        result
    }

    fn wait_idle(&mut self) -> GraphicsResult<()> {
        self.inner.wait_idle()
    }

    fn create_swap_chain(&mut self, descriptor: &SwapChainDescriptor) -> GraphicsResult<SwapChain> {
        let swap_chain = self.inner.create_swap_chain(descriptor)?;
        self.drop_back_buffers();
        Ok(swap_chain)
    }

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> GraphicsResult<SwapChain> {
        let swap_chain = self.inner.resize_swap_chain(width, height)?;
        self.drop_back_buffers();
        Ok(swap_chain)
    }

    fn get_current_back_buffer(&mut self) -> GraphicsResult<Texture> {
        let texture = self.inner.get_current_back_buffer()?;
        // Acquiring hands out a buffer whose previous contents are gone.
        self.live.insert(ResourceRef::Texture(texture.id));
        self.states.discard(texture.id);
        self.back_buffers.insert(texture.id);
        self.current_back_buffer = Some(texture);
        Ok(texture)
    }

    fn present(&mut self) -> GraphicsResult<()> {
        if let Some(back_buffer) = self.current_back_buffer {
            self.require(
                ResourceRef::Texture(back_buffer.id),
                &[ResourceState::RenderTarget, ResourceState::Present],
                "present",
            )?;
        }
        self.inner.present()?;
        self.current_back_buffer = None;
        Ok(())
    }

    fn set_debug_name(&mut self, object: ResourceRef, name: &str) -> GraphicsResult<()> {
        self.live(object, "set_debug_name")?;
        self.inner.set_debug_name(object, name)
    }

    fn begin_debug_group(&mut self, command_buffer: &CommandBuffer, name: &str) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "begin_debug_group")?;
        self.inner.begin_debug_group(command_buffer, name)
    }

    fn end_debug_group(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.command_buffer(command_buffer, "end_debug_group")?;
        self.inner.end_debug_group(command_buffer)
    }
}
