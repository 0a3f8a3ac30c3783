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

use crate::math::Extent3D;
use crate::renderer::api::*;
use crate::renderer::error::GraphicsResult;
use crate::renderer::sync::ResourceBarrier;
use std::fmt::Debug;
use std::ops::Range;

/// The contract every graphics backend implements.
///
/// A backend owns all native state behind a trait object and is driven from a
/// single thread at a time through `&mut self`. Callers are expected to go
/// through the `GraphicsBackend` facade, which validates arguments and command
/// buffer states before anything reaches this trait; implementations may
/// therefore assume well-formed descriptors but must still reject handles they
/// do not know with [`GraphicsError::InvalidOperation`].
///
/// [`GraphicsError::InvalidOperation`]: crate::renderer::GraphicsError::InvalidOperation
pub trait RenderBackend: Send + Debug + 'static {
    /// A snapshot of the device this backend drives.
    fn info(&self) -> &BackendInfo;

    /// Releases every object the backend owns. Called at most once.
    fn shutdown(&mut self) -> GraphicsResult<()>;

    // --- Resource creation ---

    /// Creates a texture, optionally filling mip level 0 with `initial_data`.
    /// ## Arguments
    /// * `descriptor` - The size, format and usage of the texture.
    /// * `initial_data` - Tightly packed texels of mip level 0, if any.
    /// ## Errors
    /// * `UnsupportedFormat` - If the device cannot create textures of the format.
    /// * `OutOfMemory` - If the allocation does not fit.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Texture>;

    /// Creates a buffer, optionally filled with `initial_data`.
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Buffer>;

    /// Creates a shader module from opaque shader code.
    fn create_shader(&mut self, descriptor: &ShaderDescriptor<'_>) -> GraphicsResult<Shader>;

    /// Creates a graphics pipeline.
    /// ## Errors
    /// * `ResourceCreationFailed` - If a referenced shader is unknown to the backend.
    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> GraphicsResult<Pipeline>;

    /// Creates a compute pipeline.
    fn create_compute_pipeline(
        &mut self,
        descriptor: &ComputePipelineDescriptor<'_>,
    ) -> GraphicsResult<Pipeline>;

    /// Creates a render target and the attachment textures it owns.
    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> GraphicsResult<RenderTarget>;

    /// Creates a sampler.
    fn create_sampler(&mut self, descriptor: &SamplerDescriptor<'_>) -> GraphicsResult<Sampler>;

    // --- Updates, readback and destruction ---

    /// Writes `data` into the buffer at `offset`. No synchronization with
    /// in-flight work is implied.
    fn update_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> GraphicsResult<()>;

    /// Writes tightly packed texels into a region of the texture.
    fn update_texture(
        &mut self,
        texture: &Texture,
        region: &TextureRegion,
        data: &[u8],
    ) -> GraphicsResult<()>;

    /// Waits for the device to go idle and returns `size` bytes of the buffer from `offset`.
    fn read_buffer(&mut self, buffer: &Buffer, offset: u64, size: u64) -> GraphicsResult<Vec<u8>>;

    /// Destroys a texture. The handle is dead afterwards.
    fn destroy_texture(&mut self, texture: &Texture) -> GraphicsResult<()>;
    /// Destroys a buffer.
    fn destroy_buffer(&mut self, buffer: &Buffer) -> GraphicsResult<()>;
    /// Destroys a shader module.
    fn destroy_shader(&mut self, shader: &Shader) -> GraphicsResult<()>;
    /// Destroys a pipeline.
    fn destroy_pipeline(&mut self, pipeline: &Pipeline) -> GraphicsResult<()>;
    /// Destroys a render target together with its attachments.
    fn destroy_render_target(&mut self, target: &RenderTarget) -> GraphicsResult<()>;
    /// Destroys a sampler.
    fn destroy_sampler(&mut self, sampler: &Sampler) -> GraphicsResult<()>;
    /// Destroys a command buffer.
    fn destroy_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()>;

    // --- Command recording ---

    /// Allocates a command buffer in the `Initial` state.
    fn create_command_buffer(&mut self) -> GraphicsResult<CommandBuffer>;
    /// Starts recording, discarding anything recorded before.
    fn begin_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()>;
    /// Finishes recording.
    fn end_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()>;
    /// Hands the recorded commands to the device. May block while the
    /// frames-in-flight limit is reached.
    /// ## Errors
    /// * `CommandSubmissionFailed` - If the device rejected this or earlier work.
    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()>;

    /// Opens a render pass on the given attachments.
    fn begin_render_pass(
        &mut self,
        command_buffer: &CommandBuffer,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> GraphicsResult<()>;
    /// Closes the open render pass.
    fn end_render_pass(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()>;
    /// Sets the viewport for subsequent draws.
    fn set_viewport(
        &mut self,
        command_buffer: &CommandBuffer,
        viewport: &Viewport,
    ) -> GraphicsResult<()>;
    /// Sets the scissor rectangle for subsequent draws.
    fn set_scissor(&mut self, command_buffer: &CommandBuffer, rect: &ScissorRect)
        -> GraphicsResult<()>;

    /// Binds a graphics or compute pipeline.
    fn bind_pipeline(
        &mut self,
        command_buffer: &CommandBuffer,
        pipeline: &Pipeline,
    ) -> GraphicsResult<()>;
    /// Binds a vertex buffer to a slot.
    fn bind_vertex_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()>;
    /// Binds the index buffer.
    fn bind_index_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        buffer: &Buffer,
        offset: u64,
        format: IndexFormat,
    ) -> GraphicsResult<()>;
    /// Binds a uniform buffer to a slot.
    fn bind_uniform_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()>;
    /// Binds a texture, and optionally the sampler to read it with, to a slot.
    fn bind_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        texture: &Texture,
        sampler: Option<&Sampler>,
    ) -> GraphicsResult<()>;

    /// Draws non-indexed primitives.
    fn draw(
        &mut self,
        command_buffer: &CommandBuffer,
        vertices: Range<u32>,
        instances: Range<u32>,
    ) -> GraphicsResult<()>;
    /// Draws indexed primitives.
    fn draw_indexed(
        &mut self,
        command_buffer: &CommandBuffer,
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    ) -> GraphicsResult<()>;
    /// Dispatches compute workgroups.
    fn dispatch(
        &mut self,
        command_buffer: &CommandBuffer,
        x: u32,
        y: u32,
        z: u32,
    ) -> GraphicsResult<()>;

    // --- Copies ---

    /// Copies `size` bytes between buffers.
    fn copy_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &Buffer,
        source_offset: u64,
        destination: &Buffer,
        destination_offset: u64,
        size: u64,
    ) -> GraphicsResult<()>;
    /// Copies a box of texels between textures.
    fn copy_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()>;
    /// Copies texels laid out in a buffer into a texture.
    fn copy_buffer_to_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &Buffer,
        layout: &BufferTextureLayout,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()>;
    /// Copies texels of a texture into a buffer.
    fn copy_texture_to_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &Buffer,
        layout: &BufferTextureLayout,
        size: Extent3D,
    ) -> GraphicsResult<()>;

    // --- Synchronization ---

    /// Records resource state transitions. Explicit backends translate them to
    /// native barriers; implicit backends validate them and do nothing else.
    fn resource_barrier(
        &mut self,
        command_buffer: &CommandBuffer,
        barriers: &[ResourceBarrier],
    ) -> GraphicsResult<()>;

    /// Blocks until every submitted command buffer has retired.
    fn wait_idle(&mut self) -> GraphicsResult<()>;

    // --- Presentation ---

    /// Creates the swap chain, replacing any previous one.
    fn create_swap_chain(&mut self, descriptor: &SwapChainDescriptor) -> GraphicsResult<SwapChain>;
    /// Resizes the back buffers. Previously returned back buffers become invalid.
    fn resize_swap_chain(&mut self, width: u32, height: u32) -> GraphicsResult<SwapChain>;
    /// Acquires the back buffer for the current frame.
    fn get_current_back_buffer(&mut self) -> GraphicsResult<Texture>;
    /// Presents the acquired back buffer and advances to the next frame.
    fn present(&mut self) -> GraphicsResult<()>;

    // --- Debugging ---

    /// Attaches a name to an object for debugging tools.
    fn set_debug_name(&mut self, object: ResourceRef, name: &str) -> GraphicsResult<()>;
    /// Opens a named debug group in a command buffer.
    fn begin_debug_group(&mut self, command_buffer: &CommandBuffer, name: &str)
        -> GraphicsResult<()>;
    /// Closes the innermost debug group.
    fn end_debug_group(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()>;
}
