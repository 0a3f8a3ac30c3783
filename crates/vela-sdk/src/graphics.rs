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

//! The [`GraphicsBackend`] facade.

use crate::validate;
use std::collections::HashMap;
use std::ops::Range;
use vela_core::math::Extent3D;
use vela_core::renderer::{
    coalesce_barriers, BackendConfig, BackendInfo, BackendType, Buffer, BufferDescriptor,
    BufferTextureLayout, BufferUsage, CommandBuffer, CommandBufferId, CommandTracker,
    ComputePipelineDescriptor, GraphicsError, GraphicsResult, IndexFormat, Pipeline,
    PipelineDescriptor, RenderBackend, RenderPassDescriptor, RenderTarget, RenderTargetDescriptor,
    ResourceBarrier, ResourceRef, Sampler, SamplerDescriptor, ScissorRect, Shader,
    ShaderDescriptor, SwapChain, SwapChainDescriptor, Texture, TextureCopyLocation,
    TextureDescriptor, TextureRegion, TextureUsage, ValidationError, Viewport,
};

/// The entry point of the graphics layer.
///
/// A `GraphicsBackend` is bound to one [`RenderBackend`] for its whole life.
/// Every call is checked for shape (descriptor sizes, usages, ranges, device
/// limits) and against the command buffer state machine before it is
/// forwarded, so a backend only ever sees well-formed requests. A call that
/// fails validation never reaches the backend.
///
/// # Examples
///
/// ```no_run
/// use vela_sdk::prelude::*;
///
/// let config = BackendConfig::headless(BackendType::Software, 64, 64);
/// let mut graphics = GraphicsBackend::new(config)?;
/// let cmd = graphics.create_command_buffer()?;
/// graphics.begin_command_buffer(&cmd)?;
/// graphics.end_command_buffer(&cmd)?;
/// graphics.submit_command_buffer(&cmd)?;
/// graphics.shutdown()?;
/// # Ok::<(), GraphicsError>(())
/// ```
#[derive(Debug)]
pub struct GraphicsBackend {
    backend: Box<dyn RenderBackend>,
    info: BackendInfo,
    config: BackendConfig,
    command_buffers: HashMap<CommandBufferId, CommandTracker>,
    swap_chain: Option<SwapChain>,
    back_buffer: Option<Texture>,
    is_shut_down: bool,
}

fn reject(error: ValidationError) -> GraphicsError {
    log::error!("Rejected before reaching the backend: {error}");
    GraphicsError::Validation(error)
}

impl GraphicsBackend {
    /// Validates `config` and creates the backend it names through the
    /// process-wide registry.
    ///
    /// ## Errors
    ///
    /// - [`GraphicsError::Validation`] if the configuration is malformed. No
    ///   backend is created in that case.
    /// - [`GraphicsError::BackendNotAvailable`] if an explicitly requested
    ///   backend cannot be loaded.
    /// - [`GraphicsError::UnsupportedOperation`] if ray tracing is requested and
    ///   the device lacks it.
    pub fn new(config: BackendConfig) -> GraphicsResult<Self> {
        config.validate().map_err(reject)?;
        let backend = vela_infra::create_backend(&config)?;
        Self::bind(config, backend)
    }

    /// Binds the facade to an already created backend.
    ///
    /// ## Errors
    ///
    /// Same as [`GraphicsBackend::new`], minus backend resolution.
    pub fn with_backend(config: BackendConfig, backend: Box<dyn RenderBackend>) -> GraphicsResult<Self> {
        config.validate().map_err(reject)?;
        Self::bind(config, backend)
    }

    fn bind(config: BackendConfig, mut backend: Box<dyn RenderBackend>) -> GraphicsResult<Self> {
        let info = backend.info().clone();
        if config.enable_ray_tracing && !info.supports_ray_tracing() {
            log::error!(
                "Ray tracing was requested but '{}' does not support it.",
                info.device_name
            );
            if let Err(e) = backend.shutdown() {
                log::warn!("Backend shutdown after a failed initialization also failed: {e}");
            }
            return Err(GraphicsError::UnsupportedOperation(
                "ray tracing is not supported by the selected device".to_string(),
            ));
        }

        log::info!(
            "GraphicsBackend initialized: {} on '{}' ({:?}), {} frame(s) in flight",
            info.backend_type.name(),
            info.device_name,
            info.device_type,
            info.max_frames_in_flight
        );
        Ok(Self {
            backend,
            info,
            config,
            command_buffers: HashMap::new(),
            swap_chain: None,
            back_buffer: None,
            is_shut_down: false,
        })
    }

    /// The capabilities of the bound device.
    pub fn info(&self) -> &BackendInfo {
        &self.info
    }

    /// The backend type that was actually selected.
    pub fn backend_type(&self) -> BackendType {
        self.info.backend_type
    }

    /// The configuration the facade was created with.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// The current swap chain, if one was created.
    pub fn swap_chain(&self) -> Option<&SwapChain> {
        self.swap_chain.as_ref()
    }

    /// Whether [`GraphicsBackend::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.is_shut_down
    }

    /// The recording state of `command_buffer`.
    pub fn command_buffer_state(&self, command_buffer: &CommandBuffer) -> GraphicsResult<CommandTracker> {
        self.tracker(command_buffer).cloned()
    }

    /// Releases the backend. Later calls, including a second shutdown, fail
    /// with [`GraphicsError::NotInitialized`].
    pub fn shutdown(&mut self) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.is_shut_down = true;
        self.command_buffers.clear();
        self.swap_chain = None;
        self.back_buffer = None;
        let result = self.backend.shutdown();
        log::info!("GraphicsBackend shut down.");
        result
    }

    fn ensure_running(&self) -> GraphicsResult<()> {
        if self.is_shut_down {
            return Err(GraphicsError::NotInitialized);
        }
        Ok(())
    }

    fn tracker(&self, command_buffer: &CommandBuffer) -> GraphicsResult<&CommandTracker> {
        self.command_buffers.get(&command_buffer.id).ok_or_else(|| {
            GraphicsError::invalid_operation("command buffer was never created or has been destroyed")
        })
    }

    /// Runs a state transition on a copy of the command buffer's tracker, then
    /// forwards. The transition is kept only if the backend accepts the call.
    fn record<R>(
        &mut self,
        command_buffer: &CommandBuffer,
        transition: impl FnOnce(&mut CommandTracker) -> GraphicsResult<()>,
        forward: impl FnOnce(&mut dyn RenderBackend) -> GraphicsResult<R>,
    ) -> GraphicsResult<R> {
        self.ensure_running()?;
        let mut next = self.tracker(command_buffer)?.clone();
        transition(&mut next)?;
        let result = forward(self.backend.as_mut())?;
        self.command_buffers.insert(command_buffer.id, next);
        Ok(result)
    }

    // --- Resources ---

    /// Creates a texture, optionally filling its first mip level.
    pub fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Texture> {
        self.ensure_running()?;
        validate::texture_descriptor(descriptor, initial_data, &self.info.limits).map_err(reject)?;
        self.backend.create_texture(descriptor, initial_data)
    }

    /// Creates a buffer, optionally filled with `initial_data`.
    pub fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Buffer> {
        self.ensure_running()?;
        validate::buffer_descriptor(descriptor, initial_data, &self.info.limits).map_err(reject)?;
        self.backend.create_buffer(descriptor, initial_data)
    }

    /// Creates a buffer holding `contents`, sized to fit them.
    pub fn create_buffer_with_data<T: bytemuck::Pod>(
        &mut self,
        label: Option<&str>,
        usage: BufferUsage,
        contents: &[T],
    ) -> GraphicsResult<Buffer> {
        let bytes: &[u8] = bytemuck::cast_slice(contents);
        let mut descriptor = BufferDescriptor::new(bytes.len() as u64, usage);
        if let Some(label) = label {
            descriptor = descriptor.with_label(label);
        }
        self.create_buffer(&descriptor, Some(bytes))
    }

    /// Creates a shader module from opaque code.
    pub fn create_shader(&mut self, descriptor: &ShaderDescriptor<'_>) -> GraphicsResult<Shader> {
        self.ensure_running()?;
        validate::shader_descriptor(descriptor).map_err(reject)?;
        self.backend.create_shader(descriptor)
    }

    /// Creates a graphics pipeline.
    pub fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> GraphicsResult<Pipeline> {
        self.ensure_running()?;
        validate::pipeline_descriptor(descriptor, &self.info.limits).map_err(reject)?;
        self.backend.create_pipeline(descriptor)
    }

    /// Creates a compute pipeline.
    ///
    /// ## Errors
    ///
    /// Returns [`GraphicsError::UnsupportedOperation`] on devices without compute.
    pub fn create_compute_pipeline(
        &mut self,
        descriptor: &ComputePipelineDescriptor<'_>,
    ) -> GraphicsResult<Pipeline> {
        self.ensure_running()?;
        if !self.info.supports_compute() {
            return Err(GraphicsError::UnsupportedOperation(
                "compute pipelines are not supported by this device".to_string(),
            ));
        }
        validate::compute_shader(descriptor.shader.stage).map_err(reject)?;
        self.backend.create_compute_pipeline(descriptor)
    }

    /// Creates a render target with its attachment textures.
    pub fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> GraphicsResult<RenderTarget> {
        self.ensure_running()?;
        validate::render_target_descriptor(descriptor, &self.info.limits).map_err(reject)?;
        self.backend.create_render_target(descriptor)
    }

    /// Creates a sampler.
    pub fn create_sampler(&mut self, descriptor: &SamplerDescriptor<'_>) -> GraphicsResult<Sampler> {
        self.ensure_running()?;
        validate::sampler_descriptor(descriptor).map_err(reject)?;
        self.backend.create_sampler(descriptor)
    }

    /// Writes `data` into `buffer` at `offset`. Work already submitted that
    /// reads the range is not waited for.
    pub fn update_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        self.ensure_running()?;
        validate::buffer_update(buffer, offset, data).map_err(reject)?;
        self.backend.update_buffer(buffer, offset, data)
    }

    /// Writes a slice of plain values into `buffer` at `offset`.
    pub fn update_buffer_typed<T: bytemuck::Pod>(
        &mut self,
        buffer: &Buffer,
        offset: u64,
        data: &[T],
    ) -> GraphicsResult<()> {
        self.update_buffer(buffer, offset, bytemuck::cast_slice(data))
    }

    /// Writes tightly packed texels into a region of `texture`.
    pub fn update_texture(
        &mut self,
        texture: &Texture,
        region: &TextureRegion,
        data: &[u8],
    ) -> GraphicsResult<()> {
        self.ensure_running()?;
        validate::texture_update(texture, region, data).map_err(reject)?;
        self.backend.update_texture(texture, region, data)
    }

    /// Waits for the device and reads `size` bytes of `buffer` at `offset`.
    pub fn read_buffer(&mut self, buffer: &Buffer, offset: u64, size: u64) -> GraphicsResult<Vec<u8>> {
        self.ensure_running()?;
        validate::buffer_usage(buffer, BufferUsage::MAP_READ, "MAP_READ").map_err(reject)?;
        validate::buffer_range("buffer read", buffer, offset, size).map_err(reject)?;
        self.backend.read_buffer(buffer, offset, size)
    }

    /// Reads a buffer range back as plain values.
    pub fn read_buffer_typed<T: bytemuck::Pod>(
        &mut self,
        buffer: &Buffer,
        offset: u64,
        count: usize,
    ) -> GraphicsResult<Vec<T>> {
        let stride = std::mem::size_of::<T>();
        if stride == 0 {
            return Ok(vec![T::zeroed(); count]);
        }
        let bytes = self.read_buffer(buffer, offset, (count * stride) as u64)?;
        Ok(bytes
            .chunks_exact(stride)
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// Destroys a texture. The handle must not be used afterwards.
    pub fn destroy_texture(&mut self, texture: &Texture) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.backend.destroy_texture(texture)
    }

    /// Destroys a buffer.
    pub fn destroy_buffer(&mut self, buffer: &Buffer) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.backend.destroy_buffer(buffer)
    }

    /// Destroys a shader module.
    pub fn destroy_shader(&mut self, shader: &Shader) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.backend.destroy_shader(shader)
    }

    /// Destroys a pipeline.
    pub fn destroy_pipeline(&mut self, pipeline: &Pipeline) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.backend.destroy_pipeline(pipeline)
    }

    /// Destroys a render target and its attachments.
    pub fn destroy_render_target(&mut self, target: &RenderTarget) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.backend.destroy_render_target(target)
    }

    /// Destroys a sampler.
    pub fn destroy_sampler(&mut self, sampler: &Sampler) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.backend.destroy_sampler(sampler)
    }

    // --- Command buffers ---

    /// Creates a command buffer in the `Initial` state.
    pub fn create_command_buffer(&mut self) -> GraphicsResult<CommandBuffer> {
        self.ensure_running()?;
        let command_buffer = self.backend.create_command_buffer()?;
        self.command_buffers
            .insert(command_buffer.id, CommandTracker::new());
        Ok(command_buffer)
    }

    /// Destroys a command buffer.
    pub fn destroy_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.tracker(command_buffer)?;
        self.backend.destroy_command_buffer(command_buffer)?;
        self.command_buffers.remove(&command_buffer.id);
        Ok(())
    }

    /// Starts recording. A submitted command buffer can be re-recorded only on
    /// devices advertising `COMMAND_BUFFER_RESET`.
    pub fn begin_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        let reset_supported = self.info.supports_command_buffer_reset();
        self.record(
            command_buffer,
            |t| t.begin(reset_supported),
            |b| b.begin_command_buffer(command_buffer),
        )
    }

    /// Finishes recording.
    pub fn end_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.record(command_buffer, CommandTracker::end, |b| {
            b.end_command_buffer(command_buffer)
        })
    }

    /// Submits a finished command buffer for execution.
    pub fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.record(command_buffer, CommandTracker::submit, |b| {
            b.submit_command_buffer(command_buffer)
        })
    }

    /// Opens a render pass over the given attachments.
    pub fn begin_render_pass(
        &mut self,
        command_buffer: &CommandBuffer,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> GraphicsResult<()> {
        validate::render_pass(descriptor, &self.info.limits).map_err(reject)?;
        self.record(command_buffer, CommandTracker::begin_render_pass, |b| {
            b.begin_render_pass(command_buffer, descriptor)
        })
    }

    /// Closes the open render pass.
    pub fn end_render_pass(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.record(command_buffer, CommandTracker::end_render_pass, |b| {
            b.end_render_pass(command_buffer)
        })
    }

    /// Sets the viewport of the open render pass.
    pub fn set_viewport(&mut self, command_buffer: &CommandBuffer, viewport: &Viewport) -> GraphicsResult<()> {
        viewport.validate().map_err(reject)?;
        self.record(
            command_buffer,
            |t| t.set_dynamic_state("set_viewport"),
            |b| b.set_viewport(command_buffer, viewport),
        )
    }

    /// Sets the scissor rectangle of the open render pass.
    pub fn set_scissor(&mut self, command_buffer: &CommandBuffer, rect: &ScissorRect) -> GraphicsResult<()> {
        if rect.width == 0 || rect.height == 0 {
            return Err(reject(ValidationError::ZeroSize {
                what: "scissor rectangle",
            }));
        }
        self.record(
            command_buffer,
            |t| t.set_dynamic_state("set_scissor"),
            |b| b.set_scissor(command_buffer, rect),
        )
    }

    /// Binds a pipeline. Graphics pipelines bind inside a render pass,
    /// compute pipelines outside.
    pub fn bind_pipeline(&mut self, command_buffer: &CommandBuffer, pipeline: &Pipeline) -> GraphicsResult<()> {
        self.record(
            command_buffer,
            |t| t.bind_pipeline(pipeline.kind),
            |b| b.bind_pipeline(command_buffer, pipeline),
        )
    }

    /// Binds a vertex buffer to `slot`.
    pub fn bind_vertex_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()> {
        validate::buffer_usage(buffer, BufferUsage::VERTEX, "VERTEX").map_err(reject)?;
        validate::slot("vertex buffer slot", slot, self.info.limits.max_vertex_buffers).map_err(reject)?;
        validate::buffer_range("vertex buffer binding", buffer, offset, 0).map_err(reject)?;
        self.record(command_buffer, CommandTracker::bind_vertex_buffer, |b| {
            b.bind_vertex_buffer(command_buffer, slot, buffer, offset)
        })
    }

    /// Binds the index buffer.
    pub fn bind_index_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        buffer: &Buffer,
        offset: u64,
        format: IndexFormat,
    ) -> GraphicsResult<()> {
        validate::buffer_usage(buffer, BufferUsage::INDEX, "INDEX").map_err(reject)?;
        validate::buffer_range("index buffer binding", buffer, offset, 0).map_err(reject)?;
        if offset % format.size() != 0 {
            return Err(reject(ValidationError::InvalidDescriptor(format!(
                "index buffer offset {offset} is not a multiple of the {format:?} index size"
            ))));
        }
        self.record(command_buffer, CommandTracker::bind_index_buffer, |b| {
            b.bind_index_buffer(command_buffer, buffer, offset, format)
        })
    }

    /// Binds a uniform buffer to `slot`.
    pub fn bind_uniform_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()> {
        validate::buffer_usage(buffer, BufferUsage::UNIFORM, "UNIFORM").map_err(reject)?;
        validate::slot(
            "uniform buffer slot",
            slot,
            self.info.limits.max_uniform_buffer_bindings,
        )
        .map_err(reject)?;
        validate::buffer_range("uniform buffer binding", buffer, offset, 0).map_err(reject)?;
        self.record(
            command_buffer,
            |t| t.bind_resource("bind_uniform_buffer"),
            |b| b.bind_uniform_buffer(command_buffer, slot, buffer, offset),
        )
    }

    /// Binds a texture, and optionally a sampler, to `slot`.
    pub fn bind_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        texture: &Texture,
        sampler: Option<&Sampler>,
    ) -> GraphicsResult<()> {
        validate::texture_usage(texture, TextureUsage::TEXTURE_BINDING, "TEXTURE_BINDING")
            .map_err(reject)?;
        validate::slot("texture slot", slot, self.info.limits.max_texture_bindings).map_err(reject)?;
        self.record(
            command_buffer,
            |t| t.bind_resource("bind_texture"),
            |b| b.bind_texture(command_buffer, slot, texture, sampler),
        )
    }

    /// Draws non-indexed primitives.
    pub fn draw(
        &mut self,
        command_buffer: &CommandBuffer,
        vertices: Range<u32>,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        check_range("vertex range", &vertices)?;
        check_range("instance range", &instances)?;
        self.record(command_buffer, CommandTracker::draw, |b| {
            b.draw(command_buffer, vertices, instances)
        })
    }

    /// Draws indexed primitives.
    pub fn draw_indexed(
        &mut self,
        command_buffer: &CommandBuffer,
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        check_range("index range", &indices)?;
        check_range("instance range", &instances)?;
        self.record(command_buffer, CommandTracker::draw_indexed, |b| {
            b.draw_indexed(command_buffer, indices, base_vertex, instances)
        })
    }

    /// Dispatches compute workgroups.
    pub fn dispatch(&mut self, command_buffer: &CommandBuffer, x: u32, y: u32, z: u32) -> GraphicsResult<()> {
        let limit = u64::from(self.info.limits.max_compute_workgroups);
        for count in [x, y, z] {
            if u64::from(count) > limit {
                return Err(reject(ValidationError::ExceedsLimit {
                    what: "dispatch workgroup count",
                    value: count.into(),
                    limit,
                }));
            }
        }
        self.record(command_buffer, CommandTracker::dispatch, |b| {
            b.dispatch(command_buffer, x, y, z)
        })
    }

    // --- Copies ---

    /// Copies `size` bytes between buffers.
    pub fn copy_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &Buffer,
        source_offset: u64,
        destination: &Buffer,
        destination_offset: u64,
        size: u64,
    ) -> GraphicsResult<()> {
        validate::buffer_copy(source, source_offset, destination, destination_offset, size)
            .map_err(reject)?;
        self.record(
            command_buffer,
            |t| t.copy("copy_buffer"),
            |b| {
                b.copy_buffer(
                    command_buffer,
                    source,
                    source_offset,
                    destination,
                    destination_offset,
                    size,
                )
            },
        )
    }

    /// Copies a box of texels between textures of the same format.
    pub fn copy_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        validate::texture_copy(source, destination, size).map_err(reject)?;
        self.record(
            command_buffer,
            |t| t.copy("copy_texture"),
            |b| b.copy_texture(command_buffer, source, destination, size),
        )
    }

    /// Copies texels laid out in a buffer into a texture.
    pub fn copy_buffer_to_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &Buffer,
        layout: &BufferTextureLayout,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        validate::buffer_usage(source, BufferUsage::COPY_SRC, "COPY_SRC").map_err(reject)?;
        validate::texture_usage(&destination.texture, TextureUsage::COPY_DST, "COPY_DST")
            .map_err(reject)?;
        validate::buffer_texture_copy(source, layout, destination, size).map_err(reject)?;
        self.record(
            command_buffer,
            |t| t.copy("copy_buffer_to_texture"),
            |b| b.copy_buffer_to_texture(command_buffer, source, layout, destination, size),
        )
    }

    /// Copies texels of a texture into a buffer.
    pub fn copy_texture_to_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &Buffer,
        layout: &BufferTextureLayout,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        validate::texture_usage(&source.texture, TextureUsage::COPY_SRC, "COPY_SRC").map_err(reject)?;
        validate::buffer_usage(destination, BufferUsage::COPY_DST, "COPY_DST").map_err(reject)?;
        validate::buffer_texture_copy(destination, layout, source, size).map_err(reject)?;
        self.record(
            command_buffer,
            |t| t.copy("copy_texture_to_buffer"),
            |b| b.copy_texture_to_buffer(command_buffer, source, destination, layout, size),
        )
    }

    // --- Synchronization ---

    /// Records resource state transitions. Adjacent chained barriers on the
    /// same resource are merged before they reach the backend.
    ///
    /// With validation enabled the batch is forwarded as written, so that
    /// transitions which merge away are still checked against the tracked
    /// states and handle lifetimes.
    pub fn resource_barrier(
        &mut self,
        command_buffer: &CommandBuffer,
        barriers: &[ResourceBarrier],
    ) -> GraphicsResult<()> {
        if barriers.is_empty() {
            return Err(reject(ValidationError::Empty { what: "barriers" }));
        }
        let batch = if self.config.enable_validation {
            barriers.to_vec()
        } else {
            coalesce_barriers(barriers)
        };
        self.record(command_buffer, CommandTracker::barrier, |b| {
            if batch.is_empty() {
                return Ok(());
            }
            b.resource_barrier(command_buffer, &batch)
        })
    }

    /// Blocks until every submitted command buffer has finished.
    pub fn wait_idle(&mut self) -> GraphicsResult<()> {
        self.ensure_running()?;
        self.backend.wait_idle()
    }

    // --- Presentation ---

    /// Creates the swap chain, replacing any previous one.
    pub fn create_swap_chain(&mut self, descriptor: &SwapChainDescriptor) -> GraphicsResult<SwapChain> {
        self.ensure_running()?;
        descriptor.validate().map_err(reject)?;
        if descriptor.format.is_depth() {
            return Err(GraphicsError::UnsupportedFormat(descriptor.format));
        }
        let swap_chain = self.backend.create_swap_chain(descriptor)?;
        self.swap_chain = Some(swap_chain);
        self.back_buffer = None;
        Ok(swap_chain)
    }

    /// Resizes the swap chain. Back buffers returned before the resize are
    /// invalid afterwards.
    ///
    /// ## Errors
    ///
    /// Returns [`GraphicsError::ResizeFailed`] for a zero dimension, without
    /// calling the backend.
    pub fn resize_swap_chain(&mut self, width: u32, height: u32) -> GraphicsResult<SwapChain> {
        self.ensure_running()?;
        if self.swap_chain.is_none() {
            return Err(GraphicsError::invalid_operation(
                "resize_swap_chain called before create_swap_chain",
            ));
        }
        if width == 0 || height == 0 {
            log::warn!("Ignoring a resize to {width}x{height}.");
            return Err(GraphicsError::ResizeFailed {
                width,
                height,
                reason: "swap chain dimensions must be non-zero".to_string(),
            });
        }
        let swap_chain = self.backend.resize_swap_chain(width, height)?;
        self.swap_chain = Some(swap_chain);
        self.back_buffer = None;
        Ok(swap_chain)
    }

    /// Acquires the back buffer of the current frame. Only one acquisition is
    /// allowed per frame.
    pub fn get_current_back_buffer(&mut self) -> GraphicsResult<Texture> {
        self.ensure_running()?;
        if self.swap_chain.is_none() {
            return Err(GraphicsError::invalid_operation(
                "get_current_back_buffer called before create_swap_chain",
            ));
        }
        if self.back_buffer.is_some() {
            return Err(GraphicsError::invalid_operation(
                "the back buffer of this frame was already acquired",
            ));
        }
        let texture = self.backend.get_current_back_buffer()?;
        self.back_buffer = Some(texture);
        Ok(texture)
    }

    /// Presents the acquired back buffer and ends the frame.
    pub fn present(&mut self) -> GraphicsResult<()> {
        self.ensure_running()?;
        if self.swap_chain.is_none() {
            return Err(GraphicsError::invalid_operation("present called before create_swap_chain"));
        }
        if self.back_buffer.is_none() {
            return Err(GraphicsError::PresentFailed(
                "no back buffer was acquired this frame".to_string(),
            ));
        }
        self.backend.present()?;
        self.back_buffer = None;
        Ok(())
    }

    // --- Debugging ---

    /// Names an object for debuggers. Failures are logged and ignored.
    pub fn set_debug_name(&mut self, object: impl Into<ResourceRef>, name: &str) {
        if self.is_shut_down {
            log::warn!("Ignoring debug name '{name}': the backend is shut down.");
            return;
        }
        let object = object.into();
        if let Err(e) = self.backend.set_debug_name(object, name) {
            log::warn!("Could not name {} '{name}': {e}", object.kind());
        }
    }

    /// Opens a debug group. Failures are logged and ignored.
    pub fn begin_debug_group(&mut self, command_buffer: &CommandBuffer, name: &str) {
        let result = self.record(command_buffer, CommandTracker::begin_debug_group, |b| {
            b.begin_debug_group(command_buffer, name)
        });
        if let Err(e) = result {
            log::warn!("Could not open debug group '{name}': {e}");
        }
    }

    /// Closes the innermost debug group. Failures are logged and ignored.
    pub fn end_debug_group(&mut self, command_buffer: &CommandBuffer) {
        let result = self.record(command_buffer, CommandTracker::end_debug_group, |b| {
            b.end_debug_group(command_buffer)
        });
        if let Err(e) = result {
            log::warn!("Could not close debug group: {e}");
        }
    }
}

fn check_range(what: &'static str, range: &Range<u32>) -> GraphicsResult<()> {
    if range.start > range.end {
        return Err(reject(ValidationError::InvalidDescriptor(format!(
            "{what} {}..{} is reversed",
            range.start, range.end
        ))));
    }
    Ok(())
}

impl Drop for GraphicsBackend {
    fn drop(&mut self) {
        if !self.is_shut_down {
            if let Err(e) = self.shutdown() {
                log::error!("GraphicsBackend shutdown on drop failed: {e}");
            }
        }
    }
}
