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

//! The software reference device.

use super::command::{PendingResolve, SoftwareCommand, SoftwareCommandList};
use super::executor::SoftwareStats;
use super::memory::{SoftwareMemory, TextureOwner};
use super::queue::{lock_memory, SoftwareQueue};
use super::swapchain::SoftwareSwapChain;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use vela_core::math::Extent3D;
use vela_core::renderer::{
    BackendConfig, BackendFeatures, BackendInfo, BackendLimits, BackendType, Buffer,
    BufferDescriptor, BufferTextureLayout, CommandBuffer, CommandBufferId, ComputePipelineDescriptor,
    DeviceType, GraphicsError, GraphicsResult, IndexFormat, LoadOp, Pipeline, PipelineDescriptor,
    PipelineId, PipelineKind, RenderBackend, RenderPassDescriptor, RenderTarget,
    RenderTargetDescriptor, RenderTargetId, ResourceBarrier, ResourcePool, ResourceRef, Sampler,
    SamplerDescriptor, SamplerId, ScissorRect, Shader, ShaderDescriptor, ShaderId, ShaderStage,
    SwapChain, SwapChainDescriptor, Texture, TextureCopyLocation, TextureDescriptor, TextureFormat,
    TextureRegion, Viewport,
};

/// The memory budget used when none is given.
pub const DEFAULT_MEMORY_BUDGET: u64 = 512 << 20;

#[derive(Debug)]
struct ShaderEntry {
    stage: ShaderStage,
}

#[derive(Debug)]
struct PipelineEntry {
    kind: PipelineKind,
}

#[derive(Debug)]
struct RenderTargetEntry {
    color: Texture,
    depth: Option<Texture>,
}

/// A CPU implementation of [`RenderBackend`].
///
/// Textures and buffers are byte vectors. Submitted command lists run in order
/// on a worker thread, which performs clears, copies, resolves and uploads and
/// counts draws and dispatches without rasterizing anything. The device
/// behaves like an implicit API: resource barriers are validated and dropped.
#[derive(Debug)]
pub struct SoftwareDevice {
    info: BackendInfo,
    memory: Arc<Mutex<SoftwareMemory>>,
    queue: SoftwareQueue,
    shaders: ResourcePool<ShaderId, ShaderEntry>,
    pipelines: ResourcePool<PipelineId, PipelineEntry>,
    samplers: ResourcePool<SamplerId, ()>,
    render_targets: ResourcePool<RenderTargetId, RenderTargetEntry>,
    command_lists: ResourcePool<CommandBufferId, SoftwareCommandList>,
    swap_chain: Option<SoftwareSwapChain>,
    debug_names: HashMap<ResourceRef, String>,
    is_shut_down: bool,
}

impl SoftwareDevice {
    /// Creates a device with the [`DEFAULT_MEMORY_BUDGET`].
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_memory_budget(config, DEFAULT_MEMORY_BUDGET)
    }

    /// Creates a device that refuses allocations beyond `budget` bytes.
    pub fn with_memory_budget(config: &BackendConfig, budget: u64) -> Self {
        let info = BackendInfo {
            backend_type: BackendType::Software,
            device_name: "Vela Software Device".to_string(),
            device_type: DeviceType::Cpu,
            limits: BackendLimits::default(),
            features: BackendFeatures::COMPUTE | BackendFeatures::COMMAND_BUFFER_RESET,
            max_frames_in_flight: config.max_frames_in_flight.max(1),
        };
        let memory = Arc::new(Mutex::new(SoftwareMemory::new(budget)));
        let queue = SoftwareQueue::new(Arc::clone(&memory), info.max_frames_in_flight);

        log::info!(
            "SoftwareDevice: created with a {} MiB budget and {} frame(s) in flight",
            budget >> 20,
            info.max_frames_in_flight
        );

        Self {
            info,
            memory,
            queue,
            shaders: ResourcePool::new("shader"),
            pipelines: ResourcePool::new("pipeline"),
            samplers: ResourcePool::new("sampler"),
            render_targets: ResourcePool::new("render target"),
            command_lists: ResourcePool::new("command buffer"),
            swap_chain: None,
            debug_names: HashMap::new(),
            is_shut_down: false,
        }
    }

    /// Counters of the work executed so far.
    pub fn stats(&self) -> SoftwareStats {
        self.queue.stats()
    }

    /// Bytes currently allocated out of the budget.
    pub fn memory_allocated(&self) -> GraphicsResult<u64> {
        Ok(lock_memory(&self.memory)?.allocated())
    }

    /// The memory budget in bytes.
    pub fn memory_budget(&self) -> GraphicsResult<u64> {
        Ok(lock_memory(&self.memory)?.budget())
    }

    /// Submissions not yet retired by the worker.
    pub fn submissions_in_flight(&mut self) -> usize {
        self.queue.poll();
        self.queue.in_flight()
    }

    /// The debug name given to `object`, if any.
    pub fn debug_name(&self, object: ResourceRef) -> Option<&str> {
        self.debug_names.get(&object).map(String::as_str)
    }

    fn ensure_running(&self) -> GraphicsResult<()> {
        if self.is_shut_down {
            return Err(GraphicsError::NotInitialized);
        }
        Ok(())
    }

    fn check_format(format: TextureFormat) -> GraphicsResult<()> {
        if format == TextureFormat::Depth32FloatStencil8 {
            return Err(GraphicsError::UnsupportedFormat(format));
        }
        Ok(())
    }

    fn list(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<&mut SoftwareCommandList> {
        self.command_lists.get_mut(command_buffer.id)
    }

    fn check_textures<'a>(&self, textures: impl IntoIterator<Item = &'a Texture>) -> GraphicsResult<()> {
        let memory = lock_memory(&self.memory)?;
        for texture in textures {
            memory.texture(texture.id)?;
        }
        Ok(())
    }

    fn check_buffers<'a>(&self, buffers: impl IntoIterator<Item = &'a Buffer>) -> GraphicsResult<()> {
        let memory = lock_memory(&self.memory)?;
        for buffer in buffers {
            memory.buffers.get(buffer.id)?;
        }
        Ok(())
    }

    fn exists(&self, object: ResourceRef) -> GraphicsResult<bool> {
        Ok(match object {
            ResourceRef::Texture(id) => lock_memory(&self.memory)?.textures.contains(id),
            ResourceRef::Buffer(id) => lock_memory(&self.memory)?.buffers.contains(id),
            ResourceRef::Shader(id) => self.shaders.contains(id),
            ResourceRef::Pipeline(id) => self.pipelines.contains(id),
            ResourceRef::RenderTarget(id) => self.render_targets.contains(id),
            ResourceRef::Sampler(id) => self.samplers.contains(id),
            ResourceRef::CommandBuffer(id) => self.command_lists.contains(id),
        })
    }

    fn check_shader(&self, shader: &Shader, stage: ShaderStage) -> GraphicsResult<()> {
        let entry = self.shaders.get(shader.id).map_err(|_| {
            GraphicsError::ResourceCreationFailed("pipeline references an unknown shader".to_string())
        })?;
        if entry.stage != stage {
            return Err(GraphicsError::ResourceCreationFailed(format!(
                "expected a {stage:?} shader, got a {:?} shader",
                entry.stage
            )));
        }
        Ok(())
    }

    fn record(&mut self, command_buffer: &CommandBuffer, command: SoftwareCommand) -> GraphicsResult<()> {
        self.list(command_buffer)?.commands.push(command);
        Ok(())
    }

    fn span(range: &Range<u32>) -> u32 {
        range.end.saturating_sub(range.start)
    }
}

impl RenderBackend for SoftwareDevice {
    fn info(&self) -> &BackendInfo {
        &self.info
    }

    fn shutdown(&mut self) -> GraphicsResult<()> {
        self.ensure_running()?;
        if let Err(e) = self.queue.wait_idle() {
            log::error!("SoftwareDevice: outstanding work failed during shutdown: {e}");
        }
        self.queue.shutdown();

        let mut memory = lock_memory(&self.memory)?;
        if let Some(mut chain) = self.swap_chain.take() {
            chain.release(&mut memory);
        }
        memory.clear();
        drop(memory);

        self.shaders.drain().for_each(drop);
        self.pipelines.drain().for_each(drop);
        self.samplers.drain().for_each(drop);
        self.render_targets.drain().for_each(drop);
        self.command_lists.drain().for_each(drop);
        self.debug_names.clear();
        self.is_shut_down = true;

        log::info!("SoftwareDevice: shut down.");
        Ok(())
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Texture> {
        self.ensure_running()?;
        Self::check_format(descriptor.format)?;
        if descriptor.size.is_empty() || descriptor.mip_level_count == 0 {
            return Err(GraphicsError::ResourceCreationFailed(
                "texture has no texels".to_string(),
            ));
        }
        let texture = lock_memory(&self.memory)?.allocate_texture(
            descriptor,
            TextureOwner::Standalone,
            initial_data,
        )?;
        log::debug!(
            "SoftwareDevice: created texture '{}' {:?}, {:?} {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            texture.id,
            descriptor.size,
            descriptor.format
        );
        Ok(texture)
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Buffer> {
        self.ensure_running()?;
        let buffer = lock_memory(&self.memory)?.allocate_buffer(descriptor, initial_data)?;
        log::debug!(
            "SoftwareDevice: created buffer '{}' {:?}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            buffer.id,
            buffer.size
        );
        Ok(buffer)
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor<'_>) -> GraphicsResult<Shader> {
        self.ensure_running()?;
        let id = self.shaders.insert(ShaderEntry {
            stage: descriptor.stage,
        });
        log::debug!(
            "SoftwareDevice: created {:?} shader '{}' {id:?}, entry point '{}', {} bytes of code",
            descriptor.stage,
            descriptor.label.unwrap_or_default(),
            descriptor.entry_point,
            descriptor.source.len()
        );
        Ok(Shader {
            id,
            stage: descriptor.stage,
        })
    }

    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> GraphicsResult<Pipeline> {
        self.ensure_running()?;
        self.check_shader(&descriptor.vertex_shader, ShaderStage::Vertex)?;
        if let Some(fragment) = &descriptor.fragment_shader {
            self.check_shader(fragment, ShaderStage::Fragment)?;
        }
        for target in descriptor.color_targets.iter() {
            Self::check_format(target.format)?;
        }
        if let Some(depth) = &descriptor.depth_target {
            Self::check_format(depth.format)?;
        }
        let id = self.pipelines.insert(PipelineEntry {
            kind: PipelineKind::Graphics,
        });
        log::debug!("SoftwareDevice: created graphics pipeline {id:?}");
        Ok(Pipeline {
            id,
            kind: PipelineKind::Graphics,
            sample_count: descriptor.sample_count,
        })
    }

    fn create_compute_pipeline(
        &mut self,
        descriptor: &ComputePipelineDescriptor<'_>,
    ) -> GraphicsResult<Pipeline> {
        self.ensure_running()?;
        self.check_shader(&descriptor.shader, ShaderStage::Compute)?;
        let id = self.pipelines.insert(PipelineEntry {
            kind: PipelineKind::Compute,
        });
        log::debug!("SoftwareDevice: created compute pipeline {id:?}");
        Ok(Pipeline {
            id,
            kind: PipelineKind::Compute,
            sample_count: Default::default(),
        })
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> GraphicsResult<RenderTarget> {
        self.ensure_running()?;
        Self::check_format(descriptor.color_format)?;
        if let Some(format) = descriptor.depth_format {
            Self::check_format(format)?;
        }

        let size = Extent3D::new_2d(descriptor.size.width, descriptor.size.height);
        let color_desc = TextureDescriptor {
            size,
            sample_count: descriptor.sample_count,
            format: descriptor.color_format,
            usage: RenderTargetDescriptor::COLOR_USAGE,
            ..TextureDescriptor::default()
        };

        let mut memory = lock_memory(&self.memory)?;
        let color = memory.allocate_texture(&color_desc, TextureOwner::RenderTarget, None)?;
        let depth = match descriptor.depth_format {
            Some(format) => {
                let depth_desc = TextureDescriptor {
                    format,
                    usage: RenderTargetDescriptor::DEPTH_USAGE,
                    ..color_desc.clone()
                };
                match memory.allocate_texture(&depth_desc, TextureOwner::RenderTarget, None) {
                    Ok(depth) => Some(depth),
                    Err(e) => {
                        let _ = memory.free_texture(color.id);
                        return Err(e);
                    }
                }
            }
            None => None,
        };
        drop(memory);

        let id = self.render_targets.insert(RenderTargetEntry { color, depth });
        log::debug!(
            "SoftwareDevice: created render target '{}' {id:?}, {}x{}",
            descriptor.label.as_deref().unwrap_or_default(),
            size.width,
            size.height
        );
        Ok(RenderTarget {
            id,
            size: descriptor.size,
            color,
            depth,
            sample_count: descriptor.sample_count,
        })
    }

    fn create_sampler(&mut self, descriptor: &SamplerDescriptor<'_>) -> GraphicsResult<Sampler> {
        self.ensure_running()?;
        let id = self.samplers.insert(());
        log::debug!(
            "SoftwareDevice: created sampler '{}' {id:?}",
            descriptor.label.as_deref().unwrap_or_default()
        );
        Ok(Sampler { id })
    }

    fn update_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        lock_memory(&self.memory)?.write_buffer(buffer.id, offset, data)
    }

    fn update_texture(
        &mut self,
        texture: &Texture,
        region: &TextureRegion,
        data: &[u8],
    ) -> GraphicsResult<()> {
        let mut memory = lock_memory(&self.memory)?;
        let format = memory.texture(texture.id)?.texture.format;
        let layout = BufferTextureLayout::tightly_packed(0, region.size, format);
        memory.write_texture(texture.id, region, data, &layout)
    }

    fn read_buffer(&mut self, buffer: &Buffer, offset: u64, size: u64) -> GraphicsResult<Vec<u8>> {
        self.queue.wait_idle()?;
        lock_memory(&self.memory)?.read_buffer(buffer.id, offset, size)
    }

    fn destroy_texture(&mut self, texture: &Texture) -> GraphicsResult<()> {
        let mut memory = lock_memory(&self.memory)?;
        match memory.texture(texture.id)?.owner {
            TextureOwner::Standalone => {}
            TextureOwner::RenderTarget => {
                return Err(GraphicsError::invalid_operation(
                    "texture belongs to a render target; destroy the render target instead",
                ))
            }
            TextureOwner::SwapChain => {
                return Err(GraphicsError::invalid_operation(
                    "back buffers belong to the swap chain and cannot be destroyed",
                ))
            }
        }
        memory.free_texture(texture.id)?;
        self.debug_names.remove(&ResourceRef::Texture(texture.id));
        log::debug!("SoftwareDevice: destroyed texture {:?}", texture.id);
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: &Buffer) -> GraphicsResult<()> {
        lock_memory(&self.memory)?.free_buffer(buffer.id)?;
        self.debug_names.remove(&ResourceRef::Buffer(buffer.id));
        log::debug!("SoftwareDevice: destroyed buffer {:?}", buffer.id);
        Ok(())
    }

    fn destroy_shader(&mut self, shader: &Shader) -> GraphicsResult<()> {
        self.shaders.remove(shader.id)?;
        self.debug_names.remove(&ResourceRef::Shader(shader.id));
        log::debug!("SoftwareDevice: destroyed shader {:?}", shader.id);
        Ok(())
    }

    fn destroy_pipeline(&mut self, pipeline: &Pipeline) -> GraphicsResult<()> {
        self.pipelines.remove(pipeline.id)?;
        self.debug_names.remove(&ResourceRef::Pipeline(pipeline.id));
        log::debug!("SoftwareDevice: destroyed pipeline {:?}", pipeline.id);
        Ok(())
    }

    fn destroy_render_target(&mut self, target: &RenderTarget) -> GraphicsResult<()> {
        let entry = self.render_targets.remove(target.id)?;
        let mut memory = lock_memory(&self.memory)?;
        memory.free_texture(entry.color.id)?;
        if let Some(depth) = entry.depth {
            memory.free_texture(depth.id)?;
        }
        self.debug_names.remove(&ResourceRef::RenderTarget(target.id));
        log::debug!("SoftwareDevice: destroyed render target {:?}", target.id);
        Ok(())
    }

    fn destroy_sampler(&mut self, sampler: &Sampler) -> GraphicsResult<()> {
        self.samplers.remove(sampler.id)?;
        self.debug_names.remove(&ResourceRef::Sampler(sampler.id));
        Ok(())
    }

    fn destroy_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.command_lists.remove(command_buffer.id)?;
        self.debug_names
            .remove(&ResourceRef::CommandBuffer(command_buffer.id));
        Ok(())
    }

    fn create_command_buffer(&mut self) -> GraphicsResult<CommandBuffer> {
        self.ensure_running()?;
        let id = self.command_lists.insert(SoftwareCommandList::default());
        log::trace!("SoftwareDevice: created command buffer {id:?}");
        Ok(CommandBuffer { id })
    }

    fn begin_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        let reset_supported = self.info.supports_command_buffer_reset();
        let list = self.list(command_buffer)?;
        list.tracker.begin(reset_supported)?;
        list.reset();
        Ok(())
    }

    fn end_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.list(command_buffer)?.tracker.end()
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.ensure_running()?;
        let list = self.list(command_buffer)?;
        list.tracker.submit()?;
        let commands = list.take_commands();
        let index = self.queue.submit(commands)?;
        log::trace!("SoftwareDevice: submitted {:?} as {index:?}", command_buffer.id);
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        command_buffer: &CommandBuffer,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> GraphicsResult<()> {
        let attachments = descriptor
            .color_attachments
            .iter()
            .flat_map(|a| std::iter::once(&a.target).chain(a.resolve_target.as_ref()))
            .chain(descriptor.depth_attachment.as_ref().map(|d| &d.target));
        self.check_textures(attachments)?;

        let list = self.list(command_buffer)?;
        list.tracker.begin_render_pass()?;
        for attachment in descriptor.color_attachments {
            if let LoadOp::Clear(color) = attachment.ops.load {
                list.commands.push(SoftwareCommand::ClearColor {
                    texture: attachment.target.id,
                    color,
                });
            }
            if let Some(resolve) = attachment.resolve_target {
                list.pending_resolves.push(PendingResolve {
                    source: attachment.target.id,
                    destination: resolve.id,
                    store: attachment.ops.store,
                });
            }
        }
        if let Some(depth) = &descriptor.depth_attachment {
            let depth_clear = depth.depth_ops.and_then(|ops| match ops.load {
                LoadOp::Clear(value) => Some(value),
                LoadOp::Load => None,
            });
            let stencil_clear = depth.stencil_ops.and_then(|ops| match ops.load {
                LoadOp::Clear(value) => Some(value),
                LoadOp::Load => None,
            });
            if depth_clear.is_some() || stencil_clear.is_some() {
                list.commands.push(SoftwareCommand::ClearDepthStencil {
                    texture: depth.target.id,
                    depth: depth_clear,
                    stencil: stencil_clear,
                });
            }
        }
        Ok(())
    }

    fn end_render_pass(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        let list = self.list(command_buffer)?;
        list.tracker.end_render_pass()?;
        list.finish_pass();
        Ok(())
    }

    fn set_viewport(
        &mut self,
        command_buffer: &CommandBuffer,
        viewport: &Viewport,
    ) -> GraphicsResult<()> {
        self.list(command_buffer)?
            .tracker
            .set_dynamic_state("set_viewport")?;
        log::trace!("SoftwareDevice: viewport {viewport:?}");
        Ok(())
    }

    fn set_scissor(&mut self, command_buffer: &CommandBuffer, rect: &ScissorRect) -> GraphicsResult<()> {
        self.list(command_buffer)?
            .tracker
            .set_dynamic_state("set_scissor")?;
        log::trace!("SoftwareDevice: scissor {rect:?}");
        Ok(())
    }

    fn bind_pipeline(&mut self, command_buffer: &CommandBuffer, pipeline: &Pipeline) -> GraphicsResult<()> {
        let kind = self.pipelines.get(pipeline.id)?.kind;
        self.list(command_buffer)?.tracker.bind_pipeline(kind)
    }

    fn bind_vertex_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        _offset: u64,
    ) -> GraphicsResult<()> {
        if slot >= self.info.limits.max_vertex_buffers {
            return Err(GraphicsError::InvalidOperation(format!(
                "vertex buffer slot {slot} exceeds the device limit"
            )));
        }
        self.check_buffers([buffer])?;
        self.list(command_buffer)?.tracker.bind_vertex_buffer()
    }

    fn bind_index_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        buffer: &Buffer,
        _offset: u64,
        _format: IndexFormat,
    ) -> GraphicsResult<()> {
        self.check_buffers([buffer])?;
        self.list(command_buffer)?.tracker.bind_index_buffer()
    }

    fn bind_uniform_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        _slot: u32,
        buffer: &Buffer,
        _offset: u64,
    ) -> GraphicsResult<()> {
        self.check_buffers([buffer])?;
        self.list(command_buffer)?
            .tracker
            .bind_resource("bind_uniform_buffer")
    }

    fn bind_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        _slot: u32,
        texture: &Texture,
        sampler: Option<&Sampler>,
    ) -> GraphicsResult<()> {
        self.check_textures([texture])?;
        if let Some(sampler) = sampler {
            self.samplers.get(sampler.id)?;
        }
        self.list(command_buffer)?.tracker.bind_resource("bind_texture")
    }

    fn draw(
        &mut self,
        command_buffer: &CommandBuffer,
        vertices: Range<u32>,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        self.list(command_buffer)?.tracker.draw()?;
        self.record(
            command_buffer,
            SoftwareCommand::Draw {
                vertices: Self::span(&vertices),
                instances: Self::span(&instances),
            },
        )
    }

    fn draw_indexed(
        &mut self,
        command_buffer: &CommandBuffer,
        indices: Range<u32>,
        _base_vertex: i32,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        self.list(command_buffer)?.tracker.draw_indexed()?;
        self.record(
            command_buffer,
            SoftwareCommand::Draw {
                vertices: Self::span(&indices),
                instances: Self::span(&instances),
            },
        )
    }

    fn dispatch(&mut self, command_buffer: &CommandBuffer, x: u32, y: u32, z: u32) -> GraphicsResult<()> {
        self.list(command_buffer)?.tracker.dispatch()?;
        self.record(
            command_buffer,
            SoftwareCommand::Dispatch {
                workgroups: [x, y, z],
            },
        )
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
        self.check_buffers([source, destination])?;
        self.list(command_buffer)?.tracker.copy("copy_buffer")?;
        self.record(
            command_buffer,
            SoftwareCommand::CopyBuffer {
                source: source.id,
                source_offset,
                destination: destination.id,
                destination_offset,
                size,
            },
        )
    }

    fn copy_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        self.check_textures([&source.texture, &destination.texture])?;
        self.list(command_buffer)?.tracker.copy("copy_texture")?;
        self.record(
            command_buffer,
            SoftwareCommand::CopyTexture {
                source: *source,
                destination: *destination,
                size,
            },
        )
    }

    fn copy_buffer_to_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &Buffer,
        layout: &BufferTextureLayout,
        destination: &TextureCopyLocation,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        self.check_buffers([source])?;
        self.check_textures([&destination.texture])?;
        self.list(command_buffer)?
            .tracker
            .copy("copy_buffer_to_texture")?;
        self.record(
            command_buffer,
            SoftwareCommand::CopyBufferToTexture {
                source: source.id,
                layout: *layout,
                destination: *destination,
                size,
            },
        )
    }

    fn copy_texture_to_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        source: &TextureCopyLocation,
        destination: &Buffer,
        layout: &BufferTextureLayout,
        size: Extent3D,
    ) -> GraphicsResult<()> {
        self.check_textures([&source.texture])?;
        self.check_buffers([destination])?;
        self.list(command_buffer)?
            .tracker
            .copy("copy_texture_to_buffer")?;
        self.record(
            command_buffer,
            SoftwareCommand::CopyTextureToBuffer {
                source: *source,
                destination: destination.id,
                layout: *layout,
                size,
            },
        )
    }

    fn resource_barrier(
        &mut self,
        command_buffer: &CommandBuffer,
        barriers: &[ResourceBarrier],
    ) -> GraphicsResult<()> {
        for barrier in barriers {
            if !self.exists(barrier.resource.resource_ref())? {
                return Err(GraphicsError::InvalidOperation(format!(
                    "barrier on a destroyed {}",
                    barrier.resource.resource_ref().kind()
                )));
            }
        }
        self.list(command_buffer)?.tracker.barrier()?;
        log::trace!(
            "SoftwareDevice: {} barrier(s) validated; nothing to do on an implicit device",
            barriers.len()
        );
        Ok(())
    }

    fn wait_idle(&mut self) -> GraphicsResult<()> {
        self.queue.wait_idle()
    }

    fn create_swap_chain(&mut self, descriptor: &SwapChainDescriptor) -> GraphicsResult<SwapChain> {
        self.ensure_running()?;
        Self::check_format(descriptor.format)?;
        if descriptor.format.is_depth() {
            return Err(GraphicsError::UnsupportedFormat(descriptor.format));
        }
        if descriptor.window.is_some() {
            log::info!("SoftwareDevice: window surface ignored; presenting headless.");
        }
        if self.swap_chain.is_some() {
            self.queue.wait_idle()?;
        }

        let mut memory = lock_memory(&self.memory)?;
        if let Some(mut old) = self.swap_chain.take() {
            old.release(&mut memory);
        }
        let chain = SoftwareSwapChain::new(&mut memory, descriptor)?;
        drop(memory);

        let info = chain.info();
        log::info!(
            "SoftwareDevice: swap chain created, {}x{} {:?}, {} buffers, vsync: {}",
            info.width,
            info.height,
            info.format,
            info.buffer_count,
            chain.vsync()
        );
        self.swap_chain = Some(chain);
        Ok(info)
    }

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> GraphicsResult<SwapChain> {
        if self.swap_chain.is_none() {
            return Err(GraphicsError::invalid_operation(
                "resize_swap_chain called before create_swap_chain",
            ));
        }
        if width == 0 || height == 0 {
            return Err(GraphicsError::ResizeFailed {
                width,
                height,
                reason: "swap chain dimensions must be non-zero".to_string(),
            });
        }
        self.queue.wait_idle()?;

        let mut memory = lock_memory(&self.memory)?;
        let chain = self.swap_chain.as_mut().ok_or_else(|| {
            GraphicsError::invalid_operation("resize_swap_chain called before create_swap_chain")
        })?;
        let info = chain.resize(&mut memory, width, height)?;
        log::info!("SoftwareDevice: swap chain resized to {width}x{height}");
        Ok(info)
    }

    fn get_current_back_buffer(&mut self) -> GraphicsResult<Texture> {
        self.swap_chain
            .as_mut()
            .ok_or_else(|| {
                GraphicsError::invalid_operation(
                    "get_current_back_buffer called before create_swap_chain",
                )
            })?
            .acquire()
    }

    fn present(&mut self) -> GraphicsResult<()> {
        self.queue.poll();
        self.queue.take_failure()?;
        let chain = self.swap_chain.as_mut().ok_or_else(|| {
            GraphicsError::invalid_operation("present called before create_swap_chain")
        })?;
        chain.present()?;
        log::trace!("SoftwareDevice: presented frame {}", chain.frame());
        Ok(())
    }

    fn set_debug_name(&mut self, object: ResourceRef, name: &str) -> GraphicsResult<()> {
        if !self.exists(object)? {
            return Err(GraphicsError::InvalidOperation(format!(
                "cannot name a destroyed {}",
                object.kind()
            )));
        }
        self.debug_names.insert(object, name.to_string());
        Ok(())
    }

    fn begin_debug_group(&mut self, command_buffer: &CommandBuffer, name: &str) -> GraphicsResult<()> {
        let list = self.list(command_buffer)?;
        list.tracker.begin_debug_group()?;
        list.debug_groups.push(name.to_string());
        Ok(())
    }

    fn end_debug_group(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        let list = self.list(command_buffer)?;
        list.tracker.end_debug_group()?;
        list.debug_groups.pop();
        Ok(())
    }
}
