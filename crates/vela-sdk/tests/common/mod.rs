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

//! A backend that records which calls reach it, for checking what the facade
//! lets through.

#![allow(dead_code)]

use std::ops::Range;
use std::sync::{Arc, Mutex};
use vela_sdk::prelude::*;
use vela_sdk::vela_core::renderer::RenderBackend;
use vela_sdk::vela_infra::SoftwareDevice;

/// The calls a [`RecordingBackend`] received, in order.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| **call == name).count()
    }

    fn push(&self, name: &'static str) {
        self.0.lock().unwrap().push(name);
    }
}

/// Forwards to a [`SoftwareDevice`] and logs every call.
#[derive(Debug)]
pub struct RecordingBackend {
    inner: SoftwareDevice,
    info: BackendInfo,
    log: CallLog,
}

impl RecordingBackend {
    pub fn new(config: &BackendConfig) -> (Self, CallLog) {
        let inner = SoftwareDevice::new(config);
        let info = inner.info().clone();
        let log = CallLog::default();
        (
            Self {
                inner,
                info,
                log: log.clone(),
            },
            log,
        )
    }

    /// Advertises `features` instead of the software device's.
    pub fn with_features(mut self, features: BackendFeatures) -> Self {
        self.info.features = features;
        self
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn recording(config: &BackendConfig) -> (GraphicsBackend, CallLog) {
    init_logging();
    let (backend, log) = RecordingBackend::new(config);
    let graphics = GraphicsBackend::with_backend(config.clone(), Box::new(backend)).unwrap();
    (graphics, log)
}

pub fn headless_config() -> BackendConfig {
    BackendConfig::headless(BackendType::Software, 64, 64).with_validation(false)
}

impl RenderBackend for RecordingBackend {
    fn info(&self) -> &BackendInfo {
        &self.info
    }

    fn shutdown(&mut self) -> GraphicsResult<()> {
        self.log.push("shutdown");
        self.inner.shutdown()
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Texture> {
        self.log.push("create_texture");
        self.inner.create_texture(descriptor, initial_data)
    }

    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Buffer> {
        self.log.push("create_buffer");
        self.inner.create_buffer(descriptor, initial_data)
    }

    fn create_shader(&mut self, descriptor: &ShaderDescriptor<'_>) -> GraphicsResult<Shader> {
        self.log.push("create_shader");
        self.inner.create_shader(descriptor)
    }

    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor<'_>) -> GraphicsResult<Pipeline> {
        self.log.push("create_pipeline");
        self.inner.create_pipeline(descriptor)
    }

    fn create_compute_pipeline(
        &mut self,
        descriptor: &ComputePipelineDescriptor<'_>,
    ) -> GraphicsResult<Pipeline> {
        self.log.push("create_compute_pipeline");
        self.inner.create_compute_pipeline(descriptor)
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor<'_>,
    ) -> GraphicsResult<RenderTarget> {
        self.log.push("create_render_target");
        self.inner.create_render_target(descriptor)
    }

    fn create_sampler(&mut self, descriptor: &SamplerDescriptor<'_>) -> GraphicsResult<Sampler> {
        self.log.push("create_sampler");
        self.inner.create_sampler(descriptor)
    }

    fn update_buffer(&mut self, buffer: &Buffer, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        self.log.push("update_buffer");
        self.inner.update_buffer(buffer, offset, data)
    }

    fn update_texture(
        &mut self,
        texture: &Texture,
        region: &TextureRegion,
        data: &[u8],
    ) -> GraphicsResult<()> {
        self.log.push("update_texture");
        self.inner.update_texture(texture, region, data)
    }

    fn read_buffer(&mut self, buffer: &Buffer, offset: u64, size: u64) -> GraphicsResult<Vec<u8>> {
        self.log.push("read_buffer");
        self.inner.read_buffer(buffer, offset, size)
    }

    fn destroy_texture(&mut self, texture: &Texture) -> GraphicsResult<()> {
        self.log.push("destroy_texture");
        self.inner.destroy_texture(texture)
    }

    fn destroy_buffer(&mut self, buffer: &Buffer) -> GraphicsResult<()> {
        self.log.push("destroy_buffer");
        self.inner.destroy_buffer(buffer)
    }

    fn destroy_shader(&mut self, shader: &Shader) -> GraphicsResult<()> {
        self.log.push("destroy_shader");
        self.inner.destroy_shader(shader)
    }

    fn destroy_pipeline(&mut self, pipeline: &Pipeline) -> GraphicsResult<()> {
        self.log.push("destroy_pipeline");
        self.inner.destroy_pipeline(pipeline)
    }

    fn destroy_render_target(&mut self, target: &RenderTarget) -> GraphicsResult<()> {
        self.log.push("destroy_render_target");
        self.inner.destroy_render_target(target)
    }

    fn destroy_sampler(&mut self, sampler: &Sampler) -> GraphicsResult<()> {
        self.log.push("destroy_sampler");
        self.inner.destroy_sampler(sampler)
    }

    fn destroy_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.log.push("destroy_command_buffer");
        self.inner.destroy_command_buffer(command_buffer)
    }

    fn create_command_buffer(&mut self) -> GraphicsResult<CommandBuffer> {
        self.log.push("create_command_buffer");
        self.inner.create_command_buffer()
    }

    fn begin_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.log.push("begin_command_buffer");
        self.inner.begin_command_buffer(command_buffer)
    }

    fn end_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.log.push("end_command_buffer");
        self.inner.end_command_buffer(command_buffer)
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.log.push("submit_command_buffer");
        self.inner.submit_command_buffer(command_buffer)
    }

    fn begin_render_pass(
        &mut self,
        command_buffer: &CommandBuffer,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> GraphicsResult<()> {
        self.log.push("begin_render_pass");
        self.inner.begin_render_pass(command_buffer, descriptor)
    }

    fn end_render_pass(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.log.push("end_render_pass");
        self.inner.end_render_pass(command_buffer)
    }

    fn set_viewport(&mut self, command_buffer: &CommandBuffer, viewport: &Viewport) -> GraphicsResult<()> {
        self.log.push("set_viewport");
        self.inner.set_viewport(command_buffer, viewport)
    }

    fn set_scissor(&mut self, command_buffer: &CommandBuffer, rect: &ScissorRect) -> GraphicsResult<()> {
        self.log.push("set_scissor");
        self.inner.set_scissor(command_buffer, rect)
    }

    fn bind_pipeline(&mut self, command_buffer: &CommandBuffer, pipeline: &Pipeline) -> GraphicsResult<()> {
        self.log.push("bind_pipeline");
        self.inner.bind_pipeline(command_buffer, pipeline)
    }

    fn bind_vertex_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()> {
        self.log.push("bind_vertex_buffer");
        self.inner.bind_vertex_buffer(command_buffer, slot, buffer, offset)
    }

    fn bind_index_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        buffer: &Buffer,
        offset: u64,
        format: IndexFormat,
    ) -> GraphicsResult<()> {
        self.log.push("bind_index_buffer");
        self.inner.bind_index_buffer(command_buffer, buffer, offset, format)
    }

    fn bind_uniform_buffer(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        buffer: &Buffer,
        offset: u64,
    ) -> GraphicsResult<()> {
        self.log.push("bind_uniform_buffer");
        self.inner.bind_uniform_buffer(command_buffer, slot, buffer, offset)
    }

    fn bind_texture(
        &mut self,
        command_buffer: &CommandBuffer,
        slot: u32,
        texture: &Texture,
        sampler: Option<&Sampler>,
    ) -> GraphicsResult<()> {
        self.log.push("bind_texture");
        self.inner.bind_texture(command_buffer, slot, texture, sampler)
    }

    fn draw(
        &mut self,
        command_buffer: &CommandBuffer,
        vertices: Range<u32>,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        self.log.push("draw");
        self.inner.draw(command_buffer, vertices, instances)
    }

    fn draw_indexed(
        &mut self,
        command_buffer: &CommandBuffer,
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    ) -> GraphicsResult<()> {
        self.log.push("draw_indexed");
        self.inner
            .draw_indexed(command_buffer, indices, base_vertex, instances)
    }

    fn dispatch(&mut self, command_buffer: &CommandBuffer, x: u32, y: u32, z: u32) -> GraphicsResult<()> {
        self.log.push("dispatch");
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
        self.log.push("copy_buffer");
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
        self.log.push("copy_texture");
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
        self.log.push("copy_buffer_to_texture");
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
        self.log.push("copy_texture_to_buffer");
        self.inner
            .copy_texture_to_buffer(command_buffer, source, destination, layout, size)
    }

    fn resource_barrier(
        &mut self,
        command_buffer: &CommandBuffer,
        barriers: &[ResourceBarrier],
    ) -> GraphicsResult<()> {
        self.log.push("resource_barrier");
        self.inner.resource_barrier(command_buffer, barriers)
    }

    fn wait_idle(&mut self) -> GraphicsResult<()> {
        self.log.push("wait_idle");
        self.inner.wait_idle()
    }

    fn create_swap_chain(&mut self, descriptor: &SwapChainDescriptor) -> GraphicsResult<SwapChain> {
        self.log.push("create_swap_chain");
        self.inner.create_swap_chain(descriptor)
    }

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> GraphicsResult<SwapChain> {
        self.log.push("resize_swap_chain");
        self.inner.resize_swap_chain(width, height)
    }

    fn get_current_back_buffer(&mut self) -> GraphicsResult<Texture> {
        self.log.push("get_current_back_buffer");
        self.inner.get_current_back_buffer()
    }

    fn present(&mut self) -> GraphicsResult<()> {
        self.log.push("present");
        self.inner.present()
    }

    fn set_debug_name(&mut self, object: ResourceRef, name: &str) -> GraphicsResult<()> {
        self.log.push("set_debug_name");
        self.inner.set_debug_name(object, name)
    }

    fn begin_debug_group(&mut self, command_buffer: &CommandBuffer, name: &str) -> GraphicsResult<()> {
        self.log.push("begin_debug_group");
        self.inner.begin_debug_group(command_buffer, name)
    }

    fn end_debug_group(&mut self, command_buffer: &CommandBuffer) -> GraphicsResult<()> {
        self.log.push("end_debug_group");
        self.inner.end_debug_group(command_buffer)
    }
}
