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

mod common;

use common::{headless_config, recording, RecordingBackend};
use std::borrow::Cow;
use vela_sdk::prelude::*;

fn shader<'a>(stage: ShaderStage, code: &'a str) -> ShaderDescriptor<'a> {
    ShaderDescriptor {
        label: None,
        source: ShaderSource::Wgsl(Cow::Borrowed(code)),
        stage,
        entry_point: "main",
    }
}

fn offscreen_pass(
    graphics: &mut GraphicsBackend,
    cmd: &CommandBuffer,
    target: Texture,
) -> GraphicsResult<()> {
    let attachments = [ColorAttachment {
        target,
        resolve_target: None,
        ops: Operations::clear(LinearRgba::BLACK),
    }];
    graphics.begin_render_pass(
        cmd,
        &RenderPassDescriptor {
            label: None,
            color_attachments: &attachments,
            depth_attachment: None,
        },
    )
}

#[test]
fn test_invalid_config_is_rejected_before_a_backend_exists() {
    // --- 1. ARRANGE ---
    let config = BackendConfig {
        sample_count: 3,
        ..headless_config()
    };

    // --- 2. ACT ---
    let result = GraphicsBackend::new(config);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(GraphicsError::Validation(ValidationError::InvalidSampleCount(3)))
    ));
}

#[test]
fn test_invalid_descriptors_never_reach_the_backend() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let zero_width = TextureDescriptor::new_2d(0, 16, TextureFormat::Rgba8Unorm, TextureUsage::COPY_DST);
    let no_usage = BufferDescriptor::new(64, BufferUsage::empty());

    // --- 2. ACT ---
    let texture = graphics.create_texture(&zero_width, None);
    let buffer = graphics.create_buffer(&no_usage, None);
    let short_data = graphics.create_buffer(
        &BufferDescriptor::new(64, BufferUsage::VERTEX),
        Some(&[0u8; 16]),
    );

    // --- 3. ASSERT ---
    assert!(matches!(
        texture,
        Err(GraphicsError::Validation(ValidationError::ZeroSize { .. }))
    ));
    assert!(matches!(buffer, Err(GraphicsError::Validation(_))));
    assert!(matches!(
        short_data,
        Err(GraphicsError::Validation(ValidationError::DataSizeMismatch { .. }))
    ));
    assert_eq!(log.count("create_texture"), 0);
    assert_eq!(log.count("create_buffer"), 0);
}

#[test]
fn test_handles_carry_their_descriptor() {
    // --- 1. ARRANGE ---
    let (mut graphics, _log) = recording(&headless_config());
    let descriptor = TextureDescriptor {
        mip_level_count: 3,
        ..TextureDescriptor::new_2d(
            32,
            16,
            TextureFormat::Rgba16Float,
            TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        )
    };

    // --- 2. ACT ---
    let texture = graphics.create_texture(&descriptor, None).unwrap();
    let buffer = graphics
        .create_buffer(
            &BufferDescriptor::new(256, BufferUsage::UNIFORM | BufferUsage::COPY_DST),
            None,
        )
        .unwrap();
    let target = graphics
        .create_render_target(&RenderTargetDescriptor {
            depth_format: Some(TextureFormat::Depth32Float),
            ..RenderTargetDescriptor::default()
        })
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(texture.size, descriptor.size);
    assert_eq!(texture.format, descriptor.format);
    assert_eq!(texture.usage, descriptor.usage);
    assert_eq!(texture.mip_level_count, 3);
    assert_eq!(texture.sample_count, SampleCount::X1);
    assert_eq!(buffer.size, 256);
    assert_eq!(buffer.usage, BufferUsage::UNIFORM | BufferUsage::COPY_DST);
    assert_eq!(target.color_format(), TextureFormat::Rgba8Unorm);
    assert_eq!(target.depth_format(), Some(TextureFormat::Depth32Float));
}

#[test]
fn test_destroyed_handles_are_rejected() {
    // --- 1. ARRANGE ---
    let (mut graphics, _log) = recording(&headless_config());
    let buffer = graphics
        .create_buffer(&BufferDescriptor::new(16, BufferUsage::COPY_DST), None)
        .unwrap();
    graphics.destroy_buffer(&buffer).unwrap();

    // --- 2. ACT ---
    let write = graphics.update_buffer(&buffer, 0, &[1, 2, 3, 4]);
    let destroy_again = graphics.destroy_buffer(&buffer);

    // --- 3. ASSERT ---
    assert!(matches!(write, Err(GraphicsError::InvalidOperation(_))));
    assert!(matches!(destroy_again, Err(GraphicsError::InvalidOperation(_))));
}

#[test]
fn test_recording_follows_the_command_buffer_lifecycle() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let cmd = graphics.create_command_buffer().unwrap();

    // --- 2. ACT & 3. ASSERT ---
    assert!(matches!(
        graphics.end_command_buffer(&cmd),
        Err(GraphicsError::InvalidOperation(_))
    ));
    assert!(matches!(
        graphics.submit_command_buffer(&cmd),
        Err(GraphicsError::InvalidOperation(_))
    ));
    assert_eq!(log.count("end_command_buffer"), 0);
    assert_eq!(log.count("submit_command_buffer"), 0);

    graphics.begin_command_buffer(&cmd).unwrap();
    assert!(matches!(
        graphics.draw(&cmd, 0..3, 0..1),
        Err(GraphicsError::InvalidOperation(_))
    ));
    assert_eq!(log.count("draw"), 0);
    graphics.end_command_buffer(&cmd).unwrap();
    graphics.submit_command_buffer(&cmd).unwrap();
    assert_eq!(
        graphics.command_buffer_state(&cmd).unwrap().state(),
        CommandBufferState::Submitted
    );

    // The software device supports resetting submitted buffers.
    graphics.wait_idle().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();
    assert_eq!(
        graphics.command_buffer_state(&cmd).unwrap().state(),
        CommandBufferState::Recording
    );
}

#[test]
fn test_submitted_buffers_stay_closed_without_reset_support() {
    // --- 1. ARRANGE ---
    common::init_logging();
    let config = headless_config();
    let (backend, log) = RecordingBackend::new(&config);
    let backend = backend.with_features(BackendFeatures::COMPUTE);
    let mut graphics = GraphicsBackend::with_backend(config, Box::new(backend)).unwrap();
    let cmd = graphics.create_command_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();
    graphics.end_command_buffer(&cmd).unwrap();
    graphics.submit_command_buffer(&cmd).unwrap();

    // --- 2. ACT ---
    let result = graphics.begin_command_buffer(&cmd);

    // --- 3. ASSERT ---
    assert!(matches!(result, Err(GraphicsError::InvalidOperation(_))));
    assert_eq!(log.count("begin_command_buffer"), 1);
}

#[test]
fn test_pipeline_draw_inside_a_pass() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let vertex = graphics
        .create_shader(&shader(ShaderStage::Vertex, "fn main() {}"))
        .unwrap();
    let fragment = graphics
        .create_shader(&shader(ShaderStage::Fragment, "fn main() {}"))
        .unwrap();
    let pipeline = graphics
        .create_pipeline(&PipelineDescriptor::new(
            vertex,
            Some(fragment),
            ColorTargetDescriptor::new(TextureFormat::Rgba8Unorm),
        ))
        .unwrap();
    let target = graphics
        .create_texture(
            &TextureDescriptor::new_2d(8, 8, TextureFormat::Rgba8Unorm, RenderTargetDescriptor::COLOR_USAGE),
            None,
        )
        .unwrap();
    let cmd = graphics.create_command_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();

    // --- 2. ACT ---
    let early_bind = graphics.bind_pipeline(&cmd, &pipeline);
    offscreen_pass(&mut graphics, &cmd, target).unwrap();
    graphics.set_viewport(&cmd, &Viewport::new(8.0, 8.0)).unwrap();
    let unbound_draw = graphics.draw(&cmd, 0..3, 0..1);
    graphics.bind_pipeline(&cmd, &pipeline).unwrap();
    graphics.draw(&cmd, 0..3, 0..1).unwrap();
    let indexed = graphics.draw_indexed(&cmd, 0..3, 0, 0..1);
    graphics.end_render_pass(&cmd).unwrap();
    graphics.end_command_buffer(&cmd).unwrap();
    graphics.submit_command_buffer(&cmd).unwrap();
    graphics.wait_idle().unwrap();

    // --- 3. ASSERT ---
    assert!(matches!(early_bind, Err(GraphicsError::InvalidOperation(_))));
    assert!(matches!(unbound_draw, Err(GraphicsError::InvalidOperation(_))));
    assert!(matches!(indexed, Err(GraphicsError::InvalidOperation(_))));
    assert_eq!(log.count("bind_pipeline"), 1);
    assert_eq!(log.count("draw"), 1);
    assert_eq!(log.count("draw_indexed"), 0);
}

#[test]
fn test_pipelines_reject_shaders_of_the_wrong_stage() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let fragment = graphics
        .create_shader(&shader(ShaderStage::Fragment, "fn main() {}"))
        .unwrap();

    // --- 2. ACT ---
    let result = graphics.create_pipeline(&PipelineDescriptor::new(
        fragment,
        None,
        ColorTargetDescriptor::new(TextureFormat::Rgba8Unorm),
    ));
    let empty = graphics.create_shader(&shader(ShaderStage::Vertex, ""));

    // --- 3. ASSERT ---
    assert!(matches!(result, Err(GraphicsError::Validation(_))));
    assert!(matches!(
        empty,
        Err(GraphicsError::Validation(ValidationError::Empty { .. }))
    ));
    assert_eq!(log.count("create_pipeline"), 0);
    assert_eq!(log.count("create_shader"), 1);
}

#[test]
fn test_adjacent_barriers_are_merged_before_the_backend() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let texture = graphics
        .create_texture(
            &TextureDescriptor::new_2d(
                4,
                4,
                TextureFormat::Rgba8Unorm,
                TextureUsage::COPY_DST | TextureUsage::TEXTURE_BINDING,
            ),
            None,
        )
        .unwrap();
    let cmd = graphics.create_command_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();

    // --- 2. ACT ---
    let empty = graphics.resource_barrier(&cmd, &[]);
    graphics
        .resource_barrier(
            &cmd,
            &[
                ResourceBarrier::texture(texture, ResourceState::Undefined, ResourceState::CopyDst),
                ResourceBarrier::texture(texture, ResourceState::CopyDst, ResourceState::ShaderResource),
            ],
        )
        .unwrap();

    // --- 3. ASSERT ---
    assert!(matches!(
        empty,
        Err(GraphicsError::Validation(ValidationError::Empty { .. }))
    ));
    assert_eq!(log.count("resource_barrier"), 1);
}

#[test]
fn test_reordered_barriers_fail_under_validation() {
    // --- 1. ARRANGE ---
    common::init_logging();
    let config = headless_config().with_validation(true);
    let mut graphics = GraphicsBackend::new(config).unwrap();
    let texture = graphics
        .create_texture(
            &TextureDescriptor::new_2d(
                4,
                4,
                TextureFormat::Rgba8Unorm,
                TextureUsage::COPY_DST | TextureUsage::TEXTURE_BINDING,
            ),
            None,
        )
        .unwrap();
    let cmd = graphics.create_command_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();

    // --- 2. ACT ---
    let skipped = graphics.resource_barrier(
        &cmd,
        &[ResourceBarrier::texture(
            texture,
            ResourceState::CopyDst,
            ResourceState::ShaderResource,
        )],
    );
    let in_order = graphics.resource_barrier(
        &cmd,
        &[ResourceBarrier::texture(
            texture,
            ResourceState::Undefined,
            ResourceState::CopyDst,
        )],
    );

    // --- 3. ASSERT ---
    assert!(matches!(skipped, Err(GraphicsError::InvalidOperation(_))));
    assert!(in_order.is_ok());
}

fn copy_target(graphics: &mut GraphicsBackend) -> Texture {
    graphics
        .create_texture(
            &TextureDescriptor::new_2d(
                4,
                4,
                TextureFormat::Rgba8Unorm,
                TextureUsage::COPY_DST | TextureUsage::TEXTURE_BINDING,
            ),
            None,
        )
        .unwrap()
}

#[test]
fn test_round_trip_barriers_are_checked_under_validation() {
    // --- 1. ARRANGE ---
    common::init_logging();
    let config = headless_config().with_validation(true);
    let mut graphics = GraphicsBackend::new(config).unwrap();
    let texture = copy_target(&mut graphics);
    let cmd = graphics.create_command_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();
    graphics
        .resource_barrier(
            &cmd,
            &[ResourceBarrier::texture(texture, ResourceState::Undefined, ResourceState::CopyDst)],
        )
        .unwrap();
    let round_trip = [
        ResourceBarrier::texture(texture, ResourceState::CopyDst, ResourceState::ShaderResource),
        ResourceBarrier::texture(texture, ResourceState::ShaderResource, ResourceState::CopyDst),
    ];

    // --- 2. ACT ---
    let live = graphics.resource_barrier(&cmd, &round_trip);
    graphics.destroy_texture(&texture).unwrap();
    let destroyed = graphics.resource_barrier(&cmd, &round_trip);

    // --- 3. ASSERT ---
    assert!(live.is_ok());
    assert!(matches!(destroyed, Err(GraphicsError::InvalidOperation(_))));
}

#[test]
fn test_round_trip_barriers_are_dropped_without_validation() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let texture = copy_target(&mut graphics);
    let cmd = graphics.create_command_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();

    // --- 2. ACT ---
    let result = graphics.resource_barrier(
        &cmd,
        &[
            ResourceBarrier::texture(texture, ResourceState::CopyDst, ResourceState::ShaderResource),
            ResourceBarrier::texture(texture, ResourceState::ShaderResource, ResourceState::CopyDst),
        ],
    );

    // --- 3. ASSERT ---
    assert!(result.is_ok());
    assert_eq!(log.count("resource_barrier"), 0);
}

#[test]
fn test_typed_buffers_round_trip_through_the_device() {
    // --- 1. ARRANGE ---
    let (mut graphics, _log) = recording(&headless_config());
    let values = [1.5f32, -2.0, 3.25, 0.0];
    let buffer = graphics
        .create_buffer_with_data(
            Some("values"),
            BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            &values,
        )
        .unwrap();

    // --- 2. ACT ---
    graphics.update_buffer_typed(&buffer, 4, &[9.0f32]).unwrap();
    let read: Vec<f32> = graphics.read_buffer_typed(&buffer, 0, 4).unwrap();

    // --- 3. ASSERT ---
    approx::assert_relative_eq!(read[0], 1.5);
    approx::assert_relative_eq!(read[1], 9.0);
    approx::assert_relative_eq!(read[2], 3.25);
    assert_eq!(buffer.size, 16);
}

#[test]
fn test_reads_require_map_read() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let buffer = graphics
        .create_buffer(&BufferDescriptor::new(16, BufferUsage::COPY_DST), None)
        .unwrap();

    // --- 2. ACT ---
    let result = graphics.read_buffer(&buffer, 0, 16);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(GraphicsError::Validation(ValidationError::MissingUsage { .. }))
    ));
    assert_eq!(log.count("read_buffer"), 0);
}

#[test]
fn test_debug_failures_are_swallowed() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let cmd = graphics.create_command_buffer().unwrap();

    // --- 2. ACT ---
    // Not recording yet, so the group is refused and only logged.
    graphics.begin_debug_group(&cmd, "frame");
    graphics.begin_command_buffer(&cmd).unwrap();
    graphics.end_debug_group(&cmd);
    graphics.begin_debug_group(&cmd, "frame");
    graphics.set_debug_name(cmd.id, "main commands");

    // --- 3. ASSERT ---
    assert_eq!(log.count("begin_debug_group"), 1);
    assert_eq!(log.count("end_debug_group"), 0);
    assert_eq!(graphics.command_buffer_state(&cmd).unwrap().debug_group_depth(), 1);
}

#[test]
fn test_unclosed_debug_groups_do_not_fail_end() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let cmd = graphics.create_command_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();
    graphics.begin_debug_group(&cmd, "shadows");

    // --- 2. ACT ---
    let ended = graphics.end_command_buffer(&cmd);

    // --- 3. ASSERT ---
    assert!(ended.is_ok());
    assert_eq!(log.count("end_command_buffer"), 1);
    assert_eq!(
        graphics.command_buffer_state(&cmd).unwrap().state(),
        CommandBufferState::Executable
    );
    assert!(graphics.submit_command_buffer(&cmd).is_ok());
}

#[test]
fn test_shutdown_is_forwarded_once() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());

    // --- 2. ACT ---
    let first = graphics.shutdown();
    let second = graphics.shutdown();
    let after = graphics.create_command_buffer();
    drop(graphics);

    // --- 3. ASSERT ---
    assert!(first.is_ok());
    assert!(matches!(second, Err(GraphicsError::NotInitialized)));
    assert!(matches!(after, Err(GraphicsError::NotInitialized)));
    assert_eq!(log.count("shutdown"), 1);
}

#[test]
fn test_dropping_shuts_the_backend_down() {
    // --- 1. ARRANGE ---
    let (graphics, log) = recording(&headless_config());

    // --- 2. ACT ---
    drop(graphics);

    // --- 3. ASSERT ---
    assert_eq!(log.calls(), vec!["shutdown"]);
}

#[test]
fn test_unsupported_ray_tracing_fails_initialization() {
    // --- 1. ARRANGE ---
    common::init_logging();
    let config = BackendConfig {
        enable_ray_tracing: true,
        ..headless_config()
    };
    let (backend, log) = RecordingBackend::new(&config);

    // --- 2. ACT ---
    let result = GraphicsBackend::with_backend(config, Box::new(backend));

    // --- 3. ASSERT ---
    assert!(matches!(result, Err(GraphicsError::UnsupportedOperation(_))));
    assert_eq!(log.count("shutdown"), 1);
}
