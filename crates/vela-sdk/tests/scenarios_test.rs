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

use common::{headless_config, init_logging, recording};
use vela_sdk::prelude::*;
use vela_sdk::vela_infra::SoftwareDevice;

fn clear_pass(
    graphics: &mut GraphicsBackend,
    cmd: &CommandBuffer,
    target: Texture,
    color: LinearRgba,
) -> GraphicsResult<()> {
    let attachments = [ColorAttachment {
        target,
        resolve_target: None,
        ops: Operations::clear(color),
    }];
    graphics.begin_render_pass(
        cmd,
        &RenderPassDescriptor {
            label: Some("clear"),
            color_attachments: &attachments,
            depth_attachment: None,
        },
    )?;
    graphics.end_render_pass(cmd)
}

#[test]
fn test_headless_frame_is_cleared_and_presented() {
    // --- 1. ARRANGE ---
    init_logging();
    let config = BackendConfig::headless(BackendType::Software, 64, 64).with_validation(true);
    let mut graphics = GraphicsBackend::new(config).unwrap();
    graphics
        .create_swap_chain(&SwapChainDescriptor::headless(64, 64, TextureFormat::Rgba8Unorm))
        .unwrap();
    let readback = graphics
        .create_buffer(
            &BufferDescriptor::new(64 * 64 * 4, BufferUsage::COPY_DST | BufferUsage::MAP_READ)
                .with_label("readback"),
            None,
        )
        .unwrap();
    let cmd = graphics.create_command_buffer().unwrap();

    // --- 2. ACT ---
    let back_buffer = graphics.get_current_back_buffer().unwrap();
    graphics.begin_command_buffer(&cmd).unwrap();
    clear_pass(&mut graphics, &cmd, back_buffer, LinearRgba::new(1.0, 0.0, 0.0, 1.0)).unwrap();
    graphics
        .resource_barrier(
            &cmd,
            &[ResourceBarrier::texture(
                back_buffer,
                ResourceState::RenderTarget,
                ResourceState::CopySrc,
            )],
        )
        .unwrap();
    graphics
        .copy_texture_to_buffer(
            &cmd,
            &TextureCopyLocation::base(back_buffer),
            &readback,
            &BufferTextureLayout::tightly_packed(0, back_buffer.size, back_buffer.format),
            back_buffer.size,
        )
        .unwrap();
    graphics
        .resource_barrier(
            &cmd,
            &[ResourceBarrier::texture(
                back_buffer,
                ResourceState::CopySrc,
                ResourceState::Present,
            )],
        )
        .unwrap();
    graphics.end_command_buffer(&cmd).unwrap();
    graphics.submit_command_buffer(&cmd).unwrap();
    graphics.present().unwrap();
    let pixels = graphics.read_buffer(&readback, 0, readback.size).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(back_buffer.size, Extent3D::new_2d(64, 64));
    assert_eq!(graphics.backend_type(), BackendType::Software);
    assert_eq!(&pixels[0..4], &[255, 0, 0, 255]);
    assert_eq!(&pixels[pixels.len() - 4..], &[255, 0, 0, 255]);
}

#[test]
fn test_offscreen_texture_is_cleared_and_read_back() {
    // --- 1. ARRANGE ---
    init_logging();
    let config = BackendConfig::headless(BackendType::Software, 64, 64).with_validation(true);
    let mut graphics = GraphicsBackend::new(config).unwrap();
    let texture = graphics
        .create_texture(
            &TextureDescriptor::new_2d(
                64,
                64,
                TextureFormat::Rgba8Unorm,
                TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC,
            ),
            None,
        )
        .unwrap();
    let readback = graphics
        .create_buffer(
            &BufferDescriptor::new(64 * 64 * 4, BufferUsage::COPY_DST | BufferUsage::MAP_READ),
            None,
        )
        .unwrap();
    let cmd = graphics.create_command_buffer().unwrap();

    // --- 2. ACT ---
    graphics.begin_command_buffer(&cmd).unwrap();
    graphics
        .resource_barrier(
            &cmd,
            &[ResourceBarrier::texture(
                texture,
                ResourceState::Undefined,
                ResourceState::RenderTarget,
            )],
        )
        .unwrap();
    clear_pass(&mut graphics, &cmd, texture, LinearRgba::new(1.0, 0.0, 0.0, 1.0)).unwrap();
    graphics
        .resource_barrier(
            &cmd,
            &[ResourceBarrier::texture(
                texture,
                ResourceState::RenderTarget,
                ResourceState::CopySrc,
            )],
        )
        .unwrap();
    graphics
        .copy_texture_to_buffer(
            &cmd,
            &TextureCopyLocation::base(texture),
            &readback,
            &BufferTextureLayout::tightly_packed(0, texture.size, texture.format),
            texture.size,
        )
        .unwrap();
    graphics.end_command_buffer(&cmd).unwrap();
    graphics.submit_command_buffer(&cmd).unwrap();
    let pixels = graphics.read_buffer(&readback, 0, readback.size).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(pixels.len(), 64 * 64 * 4);
    assert!(pixels.chunks_exact(4).all(|texel| texel == [255, 0, 0, 255]));
}

#[test]
fn test_failed_resize_keeps_the_previous_swap_chain() {
    // --- 1. ARRANGE ---
    init_logging();
    let config = headless_config();
    let device = SoftwareDevice::with_memory_budget(&config, 64 * 1024);
    let mut graphics = GraphicsBackend::with_backend(config, Box::new(device)).unwrap();
    graphics
        .create_swap_chain(&SwapChainDescriptor::headless(32, 32, TextureFormat::Rgba8Unorm))
        .unwrap();

    // --- 2. ACT ---
    let result = graphics.resize_swap_chain(4096, 4096);
    let back_buffer = graphics.get_current_back_buffer();

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(GraphicsError::ResizeFailed {
            width: 4096,
            height: 4096,
            ..
        })
    ));
    assert_eq!(graphics.swap_chain().map(|s| (s.width, s.height)), Some((32, 32)));
    assert_eq!(back_buffer.unwrap().size, Extent3D::new_2d(32, 32));
}

#[test]
fn test_missing_vulkan_driver_is_reported() {
    // --- 1. ARRANGE ---
    init_logging();
    let config = BackendConfig::headless(BackendType::Vulkan, 64, 64);

    // --- 2. ACT ---
    let result = GraphicsBackend::new(config);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(GraphicsError::BackendNotAvailable(BackendType::Vulkan))
    ));
}

#[test]
fn test_auto_selection_always_finds_a_backend() {
    // --- 1. ARRANGE ---
    init_logging();
    let config = BackendConfig::headless(BackendType::Auto, 32, 32);

    // --- 2. ACT ---
    let graphics = GraphicsBackend::new(config).unwrap();

    // --- 3. ASSERT ---
    assert_ne!(graphics.backend_type(), BackendType::Auto);
}

#[test]
fn test_zero_resize_is_refused_without_touching_the_device() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    graphics
        .create_swap_chain(&SwapChainDescriptor::headless(64, 64, TextureFormat::Bgra8Unorm))
        .unwrap();

    // --- 2. ACT ---
    let zero = graphics.resize_swap_chain(0, 0);
    let resized = graphics.resize_swap_chain(128, 32).unwrap();
    let back_buffer = graphics.get_current_back_buffer().unwrap();

    // --- 3. ASSERT ---
    assert!(matches!(
        zero,
        Err(GraphicsError::ResizeFailed {
            width: 0,
            height: 0,
            ..
        })
    ));
    assert_eq!(log.count("resize_swap_chain"), 1);
    assert_eq!((resized.width, resized.height), (128, 32));
    assert_eq!(back_buffer.size, Extent3D::new_2d(128, 32));
    assert_eq!(graphics.swap_chain().map(|s| s.width), Some(128));
}

#[test]
fn test_frames_acquire_once_and_present_once() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());
    let early_present = graphics.present();
    graphics
        .create_swap_chain(&SwapChainDescriptor::headless(16, 16, TextureFormat::Rgba8Unorm))
        .unwrap();
    let cmd = graphics.create_command_buffer().unwrap();

    // --- 2. ACT ---
    let unacquired = graphics.present();
    let back_buffer = graphics.get_current_back_buffer().unwrap();
    let second_acquire = graphics.get_current_back_buffer();
    graphics.begin_command_buffer(&cmd).unwrap();
    clear_pass(&mut graphics, &cmd, back_buffer, LinearRgba::BLUE).unwrap();
    graphics.end_command_buffer(&cmd).unwrap();
    graphics.submit_command_buffer(&cmd).unwrap();
    graphics.present().unwrap();

    // --- 3. ASSERT ---
    assert!(matches!(early_present, Err(GraphicsError::InvalidOperation(_))));
    assert!(matches!(unacquired, Err(GraphicsError::PresentFailed(_))));
    assert!(matches!(second_acquire, Err(GraphicsError::InvalidOperation(_))));
    assert_eq!(log.count("get_current_back_buffer"), 1);
    assert_eq!(log.count("present"), 1);
}

#[test]
fn test_depth_swap_chains_are_unsupported() {
    // --- 1. ARRANGE ---
    let (mut graphics, log) = recording(&headless_config());

    // --- 2. ACT ---
    let result = graphics.create_swap_chain(&SwapChainDescriptor::headless(
        16,
        16,
        TextureFormat::Depth32Float,
    ));

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(GraphicsError::UnsupportedFormat(TextureFormat::Depth32Float))
    ));
    assert_eq!(log.count("create_swap_chain"), 0);
}
