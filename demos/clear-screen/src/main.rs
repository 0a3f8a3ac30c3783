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

// Clear screen demo
// Renders one headless frame with the software backend and reads it back.
// Pass a JSON backend configuration file as the first argument to override
// the defaults.

use anyhow::{anyhow, Context, Result};
use vela_sdk::prelude::*;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 64;

fn load_config() -> Result<BackendConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading backend configuration from '{path}'");
            BackendConfig::from_file(&path).map_err(|e| anyhow!("{path}: {e}"))
        }
        None => Ok(BackendConfig::headless(BackendType::Software, WIDTH, HEIGHT)),
    }
}

fn render_frame(graphics: &mut GraphicsBackend, readback: &Buffer) -> GraphicsResult<()> {
    let cmd = graphics.create_command_buffer()?;
    graphics.set_debug_name(cmd.id, "frame commands");

    let back_buffer = graphics.get_current_back_buffer()?;
    graphics.begin_command_buffer(&cmd)?;
    graphics.begin_debug_group(&cmd, "clear");
    let attachments = [ColorAttachment {
        target: back_buffer,
        resolve_target: None,
        ops: Operations::clear(LinearRgba::RED),
    }];
    graphics.begin_render_pass(
        &cmd,
        &RenderPassDescriptor {
            label: Some("clear"),
            color_attachments: &attachments,
            depth_attachment: None,
        },
    )?;
    graphics.end_render_pass(&cmd)?;
    graphics.end_debug_group(&cmd);

    graphics.resource_barrier(
        &cmd,
        &[ResourceBarrier::texture(
            back_buffer,
            ResourceState::RenderTarget,
            ResourceState::CopySrc,
        )],
    )?;
    graphics.copy_texture_to_buffer(
        &cmd,
        &TextureCopyLocation::base(back_buffer),
        readback,
        &BufferTextureLayout::tightly_packed(0, back_buffer.size, back_buffer.format),
        back_buffer.size,
    )?;
    graphics.resource_barrier(
        &cmd,
        &[ResourceBarrier::texture(
            back_buffer,
            ResourceState::CopySrc,
            ResourceState::Present,
        )],
    )?;
    graphics.end_command_buffer(&cmd)?;
    graphics.submit_command_buffer(&cmd)?;
    graphics.present()?;
    graphics.destroy_command_buffer(&cmd)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let (width, height) = (config.window_width, config.window_height);
    let mut graphics = GraphicsBackend::new(config).context("creating the graphics backend")?;
    log::info!(
        "Rendering on {} ({})",
        graphics.info().device_name,
        graphics.backend_type().name()
    );

    graphics.create_swap_chain(&SwapChainDescriptor::headless(
        width,
        height,
        TextureFormat::Rgba8Unorm,
    ))?;
    let readback = graphics.create_buffer(
        &BufferDescriptor::new(
            u64::from(width) * u64::from(height) * 4,
            BufferUsage::COPY_DST | BufferUsage::MAP_READ,
        )
        .with_label("readback"),
        None,
    )?;

    render_frame(&mut graphics, &readback)?;

    let pixels: Vec<[u8; 4]> = graphics.read_buffer_typed(&readback, 0, 1)?;
    if let Some(pixel) = pixels.first() {
        log::info!("First pixel after the clear: {pixel:?}");
    }

    graphics.destroy_buffer(&readback)?;
    graphics.shutdown()?;
    Ok(())
}
