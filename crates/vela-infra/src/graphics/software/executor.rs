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

//! Executes submitted command lists against CPU memory.

use super::command::SoftwareCommand;
use super::memory::SoftwareMemory;
use std::sync::atomic::{AtomicU64, Ordering};
use vela_core::math::LinearRgba;
use vela_core::renderer::{BufferTextureLayout, GraphicsError, GraphicsResult, TextureFormat};

/// Counters updated by the queue worker.
#[derive(Debug, Default)]
pub(crate) struct QueueCounters {
    submissions: AtomicU64,
    draw_calls: AtomicU64,
    vertices: AtomicU64,
    dispatches: AtomicU64,
    clears: AtomicU64,
    copies: AtomicU64,
}

impl QueueCounters {
    pub(crate) fn snapshot(&self) -> SoftwareStats {
        SoftwareStats {
            submissions: self.submissions.load(Ordering::Relaxed),
            draw_calls: self.draw_calls.load(Ordering::Relaxed),
            vertices: self.vertices.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            copies: self.copies.load(Ordering::Relaxed),
        }
    }
}

/// What the software device has executed so far.
///
/// Draws and dispatches are only counted; nothing is rasterized or shaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftwareStats {
    /// Command buffers executed.
    pub submissions: u64,
    /// Draw commands executed.
    pub draw_calls: u64,
    /// Vertices (or indices) times instances over all draws.
    pub vertices: u64,
    /// Dispatch commands executed.
    pub dispatches: u64,
    /// Attachment clears executed.
    pub clears: u64,
    /// Copies and resolves executed.
    pub copies: u64,
}

/// Runs one command list to completion. Stops at the first failing command.
pub(crate) fn execute(
    commands: &[SoftwareCommand],
    memory: &mut SoftwareMemory,
    counters: &QueueCounters,
) -> GraphicsResult<()> {
    counters.submissions.fetch_add(1, Ordering::Relaxed);
    for command in commands {
        match command {
            SoftwareCommand::ClearColor { texture, color } => {
                let format = memory.texture(*texture)?.texture.format;
                let texel = encode_color(format, *color).ok_or_else(|| {
                    GraphicsError::InvalidOperation(format!(
                        "cannot clear a {format:?} texture with a color"
                    ))
                })?;
                memory.fill_texture(*texture, &texel)?;
                counters.clears.fetch_add(1, Ordering::Relaxed);
            }
            SoftwareCommand::ClearDepthStencil {
                texture,
                depth,
                stencil,
            } => {
                clear_depth_stencil(memory, *texture, *depth, *stencil)?;
                counters.clears.fetch_add(1, Ordering::Relaxed);
            }
            SoftwareCommand::Resolve {
                source,
                destination,
            } => {
                let data = memory.texture(*source)?.level(0)?.clone();
                let target = memory.texture(*destination)?;
                if target.level(0)?.len() != data.len() {
                    return Err(GraphicsError::InvalidOperation(
                        "resolve source and destination differ in size or format".to_string(),
                    ));
                }
                memory.fill_level(*destination, data)?;
                counters.copies.fetch_add(1, Ordering::Relaxed);
            }
            SoftwareCommand::CopyBuffer {
                source,
                source_offset,
                destination,
                destination_offset,
                size,
            } => {
                memory.copy_buffer(*source, *source_offset, *destination, *destination_offset, *size)?;
                counters.copies.fetch_add(1, Ordering::Relaxed);
            }
            SoftwareCommand::CopyTexture {
                source,
                destination,
                size,
            } => {
                let format = memory.texture(source.texture.id)?.texture.format;
                let layout = BufferTextureLayout::tightly_packed(0, *size, format);
                let mut staging = vec![0u8; layout.span(*size, format) as usize];
                memory.read_texture(source.texture.id, &source.region(*size), &mut staging, &layout)?;
                memory.write_texture(
                    destination.texture.id,
                    &destination.region(*size),
                    &staging,
                    &layout,
                )?;
                counters.copies.fetch_add(1, Ordering::Relaxed);
            }
            SoftwareCommand::CopyBufferToTexture {
                source,
                layout,
                destination,
                size,
            } => {
                let format = memory.texture(destination.texture.id)?.texture.format;
                let data = memory.read_buffer(*source, 0, layout.offset + layout.span(*size, format))?;
                memory.write_texture(destination.texture.id, &destination.region(*size), &data, layout)?;
                counters.copies.fetch_add(1, Ordering::Relaxed);
            }
            SoftwareCommand::CopyTextureToBuffer {
                source,
                destination,
                layout,
                size,
            } => {
                let format = memory.texture(source.texture.id)?.texture.format;
                let end = layout.offset + layout.span(*size, format);
                let mut data = memory.read_buffer(*destination, 0, end)?;
                memory.read_texture(source.texture.id, &source.region(*size), &mut data, layout)?;
                memory.write_buffer(*destination, 0, &data)?;
                counters.copies.fetch_add(1, Ordering::Relaxed);
            }
            SoftwareCommand::Draw {
                vertices,
                instances,
            } => {
                counters.draw_calls.fetch_add(1, Ordering::Relaxed);
                counters
                    .vertices
                    .fetch_add(u64::from(*vertices) * u64::from(*instances), Ordering::Relaxed);
            }
            SoftwareCommand::Dispatch { workgroups } => {
                log::trace!("Software dispatch of {workgroups:?} workgroups");
                counters.dispatches.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
    Ok(())
}

fn unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Encodes a color as one texel of `format`, or `None` for depth formats.
pub(crate) fn encode_color(format: TextureFormat, color: LinearRgba) -> Option<Vec<u8>> {
    let srgb = color.to_srgb();
    let texel = match format {
        TextureFormat::R8Unorm => vec![unorm8(color.r)],
        TextureFormat::Rg8Unorm => vec![unorm8(color.r), unorm8(color.g)],
        TextureFormat::Rgba8Unorm => color.to_array().map(unorm8).to_vec(),
        TextureFormat::Rgba8UnormSrgb => srgb.to_array().map(unorm8).to_vec(),
        TextureFormat::Bgra8Unorm => [color.b, color.g, color.r, color.a].map(unorm8).to_vec(),
        TextureFormat::Bgra8UnormSrgb => [srgb.b, srgb.g, srgb.r, srgb.a].map(unorm8).to_vec(),
        TextureFormat::R16Float => half_bytes(&[color.r]),
        TextureFormat::Rg16Float => half_bytes(&[color.r, color.g]),
        TextureFormat::Rgba16Float => half_bytes(&color.to_array()),
        TextureFormat::R32Float => color.r.to_le_bytes().to_vec(),
        TextureFormat::Rg32Float => [color.r, color.g]
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect(),
        TextureFormat::Rgba32Float => color
            .to_array()
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect(),
        TextureFormat::Depth16Unorm
        | TextureFormat::Depth24Plus
        | TextureFormat::Depth24PlusStencil8
        | TextureFormat::Depth32Float
        | TextureFormat::Depth32FloatStencil8 => return None,
    };
    Some(texel)
}

fn half_bytes(values: &[f32]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|&v| f32_to_f16_bits(v).to_le_bytes())
        .collect()
}

/// Converts to IEEE 754 binary16, rounding half up on the dropped mantissa bits.
pub(crate) fn f32_to_f16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exponent = ((bits >> 23) & 0xff) as i32;
    let mantissa = bits & 0x007f_ffff;

    if exponent == 0xff {
        let nan = if mantissa != 0 { 0x0200 } else { 0 };
        return sign | 0x7c00 | nan;
    }
    let exponent = exponent - 127 + 15;
    if exponent >= 0x1f {
        return sign | 0x7c00;
    }
    if exponent <= 0 {
        if exponent < -10 {
            return sign;
        }
        let mantissa = mantissa | 0x0080_0000;
        let shift = (14 - exponent) as u32;
        let half = (mantissa >> shift) as u16;
        let round = mantissa & (1 << (shift - 1)) != 0;
        return sign | (half + u16::from(round));
    }
    let half = sign | ((exponent as u16) << 10) | ((mantissa >> 13) as u16);
    half + u16::from(mantissa & 0x1000 != 0)
}

fn clear_depth_stencil(
    memory: &mut SoftwareMemory,
    texture: vela_core::renderer::TextureId,
    depth: Option<f32>,
    stencil: Option<u32>,
) -> GraphicsResult<()> {
    let format = memory.texture(texture)?.texture.format;
    let mut level = memory.texture(texture)?.level(0)?.clone();
    let bpp = format.bytes_per_pixel() as usize;
    for texel in level.chunks_exact_mut(bpp) {
        match format {
            TextureFormat::Depth16Unorm => {
                if let Some(d) = depth {
                    let v = (d.clamp(0.0, 1.0) * 65535.0).round() as u16;
                    texel.copy_from_slice(&v.to_le_bytes());
                }
            }
            TextureFormat::Depth24Plus | TextureFormat::Depth24PlusStencil8 => {
                let mut packed = u32::from_le_bytes([texel[0], texel[1], texel[2], texel[3]]);
                if let Some(d) = depth {
                    let v = (d.clamp(0.0, 1.0) * 16_777_215.0).round() as u32;
                    packed = (packed & 0xff00_0000) | v;
                }
                if let (Some(s), true) = (stencil, format.has_stencil()) {
                    packed = (packed & 0x00ff_ffff) | ((s & 0xff) << 24);
                }
                texel.copy_from_slice(&packed.to_le_bytes());
            }
            TextureFormat::Depth32Float => {
                if let Some(d) = depth {
                    texel.copy_from_slice(&d.to_le_bytes());
                }
            }
            other => {
                return Err(GraphicsError::InvalidOperation(format!(
                    "cannot clear depth or stencil of a {other:?} texture"
                )))
            }
        }
    }
    memory.fill_level(texture, level)
}
