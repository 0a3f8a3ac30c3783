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

//! Shape checks run by the facade before a call reaches the backend.
//!
//! Each check is a pure function of its arguments and the device limits.

use vela_core::math::Extent3D;
use vela_core::renderer::{
    BackendLimits, Buffer, BufferDescriptor, BufferTextureLayout, BufferUsage,
    PipelineDescriptor, RenderPassDescriptor, RenderTargetDescriptor, SamplerDescriptor,
    ShaderDescriptor, ShaderStage, Texture, TextureCopyLocation, TextureDescriptor,
    TextureDimension, TextureRegion, TextureUsage, ValidationError,
};

type Check = Result<(), ValidationError>;

fn within_limit(what: &'static str, value: u64, limit: u64) -> Check {
    if value > limit {
        return Err(ValidationError::ExceedsLimit { what, value, limit });
    }
    Ok(())
}

fn non_zero(what: &'static str, value: u64) -> Check {
    if value == 0 {
        return Err(ValidationError::ZeroSize { what });
    }
    Ok(())
}

fn extent(what: [&'static str; 3], size: Extent3D) -> Check {
    non_zero(what[0], size.width.into())?;
    non_zero(what[1], size.height.into())?;
    non_zero(what[2], size.depth_or_array_layers.into())
}

fn data_len(what: &'static str, data: &[u8], expected: u64) -> Check {
    if data.is_empty() {
        return Err(ValidationError::Empty { what });
    }
    let actual = data.len() as u64;
    if actual != expected {
        return Err(ValidationError::DataSizeMismatch { expected, actual });
    }
    Ok(())
}

pub(crate) fn buffer_range(what: &'static str, buffer: &Buffer, offset: u64, size: u64) -> Check {
    if !buffer.contains_range(offset, size) {
        return Err(ValidationError::OutOfBounds {
            what,
            offset,
            size,
            capacity: buffer.size,
        });
    }
    Ok(())
}

pub(crate) fn buffer_usage(buffer: &Buffer, required: BufferUsage, name: &'static str) -> Check {
    if !buffer.usage.intersects(required) {
        return Err(ValidationError::MissingUsage {
            what: "buffer",
            required: name,
        });
    }
    Ok(())
}

pub(crate) fn texture_usage(texture: &Texture, required: TextureUsage, name: &'static str) -> Check {
    if !texture.usage.contains(required) {
        return Err(ValidationError::MissingUsage {
            what: "texture",
            required: name,
        });
    }
    Ok(())
}

pub(crate) fn slot(what: &'static str, slot: u32, limit: u32) -> Check {
    if slot >= limit {
        return Err(ValidationError::ExceedsLimit {
            what,
            value: slot.into(),
            limit: u64::from(limit) - 1,
        });
    }
    Ok(())
}

pub(crate) fn texture_descriptor(
    desc: &TextureDescriptor<'_>,
    initial_data: Option<&[u8]>,
    limits: &BackendLimits,
) -> Check {
    extent(["texture width", "texture height", "texture depth"], desc.size)?;
    non_zero("texture mip level count", desc.mip_level_count.into())?;
    if desc.usage.is_empty() {
        return Err(ValidationError::Empty {
            what: "texture usage",
        });
    }

    let max_size = u64::from(limits.max_texture_size);
    within_limit("texture width", desc.size.width.into(), max_size)?;
    within_limit("texture height", desc.size.height.into(), max_size)?;
    match desc.dimension {
        TextureDimension::D1 => {
            if desc.size.height != 1 || desc.size.depth_or_array_layers != 1 {
                return Err(ValidationError::InvalidDescriptor(
                    "a 1D texture must have a height and depth of 1".to_string(),
                ));
            }
        }
        TextureDimension::D2 => within_limit(
            "texture array layers",
            desc.size.depth_or_array_layers.into(),
            limits.max_texture_array_layers.into(),
        )?,
        TextureDimension::D3 => {
            within_limit("texture depth", desc.size.depth_or_array_layers.into(), max_size)?
        }
    }

    let max_mips = desc.size.max_mip_levels();
    if desc.mip_level_count > max_mips {
        return Err(ValidationError::MipLevelCountOutOfRange {
            requested: desc.mip_level_count,
            max: max_mips,
        });
    }

    if desc.sample_count.is_multisampled() {
        if desc.dimension != TextureDimension::D2 || desc.mip_level_count != 1 {
            return Err(ValidationError::InvalidDescriptor(
                "multisampled textures must be 2D with a single mip level".to_string(),
            ));
        }
        if initial_data.is_some() {
            return Err(ValidationError::InvalidDescriptor(
                "multisampled textures cannot be created with initial data".to_string(),
            ));
        }
    }
    if desc.format.is_depth() && desc.dimension == TextureDimension::D3 {
        return Err(ValidationError::InvalidDescriptor(
            "depth formats cannot be used by 3D textures".to_string(),
        ));
    }

    if let Some(data) = initial_data {
        let expected = desc.size.texel_count() * u64::from(desc.format.bytes_per_pixel());
        data_len("texture initial data", data, expected)?;
    }
    Ok(())
}

pub(crate) fn buffer_descriptor(
    desc: &BufferDescriptor<'_>,
    initial_data: Option<&[u8]>,
    limits: &BackendLimits,
) -> Check {
    non_zero("buffer size", desc.size)?;
    within_limit("buffer size", desc.size, limits.max_buffer_size)?;
    if desc.usage.is_empty() {
        return Err(ValidationError::Empty {
            what: "buffer usage",
        });
    }
    if let Some(data) = initial_data {
        data_len("buffer initial data", data, desc.size)?;
    }
    Ok(())
}

pub(crate) fn shader_descriptor(desc: &ShaderDescriptor<'_>) -> Check {
    if desc.source.is_empty() {
        return Err(ValidationError::Empty {
            what: "shader code",
        });
    }
    if desc.entry_point.is_empty() {
        return Err(ValidationError::Empty {
            what: "shader entry point",
        });
    }
    Ok(())
}

fn stage(expected: ShaderStage, actual: ShaderStage) -> Check {
    if expected != actual {
        return Err(ValidationError::InvalidDescriptor(format!(
            "expected a {expected:?} shader, got a {actual:?} shader"
        )));
    }
    Ok(())
}

pub(crate) fn pipeline_descriptor(desc: &PipelineDescriptor<'_>, limits: &BackendLimits) -> Check {
    stage(ShaderStage::Vertex, desc.vertex_shader.stage)?;
    if let Some(fragment) = &desc.fragment_shader {
        stage(ShaderStage::Fragment, fragment.stage)?;
    }
    if desc.color_targets.is_empty() && desc.depth_target.is_none() {
        return Err(ValidationError::InvalidDescriptor(
            "a graphics pipeline needs a color or depth target".to_string(),
        ));
    }
    within_limit(
        "pipeline color targets",
        desc.color_targets.len() as u64,
        limits.max_color_attachments.into(),
    )?;
    within_limit(
        "pipeline vertex buffers",
        desc.vertex_layouts.len() as u64,
        limits.max_vertex_buffers.into(),
    )?;
    for target in desc.color_targets.iter() {
        if target.format.is_depth() {
            return Err(ValidationError::InvalidDescriptor(format!(
                "{:?} cannot be a color target",
                target.format
            )));
        }
    }
    if let Some(depth) = &desc.depth_target {
        if !depth.format.is_depth() {
            return Err(ValidationError::InvalidDescriptor(format!(
                "{:?} cannot be a depth target",
                depth.format
            )));
        }
    }

    let mut locations = Vec::new();
    for layout in desc.vertex_layouts.iter() {
        layout.validate()?;
        for attribute in layout.attributes.iter() {
            if locations.contains(&attribute.shader_location) {
                return Err(ValidationError::InvalidDescriptor(format!(
                    "shader location {} is used by two vertex attributes",
                    attribute.shader_location
                )));
            }
            locations.push(attribute.shader_location);
        }
    }
    Ok(())
}

pub(crate) fn compute_shader(shader_stage: ShaderStage) -> Check {
    stage(ShaderStage::Compute, shader_stage)
}

pub(crate) fn render_target_descriptor(
    desc: &RenderTargetDescriptor<'_>,
    limits: &BackendLimits,
) -> Check {
    non_zero("render target width", desc.size.width.into())?;
    non_zero("render target height", desc.size.height.into())?;
    let max_size = u64::from(limits.max_texture_size);
    within_limit("render target width", desc.size.width.into(), max_size)?;
    within_limit("render target height", desc.size.height.into(), max_size)?;
    if desc.color_format.is_depth() {
        return Err(ValidationError::InvalidDescriptor(format!(
            "{:?} cannot be a color attachment",
            desc.color_format
        )));
    }
    if let Some(format) = desc.depth_format.filter(|format| !format.is_depth()) {
        return Err(ValidationError::InvalidDescriptor(format!(
            "{format:?} cannot be a depth attachment"
        )));
    }
    Ok(())
}

pub(crate) fn sampler_descriptor(desc: &SamplerDescriptor<'_>) -> Check {
    if !(desc.lod_min_clamp >= 0.0 && desc.lod_min_clamp <= desc.lod_max_clamp) {
        return Err(ValidationError::InvalidDescriptor(format!(
            "sampler LOD range {}..{} is empty or negative",
            desc.lod_min_clamp, desc.lod_max_clamp
        )));
    }
    non_zero("sampler anisotropy clamp", desc.anisotropy_clamp.into())
}

pub(crate) fn texture_region(texture: &Texture, region: &TextureRegion) -> Check {
    extent(["region width", "region height", "region depth"], region.size)?;
    if !region.fits_in(texture) {
        return Err(ValidationError::InvalidDescriptor(format!(
            "region {:?}+{:?} at mip {} lies outside the texture",
            region.origin, region.size, region.mip_level
        )));
    }
    if texture.sample_count.is_multisampled() {
        return Err(ValidationError::InvalidDescriptor(
            "multisampled textures cannot be copied from or to".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn texture_update(texture: &Texture, region: &TextureRegion, data: &[u8]) -> Check {
    texture_usage(texture, TextureUsage::COPY_DST, "COPY_DST")?;
    texture_region(texture, region)?;
    data_len("texture update data", data, region.byte_len(texture.format))
}

pub(crate) fn buffer_update(buffer: &Buffer, offset: u64, data: &[u8]) -> Check {
    if data.is_empty() {
        return Err(ValidationError::Empty {
            what: "buffer update data",
        });
    }
    buffer_usage(buffer, BufferUsage::COPY_DST | BufferUsage::MAP_WRITE, "COPY_DST")?;
    buffer_range("buffer update", buffer, offset, data.len() as u64)
}

pub(crate) fn render_pass(desc: &RenderPassDescriptor<'_>, limits: &BackendLimits) -> Check {
    let size = desc.extent().ok_or_else(|| {
        ValidationError::InvalidDescriptor("a render pass needs at least one attachment".to_string())
    })?;
    within_limit(
        "render pass color attachments",
        desc.color_attachments.len() as u64,
        limits.max_color_attachments.into(),
    )?;

    let same_size = |texture: &Texture| -> Check {
        if texture.size.to_2d() != size.to_2d() {
            return Err(ValidationError::InvalidDescriptor(format!(
                "attachment of {:?} does not match the pass size {:?}",
                texture.size, size
            )));
        }
        Ok(())
    };

    for attachment in desc.color_attachments {
        let target = &attachment.target;
        texture_usage(target, TextureUsage::RENDER_ATTACHMENT, "RENDER_ATTACHMENT")?;
        same_size(target)?;
        if target.format.is_depth() {
            return Err(ValidationError::InvalidDescriptor(format!(
                "{:?} cannot be a color attachment",
                target.format
            )));
        }
        if let Some(resolve) = &attachment.resolve_target {
            texture_usage(resolve, TextureUsage::RENDER_ATTACHMENT, "RENDER_ATTACHMENT")?;
            same_size(resolve)?;
            if !target.sample_count.is_multisampled() || resolve.sample_count.is_multisampled() {
                return Err(ValidationError::InvalidDescriptor(
                    "a resolve goes from a multisampled attachment to a single-sampled one"
                        .to_string(),
                ));
            }
            if resolve.format != target.format {
                return Err(ValidationError::FormatMismatch {
                    expected: target.format,
                    actual: resolve.format,
                });
            }
        }
    }

    if let Some(depth) = &desc.depth_attachment {
        texture_usage(
            &depth.target,
            TextureUsage::DEPTH_STENCIL_ATTACHMENT,
            "DEPTH_STENCIL_ATTACHMENT",
        )?;
        same_size(&depth.target)?;
        if !depth.target.format.is_depth() {
            return Err(ValidationError::InvalidDescriptor(format!(
                "{:?} cannot be a depth attachment",
                depth.target.format
            )));
        }
    }
    Ok(())
}

pub(crate) fn buffer_copy(
    source: &Buffer,
    source_offset: u64,
    destination: &Buffer,
    destination_offset: u64,
    size: u64,
) -> Check {
    non_zero("copy size", size)?;
    buffer_usage(source, BufferUsage::COPY_SRC, "COPY_SRC")?;
    buffer_usage(destination, BufferUsage::COPY_DST, "COPY_DST")?;
    buffer_range("copy source", source, source_offset, size)?;
    buffer_range("copy destination", destination, destination_offset, size)?;
    if source.id == destination.id {
        let overlaps = source_offset < destination_offset.saturating_add(size)
            && destination_offset < source_offset.saturating_add(size);
        if overlaps {
            return Err(ValidationError::InvalidDescriptor(
                "source and destination ranges of a buffer copy overlap".to_string(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn texture_copy(
    source: &TextureCopyLocation,
    destination: &TextureCopyLocation,
    size: Extent3D,
) -> Check {
    texture_usage(&source.texture, TextureUsage::COPY_SRC, "COPY_SRC")?;
    texture_usage(&destination.texture, TextureUsage::COPY_DST, "COPY_DST")?;
    texture_region(&source.texture, &source.region(size))?;
    texture_region(&destination.texture, &destination.region(size))?;
    if source.texture.format != destination.texture.format {
        return Err(ValidationError::FormatMismatch {
            expected: source.texture.format,
            actual: destination.texture.format,
        });
    }
    Ok(())
}

pub(crate) fn buffer_texture_copy(
    buffer: &Buffer,
    layout: &BufferTextureLayout,
    location: &TextureCopyLocation,
    size: Extent3D,
) -> Check {
    let format = location.texture.format;
    texture_region(&location.texture, &location.region(size))?;
    if !layout.fits(size, format) {
        return Err(ValidationError::InvalidDescriptor(format!(
            "buffer layout {layout:?} is too small for {size:?} texels of {format:?}"
        )));
    }
    buffer_range("texture copy buffer", buffer, layout.offset, layout.span(size, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::renderer::{SampleCount, TextureFormat};

    #[test]
    fn mip_chains_longer_than_the_size_allows_are_rejected() {
        let mut desc = TextureDescriptor::new_2d(
            256,
            64,
            TextureFormat::Rgba8Unorm,
            TextureUsage::TEXTURE_BINDING,
        );
        desc.mip_level_count = 9;
        assert!(texture_descriptor(&desc, None, &BackendLimits::default()).is_ok());

        desc.mip_level_count = 10;
        assert_eq!(
            texture_descriptor(&desc, None, &BackendLimits::default()),
            Err(ValidationError::MipLevelCountOutOfRange {
                requested: 10,
                max: 9
            })
        );
    }

    #[test]
    fn initial_data_must_match_the_first_level() {
        let desc = TextureDescriptor::new_2d(2, 2, TextureFormat::R8Unorm, TextureUsage::COPY_DST);
        assert_eq!(
            texture_descriptor(&desc, Some(&[0; 3]), &BackendLimits::default()),
            Err(ValidationError::DataSizeMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            texture_descriptor(&desc, Some(&[]), &BackendLimits::default()),
            Err(ValidationError::Empty {
                what: "texture initial data"
            })
        );
    }

    #[test]
    fn multisampled_textures_have_one_level() {
        let mut desc = TextureDescriptor::new_2d(
            8,
            8,
            TextureFormat::Rgba8Unorm,
            TextureUsage::RENDER_ATTACHMENT,
        );
        desc.sample_count = SampleCount::X4;
        desc.mip_level_count = 2;
        assert!(matches!(
            texture_descriptor(&desc, None, &BackendLimits::default()),
            Err(ValidationError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn textures_beyond_the_device_limit_are_rejected() {
        let limits = BackendLimits {
            max_texture_size: 1024,
            ..BackendLimits::default()
        };
        let desc = TextureDescriptor::new_2d(
            2048,
            16,
            TextureFormat::Rgba8Unorm,
            TextureUsage::TEXTURE_BINDING,
        );
        assert_eq!(
            texture_descriptor(&desc, None, &limits),
            Err(ValidationError::ExceedsLimit {
                what: "texture width",
                value: 2048,
                limit: 1024
            })
        );
    }

    #[test]
    fn overlapping_copies_within_one_buffer_are_rejected() {
        let buffer = Buffer {
            id: Default::default(),
            size: 64,
            usage: BufferUsage::COPY_SRC | BufferUsage::COPY_DST,
        };
        assert!(buffer_copy(&buffer, 0, &buffer, 32, 32).is_ok());
        assert!(matches!(
            buffer_copy(&buffer, 0, &buffer, 16, 32),
            Err(ValidationError::InvalidDescriptor(_))
        ));
    }
}
