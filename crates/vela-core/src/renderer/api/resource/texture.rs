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

//! Defines data structures related to GPU texture and sampler resources.

use super::handle::{SamplerId, TextureId};
use crate::math::{Extent3D, Origin3D};
use crate::renderer::api::pipeline::CompareFunction;
use crate::renderer::api::util::{SampleCount, TextureFormat};
use std::borrow::Cow;

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1,
    /// A two-dimensional texture, possibly layered.
    #[default]
    D2,
    /// A three-dimensional (volumetric) texture.
    D3,
}

bitflags::bitflags! {
    /// A set of flags describing the allowed usages of a [`Texture`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// The texture can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The texture can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The texture can be bound in a shader for sampling.
        const TEXTURE_BINDING = 1 << 2;
        /// The texture can be used as a storage texture.
        const STORAGE_BINDING = 1 << 3;
        /// The texture can be used as a color or resolve attachment in a render pass.
        const RENDER_ATTACHMENT = 1 << 4;
        /// The texture can be used as a depth/stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 5;
    }
}

/// A descriptor used to create a [`Texture`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The dimensions (width, height, depth/layers) of the texture.
    pub size: Extent3D,
    /// The number of mipmap levels for the texture.
    pub mip_level_count: u32,
    /// The number of samples per pixel.
    pub sample_count: SampleCount,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// The format of the texels in the texture.
    pub format: TextureFormat,
    /// How the texture will be used.
    pub usage: TextureUsage,
}

impl Default for TextureDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            size: Extent3D::new(1, 1, 1),
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::TEXTURE_BINDING,
        }
    }
}

impl<'a> TextureDescriptor<'a> {
    /// A single-mip, single-sample 2D texture.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            size: Extent3D::new_2d(width, height),
            format,
            usage,
            ..Self::default()
        }
    }

    /// Attaches a debug label.
    pub fn with_label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A handle to a GPU texture, carrying the metadata it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Texture {
    /// The generation-checked key of the texture.
    pub id: TextureId,
    /// The size of mip level 0.
    pub size: Extent3D,
    /// The texel format.
    pub format: TextureFormat,
    /// The usages the texture was created with.
    pub usage: TextureUsage,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// The number of mip levels.
    pub mip_level_count: u32,
    /// The number of samples per pixel.
    pub sample_count: SampleCount,
}

impl Texture {
    /// Builds the handle a backend returns for a texture created from `desc`.
    pub fn from_descriptor(id: TextureId, desc: &TextureDescriptor<'_>) -> Self {
        Self {
            id,
            size: desc.size,
            format: desc.format,
            usage: desc.usage,
            dimension: desc.dimension,
            mip_level_count: desc.mip_level_count,
            sample_count: desc.sample_count,
        }
    }

    /// The number of bytes in one mip level.
    pub fn mip_level_byte_size(&self, level: u32) -> u64 {
        self.size.mip_level_size(level).texel_count() * u64::from(self.format.bytes_per_pixel())
    }

    /// The number of bytes of mip level 0, which is what initial data must cover.
    pub fn byte_size(&self) -> u64 {
        self.mip_level_byte_size(0)
    }
}

/// A box inside one mip level of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureRegion {
    /// The corner of the box closest to the origin.
    pub origin: Origin3D,
    /// The extent of the box.
    pub size: Extent3D,
    /// The mip level the box lies in.
    pub mip_level: u32,
}

impl TextureRegion {
    /// The whole of mip level `mip_level` of `texture`.
    pub fn whole(texture: &Texture, mip_level: u32) -> Self {
        Self {
            origin: Origin3D::ZERO,
            size: texture.size.mip_level_size(mip_level),
            mip_level,
        }
    }

    /// The number of bytes a tightly packed copy of the region occupies.
    pub fn byte_len(&self, format: TextureFormat) -> u64 {
        self.size.texel_count() * u64::from(format.bytes_per_pixel())
    }

    /// Whether the region lies within `texture`.
    pub fn fits_in(&self, texture: &Texture) -> bool {
        if self.mip_level >= texture.mip_level_count {
            return false;
        }
        let level = texture.size.mip_level_size(self.mip_level);
        let within = |origin: u32, size: u32, limit: u32| {
            origin.checked_add(size).is_some_and(|end| end <= limit)
        };
        within(self.origin.x, self.size.width, level.width)
            && within(self.origin.y, self.size.height, level.height)
            && within(
                self.origin.z,
                self.size.depth_or_array_layers,
                level.depth_or_array_layers,
            )
    }
}

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Coordinates wrap around.
    Repeat,
    /// Coordinates are clamped to the edge.
    #[default]
    ClampToEdge,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
    /// Coordinates outside the range are given a fixed border color.
    ClampToBorder,
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Point sampling.
    #[default]
    Nearest,
    /// Linear interpolation.
    Linear,
}

/// The border color to use when [`AddressMode::ClampToBorder`] is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerBorderColor {
    /// `[0.0, 0.0, 0.0, 0.0]`.
    TransparentBlack,
    /// `[0.0, 0.0, 0.0, 1.0]`.
    OpaqueBlack,
    /// `[1.0, 1.0, 1.0, 1.0]`.
    OpaqueWhite,
}

/// A descriptor used to create a [`Sampler`].
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The address mode for the U texture coordinate.
    pub address_mode_u: AddressMode,
    /// The address mode for the V texture coordinate.
    pub address_mode_v: AddressMode,
    /// The address mode for the W texture coordinate.
    pub address_mode_w: AddressMode,
    /// The filter used when magnifying.
    pub mag_filter: FilterMode,
    /// The filter used when minifying.
    pub min_filter: FilterMode,
    /// The filter used between mip levels.
    pub mipmap_filter: FilterMode,
    /// The minimum level of detail.
    pub lod_min_clamp: f32,
    /// The maximum level of detail.
    pub lod_max_clamp: f32,
    /// If `Some`, creates a comparison sampler.
    pub compare: Option<CompareFunction>,
    /// The maximum anisotropy level, `1` disables anisotropic filtering.
    pub anisotropy_clamp: u16,
    /// The border color used with [`AddressMode::ClampToBorder`].
    pub border_color: Option<SamplerBorderColor>,
}

impl Default for SamplerDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            address_mode_u: AddressMode::default(),
            address_mode_v: AddressMode::default(),
            address_mode_w: AddressMode::default(),
            mag_filter: FilterMode::default(),
            min_filter: FilterMode::default(),
            mipmap_filter: FilterMode::default(),
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
            anisotropy_clamp: 1,
            border_color: None,
        }
    }
}

/// A handle to a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sampler {
    /// The generation-checked key of the sampler.
    pub id: SamplerId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(width: u32, height: u32, mips: u32) -> Texture {
        let desc = TextureDescriptor {
            mip_level_count: mips,
            ..TextureDescriptor::new_2d(width, height, TextureFormat::Rgba8Unorm, TextureUsage::COPY_DST)
        };
        Texture::from_descriptor(TextureId::default(), &desc)
    }

    #[test]
    fn byte_size_covers_mip_zero() {
        let tex = texture(64, 32, 3);
        assert_eq!(tex.byte_size(), 64 * 32 * 4);
        assert_eq!(tex.mip_level_byte_size(1), 32 * 16 * 4);
    }

    #[test]
    fn region_bounds_follow_mip_level() {
        let tex = texture(64, 64, 2);
        assert!(TextureRegion::whole(&tex, 1).fits_in(&tex));

        let too_wide = TextureRegion {
            origin: Origin3D::new(16, 0, 0),
            size: Extent3D::new_2d(32, 8),
            mip_level: 1,
        };
        assert!(!too_wide.fits_in(&tex));

        let missing_level = TextureRegion {
            mip_level: 2,
            ..TextureRegion::whole(&tex, 1)
        };
        assert!(!missing_level.fits_in(&tex));
    }

    #[test]
    fn sampler_defaults_are_sane() {
        let desc = SamplerDescriptor::default();
        assert_eq!(desc.anisotropy_clamp, 1);
        assert!(desc.compare.is_none());
        assert!(desc.lod_max_clamp > desc.lod_min_clamp);
    }
}
