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

//! Offscreen render targets: a color texture with an optional depth texture.

use super::handle::RenderTargetId;
use super::texture::{Texture, TextureUsage};
use crate::math::Extent2D;
use crate::renderer::api::util::{SampleCount, TextureFormat};
use std::borrow::Cow;

/// A descriptor used to create a [`RenderTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The size of every attachment.
    pub size: Extent2D,
    /// The format of the color attachment.
    pub color_format: TextureFormat,
    /// The format of the depth attachment, if one is wanted.
    pub depth_format: Option<TextureFormat>,
    /// The number of samples per pixel of every attachment.
    pub sample_count: SampleCount,
}

impl Default for RenderTargetDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            size: Extent2D::new(1, 1),
            color_format: TextureFormat::Rgba8Unorm,
            depth_format: None,
            sample_count: SampleCount::X1,
        }
    }
}

impl RenderTargetDescriptor<'_> {
    /// Usages given to the color attachment.
    pub const COLOR_USAGE: TextureUsage = TextureUsage::RENDER_ATTACHMENT
        .union(TextureUsage::TEXTURE_BINDING)
        .union(TextureUsage::COPY_SRC);

    /// Usages given to the depth attachment.
    pub const DEPTH_USAGE: TextureUsage = TextureUsage::DEPTH_STENCIL_ATTACHMENT;
}

/// A handle to a render target and the textures it owns.
///
/// The attachment textures live and die with the render target; they cannot be
/// destroyed on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    /// The generation-checked key of the render target.
    pub id: RenderTargetId,
    /// The size of every attachment.
    pub size: Extent2D,
    /// The color attachment.
    pub color: Texture,
    /// The depth attachment, if any.
    pub depth: Option<Texture>,
    /// The number of samples per pixel.
    pub sample_count: SampleCount,
}

impl RenderTarget {
    /// The format of the color attachment.
    pub fn color_format(&self) -> TextureFormat {
        self.color.format
    }

    /// The format of the depth attachment, if any.
    pub fn depth_format(&self) -> Option<TextureFormat> {
        self.depth.map(|depth| depth.format)
    }
}
