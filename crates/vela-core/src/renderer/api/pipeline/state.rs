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

//! State descriptors for the pipeline.

use super::enums::*;
use crate::renderer::api::util::TextureFormat;
use crate::renderer::error::ValidationError;
use std::borrow::Cow;

/// One attribute inside a vertex buffer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// The shader input location the attribute feeds.
    pub shader_location: u32,
    /// The format of the attribute.
    pub format: VertexFormat,
    /// The byte offset of the attribute from the start of the element.
    pub offset: u64,
}

/// The layout of one vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout<'a> {
    /// The distance in bytes between consecutive elements.
    pub array_stride: u64,
    /// Whether the buffer advances per vertex or per instance.
    pub step_mode: VertexStepMode,
    /// The attributes of one element.
    pub attributes: Cow<'a, [VertexAttribute]>,
}

impl VertexLayout<'_> {
    /// Checks that every attribute fits inside one element.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.array_stride == 0 && !self.attributes.is_empty() {
            return Err(ValidationError::ZeroSize {
                what: "vertex array stride",
            });
        }
        for attribute in self.attributes.iter() {
            let end = attribute.offset.saturating_add(attribute.format.size());
            if end > self.array_stride {
                return Err(ValidationError::InvalidDescriptor(format!(
                    "vertex attribute at location {} ends at byte {end}, past the stride of {}",
                    attribute.shader_location, self.array_stride
                )));
            }
        }
        Ok(())
    }
}

/// Primitive assembly and rasterization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterizerState {
    /// How vertices form primitives.
    pub topology: PrimitiveTopology,
    /// The winding of front faces.
    pub front_face: FrontFace,
    /// Which faces are culled.
    pub cull_mode: CullMode,
    /// How polygons are filled.
    pub polygon_mode: PolygonMode,
}

/// Stencil behaviour for one face orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// The comparison against the stencil reference.
    pub compare: CompareFunction,
    /// The operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// The operation when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// The operation when both tests pass.
    pub pass_op: StencilOperation,
}

/// Depth and stencil testing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// Whether passing fragments write their depth.
    pub depth_write_enabled: bool,
    /// The depth comparison.
    pub depth_compare: CompareFunction,
    /// Stencil state for front faces.
    pub stencil_front: StencilFaceState,
    /// Stencil state for back faces.
    pub stencil_back: StencilFaceState,
    /// Mask applied when reading stencil values.
    pub stencil_read_mask: u32,
    /// Mask applied when writing stencil values.
    pub stencil_write_mask: u32,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil_front: StencilFaceState::default(),
            stencil_back: StencilFaceState::default(),
            stencil_read_mask: !0,
            stencil_write_mask: !0,
        }
    }
}

/// How one channel group (color or alpha) is blended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Multiplier for the fragment output.
    pub src_factor: BlendFactor,
    /// Multiplier for the value already in the target.
    pub dst_factor: BlendFactor,
    /// How the two are combined.
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// Overwrites the target.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };

    /// Standard non-premultiplied alpha blending.
    pub const OVER: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };
}

/// Blending for one color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Blending of the color channels.
    pub color: BlendComponent,
    /// Blending of the alpha channel.
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Overwrites the target.
    pub const REPLACE: Self = Self {
        color: BlendComponent::REPLACE,
        alpha: BlendComponent::REPLACE,
    };

    /// Standard alpha blending.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponent::OVER,
        alpha: BlendComponent::OVER,
    };
}

bitflags::bitflags! {
    /// Which channels of a color target are written.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWrites: u8 {
        /// The red channel.
        const R = 0b0001;
        /// The green channel.
        const G = 0b0010;
        /// The blue channel.
        const B = 0b0100;
        /// The alpha channel.
        const A = 0b1000;
        /// Every channel.
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

/// The format and blending of one color target a pipeline renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTargetDescriptor {
    /// The format of the target.
    pub format: TextureFormat,
    /// Blending, or `None` to overwrite.
    pub blend: Option<BlendState>,
    /// Which channels are written.
    pub write_mask: ColorWrites,
}

impl ColorTargetDescriptor {
    /// A target of `format` that is overwritten on every channel.
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            blend: None,
            write_mask: ColorWrites::ALL,
        }
    }
}

/// The format and testing state of the depth target a pipeline renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthTargetDescriptor {
    /// The format of the depth target; must be a depth format.
    pub format: TextureFormat,
    /// Depth and stencil testing.
    pub depth_stencil: DepthStencilState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_rejects_attribute_past_stride() {
        let attributes = [
            VertexAttribute {
                shader_location: 0,
                format: VertexFormat::Float32x3,
                offset: 0,
            },
            VertexAttribute {
                shader_location: 1,
                format: VertexFormat::Float32x2,
                offset: 12,
            },
        ];
        let layout = VertexLayout {
            array_stride: 20,
            step_mode: VertexStepMode::Vertex,
            attributes: Cow::Borrowed(&attributes),
        };
        assert!(layout.validate().is_ok());

        let short = VertexLayout {
            array_stride: 16,
            ..layout
        };
        assert!(matches!(
            short.validate(),
            Err(ValidationError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn color_writes_all_covers_every_channel() {
        assert_eq!(
            ColorWrites::ALL,
            ColorWrites::R | ColorWrites::G | ColorWrites::B | ColorWrites::A
        );
    }
}
