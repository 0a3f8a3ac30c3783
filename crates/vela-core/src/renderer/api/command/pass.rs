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

//! Descriptors and types for render passes.

use crate::math::{Extent3D, LinearRgba};
use crate::renderer::api::resource::Texture;
use crate::renderer::error::ValidationError;

/// What happens to an attachment's contents when a pass begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp<V> {
    /// Keep the existing contents.
    Load,
    /// Overwrite every texel with the value.
    Clear(V),
}

impl<V> LoadOp<V> {
    /// Whether the attachment is cleared.
    pub fn is_clear(&self) -> bool {
        matches!(self, LoadOp::Clear(_))
    }
}

/// What happens to an attachment's contents when a pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Write the results back.
    Store,
    /// The results may be thrown away.
    Discard,
}

/// The load and store behaviour of one attachment aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operations<V> {
    /// Behaviour at the start of the pass.
    pub load: LoadOp<V>,
    /// Behaviour at the end of the pass.
    pub store: StoreOp,
}

impl<V> Operations<V> {
    /// Clear to `value`, then store.
    pub fn clear(value: V) -> Self {
        Self {
            load: LoadOp::Clear(value),
            store: StoreOp::Store,
        }
    }

    /// Keep existing contents, then store.
    pub fn load() -> Self {
        Self {
            load: LoadOp::Load,
            store: StoreOp::Store,
        }
    }
}

/// A color attachment of a render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAttachment {
    /// The texture rendered to.
    pub target: Texture,
    /// The single-sample texture a multisampled target resolves into.
    pub resolve_target: Option<Texture>,
    /// Load and store behaviour.
    pub ops: Operations<LinearRgba>,
}

/// The depth/stencil attachment of a render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthAttachment {
    /// The depth texture.
    pub target: Texture,
    /// Depth load and store behaviour; `None` leaves depth read-only.
    pub depth_ops: Option<Operations<f32>>,
    /// Stencil load and store behaviour; `None` leaves stencil untouched.
    pub stencil_ops: Option<Operations<u32>>,
}

/// Describes the attachments of a render pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderPassDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The color attachments, in slot order.
    pub color_attachments: &'a [ColorAttachment],
    /// The depth/stencil attachment, if any.
    pub depth_attachment: Option<DepthAttachment>,
}

impl RenderPassDescriptor<'_> {
    /// The size shared by every attachment, taken from the first one.
    pub fn extent(&self) -> Option<Extent3D> {
        self.color_attachments
            .first()
            .map(|attachment| attachment.target.size)
            .or(self.depth_attachment.map(|depth| depth.target.size))
    }
}

/// The region of the render target that clip space maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Depth that clip-space `0` maps to.
    pub min_depth: f32,
    /// Depth that clip-space `1` maps to.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering `width` × `height` pixels with the full depth range.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Checks for a positive area and a depth range inside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ValidationError::ZeroSize { what: "viewport" });
        }
        let in_unit = |d: f32| (0.0..=1.0).contains(&d);
        if !in_unit(self.min_depth) || !in_unit(self.max_depth) || self.min_depth > self.max_depth
        {
            return Err(ValidationError::InvalidDescriptor(format!(
                "viewport depth range {}..{} is not inside 0..1",
                self.min_depth, self.max_depth
            )));
        }
        Ok(())
    }
}

/// A pixel rectangle outside of which fragments are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_validation() {
        assert!(Viewport::new(64.0, 64.0).validate().is_ok());
        assert!(Viewport::new(0.0, 64.0).validate().is_err());
        let inverted = Viewport {
            min_depth: 0.8,
            max_depth: 0.2,
            ..Viewport::new(1.0, 1.0)
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn operations_helpers() {
        let ops = Operations::clear(LinearRgba::RED);
        assert!(ops.load.is_clear());
        assert_eq!(ops.store, StoreOp::Store);
        assert!(!Operations::<f32>::load().load.is_clear());
    }
}
