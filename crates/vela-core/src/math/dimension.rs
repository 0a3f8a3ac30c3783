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

//! Integer extents (sizes) and origins (offsets) in 2D and 3D.
//!
//! These are pixel-based quantities used to describe textures, copy regions and
//! swap-chain surfaces.

/// A two-dimensional extent, typically a surface or viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
}

impl Extent2D {
    /// Creates a new two-dimensional extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either component is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A three-dimensional extent, representing width, height, and depth.
///
/// For 2D textures the third component counts array layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
    /// The depth or number of array layers.
    pub depth_or_array_layers: u32,
}

impl Extent3D {
    /// Creates a new three-dimensional extent.
    pub const fn new(width: u32, height: u32, depth_or_array_layers: u32) -> Self {
        Self {
            width,
            height,
            depth_or_array_layers,
        }
    }

    /// Creates a single-layer 2D extent.
    pub const fn new_2d(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    /// Returns `true` if any component is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth_or_array_layers == 0
    }

    /// The number of texels covered by this extent.
    pub const fn texel_count(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth_or_array_layers as u64
    }

    /// The largest of width and height.
    pub fn max_2d(&self) -> u32 {
        self.width.max(self.height)
    }

    /// The size of the given mip level. Width and height halve per level and never
    /// drop below one; layers are preserved.
    pub fn mip_level_size(&self, level: u32) -> Self {
        Self {
            width: self.width.checked_shr(level).unwrap_or(0).max(1),
            height: self.height.checked_shr(level).unwrap_or(0).max(1),
            depth_or_array_layers: self.depth_or_array_layers,
        }
    }

    /// The length of a full mip chain for this extent.
    pub fn max_mip_levels(&self) -> u32 {
        32 - self.max_2d().max(1).leading_zeros()
    }

    /// Returns the 2D part of this extent.
    pub const fn to_2d(&self) -> Extent2D {
        Extent2D::new(self.width, self.height)
    }
}

/// A two-dimensional origin, typically the top-left corner of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Origin2D {
    /// The x-coordinate of the origin.
    pub x: u32,
    /// The y-coordinate of the origin.
    pub y: u32,
}

/// A three-dimensional origin, representing an (x, y, z) offset.
///
/// The z component addresses a depth slice or an array layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Origin3D {
    /// The x-coordinate of the origin.
    pub x: u32,
    /// The y-coordinate of the origin.
    pub y: u32,
    /// The z-coordinate or array layer of the origin.
    pub z: u32,
}

impl Origin3D {
    /// The origin at `(0, 0, 0)`.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Creates a new origin.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_length() {
        assert_eq!(Extent3D::new_2d(1, 1).max_mip_levels(), 1);
        assert_eq!(Extent3D::new_2d(256, 256).max_mip_levels(), 9);
        assert_eq!(Extent3D::new_2d(300, 17).max_mip_levels(), 9);
    }

    #[test]
    fn mip_level_size_clamps_to_one() {
        let size = Extent3D::new(64, 4, 2);
        assert_eq!(size.mip_level_size(3), Extent3D::new(8, 1, 2));
        assert_eq!(size.mip_level_size(10), Extent3D::new(1, 1, 2));
    }

    #[test]
    fn empty_extents() {
        assert!(Extent3D::new(0, 4, 1).is_empty());
        assert!(Extent2D::new(4, 0).is_empty());
        assert!(!Extent3D::new_2d(1, 1).is_empty());
    }
}
