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

//! Locations and layouts for copy commands.

use crate::math::{Extent3D, Origin3D};
use crate::renderer::api::resource::{Texture, TextureRegion};
use crate::renderer::api::util::TextureFormat;

/// One end of a texture copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureCopyLocation {
    /// The texture copied from or to.
    pub texture: Texture,
    /// The mip level addressed.
    pub mip_level: u32,
    /// The texel the copy box starts at.
    pub origin: Origin3D,
}

impl TextureCopyLocation {
    /// The whole-level origin of mip 0 of `texture`.
    pub fn base(texture: Texture) -> Self {
        Self {
            texture,
            mip_level: 0,
            origin: Origin3D::ZERO,
        }
    }

    /// The box of `size` texels starting at this location.
    pub fn region(&self, size: Extent3D) -> TextureRegion {
        TextureRegion {
            origin: self.origin,
            size,
            mip_level: self.mip_level,
        }
    }
}

/// How texel rows are laid out in a buffer for buffer/texture copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferTextureLayout {
    /// Byte offset of the first texel in the buffer.
    pub offset: u64,
    /// Distance in bytes between the starts of consecutive rows.
    pub bytes_per_row: u32,
    /// Number of rows between the starts of consecutive depth slices.
    pub rows_per_image: u32,
}

impl BufferTextureLayout {
    /// Rows packed without padding, starting at `offset`.
    pub fn tightly_packed(offset: u64, size: Extent3D, format: TextureFormat) -> Self {
        Self {
            offset,
            bytes_per_row: size.width * format.bytes_per_pixel(),
            rows_per_image: size.height,
        }
    }

    /// Whether rows and images are large enough to hold `size` texels of `format`.
    pub fn fits(&self, size: Extent3D, format: TextureFormat) -> bool {
        u64::from(self.bytes_per_row) >= u64::from(size.width) * u64::from(format.bytes_per_pixel())
            && self.rows_per_image >= size.height
    }

    /// The number of buffer bytes from `offset` to the end of the last texel copied.
    pub fn span(&self, size: Extent3D, format: TextureFormat) -> u64 {
        if size.is_empty() {
            return 0;
        }
        let row = u64::from(self.bytes_per_row);
        let image = row * u64::from(self.rows_per_image);
        let last_row = u64::from(size.width) * u64::from(format.bytes_per_pixel());
        image * u64::from(size.depth_or_array_layers - 1) + row * u64::from(size.height - 1) + last_row
    }
}
