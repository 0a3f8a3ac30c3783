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

//! CPU-side storage for textures and buffers, shared between the device and
//! its queue worker.

use vela_core::renderer::{
    Buffer, BufferDescriptor, BufferId, BufferTextureLayout, GraphicsError, GraphicsResult,
    ResourcePool, Texture, TextureDescriptor, TextureId, TextureRegion,
};

/// Who is allowed to destroy a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextureOwner {
    /// Created directly; destroyed with `destroy_texture`.
    Standalone,
    /// An attachment of a render target.
    RenderTarget,
    /// A back buffer of the swap chain.
    SwapChain,
}

#[derive(Debug)]
pub(crate) struct TextureMemory {
    pub(crate) texture: Texture,
    pub(crate) owner: TextureOwner,
    /// One tightly packed byte vector per mip level.
    pub(crate) levels: Vec<Vec<u8>>,
}

impl TextureMemory {
    fn byte_size(&self) -> u64 {
        self.levels.iter().map(|level| level.len() as u64).sum()
    }

    fn row_len(&self, mip_level: u32) -> usize {
        let size = self.texture.size.mip_level_size(mip_level);
        size.width as usize * self.texture.format.bytes_per_pixel() as usize
    }

    fn rows_per_image(&self, mip_level: u32) -> usize {
        self.texture.size.mip_level_size(mip_level).height as usize
    }

    pub(crate) fn level(&self, mip_level: u32) -> GraphicsResult<&Vec<u8>> {
        self.levels.get(mip_level as usize).ok_or_else(|| {
            GraphicsError::InvalidOperation(format!("texture has no mip level {mip_level}"))
        })
    }

    fn level_mut(&mut self, mip_level: u32) -> GraphicsResult<&mut Vec<u8>> {
        self.levels.get_mut(mip_level as usize).ok_or_else(|| {
            GraphicsError::InvalidOperation(format!("texture has no mip level {mip_level}"))
        })
    }

    /// Reads a region into a buffer laid out as `layout` describes.
    fn read_region(
        &self,
        region: &TextureRegion,
        out: &mut [u8],
        layout: &BufferTextureLayout,
    ) -> GraphicsResult<()> {
        self.check_region(region)?;
        let bpp = self.texture.format.bytes_per_pixel() as usize;
        let row_len = self.row_len(region.mip_level);
        let rows = self.rows_per_image(region.mip_level);
        let level = self.level(region.mip_level)?;
        let copy_len = region.size.width as usize * bpp;
        for z in 0..region.size.depth_or_array_layers as usize {
            for y in 0..region.size.height as usize {
                let src = ((region.origin.z as usize + z) * rows + region.origin.y as usize + y)
                    * row_len
                    + region.origin.x as usize * bpp;
                let dst = layout.offset as usize
                    + z * layout.rows_per_image as usize * layout.bytes_per_row as usize
                    + y * layout.bytes_per_row as usize;
                out[dst..dst + copy_len].copy_from_slice(&level[src..src + copy_len]);
            }
        }
        Ok(())
    }

    /// Writes a region from a buffer laid out as `layout` describes.
    fn write_region(
        &mut self,
        region: &TextureRegion,
        data: &[u8],
        layout: &BufferTextureLayout,
    ) -> GraphicsResult<()> {
        self.check_region(region)?;
        let bpp = self.texture.format.bytes_per_pixel() as usize;
        let row_len = self.row_len(region.mip_level);
        let rows = self.rows_per_image(region.mip_level);
        let copy_len = region.size.width as usize * bpp;
        let level = self.level_mut(region.mip_level)?;
        for z in 0..region.size.depth_or_array_layers as usize {
            for y in 0..region.size.height as usize {
                let dst = ((region.origin.z as usize + z) * rows + region.origin.y as usize + y)
                    * row_len
                    + region.origin.x as usize * bpp;
                let src = layout.offset as usize
                    + z * layout.rows_per_image as usize * layout.bytes_per_row as usize
                    + y * layout.bytes_per_row as usize;
                level[dst..dst + copy_len].copy_from_slice(&data[src..src + copy_len]);
            }
        }
        Ok(())
    }

    fn check_region(&self, region: &TextureRegion) -> GraphicsResult<()> {
        if !region.fits_in(&self.texture) {
            return Err(GraphicsError::InvalidOperation(format!(
                "region {region:?} lies outside the texture"
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct BufferMemory {
    pub(crate) buffer: Buffer,
    pub(crate) bytes: Vec<u8>,
}

/// Every texture and buffer of a software device, with a memory budget.
#[derive(Debug)]
pub(crate) struct SoftwareMemory {
    pub(crate) textures: ResourcePool<TextureId, TextureMemory>,
    pub(crate) buffers: ResourcePool<BufferId, BufferMemory>,
    budget: u64,
    allocated: u64,
}

impl SoftwareMemory {
    pub(crate) fn new(budget: u64) -> Self {
        Self {
            textures: ResourcePool::new("texture"),
            buffers: ResourcePool::new("buffer"),
            budget,
            allocated: 0,
        }
    }

    pub(crate) fn allocated(&self) -> u64 {
        self.allocated
    }

    pub(crate) fn budget(&self) -> u64 {
        self.budget
    }

    fn reserve(&mut self, bytes: u64) -> GraphicsResult<()> {
        let available = self.budget.saturating_sub(self.allocated);
        if bytes > available {
            return Err(GraphicsError::OutOfMemory {
                requested: bytes,
                available,
            });
        }
        self.allocated += bytes;
        Ok(())
    }

    pub(crate) fn allocate_texture(
        &mut self,
        descriptor: &TextureDescriptor<'_>,
        owner: TextureOwner,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Texture> {
        let bpp = u64::from(descriptor.format.bytes_per_pixel());
        let level_sizes: Vec<u64> = (0..descriptor.mip_level_count)
            .map(|level| descriptor.size.mip_level_size(level).texel_count() * bpp)
            .collect();
        self.reserve(level_sizes.iter().sum())?;

        let mut levels: Vec<Vec<u8>> = level_sizes
            .iter()
            .map(|&len| vec![0u8; len as usize])
            .collect();
        if let (Some(data), Some(base)) = (initial_data, levels.first_mut()) {
            let len = base.len().min(data.len());
            base[..len].copy_from_slice(&data[..len]);
        }

        let id = self.textures.insert_with_key(|id| TextureMemory {
            texture: Texture::from_descriptor(id, descriptor),
            owner,
            levels,
        });
        self.textures.get(id).map(|memory| memory.texture)
    }

    pub(crate) fn free_texture(&mut self, id: TextureId) -> GraphicsResult<TextureMemory> {
        let memory = self.textures.remove(id)?;
        self.allocated = self.allocated.saturating_sub(memory.byte_size());
        Ok(memory)
    }

    pub(crate) fn texture(&self, id: TextureId) -> GraphicsResult<&TextureMemory> {
        self.textures.get(id)
    }

    pub(crate) fn allocate_buffer(
        &mut self,
        descriptor: &BufferDescriptor<'_>,
        initial_data: Option<&[u8]>,
    ) -> GraphicsResult<Buffer> {
        self.reserve(descriptor.size)?;
        let mut bytes = vec![0u8; descriptor.size as usize];
        if let Some(data) = initial_data {
            let len = bytes.len().min(data.len());
            bytes[..len].copy_from_slice(&data[..len]);
        }
        let buffer = Buffer {
            id: Default::default(),
            size: descriptor.size,
            usage: descriptor.usage,
        };
        let id = self.buffers.insert_with_key(|id| BufferMemory {
            buffer: Buffer { id, ..buffer },
            bytes,
        });
        Ok(Buffer { id, ..buffer })
    }

    pub(crate) fn free_buffer(&mut self, id: BufferId) -> GraphicsResult<()> {
        let memory = self.buffers.remove(id)?;
        self.allocated = self.allocated.saturating_sub(memory.bytes.len() as u64);
        Ok(())
    }

    pub(crate) fn write_buffer(&mut self, id: BufferId, offset: u64, data: &[u8]) -> GraphicsResult<()> {
        let memory = self.buffers.get_mut(id)?;
        let range = byte_range(offset, data.len() as u64, memory.bytes.len())?;
        memory.bytes[range].copy_from_slice(data);
        Ok(())
    }

    pub(crate) fn read_buffer(&self, id: BufferId, offset: u64, size: u64) -> GraphicsResult<Vec<u8>> {
        let memory = self.buffers.get(id)?;
        let range = byte_range(offset, size, memory.bytes.len())?;
        Ok(memory.bytes[range].to_vec())
    }

    pub(crate) fn copy_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    ) -> GraphicsResult<()> {
        let data = self.read_buffer(source, source_offset, size)?;
        self.write_buffer(destination, destination_offset, &data)
    }

    pub(crate) fn write_texture(
        &mut self,
        id: TextureId,
        region: &TextureRegion,
        data: &[u8],
        layout: &BufferTextureLayout,
    ) -> GraphicsResult<()> {
        let memory = self.textures.get_mut(id)?;
        check_span(layout, region, memory.texture, data.len())?;
        memory.write_region(region, data, layout)
    }

    pub(crate) fn read_texture(
        &self,
        id: TextureId,
        region: &TextureRegion,
        out: &mut [u8],
        layout: &BufferTextureLayout,
    ) -> GraphicsResult<()> {
        let memory = self.textures.get(id)?;
        check_span(layout, region, memory.texture, out.len())?;
        memory.read_region(region, out, layout)
    }

    /// Fills every texel of mip level 0 with `texel`.
    pub(crate) fn fill_texture(&mut self, id: TextureId, texel: &[u8]) -> GraphicsResult<()> {
        let memory = self.textures.get_mut(id)?;
        let level = memory.level_mut(0)?;
        if texel.is_empty() {
            return Ok(());
        }
        for chunk in level.chunks_exact_mut(texel.len()) {
            chunk.copy_from_slice(texel);
        }
        Ok(())
    }

    /// Replaces the contents of mip level 0.
    pub(crate) fn fill_level(&mut self, id: TextureId, data: Vec<u8>) -> GraphicsResult<()> {
        let level = self.textures.get_mut(id)?.level_mut(0)?;
        if level.len() != data.len() {
            return Err(GraphicsError::InvalidOperation(format!(
                "expected {} bytes for mip level 0, got {}",
                level.len(),
                data.len()
            )));
        }
        *level = data;
        Ok(())
    }

    /// Releases everything and resets the budget.
    pub(crate) fn clear(&mut self) {
        self.textures.drain().for_each(drop);
        self.buffers.drain().for_each(drop);
        self.allocated = 0;
    }
}

fn byte_range(offset: u64, size: u64, len: usize) -> GraphicsResult<std::ops::Range<usize>> {
    match offset.checked_add(size) {
        Some(end) if end <= len as u64 => Ok(offset as usize..end as usize),
        _ => Err(GraphicsError::InvalidOperation(format!(
            "range {offset}+{size} lies outside a buffer of {len} bytes"
        ))),
    }
}

fn check_span(
    layout: &BufferTextureLayout,
    region: &TextureRegion,
    texture: Texture,
    available: usize,
) -> GraphicsResult<()> {
    let span = layout.span(region.size, texture.format);
    if !layout.fits(region.size, texture.format)
        || layout.offset.saturating_add(span) > available as u64
    {
        return Err(GraphicsError::InvalidOperation(format!(
            "{available} bytes laid out as {layout:?} cannot hold {:?} texels",
            region.size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::math::{Extent3D, Origin3D};
    use vela_core::renderer::{BufferUsage, TextureFormat, TextureUsage};

    #[test]
    fn budget_is_enforced_and_released() {
        let mut memory = SoftwareMemory::new(100);
        let buffer = memory
            .allocate_buffer(&BufferDescriptor::new(64, BufferUsage::VERTEX), None)
            .unwrap();
        let err = memory
            .allocate_buffer(&BufferDescriptor::new(64, BufferUsage::VERTEX), None)
            .unwrap_err();
        assert_eq!(
            err,
            GraphicsError::OutOfMemory {
                requested: 64,
                available: 36
            }
        );
        memory.free_buffer(buffer.id).unwrap();
        assert_eq!(memory.allocated(), 0);
    }

    #[test]
    fn texture_regions_round_trip_through_padded_rows() {
        let mut memory = SoftwareMemory::new(1 << 20);
        let desc = TextureDescriptor::new_2d(4, 4, TextureFormat::R8Unorm, TextureUsage::COPY_DST);
        let texture = memory
            .allocate_texture(&desc, TextureOwner::Standalone, None)
            .unwrap();

        let region = TextureRegion {
            origin: Origin3D::new(1, 1, 0),
            size: Extent3D::new_2d(2, 2),
            mip_level: 0,
        };
        let layout = BufferTextureLayout {
            offset: 0,
            bytes_per_row: 8,
            rows_per_image: 2,
        };
        let data = [1, 2, 0, 0, 0, 0, 0, 0, 3, 4];
        memory.write_texture(texture.id, &region, &data, &layout).unwrap();

        let level = &memory.texture(texture.id).unwrap().levels[0];
        assert_eq!(&level[4..8], &[0, 1, 2, 0]);
        assert_eq!(&level[8..12], &[0, 3, 4, 0]);

        let mut out = [0u8; 10];
        memory.read_texture(texture.id, &region, &mut out, &layout).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn out_of_range_buffer_write_is_rejected() {
        let mut memory = SoftwareMemory::new(1 << 20);
        let buffer = memory
            .allocate_buffer(&BufferDescriptor::new(8, BufferUsage::COPY_DST), None)
            .unwrap();
        assert!(memory.write_buffer(buffer.id, 4, &[0; 8]).is_err());
        assert!(memory.write_buffer(buffer.id, 4, &[0; 4]).is_ok());
    }
}
