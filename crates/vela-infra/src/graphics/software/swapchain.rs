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

//! A headless swap chain whose back buffers are ordinary CPU textures.

use super::memory::{SoftwareMemory, TextureOwner};
use vela_core::math::Extent3D;
use vela_core::renderer::{
    GraphicsError, GraphicsResult, SwapChain, SwapChainDescriptor, Texture, TextureDescriptor,
    TextureUsage,
};

#[derive(Debug)]
pub(crate) struct SoftwareSwapChain {
    info: SwapChain,
    vsync: bool,
    back_buffers: Vec<Texture>,
    current: usize,
    acquired: bool,
    frame: u64,
}

impl SoftwareSwapChain {
    const BACK_BUFFER_USAGE: TextureUsage = TextureUsage::RENDER_ATTACHMENT
        .union(TextureUsage::COPY_SRC)
        .union(TextureUsage::COPY_DST)
        .union(TextureUsage::TEXTURE_BINDING);

    pub(crate) fn new(memory: &mut SoftwareMemory, descriptor: &SwapChainDescriptor) -> GraphicsResult<Self> {
        let info = SwapChain {
            width: descriptor.width,
            height: descriptor.height,
            format: descriptor.format,
            buffer_count: descriptor.buffer_count,
        };
        let back_buffers = Self::allocate(memory, &info)?;
        Ok(Self {
            info,
            vsync: descriptor.vsync,
            back_buffers,
            current: 0,
            acquired: false,
            frame: 0,
        })
    }

    fn allocate(memory: &mut SoftwareMemory, info: &SwapChain) -> GraphicsResult<Vec<Texture>> {
        let descriptor = TextureDescriptor {
            size: Extent3D::new_2d(info.width, info.height),
            format: info.format,
            usage: Self::BACK_BUFFER_USAGE,
            ..TextureDescriptor::default()
        };
        let mut back_buffers = Vec::with_capacity(info.buffer_count as usize);
        for _ in 0..info.buffer_count {
            match memory.allocate_texture(&descriptor, TextureOwner::SwapChain, None) {
                Ok(texture) => back_buffers.push(texture),
                Err(e) => {
                    for texture in back_buffers {
                        let _ = memory.free_texture(texture.id);
                    }
                    return Err(e);
                }
            }
        }
        Ok(back_buffers)
    }

    pub(crate) fn info(&self) -> SwapChain {
        self.info
    }

    pub(crate) fn vsync(&self) -> bool {
        self.vsync
    }

    pub(crate) fn frame(&self) -> u64 {
        self.frame
    }

    /// Reallocates every back buffer at the new size. Old back buffer handles die.
    ///
    /// On failure the chain keeps its previous size and stays usable.
    pub(crate) fn resize(&mut self, memory: &mut SoftwareMemory, width: u32, height: u32) -> GraphicsResult<SwapChain> {
        let info = SwapChain {
            width,
            height,
            ..self.info
        };
        let back_buffers = match Self::allocate(memory, &info) {
            Ok(back_buffers) => {
                self.release(memory);
                back_buffers
            }
            // Both sets may not fit at once; retry in the space the old set frees.
            Err(_) => {
                self.release(memory);
                match Self::allocate(memory, &info) {
                    Ok(back_buffers) => back_buffers,
                    Err(e) => {
                        self.restore(memory)?;
                        return Err(GraphicsError::ResizeFailed {
                            width,
                            height,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        };
        self.back_buffers = back_buffers;
        self.info = info;
        self.current = 0;
        self.acquired = false;
        Ok(info)
    }

    /// Reallocates back buffers at the current size after they were released.
    fn restore(&mut self, memory: &mut SoftwareMemory) -> GraphicsResult<()> {
        self.back_buffers = Self::allocate(memory, &self.info)?;
        self.current = 0;
        self.acquired = false;
        log::warn!(
            "SoftwareSwapChain: resize failed, back buffers restored at {}x{}",
            self.info.width,
            self.info.height
        );
        Ok(())
    }

    pub(crate) fn acquire(&mut self) -> GraphicsResult<Texture> {
        if self.acquired {
            return Err(GraphicsError::invalid_operation(
                "the back buffer was already acquired this frame",
            ));
        }
        let texture = self.back_buffers.get(self.current).copied().ok_or_else(|| {
            GraphicsError::invalid_operation("the swap chain has no back buffers")
        })?;
        self.acquired = true;
        Ok(texture)
    }

    pub(crate) fn present(&mut self) -> GraphicsResult<()> {
        if !self.acquired {
            return Err(GraphicsError::PresentFailed(
                "no back buffer was acquired this frame".to_string(),
            ));
        }
        self.acquired = false;
        self.current = (self.current + 1) % self.back_buffers.len().max(1);
        self.frame += 1;
        Ok(())
    }

    /// Frees every back buffer.
    pub(crate) fn release(&mut self, memory: &mut SoftwareMemory) {
        for texture in self.back_buffers.drain(..) {
            let _ = memory.free_texture(texture.id);
        }
    }
}
