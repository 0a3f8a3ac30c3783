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

//! Swap chain descriptors.

use crate::platform::VelaWindowHandle;
use crate::renderer::api::util::TextureFormat;
use crate::renderer::error::ValidationError;
use std::fmt;

/// The inclusive range of back buffers a swap chain may rotate through.
pub const SWAP_CHAIN_BUFFER_COUNT: std::ops::RangeInclusive<u32> = 2..=3;

/// A descriptor used to create the swap chain.
#[derive(Clone)]
pub struct SwapChainDescriptor {
    /// Width of the back buffers in pixels.
    pub width: u32,
    /// Height of the back buffers in pixels.
    pub height: u32,
    /// Format of the back buffers.
    pub format: TextureFormat,
    /// Number of back buffers, 2 or 3.
    pub buffer_count: u32,
    /// Synchronizes presentation with the display refresh.
    pub vsync: bool,
    /// The window presented to. Headless backends accept `None`.
    pub window: Option<VelaWindowHandle>,
}

impl fmt::Debug for SwapChainDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapChainDescriptor")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("buffer_count", &self.buffer_count)
            .field("vsync", &self.vsync)
            .field("window", &self.window.is_some())
            .finish()
    }
}

impl SwapChainDescriptor {
    /// A double-buffered, vsynced swap chain without a window.
    pub fn headless(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            buffer_count: 2,
            vsync: true,
            window: None,
        }
    }

    /// Checks dimensions and buffer count.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.width == 0 {
            return Err(ValidationError::ZeroSize {
                what: "swap chain width",
            });
        }
        if self.height == 0 {
            return Err(ValidationError::ZeroSize {
                what: "swap chain height",
            });
        }
        if !SWAP_CHAIN_BUFFER_COUNT.contains(&self.buffer_count) {
            return Err(ValidationError::InvalidBufferCount(self.buffer_count));
        }
        Ok(())
    }
}

/// A description of the live swap chain, as returned by creation and resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapChain {
    /// Current width of the back buffers.
    pub width: u32,
    /// Current height of the back buffers.
    pub height: u32,
    /// Format of the back buffers.
    pub format: TextureFormat,
    /// Number of back buffers rotated through.
    pub buffer_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_count_is_bounded() {
        let mut desc = SwapChainDescriptor::headless(64, 64, TextureFormat::Rgba8Unorm);
        assert!(desc.validate().is_ok());
        desc.buffer_count = 4;
        assert_eq!(desc.validate(), Err(ValidationError::InvalidBufferCount(4)));
        desc.buffer_count = 1;
        assert_eq!(desc.validate(), Err(ValidationError::InvalidBufferCount(1)));
    }

    #[test]
    fn zero_height_is_rejected() {
        let desc = SwapChainDescriptor::headless(64, 0, TextureFormat::Bgra8Unorm);
        assert!(matches!(desc.validate(), Err(ValidationError::ZeroSize { .. })));
    }
}
