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

//! Command lists recorded by the software device.

use vela_core::math::{Extent3D, LinearRgba};
use vela_core::renderer::{
    BufferId, BufferTextureLayout, CommandTracker, StoreOp, TextureCopyLocation, TextureId,
};

/// One unit of work for the queue worker.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SoftwareCommand {
    ClearColor {
        texture: TextureId,
        color: LinearRgba,
    },
    ClearDepthStencil {
        texture: TextureId,
        depth: Option<f32>,
        stencil: Option<u32>,
    },
    Resolve {
        source: TextureId,
        destination: TextureId,
    },
    CopyBuffer {
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    },
    CopyTexture {
        source: TextureCopyLocation,
        destination: TextureCopyLocation,
        size: Extent3D,
    },
    CopyBufferToTexture {
        source: BufferId,
        layout: BufferTextureLayout,
        destination: TextureCopyLocation,
        size: Extent3D,
    },
    CopyTextureToBuffer {
        source: TextureCopyLocation,
        destination: BufferId,
        layout: BufferTextureLayout,
        size: Extent3D,
    },
    Draw {
        vertices: u32,
        instances: u32,
    },
    Dispatch {
        workgroups: [u32; 3],
    },
}

/// A resolve to perform when the open render pass ends.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingResolve {
    pub(crate) source: TextureId,
    pub(crate) destination: TextureId,
    pub(crate) store: StoreOp,
}

/// The commands and recording state of one command buffer.
#[derive(Debug, Default)]
pub(crate) struct SoftwareCommandList {
    pub(crate) tracker: CommandTracker,
    pub(crate) commands: Vec<SoftwareCommand>,
    pub(crate) pending_resolves: Vec<PendingResolve>,
    pub(crate) debug_groups: Vec<String>,
}

impl SoftwareCommandList {
    /// Discards everything recorded so far.
    pub(crate) fn reset(&mut self) {
        self.commands.clear();
        self.pending_resolves.clear();
        self.debug_groups.clear();
    }

    /// Emits the resolves of the pass being closed.
    pub(crate) fn finish_pass(&mut self) {
        for resolve in self.pending_resolves.drain(..) {
            if resolve.store == StoreOp::Store {
                self.commands.push(SoftwareCommand::Resolve {
                    source: resolve.source,
                    destination: resolve.destination,
                });
            }
        }
    }

    /// Hands the recorded commands over for submission.
    pub(crate) fn take_commands(&mut self) -> Vec<SoftwareCommand> {
        std::mem::take(&mut self.commands)
    }
}
