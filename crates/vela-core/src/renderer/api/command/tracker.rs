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

//! The command buffer state machine.

use crate::renderer::api::pipeline::PipelineKind;
use crate::renderer::error::{GraphicsError, GraphicsResult};

/// The lifecycle state of a command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandBufferState {
    /// Created and never begun.
    #[default]
    Initial,
    /// Between `begin` and `end`; commands may be recorded.
    Recording,
    /// Ended and eligible for submission.
    Executable,
    /// Handed to the device.
    Submitted,
}

/// Tracks which commands are legal on one command buffer.
///
/// This is a pure state machine with no knowledge of any backend. Every
/// transition either succeeds and updates the state or fails with
/// [`GraphicsError::InvalidOperation`] and leaves the state untouched.
#[derive(Debug, Clone, Default)]
pub struct CommandTracker {
    state: CommandBufferState,
    in_render_pass: bool,
    debug_group_depth: u32,
    bound_pipeline: Option<PipelineKind>,
    index_buffer_bound: bool,
}

impl CommandTracker {
    /// A tracker for a freshly created command buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> CommandBufferState {
        self.state
    }

    /// Whether a render pass is open.
    pub fn in_render_pass(&self) -> bool {
        self.in_render_pass
    }

    /// The number of debug groups opened and not yet closed.
    pub fn debug_group_depth(&self) -> u32 {
        self.debug_group_depth
    }

    /// `Initial -> Recording`, or `Submitted -> Recording` when the device can
    /// reset submitted command buffers.
    pub fn begin(&mut self, reset_supported: bool) -> GraphicsResult<()> {
        match self.state {
            CommandBufferState::Initial => {}
            CommandBufferState::Submitted if reset_supported => {}
            CommandBufferState::Submitted => {
                return Err(GraphicsError::invalid_operation(
                    "command buffer was submitted and the device cannot reset it",
                ))
            }
            other => {
                return Err(GraphicsError::InvalidOperation(format!(
                    "cannot begin a command buffer in the {other:?} state"
                )))
            }
        }
        *self = Self {
            state: CommandBufferState::Recording,
            ..Self::default()
        };
        Ok(())
    }

    /// `Recording -> Executable`. Fails while a render pass is open. Debug
    /// groups left open are only reported and then closed.
    pub fn end(&mut self) -> GraphicsResult<()> {
        self.require_recording("end")?;
        if self.in_render_pass {
            return Err(GraphicsError::invalid_operation(
                "cannot end a command buffer while a render pass is open",
            ));
        }
        if self.debug_group_depth != 0 {
            log::warn!(
                "Ending a command buffer with {} unclosed debug group(s)",
                self.debug_group_depth
            );
            self.debug_group_depth = 0;
        }
        self.state = CommandBufferState::Executable;
        Ok(())
    }

    /// `Executable -> Submitted`.
    pub fn submit(&mut self) -> GraphicsResult<()> {
        if self.state != CommandBufferState::Executable {
            return Err(GraphicsError::InvalidOperation(format!(
                "only an ended command buffer can be submitted, this one is {:?}",
                self.state
            )));
        }
        self.state = CommandBufferState::Submitted;
        Ok(())
    }

    /// Opens a render pass. Passes do not nest.
    pub fn begin_render_pass(&mut self) -> GraphicsResult<()> {
        self.require_recording("begin_render_pass")?;
        if self.in_render_pass {
            return Err(GraphicsError::invalid_operation(
                "a render pass is already open",
            ));
        }
        self.in_render_pass = true;
        self.reset_bindings();
        Ok(())
    }

    /// Closes the open render pass.
    pub fn end_render_pass(&mut self) -> GraphicsResult<()> {
        self.require_recording("end_render_pass")?;
        if !self.in_render_pass {
            return Err(GraphicsError::invalid_operation(
                "end_render_pass without a matching begin_render_pass",
            ));
        }
        self.in_render_pass = false;
        self.reset_bindings();
        Ok(())
    }

    /// Viewport and scissor state; needs an open render pass.
    pub fn set_dynamic_state(&mut self, command: &str) -> GraphicsResult<()> {
        self.require_render_pass(command)
    }

    /// Binds a pipeline. Graphics pipelines bind inside a render pass, compute
    /// pipelines outside.
    pub fn bind_pipeline(&mut self, kind: PipelineKind) -> GraphicsResult<()> {
        match kind {
            PipelineKind::Graphics => self.require_render_pass("bind a graphics pipeline")?,
            PipelineKind::Compute => self.require_no_render_pass("bind a compute pipeline")?,
        }
        self.bound_pipeline = Some(kind);
        Ok(())
    }

    /// Binds a vertex buffer; needs an open render pass.
    pub fn bind_vertex_buffer(&mut self) -> GraphicsResult<()> {
        self.require_render_pass("bind_vertex_buffer")
    }

    /// Binds an index buffer; needs an open render pass.
    pub fn bind_index_buffer(&mut self) -> GraphicsResult<()> {
        self.require_render_pass("bind_index_buffer")?;
        self.index_buffer_bound = true;
        Ok(())
    }

    /// Binds a uniform buffer or a texture, for draws or dispatches alike.
    pub fn bind_resource(&mut self, command: &str) -> GraphicsResult<()> {
        self.require_recording(command)
    }

    /// A non-indexed draw.
    pub fn draw(&mut self) -> GraphicsResult<()> {
        self.require_render_pass("draw")?;
        self.require_pipeline(PipelineKind::Graphics, "draw")
    }

    /// An indexed draw; also needs an index buffer.
    pub fn draw_indexed(&mut self) -> GraphicsResult<()> {
        self.require_render_pass("draw_indexed")?;
        self.require_pipeline(PipelineKind::Graphics, "draw_indexed")?;
        if !self.index_buffer_bound {
            return Err(GraphicsError::invalid_operation(
                "draw_indexed requires a bound index buffer",
            ));
        }
        Ok(())
    }

    /// A compute dispatch; needs a compute pipeline and no open render pass.
    pub fn dispatch(&mut self) -> GraphicsResult<()> {
        self.require_no_render_pass("dispatch")?;
        self.require_pipeline(PipelineKind::Compute, "dispatch")
    }

    /// Any copy command.
    pub fn copy(&mut self, command: &str) -> GraphicsResult<()> {
        self.require_no_render_pass(command)
    }

    /// Resource barriers are recorded between passes.
    pub fn barrier(&mut self) -> GraphicsResult<()> {
        self.require_no_render_pass("resource_barrier")
    }

    /// Opens a debug group.
    pub fn begin_debug_group(&mut self) -> GraphicsResult<()> {
        self.require_recording("begin_debug_group")?;
        self.debug_group_depth += 1;
        Ok(())
    }

    /// Closes the innermost debug group.
    pub fn end_debug_group(&mut self) -> GraphicsResult<()> {
        self.require_recording("end_debug_group")?;
        if self.debug_group_depth == 0 {
            return Err(GraphicsError::invalid_operation(
                "end_debug_group without a matching begin_debug_group",
            ));
        }
        self.debug_group_depth -= 1;
        Ok(())
    }

    fn reset_bindings(&mut self) {
        self.bound_pipeline = None;
        self.index_buffer_bound = false;
    }

    fn require_recording(&self, command: &str) -> GraphicsResult<()> {
        if self.state != CommandBufferState::Recording {
            return Err(GraphicsError::InvalidOperation(format!(
                "{command} requires a recording command buffer, this one is {:?}",
                self.state
            )));
        }
        Ok(())
    }

    fn require_render_pass(&self, command: &str) -> GraphicsResult<()> {
        self.require_recording(command)?;
        if !self.in_render_pass {
            return Err(GraphicsError::InvalidOperation(format!(
                "{command} requires an open render pass"
            )));
        }
        Ok(())
    }

    fn require_no_render_pass(&self, command: &str) -> GraphicsResult<()> {
        self.require_recording(command)?;
        if self.in_render_pass {
            return Err(GraphicsError::InvalidOperation(format!(
                "{command} is not allowed inside a render pass"
            )));
        }
        Ok(())
    }

    fn require_pipeline(&self, kind: PipelineKind, command: &str) -> GraphicsResult<()> {
        if self.bound_pipeline != Some(kind) {
            return Err(GraphicsError::InvalidOperation(format!(
                "{command} requires a bound {kind:?} pipeline"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> CommandTracker {
        let mut tracker = CommandTracker::new();
        tracker.begin(false).unwrap();
        tracker
    }

    #[test]
    fn full_lifecycle() {
        let mut tracker = CommandTracker::new();
        assert_eq!(tracker.state(), CommandBufferState::Initial);
        tracker.begin(false).unwrap();
        tracker.begin_render_pass().unwrap();
        tracker.bind_pipeline(PipelineKind::Graphics).unwrap();
        tracker.draw().unwrap();
        tracker.end_render_pass().unwrap();
        tracker.end().unwrap();
        assert_eq!(tracker.state(), CommandBufferState::Executable);
        tracker.submit().unwrap();
        assert_eq!(tracker.state(), CommandBufferState::Submitted);
    }

    #[test]
    fn submitted_buffer_restarts_only_with_reset_support() {
        let mut tracker = recording();
        tracker.end().unwrap();
        tracker.submit().unwrap();

        assert!(tracker.begin(false).is_err());
        assert_eq!(tracker.state(), CommandBufferState::Submitted);
        tracker.begin(true).unwrap();
        assert_eq!(tracker.state(), CommandBufferState::Recording);
    }

    #[test]
    fn commands_outside_recording_are_rejected() {
        let mut tracker = CommandTracker::new();
        assert!(tracker.begin_render_pass().is_err());
        assert!(tracker.copy("copy_buffer").is_err());
        assert!(tracker.end().is_err());
        assert!(tracker.submit().is_err());
    }

    #[test]
    fn render_passes_do_not_nest() {
        let mut tracker = recording();
        assert!(tracker.end_render_pass().is_err());
        tracker.begin_render_pass().unwrap();
        assert!(tracker.begin_render_pass().is_err());
        assert!(tracker.end().is_err());
        tracker.end_render_pass().unwrap();
        tracker.end().unwrap();
    }

    #[test]
    fn draw_requirements() {
        let mut tracker = recording();
        tracker.begin_render_pass().unwrap();
        assert!(tracker.draw().is_err());
        tracker.bind_pipeline(PipelineKind::Graphics).unwrap();
        tracker.draw().unwrap();
        assert!(tracker.draw_indexed().is_err());
        tracker.bind_index_buffer().unwrap();
        tracker.draw_indexed().unwrap();

        // Bindings do not survive the pass.
        tracker.end_render_pass().unwrap();
        tracker.begin_render_pass().unwrap();
        assert!(tracker.draw().is_err());
    }

    #[test]
    fn dispatch_and_copies_stay_outside_passes() {
        let mut tracker = recording();
        assert!(tracker.dispatch().is_err());
        tracker.bind_pipeline(PipelineKind::Compute).unwrap();
        tracker.dispatch().unwrap();

        tracker.begin_render_pass().unwrap();
        assert!(tracker.bind_pipeline(PipelineKind::Compute).is_err());
        assert!(tracker.dispatch().is_err());
        assert!(tracker.copy("copy_buffer").is_err());
        assert!(tracker.barrier().is_err());
    }

    #[test]
    fn debug_groups_must_balance() {
        let mut tracker = recording();
        assert!(tracker.end_debug_group().is_err());
        tracker.begin_debug_group().unwrap();
        tracker.begin_debug_group().unwrap();
        tracker.end_debug_group().unwrap();
        tracker.end_debug_group().unwrap();
        assert_eq!(tracker.debug_group_depth(), 0);
        tracker.end().unwrap();
    }

    #[test]
    fn unclosed_debug_groups_do_not_block_end() {
        let mut tracker = recording();
        tracker.begin_debug_group().unwrap();
        tracker.begin_debug_group().unwrap();

        tracker.end().unwrap();

        assert_eq!(tracker.state(), CommandBufferState::Executable);
        assert_eq!(tracker.debug_group_depth(), 0);
    }
}
