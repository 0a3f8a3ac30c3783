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

//! Bounding the amount of work in flight.

use crate::renderer::error::{GraphicsError, GraphicsResult};
use std::collections::VecDeque;

/// A monotonically increasing identifier for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionIndex(pub u64);

/// Tracks submitted-but-not-retired work against a frames-in-flight limit.
///
/// Submissions retire in order. A backend asks [`FrameTracker::is_full`] before
/// submitting and waits for the oldest submission to retire while it is.
#[derive(Debug, Clone)]
pub struct FrameTracker {
    max_frames_in_flight: u32,
    next_index: u64,
    in_flight: VecDeque<SubmissionIndex>,
    last_retired: Option<SubmissionIndex>,
}

impl FrameTracker {
    /// A tracker allowing `max_frames_in_flight` outstanding submissions.
    pub fn new(max_frames_in_flight: u32) -> Self {
        Self {
            max_frames_in_flight: max_frames_in_flight.max(1),
            next_index: 0,
            in_flight: VecDeque::new(),
            last_retired: None,
        }
    }

    /// The limit on outstanding submissions.
    pub fn max_frames_in_flight(&self) -> u32 {
        self.max_frames_in_flight
    }

    /// The number of outstanding submissions.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether another submission would exceed the limit.
    pub fn is_full(&self) -> bool {
        self.in_flight.len() >= self.max_frames_in_flight as usize
    }

    /// Whether nothing is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// The oldest outstanding submission.
    pub fn oldest_in_flight(&self) -> Option<SubmissionIndex> {
        self.in_flight.front().copied()
    }

    /// The most recently retired submission.
    pub fn last_retired(&self) -> Option<SubmissionIndex> {
        self.last_retired
    }

    /// Reserves the index for a new submission.
    pub fn begin_submission(&mut self) -> GraphicsResult<SubmissionIndex> {
        if self.is_full() {
            return Err(GraphicsError::InvalidOperation(format!(
                "{} submissions are already in flight",
                self.in_flight.len()
            )));
        }
        let index = SubmissionIndex(self.next_index);
        self.next_index += 1;
        self.in_flight.push_back(index);
        Ok(index)
    }

    /// Marks `index` and every earlier submission as retired.
    pub fn retire(&mut self, index: SubmissionIndex) {
        while let Some(front) = self.in_flight.front().copied() {
            if front > index {
                break;
            }
            self.in_flight.pop_front();
            self.last_retired = Some(front);
        }
    }

    /// Whether `index` has retired.
    pub fn is_retired(&self, index: SubmissionIndex) -> bool {
        self.last_retired.is_some_and(|last| last >= index)
    }
}
