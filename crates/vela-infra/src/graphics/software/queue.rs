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

//! The software device queue: a worker thread that executes submitted command
//! lists in order.

use super::command::SoftwareCommand;
use super::executor::{self, QueueCounters, SoftwareStats};
use super::memory::SoftwareMemory;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use vela_core::renderer::{FrameTracker, GraphicsError, GraphicsResult, SubmissionIndex};

enum QueueMessage {
    Execute {
        index: SubmissionIndex,
        commands: Vec<SoftwareCommand>,
    },
}

struct Completion {
    index: SubmissionIndex,
    result: GraphicsResult<()>,
}

/// Locks device memory, turning a poisoned lock into a device failure.
pub(crate) fn lock_memory(memory: &Mutex<SoftwareMemory>) -> GraphicsResult<MutexGuard<'_, SoftwareMemory>> {
    memory.lock().map_err(|_| {
        GraphicsError::CommandSubmissionFailed("software device memory is poisoned".to_string())
    })
}

/// Owns the worker thread and the bookkeeping of work in flight.
#[derive(Debug)]
pub(crate) struct SoftwareQueue {
    sender: Option<flume::Sender<QueueMessage>>,
    completions: flume::Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
    frames: FrameTracker,
    counters: Arc<QueueCounters>,
    failure: Option<String>,
}

impl SoftwareQueue {
    /// Starts the worker thread.
    pub(crate) fn new(memory: Arc<Mutex<SoftwareMemory>>, max_frames_in_flight: u32) -> Self {
        let (sender, work) = flume::unbounded::<QueueMessage>();
        let (done, completions) = flume::unbounded::<Completion>();
        let counters = Arc::new(QueueCounters::default());
        let worker_counters = Arc::clone(&counters);

        let worker = thread::spawn(move || {
            log::debug!("Software queue worker started.");
            while let Ok(message) = work.recv() {
                match message {
                    QueueMessage::Execute { index, commands } => {
                        let result = lock_memory(&memory).and_then(|mut memory| {
                            executor::execute(&commands, &mut memory, &worker_counters)
                        });
                        if let Err(e) = &result {
                            log::error!("Software queue: submission {index:?} failed: {e}");
                        }
                        if done.send(Completion { index, result }).is_err() {
                            break;
                        }
                    }
                }
            }
            log::debug!("Software queue worker stopped.");
        });

        Self {
            sender: Some(sender),
            completions,
            worker: Some(worker),
            frames: FrameTracker::new(max_frames_in_flight),
            counters,
            failure: None,
        }
    }

    /// Queues a command list, blocking while the frames-in-flight limit is reached.
    pub(crate) fn submit(&mut self, commands: Vec<SoftwareCommand>) -> GraphicsResult<SubmissionIndex> {
        self.poll();
        self.take_failure()?;
        while self.frames.is_full() {
            self.wait_one()?;
        }
        self.take_failure()?;

        let index = self.frames.begin_submission()?;
        let sender = self.sender.as_ref().ok_or_else(|| {
            GraphicsError::CommandSubmissionFailed("software queue has shut down".to_string())
        })?;
        sender
            .send(QueueMessage::Execute { index, commands })
            .map_err(|_| {
                GraphicsError::CommandSubmissionFailed("software queue worker is gone".to_string())
            })?;
        log::trace!("Software queue: submitted {index:?}");
        Ok(index)
    }

    /// Collects finished submissions without blocking.
    pub(crate) fn poll(&mut self) {
        while let Ok(completion) = self.completions.try_recv() {
            self.complete(completion);
        }
    }

    /// Blocks until every submission has retired, then reports any failure.
    pub(crate) fn wait_idle(&mut self) -> GraphicsResult<()> {
        while !self.frames.is_idle() {
            self.wait_one()?;
        }
        self.take_failure()
    }

    /// Reports, once, the first failure seen since the last report.
    pub(crate) fn take_failure(&mut self) -> GraphicsResult<()> {
        match self.failure.take() {
            Some(reason) => Err(GraphicsError::CommandSubmissionFailed(reason)),
            None => Ok(()),
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.frames.in_flight()
    }

    pub(crate) fn stats(&self) -> SoftwareStats {
        self.counters.snapshot()
    }

    /// Stops the worker after it drains the work already queued.
    pub(crate) fn shutdown(&mut self) {
        self.sender = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Software queue worker panicked.");
            }
        }
        self.poll();
    }

    fn wait_one(&mut self) -> GraphicsResult<()> {
        let completion = self.completions.recv().map_err(|_| {
            GraphicsError::CommandSubmissionFailed("software queue worker is gone".to_string())
        })?;
        self.complete(completion);
        Ok(())
    }

    fn complete(&mut self, completion: Completion) {
        self.frames.retire(completion.index);
        if let Err(e) = completion.result {
            if self.failure.is_none() {
                self.failure = Some(format!("submission {} failed: {e}", completion.index.0));
            }
        }
    }
}

impl Drop for SoftwareQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}
