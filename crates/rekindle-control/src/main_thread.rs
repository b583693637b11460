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

//! The main-context side of the scheduler.

use crossbeam_channel::Receiver;
use rekindle_core::{MainContext, MainTask, TaskHandle};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Handles of main-context units that have been submitted and not cancelled.
pub(crate) type PendingSet = Arc<Mutex<HashSet<TaskHandle>>>;

/// A main-context unit in flight from a submitter to the pump.
pub(crate) struct Envelope {
    pub(crate) handle: TaskHandle,
    pub(crate) due: Instant,
    pub(crate) task: Box<dyn MainTask>,
}

struct Queued {
    due: Instant,
    seq: u64,
    handle: TaskHandle,
    task: Box<dyn MainTask>,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Reversed so the heap yields the earliest due unit first, FIFO among equals.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Runs main-context units on the thread that owns session state.
///
/// The host calls [`pump`](Self::pump) once per main-loop turn. Units submitted
/// while a pump is running are picked up by the next one.
pub struct MainThread {
    receiver: Receiver<Envelope>,
    queue: BinaryHeap<Queued>,
    pending: PendingSet,
    next_seq: u64,
}

impl MainThread {
    pub(crate) fn new(receiver: Receiver<Envelope>, pending: PendingSet) -> Self {
        Self {
            receiver,
            queue: BinaryHeap::new(),
            pending,
            next_seq: 0,
        }
    }

    /// Runs every unit that is due now. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        self.pump_at(Instant::now())
    }

    /// Runs every unit due at or before `now`. Returns how many ran.
    pub fn pump_at(&mut self, now: Instant) -> usize {
        self.ingest();

        let ctx = MainContext::assume_current_thread();
        let ctx_ref = &ctx;
        let mut ran = 0;

        while self.queue.peek().is_some_and(|queued| queued.due <= now) {
            let Some(queued) = self.queue.pop() else {
                break;
            };
            if !self.claim(queued.handle) {
                log::trace!("MainThread: Skipping cancelled {}", queued.handle);
                continue;
            }

            let task = queued.task;
            if panic::catch_unwind(AssertUnwindSafe(move || task.run(ctx_ref))).is_err() {
                log::error!("MainThread: {} panicked", queued.handle);
            }
            ran += 1;
        }

        ran
    }

    /// Pumps until `done` returns `true` or `timeout` elapses.
    ///
    /// Returns whether `done` was satisfied. Sleeps between pumps, so this is
    /// meant for hosts and tests without a main loop of their own.
    pub fn run_until(&mut self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep((deadline - now).min(Duration::from_millis(1)));
        }
    }

    /// Number of units waiting to run, including cancelled ones not yet discarded.
    pub fn queued(&self) -> usize {
        self.queue.len() + self.receiver.len()
    }

    /// When the earliest queued unit becomes due.
    pub fn next_due(&mut self) -> Option<Instant> {
        self.ingest();
        self.queue.peek().map(|queued| queued.due)
    }

    fn ingest(&mut self) {
        while let Ok(envelope) = self.receiver.try_recv() {
            self.queue.push(Queued {
                due: envelope.due,
                seq: self.next_seq,
                handle: envelope.handle,
                task: envelope.task,
            });
            self.next_seq += 1;
        }
    }

    /// Removes `handle` from the pending set; `false` means it was cancelled.
    fn claim(&self, handle: TaskHandle) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle)
    }
}
