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

//! Aggregates recovery telemetry events into counters.

use crossbeam_channel::{Receiver, Sender};
use rekindle_core::telemetry::RecoveryEvent;
use serde::Serialize;

/// Counters over every recovery cycle observed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecoverySummary {
    /// Fetches that came back unloaded.
    pub attempts_failed: u64,
    /// Cycles that loaded a profile.
    pub recovered: u64,
    /// Cycles that ran out of attempts.
    pub exhausted: u64,
    /// Cycles stopped because the player left during the fetch phase.
    pub abandoned: u64,
    /// Sessions registered by the apply phase.
    pub applied: u64,
    /// Apply phases skipped because the player had left.
    pub apply_aborted: u64,
}

impl RecoverySummary {
    /// Cycles that reached a terminal state in the fetch phase.
    pub fn cycles_finished(&self) -> u64 {
        self.recovered + self.exhausted + self.abandoned
    }

    /// Renders the summary as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn record(&mut self, event: &RecoveryEvent) {
        match event {
            RecoveryEvent::AttemptFailed { .. } => self.attempts_failed += 1,
            RecoveryEvent::Recovered { .. } => self.recovered += 1,
            RecoveryEvent::Exhausted { .. } => self.exhausted += 1,
            RecoveryEvent::Abandoned { .. } => self.abandoned += 1,
            RecoveryEvent::Applied { .. } => self.applied += 1,
            RecoveryEvent::ApplyAborted { .. } => self.apply_aborted += 1,
        }
    }
}

/// Receives [`RecoveryEvent`]s and folds them into a [`RecoverySummary`].
#[derive(Debug)]
pub struct RecoveryMonitor {
    receiver: Receiver<RecoveryEvent>,
    summary: RecoverySummary,
}

impl RecoveryMonitor {
    /// Creates a monitor and the sender the recovery flow reports through.
    pub fn new() -> (Self, Sender<RecoveryEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let monitor = Self {
            receiver,
            summary: RecoverySummary::default(),
        };
        (monitor, sender)
    }

    /// Folds every pending event into the counters and returns them.
    pub fn drain(&mut self) -> Vec<RecoveryEvent> {
        let events: Vec<_> = self.receiver.try_iter().collect();
        for event in &events {
            log::trace!("RecoveryMonitor: {:?}", event);
            self.summary.record(event);
        }
        events
    }

    /// Drains pending events and returns the counters.
    pub fn summary(&mut self) -> RecoverySummary {
        self.drain();
        self.summary
    }
}
