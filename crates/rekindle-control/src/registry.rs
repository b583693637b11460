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

//! Registry of repeating units and their due ticks.

use rekindle_core::{BackgroundContext, RepeatingTask, TaskControl, TaskHandle, Ticks};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Entry in the registry containing the unit and its schedule.
struct TaskEntry {
    handle: TaskHandle,
    task: Arc<dyn RepeatingTask>,
    period: Ticks,
    next_due: u64,
}

/// Registry that owns every live repeating unit.
///
/// Units are invoked one after another in registration order, so a unit can
/// never overlap with itself when driven by a single worker.
pub struct RepeatingTaskRegistry {
    entries: Vec<TaskEntry>,
}

impl RepeatingTaskRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a unit whose first invocation is due at tick `first_due`.
    pub fn register(
        &mut self,
        handle: TaskHandle,
        task: Arc<dyn RepeatingTask>,
        first_due: u64,
        period: Ticks,
    ) {
        log::debug!(
            "RepeatingTaskRegistry: Registered '{}' as {} (first due at tick {}, every {})",
            task.name(),
            handle,
            first_due,
            period
        );

        self.entries.push(TaskEntry {
            handle,
            task,
            period,
            next_due: first_due,
        });
    }

    /// Drops the unit behind `handle`. Returns `false` if it was not registered.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        before != self.entries.len()
    }

    /// Returns `true` if `handle` is still registered.
    pub fn contains(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Returns the number of registered units.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invokes every unit due at `tick` and returns how many ran.
    ///
    /// Units that return [`TaskControl::Stop`] or panic are removed.
    pub fn run_due(&mut self, tick: u64, ctx: &BackgroundContext) -> usize {
        let mut invoked = 0;

        self.entries.retain_mut(|entry| {
            if entry.next_due > tick {
                return true;
            }
            invoked += 1;

            match panic::catch_unwind(AssertUnwindSafe(|| entry.task.run(ctx))) {
                Ok(TaskControl::Continue) => {
                    entry.next_due = tick.saturating_add(entry.period.0.max(1));
                    true
                }
                Ok(TaskControl::Stop) => {
                    log::debug!(
                        "RepeatingTaskRegistry: '{}' ({}) finished",
                        entry.task.name(),
                        entry.handle
                    );
                    false
                }
                Err(_) => {
                    log::error!(
                        "RepeatingTaskRegistry: '{}' ({}) panicked, dropping it",
                        entry.task.name(),
                        entry.handle
                    );
                    false
                }
            }
        });

        invoked
    }
}

impl Default for RepeatingTaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
