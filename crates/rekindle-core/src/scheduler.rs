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

//! The host scheduler contract.
//!
//! Units of work come in two shapes:
//!
//! - [`RepeatingTask`]s run on the background context every period until they
//!   return [`TaskControl::Stop`] or are cancelled.
//! - [`MainTask`]s run once on the main context, immediately or after a delay.
//!
//! Units report nothing back to the scheduler beyond [`TaskControl`]; failures
//! inside a unit are the unit's own business to log.

use crate::context::{BackgroundContext, MainContext, Ticks};
use std::fmt;
use std::sync::Arc;

/// Opaque handle to a scheduled unit, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    /// Wraps a raw handle value allocated by a scheduler.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// What a repeating task wants after an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// Invoke again at the next period.
    Continue,
    /// Never invoke again.
    Stop,
}

/// A unit the scheduler invokes periodically on the background context.
pub trait RepeatingTask: Send + Sync {
    /// Runs one invocation.
    fn run(&self, ctx: &BackgroundContext) -> TaskControl;

    /// Short name used in scheduler logs.
    fn name(&self) -> &str {
        "repeating-task"
    }
}

/// A one-shot unit that runs on the main context.
pub trait MainTask: Send {
    /// Runs the unit, consuming it.
    fn run(self: Box<Self>, ctx: &MainContext);
}

impl<F> MainTask for F
where
    F: FnOnce(&MainContext) + Send,
{
    fn run(self: Box<Self>, ctx: &MainContext) {
        (*self)(ctx)
    }
}

/// Errors returned when submitting work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler no longer accepts work.
    #[error("scheduler has shut down")]
    ShutDown,
    /// The background worker could not be started.
    #[error("failed to spawn background worker: {0}")]
    Spawn(String),
}

/// Submits units of work to the host's execution contexts.
pub trait Scheduler: Send + Sync {
    /// Runs `task` on the background context after `delay`, then every `period`.
    fn schedule_repeating(
        &self,
        task: Arc<dyn RepeatingTask>,
        delay: Ticks,
        period: Ticks,
    ) -> Result<TaskHandle, SchedulerError>;

    /// Runs `task` once on the main context as soon as possible.
    fn schedule_once(&self, task: Box<dyn MainTask>) -> Result<TaskHandle, SchedulerError> {
        self.schedule_once_delayed(task, Ticks::ZERO)
    }

    /// Runs `task` once on the main context after `delay`.
    fn schedule_once_delayed(
        &self,
        task: Box<dyn MainTask>,
        delay: Ticks,
    ) -> Result<TaskHandle, SchedulerError>;

    /// Prevents any future invocation of the unit behind `handle`.
    ///
    /// An invocation already in flight is not interrupted.
    fn cancel(&self, handle: TaskHandle);
}
