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

//! Shared fixtures for the recovery integration tests.

#![allow(dead_code)]

use rekindle_agents::{ApplyServices, RecoveryServices, RetryLoader};
use rekindle_core::locale::EnglishCatalog;
use rekindle_core::storage::ProfileStore;
use rekindle_core::{
    BackgroundContext, MainContext, MainTask, PlayerId, PlayerIdentity, RecoveryConfig,
    RepeatingTask, Scheduler, SchedulerError, TaskControl, TaskHandle, Ticks,
};
use rekindle_infra::{
    ChannelNotifier, InMemoryProfileStore, InMemoryScoreboard, InMemorySessionRegistry,
    Notification, PresenceTracker,
};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

struct Repeating {
    handle: TaskHandle,
    task: Arc<dyn RepeatingTask>,
    delay: Ticks,
    period: Ticks,
}

struct Queued {
    handle: TaskHandle,
    task: Box<dyn MainTask>,
    delay: Ticks,
}

/// A scheduler the test drives by hand: nothing runs until asked.
#[derive(Default)]
pub struct ManualScheduler {
    repeating: Mutex<Vec<Repeating>>,
    main: Mutex<VecDeque<Queued>>,
    cancelled: Mutex<HashSet<TaskHandle>>,
    next_handle: AtomicU64,
    refuse: AtomicBool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later submission fail as if the host had shut down.
    pub fn refuse_submissions(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    /// Runs every live repeating task once, dropping those that stop.
    pub fn run_repeating(&self, ctx: &BackgroundContext) -> usize {
        let tasks: Vec<(TaskHandle, Arc<dyn RepeatingTask>)> = self
            .repeating
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.handle, Arc::clone(&r.task)))
            .collect();

        let mut ran = 0;
        for (handle, task) in tasks {
            if self.is_cancelled(handle) {
                continue;
            }
            ran += 1;
            if task.run(ctx) == TaskControl::Stop {
                self.repeating.lock().unwrap().retain(|r| r.handle != handle);
            }
        }
        ran
    }

    /// Runs queued main tasks, including any they submit, ignoring delays.
    pub fn run_main_tasks(&self, ctx: &MainContext) -> usize {
        let mut ran = 0;
        loop {
            // Popped outside the lock so a task can submit more work.
            let next = self.main.lock().unwrap().pop_front();
            let Some(queued) = next else {
                return ran;
            };
            if self.is_cancelled(queued.handle) {
                continue;
            }
            queued.task.run(ctx);
            ran += 1;
        }
    }

    /// Delays of the main tasks waiting to run, in submission order.
    pub fn main_delays(&self) -> Vec<Ticks> {
        self.main.lock().unwrap().iter().map(|q| q.delay).collect()
    }

    pub fn main_queued(&self) -> usize {
        self.main.lock().unwrap().len()
    }

    /// `(delay, period)` of each live repeating task.
    pub fn repeating_schedule(&self) -> Vec<(Ticks, Ticks)> {
        self.repeating
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.delay, r.period))
            .collect()
    }

    pub fn repeating_len(&self) -> usize {
        self.repeating.lock().unwrap().len()
    }

    pub fn is_cancelled(&self, handle: TaskHandle) -> bool {
        self.cancelled.lock().unwrap().contains(&handle)
    }

    fn next_handle(&self) -> Result<TaskHandle, SchedulerError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(SchedulerError::ShutDown);
        }
        Ok(TaskHandle::from_raw(
            self.next_handle.fetch_add(1, Ordering::SeqCst) + 1,
        ))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(
        &self,
        task: Arc<dyn RepeatingTask>,
        delay: Ticks,
        period: Ticks,
    ) -> Result<TaskHandle, SchedulerError> {
        let handle = self.next_handle()?;
        self.repeating.lock().unwrap().push(Repeating {
            handle,
            task,
            delay,
            period,
        });
        Ok(handle)
    }

    fn schedule_once_delayed(
        &self,
        task: Box<dyn MainTask>,
        delay: Ticks,
    ) -> Result<TaskHandle, SchedulerError> {
        let handle = self.next_handle()?;
        self.main.lock().unwrap().push_back(Queued {
            handle,
            task,
            delay,
        });
        Ok(handle)
    }

    fn cancel(&self, handle: TaskHandle) {
        self.cancelled.lock().unwrap().insert(handle);
    }
}

/// One connected player plus in-memory collaborators.
pub struct Harness {
    pub identity: PlayerIdentity,
    pub store: Arc<InMemoryProfileStore>,
    pub presence: Arc<PresenceTracker>,
    pub sessions: Arc<InMemorySessionRegistry>,
    pub notifier: Arc<ChannelNotifier>,
    pub scoreboard: Arc<InMemoryScoreboard>,
    pub scheduler: Arc<ManualScheduler>,
    pub config: RecoveryConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RecoveryConfig::default())
    }

    pub fn with_config(config: RecoveryConfig) -> Self {
        Self::build("Steve", config)
    }

    /// A harness whose player goes by `name`.
    pub fn named(name: &str) -> Self {
        Self::build(name, RecoveryConfig::default())
    }

    fn build(name: &str, config: RecoveryConfig) -> Self {
        let identity = PlayerIdentity::new(name, PlayerId::offline(name));
        let presence = Arc::new(PresenceTracker::new());
        presence.connect(*identity.id());
        Self {
            identity,
            store: Arc::new(InMemoryProfileStore::new()),
            presence,
            sessions: Arc::new(InMemorySessionRegistry::new()),
            notifier: Arc::new(ChannelNotifier::new()),
            scoreboard: Arc::new(InMemoryScoreboard::new()),
            scheduler: Arc::new(ManualScheduler::new()),
            config,
        }
    }

    pub fn player(&self) -> PlayerId {
        *self.identity.id()
    }

    pub fn apply_services(&self) -> ApplyServices {
        ApplyServices {
            presence: self.presence.clone(),
            sessions: self.sessions.clone(),
            notifier: self.notifier.clone(),
            messages: Arc::new(EnglishCatalog),
            scoreboard: self.scoreboard.clone(),
            config: Arc::new(self.config),
            scheduler: self.scheduler.clone(),
            scoreboard_keep_delay: self.config.scoreboard_keep_delay_ticks,
        }
    }

    pub fn services(&self) -> RecoveryServices {
        self.services_with_store(self.store.clone())
    }

    pub fn services_with_store(&self, store: Arc<dyn ProfileStore>) -> RecoveryServices {
        RecoveryServices {
            store,
            apply: self.apply_services(),
        }
    }

    pub fn loader(&self) -> RetryLoader {
        RetryLoader::new(
            self.identity.clone(),
            self.services(),
            self.config.max_attempts,
        )
    }

    /// Texts of the direct messages delivered so far, one entry per message.
    pub fn direct_messages(&self, notifications: &[Notification]) -> Vec<String> {
        notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Direct { message, .. } => {
                    Some(message.lines().collect::<Vec<_>>().join("\n"))
                }
                Notification::Broadcast { .. } => None,
            })
            .collect()
    }

    pub fn broadcasts(&self, notifications: &[Notification]) -> Vec<String> {
        notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Broadcast { text, .. } => Some(text.clone()),
                Notification::Direct { .. } => None,
            })
            .collect()
    }
}
