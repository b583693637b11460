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

//! Thread-backed implementation of the [`Scheduler`] contract.

use crate::main_thread::{Envelope, MainThread, PendingSet};
use crate::registry::RepeatingTaskRegistry;
use crossbeam_channel::{Receiver, Sender};
use rekindle_core::context::NOMINAL_TICK;
use rekindle_core::{
    BackgroundContext, MainTask, RecoveryConfig, RepeatingTask, Scheduler, SchedulerError,
    TaskHandle, Ticks,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Configuration for the [`ThreadedScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Wall-clock length of one tick.
    pub tick_length: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_length: NOMINAL_TICK,
        }
    }
}

impl From<&RecoveryConfig> for SchedulerConfig {
    fn from(config: &RecoveryConfig) -> Self {
        Self {
            tick_length: config.tick_length(),
        }
    }
}

enum Command {
    Register {
        handle: TaskHandle,
        task: Arc<dyn RepeatingTask>,
        delay: Ticks,
        period: Ticks,
    },
    Cancel(TaskHandle),
}

/// A two-context scheduler.
///
/// Repeating units run sequentially on one background worker thread, ticking
/// at a fixed rate. Main-context units are forwarded to the [`MainThread`]
/// returned by [`new`](Self::new).
pub struct ThreadedScheduler {
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    command_tx: Sender<Command>,
    command_rx: Mutex<Option<Receiver<Command>>>,
    main_tx: Sender<Envelope>,
    pending_main: PendingSet,
    next_handle: AtomicU64,
}

impl ThreadedScheduler {
    /// Creates a scheduler and the main-context pump that goes with it.
    ///
    /// Repeating units submitted before [`start`](Self::start) wait for the
    /// worker to come up.
    pub fn new(config: SchedulerConfig) -> (Self, MainThread) {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (main_tx, main_rx) = crossbeam_channel::unbounded();
        let pending_main: PendingSet = Arc::new(Mutex::new(HashSet::new()));

        let scheduler = Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            command_tx,
            command_rx: Mutex::new(Some(command_rx)),
            main_tx,
            pending_main: Arc::clone(&pending_main),
            next_handle: AtomicU64::new(1),
        };
        (scheduler, MainThread::new(main_rx, pending_main))
    }

    /// Starts the background worker thread.
    ///
    /// A scheduler cannot be restarted once stopped.
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let Some(command_rx) = self
            .command_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            self.running.store(false, Ordering::SeqCst);
            return Err(SchedulerError::ShutDown);
        };

        let running = Arc::clone(&self.running);
        let tick_length = self.config.tick_length;

        let spawned = thread::Builder::new()
            .name("rekindle-background".to_string())
            .spawn(move || {
                let ctx = BackgroundContext::assume_current_thread();
                let mut registry = RepeatingTaskRegistry::new();
                let mut tick: u64 = 0;

                log::info!("ThreadedScheduler: Background thread started.");

                while running.load(Ordering::Relaxed) {
                    let start_time = Instant::now();

                    // 1. Ingest pending commands
                    while let Ok(command) = command_rx.try_recv() {
                        match command {
                            Command::Register {
                                handle,
                                task,
                                delay,
                                period,
                            } => {
                                let first_due = tick.saturating_add(delay.0);
                                registry.register(handle, task, first_due, period);
                            }
                            Command::Cancel(handle) => {
                                if registry.cancel(handle) {
                                    log::debug!("ThreadedScheduler: Cancelled {}", handle);
                                }
                            }
                        }
                    }

                    // 2. Run due units
                    registry.run_due(tick, &ctx);
                    tick += 1;

                    // 3. Sleep until next tick
                    let elapsed = start_time.elapsed();
                    if elapsed < tick_length {
                        thread::sleep(tick_length - elapsed);
                    }
                }

                log::info!(
                    "ThreadedScheduler: Background thread stopped ({} units dropped).",
                    registry.len()
                );
            });

        match spawned {
            Ok(handle) => {
                *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(SchedulerError::Spawn(e.to_string()))
            }
        }
    }

    /// Stops the background worker and waits for the current tick to finish.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            // Dropped from inside a unit: the loop exits on its own.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("ThreadedScheduler: Background thread panicked.");
            }
        }
    }

    /// Returns `true` while the background worker is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Wall-clock length of one tick.
    pub fn tick_length(&self) -> Duration {
        self.config.tick_length
    }

    fn allocate_handle(&self) -> TaskHandle {
        TaskHandle::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    fn pending_main(&self) -> std::sync::MutexGuard<'_, HashSet<TaskHandle>> {
        self.pending_main
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ThreadedScheduler {
    fn schedule_repeating(
        &self,
        task: Arc<dyn RepeatingTask>,
        delay: Ticks,
        period: Ticks,
    ) -> Result<TaskHandle, SchedulerError> {
        let handle = self.allocate_handle();
        self.command_tx
            .send(Command::Register {
                handle,
                task,
                delay,
                period,
            })
            .map_err(|_| SchedulerError::ShutDown)?;
        Ok(handle)
    }

    fn schedule_once_delayed(
        &self,
        task: Box<dyn MainTask>,
        delay: Ticks,
    ) -> Result<TaskHandle, SchedulerError> {
        let handle = self.allocate_handle();
        let due = Instant::now() + delay.as_duration(self.config.tick_length);

        self.pending_main().insert(handle);
        if self.main_tx.send(Envelope { handle, due, task }).is_err() {
            self.pending_main().remove(&handle);
            return Err(SchedulerError::ShutDown);
        }
        Ok(handle)
    }

    fn cancel(&self, handle: TaskHandle) {
        if self.pending_main().remove(&handle) {
            log::debug!("ThreadedScheduler: Cancelled main-context {}", handle);
            return;
        }
        // The worker may already be gone; nothing left to cancel then.
        let _ = self.command_tx.send(Command::Cancel(handle));
    }
}

impl Drop for ThreadedScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
