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

//! Entry point hosts use to start and abort profile recoveries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::Sender;
use rekindle_core::telemetry::RecoveryEvent;
use rekindle_core::{PlayerId, PlayerIdentity, RecoveryConfig, SchedulerError, TaskHandle};

use super::loader::RetryLoader;
use super::services::RecoveryServices;

/// An error that can occur when starting a recovery.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// The player already has a recovery in progress.
    #[error("a profile recovery is already running for {0}")]
    AlreadyRecovering(String),
    /// The scheduler refused the retry loop.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

struct ActiveRecovery {
    handle: TaskHandle,
    loader: Arc<RetryLoader>,
}

/// Starts, tracks, and aborts one recovery cycle per player.
pub struct ProfileRecoveryAgent {
    services: RecoveryServices,
    config: RecoveryConfig,
    active: Mutex<HashMap<PlayerId, ActiveRecovery>>,
    telemetry_sender: Option<Sender<RecoveryEvent>>,
}

impl ProfileRecoveryAgent {
    /// Creates a new `ProfileRecoveryAgent`.
    pub fn new(services: RecoveryServices, config: RecoveryConfig) -> Self {
        Self {
            services,
            config,
            active: Mutex::new(HashMap::new()),
            telemetry_sender: None,
        }
    }

    /// Attaches a sender for telemetry events, shared by every cycle it starts.
    pub fn with_telemetry_sender(mut self, sender: Sender<RecoveryEvent>) -> Self {
        self.telemetry_sender = Some(sender);
        self
    }

    /// Starts recovering the profile of a player whose initial load failed.
    ///
    /// The first attempt runs after `retry_delay_ticks`, then every
    /// `retry_period_ticks` until success, exhaustion, or disconnect.
    pub fn begin(&self, identity: PlayerIdentity) -> Result<TaskHandle, RecoveryError> {
        let mut active = self.active();
        Self::prune(&mut active);

        if active.contains_key(identity.id()) {
            return Err(RecoveryError::AlreadyRecovering(identity.name().to_owned()));
        }

        let mut loader = RetryLoader::new(
            identity.clone(),
            self.services.clone(),
            self.config.max_attempts,
        );
        if let Some(sender) = &self.telemetry_sender {
            loader = loader.with_telemetry_sender(sender.clone());
        }
        let loader = Arc::new(loader);

        let handle = self.services.apply.scheduler.schedule_repeating(
            loader.clone(),
            self.config.retry_delay_ticks,
            self.config.retry_period_ticks,
        )?;

        log::info!(
            "ProfileRecoveryAgent: Started recovery for {} as {} (up to {} attempts, every {})",
            identity,
            handle,
            self.config.max_attempts,
            self.config.retry_period_ticks
        );
        active.insert(*identity.id(), ActiveRecovery { handle, loader });
        Ok(handle)
    }

    /// Aborts the player's recovery. Returns `false` if none was running.
    pub fn abort(&self, player: &PlayerId) -> bool {
        let Some(recovery) = self.active().remove(player) else {
            return false;
        };
        let was_running = !recovery.loader.is_cancelled();
        recovery.loader.cancel();
        self.services.apply.scheduler.cancel(recovery.handle);
        if was_running {
            log::info!("ProfileRecoveryAgent: Aborted recovery for {}", player);
        }
        was_running
    }

    /// Returns `true` while the player's retry loop is still live.
    pub fn is_recovering(&self, player: &PlayerId) -> bool {
        self.active()
            .get(player)
            .is_some_and(|recovery| !recovery.loader.is_cancelled())
    }

    /// Number of live recoveries.
    pub fn active_count(&self) -> usize {
        let mut active = self.active();
        Self::prune(&mut active);
        active.len()
    }

    fn prune(active: &mut HashMap<PlayerId, ActiveRecovery>) {
        active.retain(|_, recovery| !recovery.loader.is_cancelled());
    }

    fn active(&self) -> MutexGuard<'_, HashMap<PlayerId, ActiveRecovery>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
