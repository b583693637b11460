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

//! The background half of a recovery cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam_channel::Sender;
use rekindle_core::locale::MessageKey;
use rekindle_core::notify::{Audience, Message};
use rekindle_core::telemetry::RecoveryEvent;
use rekindle_core::{
    BackgroundContext, PlayerIdentity, Profile, ProfileResult, RepeatingTask, TaskControl,
};

use super::applier::{Applier, RecoveredProfile};
use super::services::RecoveryServices;

/// Retry bookkeeping for one recovery cycle. Never leaves the loader.
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    cancelled: bool,
}

/// Retries a profile fetch on the background context.
///
/// Every invocation runs under one exclusive lock over the retry state, so
/// overlapping invocations are serialized: the second waits until the first
/// has fully returned. Once the loader is cancelled, further invocations do
/// nothing.
pub struct RetryLoader {
    identity: PlayerIdentity,
    services: RecoveryServices,
    max_attempts: u32,
    state: Mutex<RetryState>,
    // Lock-free mirror of `state.cancelled`, written under the lock.
    finished: AtomicBool,
    abort_requested: AtomicBool,
    telemetry_sender: Option<Sender<RecoveryEvent>>,
}

impl RetryLoader {
    /// Creates a loader that gives up after `max_attempts` failed fetches.
    pub fn new(identity: PlayerIdentity, services: RecoveryServices, max_attempts: u32) -> Self {
        Self {
            identity,
            services,
            max_attempts: max_attempts.max(1),
            state: Mutex::new(RetryState::default()),
            finished: AtomicBool::new(false),
            abort_requested: AtomicBool::new(false),
            telemetry_sender: None,
        }
    }

    /// Attaches a sender for telemetry events.
    pub fn with_telemetry_sender(mut self, sender: Sender<RecoveryEvent>) -> Self {
        self.telemetry_sender = Some(sender);
        self
    }

    /// The player being recovered.
    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// Failed fetches so far. Waits for an in-flight invocation to finish.
    pub fn attempt(&self) -> u32 {
        self.state().attempt
    }

    /// The attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` once the cycle has ended or an abort was requested.
    ///
    /// Never blocks, so it is safe to call from the main context.
    pub fn is_cancelled(&self) -> bool {
        self.finished.load(Ordering::Acquire) || self.abort_requested.load(Ordering::Acquire)
    }

    /// Requests that the cycle end. Never blocks.
    ///
    /// An invocation already in flight completes normally; the next one
    /// observes the request and does nothing.
    pub fn cancel(&self) {
        self.abort_requested.store(true, Ordering::Release);
    }

    /// Runs one invocation of the cycle body.
    pub fn run_cycle(&self, ctx: &BackgroundContext) -> TaskControl {
        let mut state = self.state();

        if state.cancelled {
            return TaskControl::Stop;
        }
        if self.abort_requested.load(Ordering::Acquire) {
            log::debug!("RetryLoader: Recovery for {} aborted", self.identity.name());
            self.finish(&mut state);
            return TaskControl::Stop;
        }

        let player = *self.identity.id();
        let apply = &self.services.apply;

        if !apply.presence.is_connected(&player) {
            log::info!(
                "RetryLoader: Aborting profile loading recovery for {} - player logged out",
                self.identity.name()
            );
            self.finish(&mut state);
            self.emit(RecoveryEvent::Abandoned { player });
            return TaskControl::Stop;
        }

        if state.attempt > 0 {
            let text = apply.messages.message(MessageKey::LoadingStart, &[]);
            apply.notifier.send_message(&player, Message::line(text));
        }

        let result = self
            .services
            .store
            .load_profile(self.identity.name(), &player, true, ctx);

        if let ProfileResult::Loaded(profile) = result {
            self.finish(&mut state);
            self.hand_off(profile, state.attempt);
            return TaskControl::Stop;
        }

        state.attempt += 1;
        log::debug!(
            "RetryLoader: Attempt {}/{} for {} came back unloaded",
            state.attempt,
            self.max_attempts,
            self.identity.name()
        );
        self.emit(RecoveryEvent::AttemptFailed {
            player,
            attempt: state.attempt,
        });

        if state.attempt >= self.max_attempts {
            self.give_up(state.attempt);
            self.finish(&mut state);
            return TaskControl::Stop;
        }

        TaskControl::Continue
    }

    /// Submits the apply phase with an immutable snapshot of the result.
    fn hand_off(&self, profile: Profile, attempt: u32) {
        let player = *self.identity.id();
        let recovered = RecoveredProfile { profile, attempt };
        let mut applier = Applier::new(
            self.identity.clone(),
            recovered,
            self.services.apply.clone(),
        );
        if let Some(sender) = &self.telemetry_sender {
            applier = applier.with_telemetry_sender(sender.clone());
        }

        match self.services.apply.scheduler.schedule_once(Box::new(applier)) {
            Ok(handle) => {
                log::debug!(
                    "RetryLoader: Profile of {} loaded after {} failed attempts, apply queued as {}",
                    self.identity.name(),
                    attempt,
                    handle
                );
                self.emit(RecoveryEvent::Recovered { player, attempt });
            }
            Err(e) => log::error!(
                "RetryLoader: Could not queue the apply phase for {}: {}",
                self.identity.name(),
                e
            ),
        }
    }

    fn give_up(&self, attempts: u32) {
        let apply = &self.services.apply;
        let name = self.identity.name();

        log::error!("RetryLoader: Giving up on attempting to load the profile for {name}");

        let notice = apply
            .messages
            .message(MessageKey::AdminFailureNotice, &[name]);
        apply.notifier.broadcast(&notice, Audience::Administrative);

        let failure = apply.messages.message(MessageKey::LoadingFailure, &[]);
        apply
            .notifier
            .send_message(self.identity.id(), Message::split_lines(&failure));

        self.emit(RecoveryEvent::Exhausted {
            player: *self.identity.id(),
            attempts,
        });
    }

    fn finish(&self, state: &mut RetryState) {
        state.cancelled = true;
        self.finished.store(true, Ordering::Release);
    }

    fn emit(&self, event: RecoveryEvent) {
        if let Some(sender) = &self.telemetry_sender {
            let _ = sender.try_send(event);
        }
    }

    fn state(&self) -> MutexGuard<'_, RetryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RepeatingTask for RetryLoader {
    fn run(&self, ctx: &BackgroundContext) -> TaskControl {
        self.run_cycle(ctx)
    }

    fn name(&self) -> &str {
        "profile-recovery"
    }
}
