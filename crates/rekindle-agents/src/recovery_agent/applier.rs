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

//! The main-context half of a recovery cycle.

use std::time::SystemTime;

use crossbeam_channel::Sender;
use rekindle_core::locale::MessageKey;
use rekindle_core::notify::Message;
use rekindle_core::session::SessionRecord;
use rekindle_core::telemetry::RecoveryEvent;
use rekindle_core::{MainContext, MainTask, PlayerIdentity, Profile};

use super::keep_task::ScoreboardKeepTask;
use super::services::ApplyServices;

/// The immutable result handed from the loader to the apply phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredProfile {
    /// The loaded profile.
    pub profile: Profile,
    /// Failed attempts before the successful fetch.
    pub attempt: u32,
}

/// What a run of the apply phase did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A session was registered.
    Applied,
    /// The player left before the apply phase ran; nothing was created.
    PlayerDeparted,
}

/// Turns a recovered profile into a live session. Runs once, on the main context.
///
/// Never retries and never reports back to the loader: by the time it runs the
/// loader's cycle is over.
pub struct Applier {
    identity: PlayerIdentity,
    recovered: RecoveredProfile,
    services: ApplyServices,
    telemetry_sender: Option<Sender<RecoveryEvent>>,
}

impl Applier {
    /// Creates the apply unit for a recovered profile.
    pub fn new(
        identity: PlayerIdentity,
        recovered: RecoveredProfile,
        services: ApplyServices,
    ) -> Self {
        Self {
            identity,
            recovered,
            services,
            telemetry_sender: None,
        }
    }

    /// Attaches a sender for telemetry events.
    pub fn with_telemetry_sender(mut self, sender: Sender<RecoveryEvent>) -> Self {
        self.telemetry_sender = Some(sender);
        self
    }

    /// Applies the profile.
    pub fn apply(self, ctx: &MainContext) -> ApplyOutcome {
        let player = *self.identity.id();
        let services = &self.services;

        if !services.presence.is_connected(&player) {
            log::info!(
                "Applier: Aborting profile loading recovery for {} - player logged out",
                self.identity.name()
            );
            self.emit(RecoveryEvent::ApplyAborted { player });
            return ApplyOutcome::PlayerDeparted;
        }

        // The registry takes ownership, so session-start stamping happens first.
        let mut record = SessionRecord::new(self.identity.clone(), self.recovered.profile.clone());
        record.actualize_respawn_stamp(SystemTime::now());
        services.sessions.register(record, ctx);
        services.scoreboard.setup_player(&player, ctx);

        if self.recovered.attempt > 0 {
            let text = services.messages.message(MessageKey::LoadingSuccess, &[]);
            services.notifier.send_message(&player, Message::line(text));
        }

        if services.config.show_stats_after_login() {
            services.scoreboard.enable_stats(&player, ctx);
            let keep = ScoreboardKeepTask::new(
                player,
                services.presence.clone(),
                services.scoreboard.clone(),
            );
            if let Err(e) = services
                .scheduler
                .schedule_once_delayed(Box::new(keep), services.scoreboard_keep_delay)
            {
                log::warn!(
                    "Applier: Could not schedule the stats refresh for {}: {}",
                    self.identity.name(),
                    e
                );
            }
        }

        log::info!(
            "Applier: Session for {} started after {} failed attempts",
            self.identity.name(),
            self.recovered.attempt
        );
        self.emit(RecoveryEvent::Applied { player });
        ApplyOutcome::Applied
    }

    fn emit(&self, event: RecoveryEvent) {
        if let Some(sender) = &self.telemetry_sender {
            let _ = sender.try_send(event);
        }
    }
}

impl MainTask for Applier {
    fn run(self: Box<Self>, ctx: &MainContext) {
        self.apply(ctx);
    }
}
