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

use anyhow::{Context, Result};
use rekindle_agents::{ApplyServices, ProfileRecoveryAgent, RecoveryServices};
use rekindle_control::{SchedulerConfig, ThreadedScheduler};
use rekindle_core::locale::EnglishCatalog;
use rekindle_core::{PlayerId, PlayerIdentity, Profile, RecoveryConfig};
use rekindle_infra::{
    ChannelNotifier, InMemoryProfileStore, InMemoryScoreboard, InMemorySessionRegistry,
    Notification, PresenceTracker,
};
use rekindle_telemetry::RecoveryMonitor;
use std::sync::Arc;
use std::time::Duration;

/// Failed loads injected before storage comes back.
const OUTAGE_LOADS: u32 = 2;

fn load_config() -> Result<RecoveryConfig> {
    match std::env::args().nth(1) {
        Some(path) => RecoveryConfig::load(&path)
            .with_context(|| format!("failed to load recovery config from {path}")),
        None => Ok(RecoveryConfig {
            show_stats_after_login: true,
            ..Default::default()
        }),
    }
}

fn main() -> Result<()> {
    rekindle_telemetry::logging::init("info");
    let config = load_config()?;

    let (scheduler, mut main_thread) = ThreadedScheduler::new(SchedulerConfig::from(&config));
    let scheduler = Arc::new(scheduler);
    scheduler
        .start()
        .context("failed to start the background worker")?;

    let identity = PlayerIdentity::new("Steve", PlayerId::offline("Steve"));
    let player = *identity.id();

    let store = Arc::new(InMemoryProfileStore::new().with_latency(Duration::from_millis(15)));
    store.insert(
        Profile::new(player)
            .with_skill("mining", 31)
            .with_skill("excavation", 12),
    );
    store.simulate_outage(OUTAGE_LOADS);

    let presence = Arc::new(PresenceTracker::new());
    presence.connect(player);
    let sessions = Arc::new(InMemorySessionRegistry::new());
    let notifier = Arc::new(ChannelNotifier::new());
    let scoreboard = Arc::new(InMemoryScoreboard::new());

    let services = RecoveryServices {
        store: store.clone(),
        apply: ApplyServices {
            presence,
            sessions: sessions.clone(),
            notifier: notifier.clone(),
            messages: Arc::new(EnglishCatalog),
            scoreboard: scoreboard.clone(),
            config: Arc::new(config),
            scheduler: scheduler.clone(),
            scoreboard_keep_delay: config.scoreboard_keep_delay_ticks,
        },
    };

    let (mut monitor, sender) = RecoveryMonitor::new();
    let agent = ProfileRecoveryAgent::new(services, config).with_telemetry_sender(sender);
    agent.begin(identity)?;

    // Stand-in for the host's main loop.
    let tick = config.tick_length();
    let budget = config
        .retry_period_ticks
        .as_duration(tick)
        .saturating_mul(config.max_attempts.saturating_add(2))
        .saturating_add(config.scoreboard_keep_delay_ticks.as_duration(tick))
        .saturating_add(Duration::from_secs(1));
    let settled = main_thread.run_until(budget, || {
        let summary = monitor.summary();
        if summary.exhausted + summary.abandoned + summary.apply_aborted > 0 {
            return true;
        }
        summary.applied > 0
            && (!config.show_stats_after_login
                || scoreboard
                    .state(&player)
                    .is_some_and(|board| board.keep_count > 0))
    });
    if !settled {
        log::warn!("Sandbox: Recovery did not settle within {:?}", budget);
    }
    scheduler.stop();

    for notification in notifier.drain() {
        match notification {
            Notification::Direct { message, .. } => {
                for line in message.lines() {
                    println!("[to Steve] {line}");
                }
            }
            Notification::Broadcast { text, audience } => {
                println!("[{}] {text}", audience.channel());
            }
        }
    }

    match sessions.get(&player) {
        Some(session) => println!(
            "Session live for {} with {} skills",
            session.identity(),
            session.profile().skills().count()
        ),
        None => println!("No session for {}", player),
    }
    println!("Storage loads: {}", store.load_count());
    println!("{}", monitor.summary().to_json()?);
    Ok(())
}
