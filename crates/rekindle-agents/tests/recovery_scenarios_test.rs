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

mod support;

use rekindle_agents::{
    Applier, ApplyOutcome, ProfileRecoveryAgent, RecoveredProfile, RecoveryError, RetryLoader,
};
use rekindle_core::locale::{EnglishCatalog, MessageCatalog, MessageKey};
use rekindle_core::notify::{Audience, Message};
use rekindle_core::storage::ProfileStore;
use rekindle_core::{
    BackgroundContext, MainContext, PlayerId, Profile, ProfileResult, RecoveryConfig,
    SchedulerError, TaskControl, Ticks,
};
use rekindle_infra::Notification;
use rekindle_telemetry::RecoveryMonitor;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use support::Harness;

fn text(key: MessageKey) -> String {
    EnglishCatalog.message(key, &[])
}

fn count(messages: &[String], key: MessageKey) -> usize {
    let expected = text(key);
    messages.iter().filter(|m| **m == expected).count()
}

#[test]
fn test_first_try_success_is_silent() {
    // --- 1. ARRANGE ---
    let harness = Harness::new();
    harness
        .store
        .insert(Profile::new(harness.player()).with_skill("mining", 40));
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();
    let main = MainContext::assume_current_thread();

    // --- 2. ACT ---
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    assert_eq!(harness.scheduler.main_delays(), vec![Ticks::ZERO]);
    assert_eq!(harness.scheduler.run_main_tasks(&main), 1);

    // --- 3. ASSERT ---
    let session = harness.sessions.get(&harness.player()).unwrap();
    assert_eq!(session.profile().skill_level("mining"), 40);
    assert!(session.respawn_stamp().is_some());
    assert!(harness.scoreboard.state(&harness.player()).unwrap().baseline);
    assert!(
        harness.notifier.drain().is_empty(),
        "A first-try success must not message the player"
    );
    assert!(loader.is_cancelled());
}

#[test]
fn test_success_after_three_failures() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    harness.store.simulate_outage(3);
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();
    let main = MainContext::assume_current_thread();

    for _ in 0..3 {
        assert_eq!(loader.run_cycle(&bg), TaskControl::Continue);
    }
    assert_eq!(loader.attempt(), 3);
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    harness.scheduler.run_main_tasks(&main);

    let notifications = harness.notifier.drain();
    let messages = harness.direct_messages(&notifications);
    assert_eq!(count(&messages, MessageKey::LoadingStart), 3);
    assert_eq!(count(&messages, MessageKey::LoadingSuccess), 1);
    assert_eq!(messages.last(), Some(&text(MessageKey::LoadingSuccess)));
    assert!(harness.broadcasts(&notifications).is_empty());
    assert!(harness.sessions.contains(&harness.player()));
    assert_eq!(harness.store.load_count(), 4);
}

#[test]
fn test_exhaustion_reports_once_and_stops_for_good() {
    let harness = Harness::new();
    harness.store.simulate_outage(100);
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();

    for _ in 0..4 {
        assert_eq!(loader.run_cycle(&bg), TaskControl::Continue);
    }
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    assert_eq!(loader.attempt(), 5);

    let notifications = harness.notifier.drain();
    let broadcasts = harness.broadcasts(&notifications);
    assert_eq!(broadcasts.len(), 1);
    assert!(broadcasts[0].contains("Steve"));
    assert!(notifications.iter().any(|n| matches!(
        n,
        Notification::Broadcast {
            audience: Audience::Administrative,
            ..
        }
    )));

    let failures: Vec<&Message> = notifications
        .iter()
        .filter_map(|n| match n {
            Notification::Direct { message, .. } if message.line_count() > 1 => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(failures.len(), 1, "Exactly one failure message");
    assert_eq!(failures[0].line_count(), 3);

    // Later invocations touch nothing.
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    assert_eq!(harness.store.load_count(), 5);
    assert!(harness.notifier.drain().is_empty());
    assert_eq!(harness.scheduler.main_queued(), 0);
    assert!(harness.sessions.is_empty());
}

#[test]
fn test_disconnect_between_attempts_stops_quietly() {
    let harness = Harness::new();
    harness.store.simulate_outage(100);
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();

    loader.run_cycle(&bg);
    loader.run_cycle(&bg);
    assert_eq!(loader.attempt(), 2);
    harness.notifier.drain();

    harness.presence.disconnect(&harness.player());
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);

    assert_eq!(loader.attempt(), 2);
    assert_eq!(harness.store.load_count(), 2, "No storage call after logout");
    assert!(harness.notifier.drain().is_empty());
    assert!(loader.is_cancelled());
}

#[test]
fn test_disconnect_before_apply_creates_no_session() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();
    let main = MainContext::assume_current_thread();

    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    harness.presence.disconnect(&harness.player());
    harness.scheduler.run_main_tasks(&main);

    assert!(harness.sessions.is_empty());
    assert!(harness.scoreboard.state(&harness.player()).is_none());
    assert!(harness.notifier.drain().is_empty());
}

#[test]
fn test_applier_reports_departed_player() {
    let harness = Harness::new();
    let main = MainContext::assume_current_thread();
    harness.presence.disconnect(&harness.player());

    let recovered = RecoveredProfile {
        profile: Profile::new(harness.player()),
        attempt: 2,
    };
    let applier = Applier::new(harness.identity.clone(), recovered, harness.apply_services());

    assert_eq!(applier.apply(&main), ApplyOutcome::PlayerDeparted);
    assert!(harness.sessions.is_empty());
}

#[test]
fn test_attempt_counts_up_by_one_and_stays_bounded() {
    let config = RecoveryConfig {
        max_attempts: 3,
        ..Default::default()
    };
    let harness = Harness::with_config(config);
    harness.store.simulate_outage(100);
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();

    assert_eq!(loader.identity().name(), "Steve");
    assert_eq!(loader.max_attempts(), 3);

    let mut seen = vec![loader.attempt()];
    for _ in 0..6 {
        loader.run_cycle(&bg);
        seen.push(loader.attempt());
    }

    assert_eq!(seen, vec![0, 1, 2, 3, 3, 3, 3]);
    assert_eq!(harness.store.load_count(), 3);
}

#[test]
fn test_zero_attempt_budget_still_tries_once() {
    let harness = Harness::new();
    harness.store.simulate_outage(100);
    let loader = RetryLoader::new(harness.identity.clone(), harness.services(), 0);
    let bg = BackgroundContext::assume_current_thread();

    assert_eq!(loader.max_attempts(), 1);
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    assert_eq!(harness.store.load_count(), 1);
}

#[test]
fn test_cancelled_loader_does_nothing() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();

    loader.cancel();
    assert!(loader.is_cancelled());
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);

    assert_eq!(harness.store.load_count(), 0);
    assert_eq!(harness.scheduler.main_queued(), 0);
    assert!(harness.notifier.drain().is_empty());
    assert_eq!(loader.attempt(), 0);
}

#[test]
fn test_handoff_happens_at_most_once() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();

    for _ in 0..3 {
        loader.run_cycle(&bg);
    }

    assert_eq!(harness.scheduler.main_queued(), 1);
    assert_eq!(harness.store.load_count(), 1);
}

#[test]
fn test_refused_handoff_still_ends_the_cycle() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    harness.scheduler.refuse_submissions();
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();

    assert_eq!(loader.run_cycle(&bg), TaskControl::Stop);
    assert!(loader.is_cancelled());
    assert_eq!(harness.scheduler.main_queued(), 0);
}

#[test]
fn test_stats_scoreboard_kept_after_delay() {
    let config = RecoveryConfig {
        show_stats_after_login: true,
        ..Default::default()
    };
    let harness = Harness::with_config(config);
    harness.store.insert(Profile::new(harness.player()));
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();
    let main = MainContext::assume_current_thread();

    loader.run_cycle(&bg);
    // Delays are ignored here, so the keep task runs in the same drain.
    let ran = harness.scheduler.run_main_tasks(&main);
    assert_eq!(ran, 2);

    let board = harness.scoreboard.state(&harness.player()).unwrap();
    assert!(board.baseline);
    assert!(board.stats_enabled);
    assert_eq!(board.keep_count, 1);
}

#[test]
fn test_keep_task_waits_one_second() {
    let config = RecoveryConfig {
        show_stats_after_login: true,
        ..Default::default()
    };
    let harness = Harness::with_config(config);
    let main = MainContext::assume_current_thread();
    let recovered = RecoveredProfile {
        profile: Profile::new(harness.player()),
        attempt: 0,
    };

    Applier::new(harness.identity.clone(), recovered, harness.apply_services()).apply(&main);

    assert_eq!(harness.scheduler.main_delays(), vec![Ticks::seconds(1)]);
}

#[test]
fn test_keep_task_skips_departed_player() {
    let config = RecoveryConfig {
        show_stats_after_login: true,
        ..Default::default()
    };
    let harness = Harness::with_config(config);
    let main = MainContext::assume_current_thread();
    let recovered = RecoveredProfile {
        profile: Profile::new(harness.player()),
        attempt: 0,
    };

    Applier::new(harness.identity.clone(), recovered, harness.apply_services()).apply(&main);
    harness.presence.disconnect(&harness.player());
    harness.scheduler.run_main_tasks(&main);

    assert_eq!(harness.scoreboard.state(&harness.player()).unwrap().keep_count, 0);
}

#[test]
fn test_stats_scoreboard_off_by_default() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    let loader = harness.loader();
    let bg = BackgroundContext::assume_current_thread();
    let main = MainContext::assume_current_thread();

    loader.run_cycle(&bg);
    assert_eq!(harness.scheduler.run_main_tasks(&main), 1);
    assert!(!harness.scoreboard.state(&harness.player()).unwrap().stats_enabled);
}

#[test]
fn test_agent_schedules_and_refuses_duplicates() {
    let harness = Harness::new();
    harness.store.simulate_outage(100);
    let agent = ProfileRecoveryAgent::new(harness.services(), harness.config);

    agent.begin(harness.identity.clone()).unwrap();
    assert_eq!(
        harness.scheduler.repeating_schedule(),
        vec![(Ticks(1), Ticks::seconds(1))]
    );
    assert!(agent.is_recovering(&harness.player()));

    let duplicate = agent.begin(harness.identity.clone());
    assert!(matches!(duplicate, Err(RecoveryError::AlreadyRecovering(name)) if name == "Steve"));
    assert_eq!(agent.active_count(), 1);
}

#[test]
fn test_agent_abort_cancels_the_cycle() {
    let harness = Harness::new();
    harness.store.simulate_outage(100);
    let agent = ProfileRecoveryAgent::new(harness.services(), harness.config);
    let bg = BackgroundContext::assume_current_thread();

    let handle = agent.begin(harness.identity.clone()).unwrap();
    assert!(agent.abort(&harness.player()));
    assert!(!agent.abort(&harness.player()));

    assert!(harness.scheduler.is_cancelled(handle));
    assert!(!agent.is_recovering(&harness.player()));
    assert_eq!(harness.scheduler.run_repeating(&bg), 0);
    assert_eq!(harness.store.load_count(), 0);
}

#[test]
fn test_agent_allows_new_recovery_after_completion() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    let agent = ProfileRecoveryAgent::new(harness.services(), harness.config);
    let bg = BackgroundContext::assume_current_thread();

    agent.begin(harness.identity.clone()).unwrap();
    harness.scheduler.run_repeating(&bg);

    assert_eq!(harness.scheduler.repeating_len(), 0);
    assert_eq!(agent.active_count(), 0);
    assert!(agent.begin(harness.identity.clone()).is_ok());
}

#[test]
fn test_agent_surfaces_scheduler_refusal() {
    let harness = Harness::new();
    harness.scheduler.refuse_submissions();
    let agent = ProfileRecoveryAgent::new(harness.services(), harness.config);

    let result = agent.begin(harness.identity.clone());
    assert!(matches!(
        result,
        Err(RecoveryError::Scheduler(SchedulerError::ShutDown))
    ));
    assert!(!agent.is_recovering(&harness.player()));
}

#[test]
fn test_telemetry_reaches_monitor() {
    let harness = Harness::new();
    harness.store.insert(Profile::new(harness.player()));
    harness.store.simulate_outage(2);
    let (mut monitor, sender) = RecoveryMonitor::new();
    let loader = harness.loader().with_telemetry_sender(sender);
    let bg = BackgroundContext::assume_current_thread();
    let main = MainContext::assume_current_thread();

    while loader.run_cycle(&bg) == TaskControl::Continue {}
    harness.scheduler.run_main_tasks(&main);

    let summary = monitor.summary();
    assert_eq!(summary.attempts_failed, 2);
    assert_eq!(summary.recovered, 1);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.exhausted, 0);
}

/// Always fails, and records whether two loads were ever in flight at once.
#[derive(Default)]
struct SlowFailingStore {
    in_flight: AtomicBool,
    overlapped: AtomicBool,
    calls: AtomicU32,
}

impl ProfileStore for SlowFailingStore {
    fn load_profile(
        &self,
        _name: &str,
        _player: &PlayerId,
        _allow_recovery: bool,
        _ctx: &BackgroundContext,
    ) -> ProfileResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        thread::sleep(Duration::from_millis(30));
        self.in_flight.store(false, Ordering::SeqCst);
        ProfileResult::Unloaded
    }
}

#[test]
fn test_overlapping_invocations_are_serialized() {
    let harness = Harness::new();
    let store = Arc::new(SlowFailingStore::default());
    let loader = Arc::new(RetryLoader::new(
        harness.identity.clone(),
        harness.services_with_store(store.clone()),
        5,
    ));
    let barrier = Arc::new(Barrier::new(2));

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let loader = Arc::clone(&loader);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let ctx = BackgroundContext::assume_current_thread();
                barrier.wait();
                loader.run_cycle(&ctx)
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap(), TaskControl::Continue);
    }

    assert!(
        !store.overlapped.load(Ordering::SeqCst),
        "Two invocations of one cycle ran storage at the same time"
    );
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    assert_eq!(loader.attempt(), 2);
}
