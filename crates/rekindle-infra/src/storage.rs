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

//! In-memory profile storage with injectable outages.

use rekindle_core::storage::ProfileStore;
use rekindle_core::{BackgroundContext, PlayerId, Profile, ProfileResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Profile store backed by a `RwLock<HashMap>`.
///
/// `simulate_outage(n)` makes the next `n` loads come back unloaded, which is
/// how a storage hiccup looks to callers.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<PlayerId, Profile>>,
    fail_next: AtomicU32,
    loads: AtomicU64,
    latency: Option<Duration>,
}

impl InMemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixed delay to every load.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Stores or replaces a profile.
    pub fn insert(&self, profile: Profile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(*profile.owner(), profile);
    }

    /// Returns a copy of the stored profile, if any.
    pub fn get(&self, player: &PlayerId) -> Option<Profile> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(player)
            .cloned()
    }

    /// Makes the next `loads` calls fail.
    pub fn simulate_outage(&self, loads: u32) {
        self.fail_next.store(loads, Ordering::SeqCst);
    }

    /// Total number of `load_profile` calls served.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    fn consume_outage(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load_profile(
        &self,
        name: &str,
        player: &PlayerId,
        allow_recovery: bool,
        _ctx: &BackgroundContext,
    ) -> ProfileResult {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        if self.consume_outage() {
            log::warn!("InMemoryProfileStore: Simulated outage while loading {name}");
            return ProfileResult::Unloaded;
        }

        if let Some(profile) = self.get(player) {
            return ProfileResult::Loaded(profile);
        }

        if !allow_recovery {
            return ProfileResult::Unloaded;
        }

        log::info!("InMemoryProfileStore: Creating a fresh profile for {name}");
        let profile = Profile::new(*player);
        self.insert(profile.clone());
        ProfileResult::Loaded(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(
        store: &InMemoryProfileStore,
        player: &PlayerId,
        allow_recovery: bool,
    ) -> ProfileResult {
        let ctx = BackgroundContext::assume_current_thread();
        store.load_profile("steve", player, allow_recovery, &ctx)
    }

    #[test]
    fn test_loads_stored_profile() {
        let store = InMemoryProfileStore::new();
        let player = PlayerId::random();
        store.insert(Profile::new(player).with_skill("mining", 12));

        let profile = load(&store, &player, false).into_profile().unwrap();
        assert_eq!(profile.skill_level("mining"), 12);
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_missing_profile_created_only_with_recovery() {
        let store = InMemoryProfileStore::new();
        let player = PlayerId::random();

        assert!(!load(&store, &player, false).is_loaded());
        assert!(store.get(&player).is_none());

        assert!(load(&store, &player, true).is_loaded());
        assert!(store.get(&player).is_some());
    }

    #[test]
    fn test_outage_consumes_exactly_n_loads() {
        let store = InMemoryProfileStore::new();
        let player = PlayerId::random();
        store.insert(Profile::new(player));
        store.simulate_outage(2);

        assert!(!load(&store, &player, true).is_loaded());
        assert!(!load(&store, &player, true).is_loaded());
        assert!(load(&store, &player, true).is_loaded());
        assert_eq!(store.load_count(), 3);
    }
}
