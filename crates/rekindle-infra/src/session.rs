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

//! Session registry keeping live records in memory.

use rekindle_core::session::{SessionRecord, SessionRegistry};
use rekindle_core::{MainContext, PlayerId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Owns the live session of each player.
#[derive(Debug, Default)]
pub struct InMemorySessionRegistry {
    sessions: RwLock<HashMap<PlayerId, SessionRecord>>,
}

impl InMemorySessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the player's session.
    pub fn get(&self, player: &PlayerId) -> Option<SessionRecord> {
        self.read().get(player).cloned()
    }

    /// Returns `true` if the player has a live session.
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.read().contains_key(player)
    }

    /// Ends the player's session.
    pub fn remove(&self, player: &PlayerId) -> Option<SessionRecord> {
        self.write().remove(player)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when no session is live.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PlayerId, SessionRecord>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PlayerId, SessionRecord>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn register(&self, record: SessionRecord, _ctx: &MainContext) {
        let player = *record.player();
        if self.write().insert(player, record).is_some() {
            log::warn!("InMemorySessionRegistry: Replaced an existing session for {player}");
        }
    }
}
