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

use rekindle_core::{PlayerId, PlayerPresence};
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Tracks which players are online.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    online: RwLock<HashSet<PlayerId>>,
}

impl PresenceTracker {
    /// Creates a tracker with nobody online.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the player online.
    pub fn connect(&self, player: PlayerId) {
        self.online
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player);
    }

    /// Marks the player offline. Returns `false` if they were not online.
    pub fn disconnect(&self, player: &PlayerId) -> bool {
        self.online
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(player)
    }

    /// Number of online players.
    pub fn online_count(&self) -> usize {
        self.online
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl PlayerPresence for PresenceTracker {
    fn is_connected(&self, player: &PlayerId) -> bool {
        self.online
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(player)
    }
}
