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

use rekindle_core::scoreboard::Scoreboard;
use rekindle_core::{MainContext, PlayerId};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// What the in-memory scoreboard knows about one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardState {
    /// The baseline scoreboard was set up.
    pub baseline: bool,
    /// The stats view is on.
    pub stats_enabled: bool,
    /// Number of keep-alive refreshes received.
    pub keep_count: u32,
}

/// Scoreboard that records every call per player.
#[derive(Debug, Default)]
pub struct InMemoryScoreboard {
    boards: Mutex<HashMap<PlayerId, BoardState>>,
}

impl InMemoryScoreboard {
    /// Creates an empty scoreboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the player's board, if one was ever touched.
    pub fn state(&self, player: &PlayerId) -> Option<BoardState> {
        self.boards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(player)
            .copied()
    }

    fn update(&self, player: &PlayerId, f: impl FnOnce(&mut BoardState)) {
        let mut boards = self.boards.lock().unwrap_or_else(PoisonError::into_inner);
        f(boards.entry(*player).or_default());
    }
}

impl Scoreboard for InMemoryScoreboard {
    fn setup_player(&self, player: &PlayerId, _ctx: &MainContext) {
        self.update(player, |board| board.baseline = true);
    }

    fn enable_stats(&self, player: &PlayerId, _ctx: &MainContext) {
        self.update(player, |board| board.stats_enabled = true);
    }

    fn keep_stats(&self, player: &PlayerId, _ctx: &MainContext) {
        self.update(player, |board| board.keep_count += 1);
    }
}
