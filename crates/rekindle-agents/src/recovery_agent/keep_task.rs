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

use std::sync::Arc;

use rekindle_core::scoreboard::Scoreboard;
use rekindle_core::{MainContext, MainTask, PlayerId, PlayerPresence};

/// One-shot follow-up that keeps the stats scoreboard on screen after login.
pub struct ScoreboardKeepTask {
    player: PlayerId,
    presence: Arc<dyn PlayerPresence>,
    scoreboard: Arc<dyn Scoreboard>,
}

impl ScoreboardKeepTask {
    /// Creates the follow-up for `player`.
    pub fn new(
        player: PlayerId,
        presence: Arc<dyn PlayerPresence>,
        scoreboard: Arc<dyn Scoreboard>,
    ) -> Self {
        Self {
            player,
            presence,
            scoreboard,
        }
    }
}

impl MainTask for ScoreboardKeepTask {
    fn run(self: Box<Self>, ctx: &MainContext) {
        if self.presence.is_connected(&self.player) {
            self.scoreboard.keep_stats(&self.player, ctx);
        } else {
            log::debug!(
                "ScoreboardKeepTask: {} left before the refresh",
                self.player
            );
        }
    }
}
