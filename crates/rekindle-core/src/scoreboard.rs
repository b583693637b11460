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

//! The scoreboard/UI contract touched after a profile is applied.

use crate::context::MainContext;
use crate::identity::PlayerId;

/// Per-player scoreboard control. Main context only.
pub trait Scoreboard: Send + Sync {
    /// Installs the player's baseline scoreboard.
    fn setup_player(&self, player: &PlayerId, ctx: &MainContext);

    /// Switches the player's board to the stats view.
    fn enable_stats(&self, player: &PlayerId, ctx: &MainContext);

    /// Keeps the stats view displayed instead of letting it time out.
    fn keep_stats(&self, player: &PlayerId, ctx: &MainContext);
}
