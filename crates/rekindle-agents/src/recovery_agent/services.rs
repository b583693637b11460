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

use rekindle_core::locale::MessageCatalog;
use rekindle_core::notify::Notifier;
use rekindle_core::scoreboard::Scoreboard;
use rekindle_core::session::SessionRegistry;
use rekindle_core::storage::ProfileStore;
use rekindle_core::{ConfigProvider, PlayerPresence, Scheduler, Ticks};
use std::sync::Arc;

/// Collaborators available to the main-context apply phase.
///
/// Storage is deliberately absent: the apply phase must never block.
#[derive(Clone)]
pub struct ApplyServices {
    /// Liveness query.
    pub presence: Arc<dyn PlayerPresence>,
    /// Owner of live sessions.
    pub sessions: Arc<dyn SessionRegistry>,
    /// Player messages and broadcasts.
    pub notifier: Arc<dyn Notifier>,
    /// Message text lookup.
    pub messages: Arc<dyn MessageCatalog>,
    /// Per-player scoreboard control.
    pub scoreboard: Arc<dyn Scoreboard>,
    /// Live configuration flags.
    pub config: Arc<dyn ConfigProvider>,
    /// Host scheduler, used for follow-up units.
    pub scheduler: Arc<dyn Scheduler>,
    /// Delay before the stats scoreboard refresh.
    pub scoreboard_keep_delay: Ticks,
}

/// Everything a recovery cycle talks to.
#[derive(Clone)]
pub struct RecoveryServices {
    /// Blocking profile storage, background context only.
    pub store: Arc<dyn ProfileStore>,
    /// Collaborators shared with the apply phase.
    pub apply: ApplyServices,
}
