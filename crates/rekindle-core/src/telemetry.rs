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

//! Telemetry events reported by the recovery flow.

use crate::identity::PlayerId;

/// A notable step of a recovery cycle, sent to an optional telemetry sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryEvent {
    /// A fetch came back unloaded; `attempt` is the counter after incrementing.
    AttemptFailed {
        /// The player being recovered.
        player: PlayerId,
        /// Failed attempts so far.
        attempt: u32,
    },
    /// A fetch succeeded and the apply phase was submitted.
    Recovered {
        /// The player being recovered.
        player: PlayerId,
        /// Failed attempts before the success.
        attempt: u32,
    },
    /// The attempt budget ran out.
    Exhausted {
        /// The player being recovered.
        player: PlayerId,
        /// Failed attempts, equal to the budget.
        attempts: u32,
    },
    /// The player disconnected before the fetch phase finished.
    Abandoned {
        /// The player being recovered.
        player: PlayerId,
    },
    /// The apply phase registered a session.
    Applied {
        /// The player being recovered.
        player: PlayerId,
    },
    /// The player disconnected before the apply phase ran.
    ApplyAborted {
        /// The player being recovered.
        player: PlayerId,
    },
}

impl RecoveryEvent {
    /// The player the event concerns.
    pub fn player(&self) -> &PlayerId {
        match self {
            RecoveryEvent::AttemptFailed { player, .. }
            | RecoveryEvent::Recovered { player, .. }
            | RecoveryEvent::Exhausted { player, .. }
            | RecoveryEvent::Abandoned { player }
            | RecoveryEvent::Applied { player }
            | RecoveryEvent::ApplyAborted { player } => player,
        }
    }
}
