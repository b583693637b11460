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

//! Live session records and the registry that owns them.

use crate::context::MainContext;
use crate::identity::{PlayerId, PlayerIdentity};
use crate::profile::Profile;
use std::time::SystemTime;

/// The in-memory representation of a connected player whose profile is available.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    identity: PlayerIdentity,
    profile: Profile,
    respawn_stamp: Option<SystemTime>,
}

impl SessionRecord {
    /// Creates a record for a player and their loaded profile.
    pub fn new(identity: PlayerIdentity, profile: Profile) -> Self {
        Self {
            identity,
            profile,
            respawn_stamp: None,
        }
    }

    /// Stamps the respawn timestamp that session start requires.
    pub fn actualize_respawn_stamp(&mut self, now: SystemTime) {
        self.respawn_stamp = Some(now);
    }

    /// The owning player's identity.
    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// The owning player's id.
    pub fn player(&self) -> &PlayerId {
        self.identity.id()
    }

    /// The profile backing this session.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// When the respawn timestamp was last stamped, if ever.
    pub fn respawn_stamp(&self) -> Option<SystemTime> {
        self.respawn_stamp
    }
}

/// Tracks live sessions. Main context only.
pub trait SessionRegistry: Send + Sync {
    /// Takes ownership of a freshly created session record.
    fn register(&self, record: SessionRecord, ctx: &MainContext);
}
