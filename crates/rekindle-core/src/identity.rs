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

//! Player identities and the liveness query.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Namespace used to derive offline identifiers from display names.
const OFFLINE_NAMESPACE: Uuid = Uuid::from_u128(0x6f66_666c_696e_6550_6c61_7965_723a_0001);

/// Stable unique identifier of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derives a deterministic identifier from a display name.
    ///
    /// Hosts without an account service use this so a returning player maps
    /// back onto the same stored profile.
    pub fn offline(name: &str) -> Self {
        Self(Uuid::new_v5(&OFFLINE_NAMESPACE, name.as_bytes()))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The immutable identity of a connecting player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerIdentity {
    name: String,
    id: PlayerId,
}

impl PlayerIdentity {
    /// Creates an identity from a display name and a unique id.
    pub fn new(name: impl Into<String>, id: PlayerId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// The player's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The player's stable unique identifier.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Answers whether a player is still connected.
///
/// Callable from either context.
pub trait PlayerPresence: Send + Sync {
    /// Returns `true` while the player holds a live connection.
    fn is_connected(&self, player: &PlayerId) -> bool;
}
