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

//! The persisted player profile and the result of a load attempt.

use crate::identity::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A player's persisted record.
///
/// The recovery machinery treats it as an opaque payload; the skill table
/// only exists so reference stores have something concrete to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    owner: PlayerId,
    #[serde(default)]
    skills: BTreeMap<String, u32>,
}

impl Profile {
    /// Creates an empty profile for a player.
    pub fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            skills: BTreeMap::new(),
        }
    }

    /// Builder-style setter for a skill level.
    pub fn with_skill(mut self, skill: impl Into<String>, level: u32) -> Self {
        self.skills.insert(skill.into(), level);
        self
    }

    /// The player this profile belongs to.
    pub fn owner(&self) -> &PlayerId {
        &self.owner
    }

    /// Level of a skill, zero when the skill was never trained.
    pub fn skill_level(&self, skill: &str) -> u32 {
        self.skills.get(skill).copied().unwrap_or(0)
    }

    /// Iterates over all recorded skills in name order.
    pub fn skills(&self) -> impl Iterator<Item = (&str, u32)> {
        self.skills.iter().map(|(name, level)| (name.as_str(), *level))
    }
}

/// The outcome of a single profile load.
///
/// Storage reports a clean binary signal; there are no partial states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileResult {
    /// The profile was read successfully.
    Loaded(Profile),
    /// The load did not succeed this time.
    Unloaded,
}

impl ProfileResult {
    /// Returns `true` for [`ProfileResult::Loaded`].
    pub fn is_loaded(&self) -> bool {
        matches!(self, ProfileResult::Loaded(_))
    }

    /// Consumes the result, yielding the profile if one was loaded.
    pub fn into_profile(self) -> Option<Profile> {
        match self {
            ProfileResult::Loaded(profile) => Some(profile),
            ProfileResult::Unloaded => None,
        }
    }
}
