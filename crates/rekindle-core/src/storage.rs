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

//! The storage contract used to fetch profiles.

use crate::context::BackgroundContext;
use crate::identity::PlayerId;
use crate::profile::ProfileResult;

/// Loads persisted profiles.
///
/// Implementations may block. Repeated calls for the same identity are
/// expected and must be harmless. The [`BackgroundContext`] parameter keeps
/// the call out of main-context code paths.
pub trait ProfileStore: Send + Sync {
    /// Fetches the profile for `name`/`id`.
    ///
    /// `allow_recovery` lets the backend create or repair a record instead of
    /// reporting [`ProfileResult::Unloaded`] when the record is missing.
    fn load_profile(
        &self,
        name: &str,
        id: &PlayerId,
        allow_recovery: bool,
        ctx: &BackgroundContext,
    ) -> ProfileResult;
}
