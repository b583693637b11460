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

//! Concrete, host-independent implementations of the recovery collaborators.
//!
//! These back the sandbox and the integration tests. A real host supplies its
//! own storage, session registry, and UI on top of the same traits.

pub mod notify;
pub mod presence;
pub mod scoreboard;
pub mod session;
pub mod storage;

pub use notify::{ChannelNotifier, Notification};
pub use presence::PresenceTracker;
pub use scoreboard::{BoardState, InMemoryScoreboard};
pub use session::InMemorySessionRegistry;
pub use storage::InMemoryProfileStore;
