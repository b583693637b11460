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

//! # Rekindle Core
//!
//! Foundational crate containing the traits, core types, and interface contracts
//! shared by the profile recovery subsystem.
//!
//! Everything a recovery cycle talks to (storage, the session registry, the
//! scoreboard, the host scheduler) is described here as a trait, so that the
//! state machine in `rekindle-agents` never depends on a concrete host.

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod event;
pub mod identity;
pub mod locale;
pub mod notify;
pub mod profile;
pub mod scheduler;
pub mod scoreboard;
pub mod session;
pub mod storage;
pub mod telemetry;

pub use config::{ConfigError, ConfigProvider, RecoveryConfig};
pub use context::{BackgroundContext, MainContext, Ticks};
pub use identity::{PlayerId, PlayerIdentity, PlayerPresence};
pub use profile::{Profile, ProfileResult};
pub use scheduler::{MainTask, RepeatingTask, Scheduler, SchedulerError, TaskControl, TaskHandle};
