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

//! Two-phase profile recovery.
//!
//! A [`RetryLoader`] runs periodically on the background context and retries
//! the profile fetch up to a fixed budget. The first successful fetch is
//! handed, by value, to an [`Applier`] that runs once on the main context and
//! turns it into a live session. [`ProfileRecoveryAgent`] is the entry point
//! hosts use to start and abort recoveries.

mod agent;
mod applier;
mod keep_task;
mod loader;
mod services;

pub use agent::{ProfileRecoveryAgent, RecoveryError};
pub use applier::{Applier, ApplyOutcome, RecoveredProfile};
pub use keep_task::ScoreboardKeepTask;
pub use loader::RetryLoader;
pub use services::{ApplyServices, RecoveryServices};
