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

//! Reference implementation of the host scheduler contract.
//!
//! [`ThreadedScheduler`] owns a background worker thread that drives repeating
//! units on a fixed tick. Main-context units are handed to a [`MainThread`]
//! pump, which the host calls from the thread that owns session state.

mod main_thread;
mod registry;
mod scheduler;

pub use main_thread::MainThread;
pub use registry::RepeatingTaskRegistry;
pub use scheduler::{SchedulerConfig, ThreadedScheduler};
