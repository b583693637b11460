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

//! Execution-context tokens and the tick time unit.
//!
//! Two contexts exist:
//!
//! - the **main context**, single-threaded and cooperative, where live session
//!   state is mutated. It must never block.
//! - the **background context**, where blocking work such as storage I/O runs.
//!
//! Operations bound to one context take a reference to the matching token.
//! Both tokens are `!Send` and `!Sync`, so a token obtained on one thread can
//! never be smuggled into a closure that runs on another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

/// Number of scheduler ticks in one second.
pub const TICKS_PER_SECOND: u64 = 20;

/// Wall-clock length of one tick at the nominal rate.
pub const NOMINAL_TICK: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND);

/// A span of time measured in scheduler ticks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ticks(pub u64);

impl Ticks {
    /// No delay at all.
    pub const ZERO: Ticks = Ticks(0);

    /// Returns the tick count for a number of whole seconds.
    pub const fn seconds(seconds: u64) -> Self {
        Ticks(seconds * TICKS_PER_SECOND)
    }

    /// Converts the span into wall-clock time for a given tick length.
    pub fn as_duration(self, tick_length: Duration) -> Duration {
        let count = u32::try_from(self.0).unwrap_or(u32::MAX);
        tick_length.saturating_mul(count)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

/// Proof that the current code is running on the main context.
///
/// Session registration, scoreboard changes, and every [`MainTask`](crate::MainTask)
/// require a reference to this token.
pub struct MainContext {
    _not_send: PhantomData<*const ()>,
}

impl MainContext {
    /// Claims the main context for the current thread.
    ///
    /// Only the thread that owns live session state should call this: the
    /// host's main loop, or a scheduler pump running on it.
    pub fn assume_current_thread() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

impl fmt::Debug for MainContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MainContext")
    }
}

/// Proof that the current code is running on a background context where
/// blocking calls are acceptable.
///
/// Storage access requires a reference to this token.
pub struct BackgroundContext {
    _not_send: PhantomData<*const ()>,
}

impl BackgroundContext {
    /// Claims a background context for the current thread.
    ///
    /// Must not be called from the thread that owns the main context.
    pub fn assume_current_thread() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }
}

impl fmt::Debug for BackgroundContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackgroundContext")
    }
}
