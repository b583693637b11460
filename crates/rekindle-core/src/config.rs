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

//! Recovery configuration.

use crate::context::Ticks;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Maximum number of load attempts before recovery gives up.
pub const MAX_ATTEMPTS: u32 = 5;

/// Longest delay or period any scheduled unit may be configured with.
pub const MAX_SCHEDULE_TICKS: Ticks = Ticks::seconds(24 * 60 * 60);

/// Errors raised while loading or validating a [`RecoveryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration text is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the recovery flow cannot work with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Read-only access to the settings the apply phase consults.
pub trait ConfigProvider: Send + Sync {
    /// Whether the stats scoreboard is shown right after login.
    fn show_stats_after_login(&self) -> bool;
}

/// Tunables of the recovery flow.
///
/// The retry cadence is part of the user-facing behavior (messages appear at
/// a predictable rate), so it stays fixed: there is no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Load attempts before giving up.
    pub max_attempts: u32,
    /// Delay before the first attempt.
    pub retry_delay_ticks: Ticks,
    /// Spacing between attempts.
    pub retry_period_ticks: Ticks,
    /// Delay before the stats scoreboard is refreshed after login.
    pub scoreboard_keep_delay_ticks: Ticks,
    /// Whether the stats scoreboard is shown right after login.
    pub show_stats_after_login: bool,
    /// Wall-clock length of one tick, in milliseconds.
    pub tick_millis: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            retry_delay_ticks: Ticks(1),
            retry_period_ticks: Ticks::seconds(1),
            scoreboard_keep_delay_ticks: Ticks::seconds(1),
            show_stats_after_login: false,
            tick_millis: 50,
        }
    }
}

impl RecoveryConfig {
    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: RecoveryConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("RecoveryConfig: Loaded {}", path.display());
        Ok(config)
    }

    /// Checks the invariants the recovery flow relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "max_attempts",
                reason: "at least one attempt is required",
            });
        }
        if self.retry_period_ticks == Ticks::ZERO {
            return Err(ConfigError::Invalid {
                field: "retry_period_ticks",
                reason: "the retry period must be at least one tick",
            });
        }
        let delays = [
            ("retry_delay_ticks", self.retry_delay_ticks),
            ("retry_period_ticks", self.retry_period_ticks),
            ("scoreboard_keep_delay_ticks", self.scoreboard_keep_delay_ticks),
        ];
        for (field, ticks) in delays {
            if ticks > MAX_SCHEDULE_TICKS {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "delays and periods are capped at one day",
                });
            }
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_millis",
                reason: "a tick must last at least one millisecond",
            });
        }
        Ok(())
    }

    /// Wall-clock length of one tick.
    pub fn tick_length(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl ConfigProvider for RecoveryConfig {
    fn show_stats_after_login(&self) -> bool {
        self.show_stats_after_login
    }
}
