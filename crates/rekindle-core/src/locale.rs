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

//! Localized message lookup for the recovery flow.

use std::fmt;

/// Keys of every message the recovery flow emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Shown to the player before each retry after the first attempt.
    LoadingStart,
    /// Shown to the player when a retry eventually succeeded.
    LoadingSuccess,
    /// Shown to the player when every attempt failed. May span several lines.
    LoadingFailure,
    /// Broadcast to administrators on failure. Takes the player name as `{0}`.
    AdminFailureNotice,
}

impl MessageKey {
    /// The key as it appears in locale files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::LoadingStart => "Profile.Loading.Start",
            MessageKey::LoadingSuccess => "Profile.Loading.Success",
            MessageKey::LoadingFailure => "Profile.Loading.Failure",
            MessageKey::AdminFailureNotice => "Profile.Loading.AdminFailureNotice",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves message keys into display text.
pub trait MessageCatalog: Send + Sync {
    /// Returns the text for `key` with `{0}`, `{1}`, ... replaced by `args`.
    fn message(&self, key: MessageKey, args: &[&str]) -> String;
}

/// Built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl EnglishCatalog {
    fn template(key: MessageKey) -> &'static str {
        match key {
            MessageKey::LoadingStart => "[Rekindle] Retrying the load of your profile...",
            MessageKey::LoadingSuccess => "[Rekindle] Your profile has been loaded.",
            MessageKey::LoadingFailure => concat!(
                "[Rekindle] Your profile could not be loaded.\n",
                "Progress made during this session will not be saved.\n",
                "Please reconnect or contact a server administrator."
            ),
            MessageKey::AdminFailureNotice => {
                "[Rekindle] Gave up loading the profile of {0} after repeated failures."
            }
        }
    }
}

impl MessageCatalog for EnglishCatalog {
    fn message(&self, key: MessageKey, args: &[&str]) -> String {
        format_template(Self::template(key), args)
    }
}

/// Replaces positional `{n}` placeholders in `template`.
///
/// Placeholders without a matching argument are left untouched.
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = template.to_owned();
    for (index, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{index}}}"), arg);
    }
    out
}
