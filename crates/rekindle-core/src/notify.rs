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

//! Player-facing messages and audience broadcasts.

use crate::identity::PlayerId;
use std::fmt;

/// A message sent directly to one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A single line of text.
    Line(String),
    /// Text already split into lines, delivered in order.
    Lines(Vec<String>),
}

impl Message {
    /// A single-line message.
    pub fn line(text: impl Into<String>) -> Self {
        Message::Line(text.into())
    }

    /// Splits `text` on newlines into a multi-line message.
    pub fn split_lines(text: &str) -> Self {
        Message::Lines(text.split('\n').map(str::to_owned).collect())
    }

    /// Iterates over the lines in delivery order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        let lines: &[String] = match self {
            Message::Line(line) => std::slice::from_ref(line),
            Message::Lines(lines) => lines,
        };
        lines.iter().map(String::as_str)
    }

    /// Number of lines the player will see.
    pub fn line_count(&self) -> usize {
        match self {
            Message::Line(_) => 1,
            Message::Lines(lines) => lines.len(),
        }
    }
}

/// Audience channels for broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Operators and anyone holding the administrative broadcast permission.
    Administrative,
}

impl Audience {
    /// Channel name hosts use to route the broadcast.
    pub fn channel(&self) -> &'static str {
        match self {
            Audience::Administrative => "rekindle.broadcast.admin",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel())
    }
}

/// Delivers player messages and audience broadcasts.
pub trait Notifier: Send + Sync {
    /// Sends a message to one player.
    fn send_message(&self, player: &PlayerId, message: Message);

    /// Broadcasts text to everyone in `audience`.
    fn broadcast(&self, text: &str, audience: Audience);
}
