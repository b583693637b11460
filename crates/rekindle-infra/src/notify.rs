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

//! Notifier that records deliveries on an event bus.

use rekindle_core::event::EventBus;
use rekindle_core::notify::{Audience, Message, Notifier};
use rekindle_core::PlayerId;

/// A delivery made through [`ChannelNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A message sent to one player.
    Direct {
        /// Recipient.
        player: PlayerId,
        /// Content.
        message: Message,
    },
    /// A broadcast to an audience.
    Broadcast {
        /// Broadcast text.
        text: String,
        /// Who receives it.
        audience: Audience,
    },
}

/// Publishes every notification to an unbounded bus for a host (or a test)
/// to drain.
#[derive(Default)]
pub struct ChannelNotifier {
    bus: EventBus<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier with an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every notification published so far.
    pub fn drain(&self) -> Vec<Notification> {
        self.bus.drain()
    }

    /// Number of notifications waiting to be drained.
    pub fn pending(&self) -> usize {
        self.bus.len()
    }
}

impl Notifier for ChannelNotifier {
    fn send_message(&self, player: &PlayerId, message: Message) {
        self.bus.publish(Notification::Direct {
            player: *player,
            message,
        });
    }

    fn broadcast(&self, text: &str, audience: Audience) {
        log::debug!("ChannelNotifier: Broadcast on {}: {}", audience.channel(), text);
        self.bus.publish(Notification::Broadcast {
            text: text.to_owned(),
            audience,
        });
    }
}
