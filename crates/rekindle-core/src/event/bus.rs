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

/// A generic, thread-safe publish/drain channel.
///
/// Publishers may live on either execution context; the owner of the bus
/// drains it from the main context.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Publishes a value. Never blocks.
    pub fn publish(&self, event: T) {
        // The bus owns its receiver, so the channel only disconnects when the bus is gone.
        if let Err(e) = self.sender.send(event) {
            log::error!("EventBus: Failed to publish event: {e}");
        }
    }

    /// Returns a sender that can be handed to other threads.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Takes every value published so far, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Number of values waiting to be drained.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is waiting to be drained.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
