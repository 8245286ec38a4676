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

//! Ordered, fail-fast delivery on the publisher's thread.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, Weak};

use super::subscribers::{Revoke, SubscriberList};
use super::subscription::Subscription;
use crate::error::EventError;

type SyncCallback<T> = dyn Fn(&T) -> anyhow::Result<()> + Send + Sync;

/// A channel that delivers each event to its subscribers one after another,
/// on the publisher's thread, in subscription order.
///
/// Delivery is fail-fast: the first subscriber that returns an error stops
/// the publish, and subscribers registered after it are not invoked for that
/// event.
pub struct SyncChannel<T: Clone + Send + Sync + 'static> {
    subscribers: Arc<SubscriberList<SyncCallback<T>>>,
}

impl<T: Clone + Send + Sync + 'static> SyncChannel<T> {
    /// Creates a channel with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(SubscriberList::new()),
        }
    }

    /// Appends `callback` to the delivery order.
    ///
    /// The same callback may be subscribed several times; it is then invoked
    /// once per registration.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = self.subscribers.push(Arc::new(callback));
        log::trace!("SyncChannel<{}>: subscription {id} added.", type_name::<T>());

        let subscribers = Arc::downgrade(&self.subscribers) as Weak<dyn Revoke>;
        Subscription::new(id, type_name::<T>(), subscribers)
    }

    /// Revokes `subscription` if it was issued by this channel.
    ///
    /// Handles from another channel, or handles already revoked, are ignored.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        if subscription.is_issued_by(&self.subscribers) {
            subscription.revoke();
        }
    }

    /// Delivers `event` to every subscriber in subscription order.
    ///
    /// Returns the first subscriber failure, after which no further
    /// subscribers are invoked. Publishing with no subscribers does nothing.
    pub fn publish(&self, event: &T) -> Result<(), EventError> {
        let callbacks = self.subscribers.snapshot();
        if callbacks.is_empty() {
            return Ok(());
        }

        log::trace!(
            "SyncChannel<{}>: publishing to {} subscribers.",
            type_name::<T>(),
            callbacks.len()
        );

        for (position, callback) in callbacks.iter().enumerate() {
            if let Err(source) = callback(event) {
                log::debug!(
                    "SyncChannel<{}>: subscriber at position {position} failed: {source:#}",
                    type_name::<T>()
                );
                return Err(EventError::Subscriber {
                    event_type: type_name::<T>(),
                    position,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Returns `true` if at least one callback is subscribed.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    /// Returns the number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SyncChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for SyncChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncChannel")
            .field("event_type", &type_name::<T>())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
