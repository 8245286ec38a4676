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

//! Concurrent fan-out delivery joined before the publish completes.

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

use super::subscribers::{Revoke, SubscriberList};
use super::subscription::Subscription;
use crate::config::EventBusConfig;
use crate::error::{panic_to_error, EventError};

type AsyncCallback<T> = dyn Fn(T) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// A channel that delivers each event to all of its subscribers concurrently
/// and completes once every one of them has finished.
///
/// Each subscriber receives its own clone of the event. There is no ordering
/// guarantee between subscriber completions; only the join point is
/// deterministic. A failing or panicking subscriber never cancels its
/// siblings.
pub struct AsyncChannel<T: Clone + Send + Sync + 'static> {
    subscribers: Arc<SubscriberList<AsyncCallback<T>>>,
    publish_timeout: Option<Duration>,
}

impl<T: Clone + Send + Sync + 'static> AsyncChannel<T> {
    /// Creates a channel with no subscribers and no publish timeout.
    pub fn new() -> Self {
        Self::with_config(&EventBusConfig::default())
    }

    /// Creates a channel with no subscribers using the given configuration.
    pub fn with_config(config: &EventBusConfig) -> Self {
        Self {
            subscribers: Arc::new(SubscriberList::new()),
            publish_timeout: config.publish_timeout,
        }
    }

    /// Adds `callback` to the set of subscribers.
    ///
    /// The same callback may be subscribed several times; it is then invoked
    /// once per registration.
    pub fn subscribe<F, Fut>(&self, callback: F) -> Subscription
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let callback: Arc<AsyncCallback<T>> = Arc::new(move |event: T| callback(event).boxed());
        let id = self.subscribers.push(callback);
        log::trace!("AsyncChannel<{}>: subscription {id} added.", type_name::<T>());

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

    /// Delivers `event` to every subscriber concurrently and waits for all of
    /// them.
    ///
    /// Subscribers are taken from a snapshot made when the call starts, so a
    /// concurrent subscribe or unsubscribe only affects later publishes.
    /// Returns [`EventError::Publish`] if any subscriber failed or panicked,
    /// after all of them have completed. Publishing with no subscribers
    /// returns immediately.
    pub async fn publish(&self, event: T) -> Result<(), EventError> {
        let callbacks = self.subscribers.snapshot();
        if callbacks.is_empty() {
            return Ok(());
        }

        let total = callbacks.len();
        log::trace!(
            "AsyncChannel<{}>: publishing to {total} subscribers.",
            type_name::<T>()
        );

        // The callback itself is invoked inside the future so a panic while
        // building the subscriber's future is caught as well.
        let deliveries = join_all(callbacks.into_iter().map(|callback| {
            let event = event.clone();
            AssertUnwindSafe(async move { callback(event).await }).catch_unwind()
        }));

        let outcomes = match self.publish_timeout {
            Some(timeout) => tokio::time::timeout(timeout, deliveries)
                .await
                .map_err(|_| {
                    log::warn!(
                        "AsyncChannel<{}>: publish timed out after {timeout:?}.",
                        type_name::<T>()
                    );
                    EventError::Timeout {
                        event_type: type_name::<T>(),
                        timeout,
                    }
                })?,
            None => deliveries.await,
        };

        let mut failures = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some(error),
                Err(payload) => Some(panic_to_error(payload)),
            })
            .collect::<Vec<_>>();

        if failures.is_empty() {
            return Ok(());
        }

        log::debug!(
            "AsyncChannel<{}>: {} of {total} subscribers failed.",
            type_name::<T>(),
            failures.len()
        );
        let first = failures.remove(0);
        Err(EventError::Publish {
            event_type: type_name::<T>(),
            total,
            first,
            others: failures,
        })
    }

    /// Returns `true` if at least one callback is subscribed.
    ///
    /// Producers can use this to skip building an event nobody listens to.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    /// Returns the number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for AsyncChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> fmt::Debug for AsyncChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncChannel")
            .field("event_type", &type_name::<T>())
            .field("subscribers", &self.subscribers.len())
            .field("publish_timeout", &self.publish_timeout)
            .finish()
    }
}
