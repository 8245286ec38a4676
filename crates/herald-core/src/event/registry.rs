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

//! A type-keyed registry of event channels.
//!
//! The [`EventRegistry`] is a type-map in the spirit of a service locator:
//! producers and consumers ask it for the channel of a payload type instead of
//! being wired to each other. Channels are created on first access and live
//! as long as the registry.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::async_channel::AsyncChannel;
use super::sync_channel::SyncChannel;
use crate::config::EventBusConfig;
use crate::error::EventError;

/// How a channel delivers events to its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryMode {
    /// Sequential, in subscription order, on the publisher's thread.
    Sync,
    /// Concurrent fan-out joined before the publish completes.
    Async,
}

type ChannelKey = (TypeId, DeliveryMode);

/// Owner and factory of every channel, keyed by payload type.
///
/// At most one synchronous and one asynchronous channel exist per payload
/// type, and repeated lookups return the same instance. The registry is meant
/// to be created once by the application and passed by reference (or inside
/// an [`Arc`]) to everything that publishes or subscribes.
///
/// # Example
///
/// ```rust
/// use herald_core::EventRegistry;
///
/// #[derive(Clone)]
/// struct Ping(u32);
///
/// let registry = EventRegistry::new();
/// let channel = registry.sync_channel::<Ping>().unwrap();
/// let _subscription = channel.subscribe(|ping: &Ping| {
///     assert_eq!(ping.0, 7);
///     Ok(())
/// });
///
/// registry.publish_sync(&Ping(7)).unwrap();
/// ```
pub struct EventRegistry {
    config: EventBusConfig,
    channels: RwLock<HashMap<ChannelKey, Arc<dyn Any + Send + Sync>>>,
}

impl EventRegistry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Creates an empty registry whose channels use `config`.
    #[must_use]
    pub fn with_config(config: EventBusConfig) -> Self {
        log::info!("EventRegistry initialized ({config:?}).");
        Self {
            config,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// The configuration applied to channels created by this registry.
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Returns the asynchronous channel for `T`, creating it on first access.
    pub fn async_channel<T>(&self) -> Result<Arc<AsyncChannel<T>>, EventError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.get_or_create::<T, _, _>(DeliveryMode::Async, || {
            AsyncChannel::<T>::with_config(&self.config)
        })
    }

    /// Returns the synchronous channel for `T`, creating it on first access.
    pub fn sync_channel<T>(&self) -> Result<Arc<SyncChannel<T>>, EventError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.get_or_create::<T, _, _>(DeliveryMode::Sync, SyncChannel::<T>::new)
    }

    /// Publishes `event` on the asynchronous channel for `T`.
    pub async fn publish_async<T>(&self, event: T) -> Result<(), EventError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.async_channel::<T>()?.publish(event).await
    }

    /// Publishes `event` on the synchronous channel for `T`.
    pub fn publish_sync<T>(&self, event: &T) -> Result<(), EventError>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.sync_channel::<T>()?.publish(event)
    }

    /// Returns the number of channels created so far, across both modes.
    pub fn channel_count(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn get_or_create<T, C, F>(&self, mode: DeliveryMode, create: F) -> Result<Arc<C>, EventError>
    where
        T: 'static,
        C: Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        let key = (TypeId::of::<T>(), mode);

        let existing = self
            .channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        let channel = match existing {
            Some(channel) => channel,
            None => {
                // Re-checked under the write lock: only one racer creates.
                let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
                let channel = channels.entry(key).or_insert_with(|| {
                    log::debug!(
                        "EventRegistry: created {mode:?} channel for {}.",
                        type_name::<T>()
                    );
                    Arc::new(create()) as Arc<dyn Any + Send + Sync>
                });
                Arc::clone(channel)
            }
        };

        channel
            .downcast::<C>()
            .map_err(|_| EventError::ChannelTypeMismatch {
                event_type: type_name::<T>(),
            })
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("config", &self.config)
            .field("channels", &self.channel_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    struct PlayerJoined {
        name: String,
    }

    #[test]
    fn async_channel_is_memoized() {
        let registry = EventRegistry::new();
        let first = registry.async_channel::<String>().unwrap();
        let second = registry.async_channel::<String>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.channel_count(), 1);
    }

    #[test]
    fn sync_channel_is_memoized() {
        let registry = EventRegistry::new();
        let first = registry.sync_channel::<String>().unwrap();
        let second = registry.sync_channel::<String>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn different_types_get_different_channels() {
        let registry = EventRegistry::new();
        let strings = registry.async_channel::<String>().unwrap();
        let numbers = registry.async_channel::<i32>().unwrap();

        strings.subscribe(|_: String| async { Ok(()) });

        assert!(strings.has_subscribers());
        assert!(!numbers.has_subscribers());
        assert_eq!(registry.channel_count(), 2);
    }

    #[test]
    fn sync_and_async_channels_are_distinct() {
        let registry = EventRegistry::new();
        let sync = registry.sync_channel::<String>().unwrap();
        let asynchronous = registry.async_channel::<String>().unwrap();

        sync.subscribe(|_: &String| Ok(()));

        assert!(sync.has_subscribers());
        assert!(!asynchronous.has_subscribers());
        assert_eq!(registry.channel_count(), 2);
    }

    #[test]
    fn subscriptions_are_shared_through_the_registry() {
        let registry = EventRegistry::new();
        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        registry
            .sync_channel::<PlayerJoined>()
            .unwrap()
            .subscribe(move |event: &PlayerJoined| {
                sink.lock().unwrap().push(event.name.clone());
                Ok(())
            });

        registry
            .publish_sync(&PlayerJoined {
                name: "Jane Smith".to_string(),
            })
            .unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["Jane Smith".to_string()]);
    }

    #[test]
    fn concurrent_first_access_creates_one_channel() {
        let registry = Arc::new(EventRegistry::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.async_channel::<PlayerJoined>().unwrap()
                })
            })
            .collect();

        let channels: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("Thread join failed"))
            .collect();

        assert!(channels.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
        assert_eq!(registry.channel_count(), 1);
    }

    #[test]
    fn channels_inherit_registry_config() {
        let config = EventBusConfig::default()
            .with_publish_timeout(std::time::Duration::from_millis(75));
        let registry = EventRegistry::with_config(config.clone());
        let channel = registry.async_channel::<String>().unwrap();

        assert_eq!(registry.config(), &config);
        assert!(format!("{channel:?}").contains("75ms"));
    }
}
