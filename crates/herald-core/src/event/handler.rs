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

//! Subscriber aggregates that own, and release together, every subscription
//! they create.
//!
//! A concrete handler embeds a [`HandlerBase`], implements [`EventHandler`]
//! to declare its subscriptions, and is constructed through [`attach`], which
//! fuses construction and subscription:
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use herald_core::{attach, EventError, EventHandler, EventRegistry, HandlerBase, Registrar};
//!
//! #[derive(Clone)]
//! struct ScoreChanged(u32);
//!
//! struct Scoreboard {
//!     base: HandlerBase,
//!     updates: AtomicUsize,
//! }
//!
//! impl Scoreboard {
//!     fn new(registry: &EventRegistry) -> Result<Arc<Self>, EventError> {
//!         attach(
//!             registry,
//!             Self {
//!                 base: HandlerBase::new("Scoreboard"),
//!                 updates: AtomicUsize::new(0),
//!             },
//!         )
//!     }
//! }
//!
//! impl EventHandler for Scoreboard {
//!     fn base(&self) -> &HandlerBase {
//!         &self.base
//!     }
//!
//!     fn register_events(registrar: &mut Registrar<'_, Self>) -> Result<(), EventError> {
//!         registrar.register_sync(|board: &Self, _event: &ScoreChanged| {
//!             board.updates.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let registry = EventRegistry::new();
//! let board = Scoreboard::new(&registry).unwrap();
//! registry.publish_sync(&ScoreChanged(3)).unwrap();
//! board.revoke_all();
//! registry.publish_sync(&ScoreChanged(4)).unwrap();
//! assert_eq!(board.updates.load(Ordering::SeqCst), 1);
//! ```

use std::future::Future;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::registry::EventRegistry;
use super::subscription::Subscription;
use crate::error::EventError;

/// Bookkeeping shared by every [`EventHandler`]: a name for diagnostics and
/// the set of subscriptions the handler owns.
#[derive(Debug)]
pub struct HandlerBase {
    name: &'static str,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl HandlerBase {
    /// Creates an empty base for a handler called `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// The handler's name, as used in log messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns how many of the owned subscriptions are still registered.
    pub fn active_subscriptions(&self) -> usize {
        self.lock()
            .iter()
            .filter(|subscription| subscription.is_active())
            .count()
    }

    /// Revokes every owned subscription and clears the owned set.
    ///
    /// Calling it again is a no-op.
    pub fn revoke_all(&self) {
        let subscriptions = mem::take(&mut *self.lock());
        if subscriptions.is_empty() {
            return;
        }

        let revoked = subscriptions
            .iter()
            .filter(|subscription| subscription.revoke())
            .count();
        log::info!("{}: Unsubscribed from {revoked} events.", self.name);
    }

    fn adopt(&self, subscriptions: Vec<Subscription>) {
        self.lock().extend(subscriptions);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HandlerBase {
    fn drop(&mut self) {
        let leftover = self
            .subscriptions
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let active = leftover.iter().filter(|s| s.revoke()).count();
        if active > 0 {
            log::warn!(
                "{}: dropped with {active} active subscriptions; revoke_all() was not called.",
                self.name
            );
        }
    }
}

/// A component that subscribes to several event types and releases them
/// together.
///
/// Implementors are built with [`attach`], which calls
/// [`register_events`](Self::register_events) exactly once as part of
/// construction.
pub trait EventHandler: Send + Sync + Sized + 'static {
    /// The bookkeeping embedded in the handler.
    fn base(&self) -> &HandlerBase;

    /// Declares the handler's subscriptions through `registrar`.
    ///
    /// Any error aborts construction and revokes what was registered so far.
    fn register_events(registrar: &mut Registrar<'_, Self>) -> Result<(), EventError>;

    /// Revokes every subscription the handler owns.
    fn revoke_all(&self) {
        self.base().revoke_all();
    }
}

/// Registration context handed to [`EventHandler::register_events`].
///
/// Callbacks registered here receive the handler itself. The channel only
/// holds a weak reference to the handler, so once the handler is dropped its
/// callbacks turn into no-ops instead of keeping it alive.
pub struct Registrar<'a, H> {
    registry: &'a EventRegistry,
    owner: Weak<H>,
    subscriptions: Vec<Subscription>,
}

impl<'a, H: EventHandler> Registrar<'a, H> {
    /// The registry the handler is being attached to.
    pub fn registry(&self) -> &'a EventRegistry {
        self.registry
    }

    /// Subscribes `callback` to the asynchronous channel for `T`.
    pub fn register<T, F, Fut>(&mut self, callback: F) -> Result<(), EventError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Arc<H>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let channel = self.registry.async_channel::<T>()?;
        let owner = self.owner.clone();
        let subscription = channel.subscribe(move |event: T| {
            let delivery = owner.upgrade().map(|handler| callback(handler, event));
            async move {
                match delivery {
                    Some(delivery) => delivery.await,
                    None => Ok(()),
                }
            }
        });
        self.subscriptions.push(subscription);
        Ok(())
    }

    /// Subscribes `callback` to the synchronous channel for `T`.
    pub fn register_sync<T, F>(&mut self, callback: F) -> Result<(), EventError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&H, &T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let channel = self.registry.sync_channel::<T>()?;
        let owner = self.owner.clone();
        let subscription = channel.subscribe(move |event: &T| match owner.upgrade() {
            Some(handler) => callback(&handler, event),
            None => Ok(()),
        });
        self.subscriptions.push(subscription);
        Ok(())
    }

    /// Adds a subscription made directly on a channel to the handler's owned
    /// set, so [`EventHandler::revoke_all`] releases it too.
    pub fn adopt(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }
}

/// Wraps `handler` in an [`Arc`] and performs all of its subscriptions.
///
/// On success every subscription made during
/// [`register_events`](EventHandler::register_events) is owned by the
/// handler's [`HandlerBase`]. On failure those subscriptions are revoked and
/// the handler is dropped, so no half-subscribed handler survives.
pub fn attach<H: EventHandler>(registry: &EventRegistry, handler: H) -> Result<Arc<H>, EventError> {
    let handler = Arc::new(handler);
    let mut registrar = Registrar {
        registry,
        owner: Arc::downgrade(&handler),
        subscriptions: Vec::new(),
    };

    let name = handler.base().name();
    match H::register_events(&mut registrar) {
        Ok(()) => {
            let count = registrar.subscriptions.len();
            handler.base().adopt(registrar.subscriptions);
            log::info!("{name}: Subscribed to {count} events.");
            Ok(handler)
        }
        Err(source) => {
            for subscription in &registrar.subscriptions {
                subscription.revoke();
            }
            log::error!("{name}: Failed to subscribe to events during construction: {source}");
            Err(EventError::HandlerRegistration {
                handler: name,
                source: Box::new(source),
            })
        }
    }
}
