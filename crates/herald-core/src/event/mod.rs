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

//! Provides the typed publish/subscribe primitives.
//!
//! Every event payload type `T` gets its own channels, created lazily by the
//! [`EventRegistry`]:
//!
//! - a [`SyncChannel`], which runs subscribers one after another in
//!   subscription order and stops at the first failure;
//! - an [`AsyncChannel`], which runs all subscribers concurrently and waits
//!   for every one of them before reporting.
//!
//! Subscribing returns a [`Subscription`] that revokes exactly that
//! registration. Components that subscribe to several event types implement
//! [`EventHandler`] and keep their subscriptions in a [`HandlerBase`].

mod async_channel;
mod handler;
mod registry;
mod subscribers;
mod subscription;
mod sync_channel;

pub use self::async_channel::AsyncChannel;
pub use self::handler::{attach, EventHandler, HandlerBase, Registrar};
pub use self::registry::{DeliveryMode, EventRegistry};
pub use self::subscription::{Subscription, SubscriptionGuard, SubscriptionId};
pub use self::sync_channel::SyncChannel;
