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

//! # Herald Core
//!
//! Typed, in-process publish/subscribe primitives.
//!
//! An [`EventRegistry`] lazily creates one [`SyncChannel`] and one
//! [`AsyncChannel`] per event payload type. Subscribing to a channel returns a
//! [`Subscription`] that can later be revoked, and types implementing
//! [`EventHandler`] aggregate their subscriptions in a [`HandlerBase`] so they
//! can be released together.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::EventBusConfig;
pub use error::EventError;
pub use event::{
    attach, AsyncChannel, DeliveryMode, EventHandler, EventRegistry, HandlerBase, Registrar,
    Subscription, SubscriptionGuard, SubscriptionId, SyncChannel,
};
