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

//! Error types reported by registries, channels and handlers.

use std::any::Any;
use std::time::Duration;

use thiserror::Error;

/// An error raised while looking up a channel, publishing an event or
/// attaching a handler.
///
/// Subscriber callbacks report their own failures as [`anyhow::Error`]; the
/// channel never swallows them and wraps them here with enough context to
/// tell which event type was being delivered.
#[derive(Debug, Error)]
pub enum EventError {
    /// The channel stored for an event type could not be downcast to the
    /// requested channel type.
    #[error("channel registered for `{event_type}` has an unexpected type")]
    ChannelTypeMismatch {
        /// The payload type that was requested.
        event_type: &'static str,
    },

    /// A subscriber of a synchronous channel failed. Subscribers registered
    /// after it were not invoked for this publish.
    #[error("subscriber #{position} of `{event_type}` failed: {source}")]
    Subscriber {
        /// The payload type being delivered.
        event_type: &'static str,
        /// Zero-based position of the failing subscriber in delivery order.
        position: usize,
        /// The error returned by the subscriber.
        #[source]
        source: anyhow::Error,
    },

    /// One or more subscribers of an asynchronous channel failed. Every
    /// subscriber still ran to completion.
    #[error(
        "{} of {total} subscribers of `{event_type}` failed; first failure: {first}",
        .others.len() + 1
    )]
    Publish {
        /// The payload type being delivered.
        event_type: &'static str,
        /// How many subscribers the publish was delivered to.
        total: usize,
        /// The first failure, in subscription order.
        #[source]
        first: anyhow::Error,
        /// Every other failure, in subscription order.
        others: Vec<anyhow::Error>,
    },

    /// An asynchronous publish did not complete within the configured
    /// [`publish_timeout`](crate::EventBusConfig::publish_timeout).
    #[error("publishing `{event_type}` did not complete within {timeout:?}")]
    Timeout {
        /// The payload type being delivered.
        event_type: &'static str,
        /// The limit that was exceeded.
        timeout: Duration,
    },

    /// A handler failed while registering its events. None of the
    /// subscriptions it made before the failure remain active.
    #[error("handler `{handler}` failed to register its events: {source}")]
    HandlerRegistration {
        /// Name of the handler being attached.
        handler: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<EventError>,
    },
}

impl EventError {
    /// Returns every subscriber failure carried by this error, in
    /// subscription order.
    ///
    /// Lookup, timeout and registration errors carry none.
    pub fn subscriber_failures(&self) -> Vec<&anyhow::Error> {
        match self {
            EventError::Subscriber { source, .. } => vec![source],
            EventError::Publish { first, others, .. } => {
                std::iter::once(first).chain(others.iter()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Converts a panic payload caught from a subscriber into an error.
pub(crate) fn panic_to_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    anyhow::anyhow!("subscriber panicked: {message}")
}
