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

//! Runtime configuration for the event registry and its channels.

use std::time::Duration;

/// Configuration shared by every channel an [`EventRegistry`](crate::EventRegistry)
/// creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Upper bound on how long an asynchronous publish waits for its
    /// subscribers to finish.
    ///
    /// `None` (the default) waits for every subscriber, however long it takes.
    /// When set, a publish that exceeds the limit returns
    /// [`EventError::Timeout`](crate::EventError::Timeout) and the subscribers
    /// still in flight are dropped. Requires a Tokio runtime with the time
    /// driver enabled.
    pub publish_timeout: Option<Duration>,
}

impl EventBusConfig {
    /// Returns this configuration with the asynchronous publish timeout set.
    #[must_use]
    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = Some(timeout);
        self
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            publish_timeout: None,
        }
    }
}
