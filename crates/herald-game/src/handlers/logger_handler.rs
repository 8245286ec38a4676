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

use std::sync::{Arc, Mutex, PoisonError};

use herald_core::{attach, EventError, EventHandler, EventRegistry, HandlerBase, Registrar};

use crate::events::{PlayerAdded, PlayerLevelUp};

/// Writes a journal line for player arrivals and level-ups.
///
/// Arrivals come from the asynchronous [`PlayerAdded`] channel, level-ups from
/// the synchronous [`PlayerLevelUp`] channel.
#[derive(Debug)]
pub struct LoggerEventHandler {
    base: HandlerBase,
    journal: Mutex<Vec<String>>,
}

impl LoggerEventHandler {
    /// Creates the handler and subscribes it.
    pub fn new(registry: &EventRegistry) -> Result<Arc<Self>, EventError> {
        attach(
            registry,
            Self {
                base: HandlerBase::new("LoggerEventHandler"),
                journal: Mutex::new(Vec::new()),
            },
        )
    }

    /// Returns every journal line written so far, oldest first.
    pub fn journal(&self) -> Vec<String> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, line: String) {
        log::info!("LoggerEventHandler: {line}");
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}

impl EventHandler for LoggerEventHandler {
    fn base(&self) -> &HandlerBase {
        &self.base
    }

    fn register_events(registrar: &mut Registrar<'_, Self>) -> Result<(), EventError> {
        registrar.register(|handler: Arc<Self>, event: PlayerAdded| async move {
            handler.record(format!("Player {} (ID: {}) added.", event.name, event.id));
            Ok(())
        })?;
        registrar.register_sync(|handler: &Self, event: &PlayerLevelUp| {
            handler.record(format!(
                "Player {} (ID: {}) reached level {} from level {}.",
                event.name, event.id, event.new_level, event.old_level
            ));
            Ok(())
        })
    }
}
