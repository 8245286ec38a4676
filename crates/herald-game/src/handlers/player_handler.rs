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

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use herald_core::{attach, EventError, EventHandler, EventRegistry, HandlerBase, Registrar};
use uuid::Uuid;

use crate::events::{PlayerAdded, PlayerRemoved, PlayerUpdated};

/// Keeps a roster of the players announced on the registry.
///
/// Subscribes to [`PlayerAdded`], [`PlayerUpdated`] and [`PlayerRemoved`].
/// Each callback waits for `processing_delay` to stand in for real work.
#[derive(Debug)]
pub struct PlayerEventHandler {
    base: HandlerBase,
    processing_delay: Duration,
    roster: Mutex<HashMap<Uuid, String>>,
    updates: Mutex<u32>,
}

impl PlayerEventHandler {
    /// Creates the handler and subscribes it to the player events.
    pub fn new(registry: &EventRegistry) -> Result<Arc<Self>, EventError> {
        Self::with_processing_delay(registry, Duration::ZERO)
    }

    /// Like [`new`](Self::new), with every callback taking at least `delay`.
    pub fn with_processing_delay(
        registry: &EventRegistry,
        delay: Duration,
    ) -> Result<Arc<Self>, EventError> {
        attach(
            registry,
            Self {
                base: HandlerBase::new("PlayerEventHandler"),
                processing_delay: delay,
                roster: Mutex::new(HashMap::new()),
                updates: Mutex::new(0),
            },
        )
    }

    /// Returns the name last announced for `id`, if the player is known.
    pub fn known_player(&self, id: Uuid) -> Option<String> {
        self.roster().get(&id).cloned()
    }

    /// Returns how many players are currently on the roster.
    pub fn roster_size(&self) -> usize {
        self.roster().len()
    }

    /// Returns how many [`PlayerUpdated`] events were observed.
    pub fn update_count(&self) -> u32 {
        *self.updates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn on_player_added(&self, event: PlayerAdded) -> anyhow::Result<()> {
        log::info!(
            "PlayerEventHandler: Player {} (ID: {}) joined the roster.",
            event.name,
            event.id
        );
        self.roster().insert(event.id, event.name);
        self.simulate_work().await;
        Ok(())
    }

    async fn on_player_updated(&self, event: PlayerUpdated) -> anyhow::Result<()> {
        let player = event.player;
        log::info!(
            "PlayerEventHandler: Player {} was updated with {} XP at level {}.",
            player.name,
            player.experience,
            player.level()
        );
        self.roster().insert(player.id(), player.name);
        *self.updates.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.simulate_work().await;
        Ok(())
    }

    async fn on_player_removed(&self, event: PlayerRemoved) -> anyhow::Result<()> {
        log::info!(
            "PlayerEventHandler: Player with ID {} was removed from the system.",
            event.id
        );
        self.roster().remove(&event.id);
        self.simulate_work().await;
        Ok(())
    }

    async fn simulate_work(&self) {
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }
    }

    fn roster(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, String>> {
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventHandler for PlayerEventHandler {
    fn base(&self) -> &HandlerBase {
        &self.base
    }

    fn register_events(registrar: &mut Registrar<'_, Self>) -> Result<(), EventError> {
        registrar.register(|handler: Arc<Self>, event: PlayerAdded| async move {
            handler.on_player_added(event).await
        })?;
        registrar.register(|handler: Arc<Self>, event: PlayerUpdated| async move {
            handler.on_player_updated(event).await
        })?;
        registrar.register(|handler: Arc<Self>, event: PlayerRemoved| async move {
            handler.on_player_removed(event).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;

    #[tokio::test]
    async fn roster_follows_player_lifecycle() {
        let registry = EventRegistry::new();
        let handler = PlayerEventHandler::new(&registry).unwrap();
        let mut player = Player::new("John Doe");

        registry
            .publish_async(PlayerAdded::from(&player))
            .await
            .unwrap();
        assert_eq!(handler.known_player(player.id()).as_deref(), Some("John Doe"));

        player.name = "John Q. Doe".to_string();
        registry
            .publish_async(PlayerUpdated {
                player: player.clone(),
            })
            .await
            .unwrap();
        assert_eq!(handler.known_player(player.id()).as_deref(), Some("John Q. Doe"));
        assert_eq!(handler.update_count(), 1);

        registry
            .publish_async(PlayerRemoved { id: player.id() })
            .await
            .unwrap();
        assert_eq!(handler.roster_size(), 0);
    }

    #[tokio::test]
    async fn subscribes_to_three_events() {
        let registry = EventRegistry::new();
        let handler = PlayerEventHandler::new(&registry).unwrap();

        assert_eq!(handler.base().active_subscriptions(), 3);
        handler.revoke_all();
        assert_eq!(handler.base().active_subscriptions(), 0);
    }
}
