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

//! Player bookkeeping that announces every change on the event registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use herald_core::{EventError, EventRegistry};
use thiserror::Error;
use uuid::Uuid;

use crate::events::{PlayerAdded, PlayerLevelUp, PlayerRemoved, PlayerUpdated};
use crate::player::Player;

/// An error raised by [`PlayerManager`] operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// No player with the given id is stored.
    #[error("no player with id {0}")]
    NotFound(Uuid),
    /// The change was stored but announcing it failed.
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Stores players in memory and publishes an event for every change.
///
/// The store is updated before the event is published, so subscribers that
/// query the manager observe the new state.
#[derive(Debug)]
pub struct PlayerManager {
    registry: Arc<EventRegistry>,
    players: RwLock<HashMap<Uuid, Player>>,
}

impl PlayerManager {
    /// Creates an empty manager publishing on `registry`.
    pub fn new(registry: Arc<EventRegistry>) -> Self {
        Self {
            registry,
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `player` and publishes [`PlayerAdded`].
    pub async fn add_player(&self, player: Player) -> Result<Player, PlayerError> {
        let event = PlayerAdded::from(&player);
        self.write().insert(player.id(), player.clone());
        log::debug!("PlayerManager: added {} ({}).", player.name, player.id());

        self.registry.publish_async(event).await?;
        Ok(player)
    }

    /// Creates a player called `name`, stores it and publishes
    /// [`PlayerAdded`].
    pub async fn create_player(&self, name: &str) -> Result<Player, PlayerError> {
        self.add_player(Player::new(name)).await
    }

    /// Replaces a stored player and publishes [`PlayerUpdated`].
    pub async fn update_player(&self, player: Player) -> Result<Player, PlayerError> {
        {
            let mut players = self.write();
            let slot = players
                .get_mut(&player.id())
                .ok_or(PlayerError::NotFound(player.id()))?;
            *slot = player.clone();
        }

        self.registry
            .publish_async(PlayerUpdated {
                player: player.clone(),
            })
            .await?;
        Ok(player)
    }

    /// Removes a player and publishes [`PlayerRemoved`].
    pub async fn remove_player(&self, id: Uuid) -> Result<(), PlayerError> {
        if self.write().remove(&id).is_none() {
            return Err(PlayerError::NotFound(id));
        }
        log::debug!("PlayerManager: removed {id}.");

        self.registry.publish_async(PlayerRemoved { id }).await?;
        Ok(())
    }

    /// Adds experience to a stored player.
    ///
    /// The stored player is updated in place, so concurrent grants to the
    /// same id all count. If the player levels up, [`PlayerLevelUp`] is
    /// published synchronously first; [`PlayerUpdated`] follows in every case.
    pub async fn add_experience(&self, id: Uuid, amount: u32) -> Result<Player, PlayerError> {
        let (player, level_up) = {
            let mut players = self.write();
            let stored = players.get_mut(&id).ok_or(PlayerError::NotFound(id))?;
            let old_level = stored.level();
            let level_up = stored.add_experience(amount).then(|| PlayerLevelUp {
                id,
                name: stored.name.clone(),
                old_level,
                new_level: stored.level(),
            });
            (stored.clone(), level_up)
        };

        if let Some(event) = level_up {
            let channel = self.registry.sync_channel::<PlayerLevelUp>()?;
            if channel.has_subscribers() {
                channel.publish(&event)?;
            }
        }

        self.registry
            .publish_async(PlayerUpdated {
                player: player.clone(),
            })
            .await?;
        Ok(player)
    }

    /// Returns a copy of the player with the given id.
    pub fn get_player(&self, id: Uuid) -> Option<Player> {
        self.read().get(&id).cloned()
    }

    /// Returns a copy of every stored player, in no particular order.
    pub fn all_players(&self) -> Vec<Player> {
        self.read().values().cloned().collect()
    }

    /// Returns the number of stored players.
    pub fn player_count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Player>> {
        self.players.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Player>> {
        self.players.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn manager() -> (Arc<EventRegistry>, PlayerManager) {
        let registry = Arc::new(EventRegistry::new());
        let manager = PlayerManager::new(Arc::clone(&registry));
        (registry, manager)
    }

    #[tokio::test]
    async fn create_player_stores_and_returns_it() {
        let (_, manager) = manager();
        let player = manager.create_player("Test Player").await.unwrap();

        assert_eq!(player.name, "Test Player");
        assert_eq!(manager.get_player(player.id()), Some(player));
    }

    #[tokio::test]
    async fn all_players_lists_every_player() {
        let (_, manager) = manager();
        for name in ["Player 1", "Player 2", "Player 3"] {
            manager.create_player(name).await.unwrap();
        }

        let mut names: Vec<String> = manager.all_players().into_iter().map(|p| p.name).collect();
        names.sort();
        assert_eq!(names, vec!["Player 1", "Player 2", "Player 3"]);
        assert_eq!(manager.player_count(), 3);
    }

    #[tokio::test]
    async fn update_player_replaces_stored_data() {
        let (_, manager) = manager();
        let mut player = manager.create_player("Original Name").await.unwrap();

        player.name = "Updated Name".to_string();
        manager.update_player(player.clone()).await.unwrap();

        assert_eq!(
            manager.get_player(player.id()).map(|p| p.name),
            Some("Updated Name".to_string())
        );
    }

    #[tokio::test]
    async fn update_unknown_player_fails() {
        let (_, manager) = manager();
        let stranger = Player::new("Nobody");

        let error = manager.update_player(stranger.clone()).await.unwrap_err();

        assert!(matches!(error, PlayerError::NotFound(id) if id == stranger.id()));
    }

    #[tokio::test]
    async fn remove_player_deletes_it() {
        let (_, manager) = manager();
        let player = manager.create_player("To Be Removed").await.unwrap();

        manager.remove_player(player.id()).await.unwrap();

        assert!(manager.get_player(player.id()).is_none());
        assert!(matches!(
            manager.remove_player(player.id()).await,
            Err(PlayerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn add_experience_publishes_level_up_before_update() {
        let (registry, manager) = manager();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&log);
        registry
            .sync_channel::<PlayerLevelUp>()
            .unwrap()
            .subscribe(move |event: &PlayerLevelUp| {
                sink.lock()
                    .unwrap()
                    .push(format!("level {}->{}", event.old_level, event.new_level));
                Ok(())
            });
        let sink = Arc::clone(&log);
        registry
            .async_channel::<PlayerUpdated>()
            .unwrap()
            .subscribe(move |event: PlayerUpdated| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock()
                        .unwrap()
                        .push(format!("updated xp {}", event.player.experience));
                    Ok(())
                }
            });

        let player = manager.create_player("Climber").await.unwrap();
        manager.add_experience(player.id(), 40).await.unwrap();
        let updated = manager.add_experience(player.id(), 210).await.unwrap();

        assert_eq!(updated.level(), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["updated xp 40", "level 1->3", "updated xp 250"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_grants_to_one_player_all_count() {
        let (registry, manager) = manager();
        let manager = Arc::new(manager);
        let levels = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&levels);
        registry
            .sync_channel::<PlayerLevelUp>()
            .unwrap()
            .subscribe(move |event: &PlayerLevelUp| {
                std::thread::sleep(std::time::Duration::from_millis(5));
                sink.lock()
                    .unwrap()
                    .push((event.old_level, event.new_level));
                Ok(())
            });

        let player = manager.create_player("Grinder").await.unwrap();
        let grants: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let id = player.id();
                tokio::spawn(async move { manager.add_experience(id, 100).await })
            })
            .collect();
        for grant in grants {
            grant.await.expect("Task join failed").unwrap();
        }

        let stored = manager.get_player(player.id()).unwrap();
        assert_eq!(stored.experience, 800);
        assert_eq!(stored.level(), 9);

        let mut levels = levels.lock().unwrap().clone();
        levels.sort();
        let expected: Vec<(u32, u32)> = (1..=8).map(|level| (level, level + 1)).collect();
        assert_eq!(levels, expected);
    }

    #[tokio::test]
    async fn add_experience_to_unknown_player_fails() {
        let (_, manager) = manager();
        let id = Uuid::new_v4();

        assert!(matches!(
            manager.add_experience(id, 10).await,
            Err(PlayerError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn subscriber_failure_surfaces_after_store_update() {
        let (registry, manager) = manager();
        registry
            .async_channel::<PlayerAdded>()
            .unwrap()
            .subscribe(|_: PlayerAdded| async { anyhow::bail!("roster full") });

        let error = manager.create_player("Late Joiner").await.unwrap_err();

        assert!(matches!(error, PlayerError::Event(EventError::Publish { .. })));
        assert_eq!(manager.player_count(), 1);
    }
}
