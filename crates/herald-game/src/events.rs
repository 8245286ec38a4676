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

//! Event payloads published by the player domain.
//!
//! [`PlayerAdded`], [`PlayerUpdated`] and [`PlayerRemoved`] travel on
//! asynchronous channels. [`PlayerLevelUp`] travels on a synchronous channel
//! so its subscribers run before the manager reports the update.

use uuid::Uuid;

use crate::player::Player;

/// A player was added to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAdded {
    /// Id of the new player.
    pub id: Uuid,
    /// Name of the new player.
    pub name: String,
}

impl From<&Player> for PlayerAdded {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id(),
            name: player.name.clone(),
        }
    }
}

/// A stored player was replaced with new data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerUpdated {
    /// The player as stored after the update.
    pub player: Player,
}

/// A player was removed from the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRemoved {
    /// Id of the removed player.
    pub id: Uuid,
}

/// A player crossed one or more level thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLevelUp {
    /// Id of the player.
    pub id: Uuid,
    /// Name of the player.
    pub name: String,
    /// Level before the experience was added.
    pub old_level: u32,
    /// Level after the experience was added.
    pub new_level: u32,
}
