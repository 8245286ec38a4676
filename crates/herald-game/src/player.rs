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

//! The player model and its experience-based levelling.

use std::fmt;

use uuid::Uuid;

/// Experience needed to gain one level.
pub const EXPERIENCE_PER_LEVEL: u32 = 100;

/// A player tracked by the [`PlayerManager`](crate::PlayerManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: Uuid,
    /// Display name.
    pub name: String,
    /// Accumulated experience points.
    pub experience: u32,
}

impl Player {
    /// Creates a player with a fresh random id and no experience.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a player with a known id.
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            experience: 0,
        }
    }

    /// The player's unique id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current level, derived from experience. Starts at 1.
    pub fn level(&self) -> u32 {
        self.experience / EXPERIENCE_PER_LEVEL + 1
    }

    /// Adds experience and returns `true` if the player levelled up.
    pub fn add_experience(&mut self, amount: u32) -> bool {
        let old_level = self.level();
        self.experience = self.experience.saturating_add(amount);
        self.level() > old_level
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player: {}, ID: {}, Level: {} (XP: {})",
            self.name,
            self.id,
            self.level(),
            self.experience
        )
    }
}
