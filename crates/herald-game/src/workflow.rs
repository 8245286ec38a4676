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

//! The demo scenario run by the sandbox: three players join at once, then
//! all of them earn some experience at once.

use futures::future::try_join_all;

use crate::manager::{PlayerError, PlayerManager};
use crate::player::Player;

/// Names of the players created by [`run_demo`], in creation order.
pub const DEMO_PLAYERS: [&str; 3] = ["John Doe", "Jane Smith", "Alex Johnson"];

/// Experience granted to each demo player, matching [`DEMO_PLAYERS`].
pub const DEMO_EXPERIENCE: [u32; 3] = [75, 150, 200];

/// Runs the demo scenario on `manager` and returns the players it produced,
/// in [`DEMO_PLAYERS`] order.
///
/// Players are created concurrently, then all of them receive their
/// experience concurrently, so the handler deliveries of each phase overlap.
pub async fn run_demo(manager: &PlayerManager) -> Result<Vec<Player>, PlayerError> {
    log::info!("Creating {} players concurrently...", DEMO_PLAYERS.len());
    let created = try_join_all(DEMO_PLAYERS.iter().map(|name| manager.create_player(name))).await?;

    log::info!("Granting experience to {} players concurrently...", created.len());
    try_join_all(created.iter().zip(DEMO_EXPERIENCE).map(|(player, amount)| {
        log::info!("Granting {amount} XP to {}.", player.name);
        manager.add_experience(player.id(), amount)
    }))
    .await
}
