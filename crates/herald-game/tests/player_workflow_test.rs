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

use std::sync::Arc;
use std::time::{Duration, Instant};

use herald_core::{EventHandler, EventRegistry};
use herald_game::workflow::run_demo;
use herald_game::{LoggerEventHandler, PlayerEventHandler, PlayerManager};

struct World {
    manager: PlayerManager,
    players: Arc<PlayerEventHandler>,
    logger: Arc<LoggerEventHandler>,
}

fn world(delay: Duration) -> World {
    let registry = Arc::new(EventRegistry::new());
    let players = PlayerEventHandler::with_processing_delay(&registry, delay).unwrap();
    let logger = LoggerEventHandler::new(&registry).unwrap();
    World {
        manager: PlayerManager::new(registry),
        players,
        logger,
    }
}

#[tokio::test]
async fn handlers_follow_the_demo_workflow() {
    let world = world(Duration::ZERO);

    let players = run_demo(&world.manager).await.unwrap();

    assert_eq!(world.players.roster_size(), 3);
    assert_eq!(world.players.update_count(), 3);
    for player in &players {
        assert_eq!(
            world.players.known_player(player.id()).as_deref(),
            Some(player.name.as_str())
        );
    }

    let journal = world.logger.journal();
    let arrivals = journal.iter().filter(|line| line.ends_with("added.")).count();
    let level_ups: Vec<&String> = journal
        .iter()
        .filter(|line| line.contains("reached level"))
        .collect();
    assert_eq!(arrivals, 3);
    assert_eq!(level_ups.len(), 2);
    assert!(level_ups.iter().any(|line| line.contains("Jane Smith")));
    assert!(level_ups.iter().any(|line| line.contains("Alex Johnson")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creation_overlaps_handler_work() {
    let world = world(Duration::from_millis(100));

    let started = Instant::now();
    run_demo(&world.manager).await.unwrap();
    let elapsed = started.elapsed();

    // One overlapped round of arrivals, then one overlapped round of updates.
    assert!(elapsed >= Duration::from_millis(200), "took {elapsed:?}");
    assert!(elapsed < Duration::from_millis(350), "took {elapsed:?}");
}

#[tokio::test]
async fn revoke_all_stops_delivery() {
    let world = world(Duration::ZERO);
    world.manager.create_player("Before").await.unwrap();

    world.players.revoke_all();
    world.logger.revoke_all();
    let after = world.manager.create_player("After").await.unwrap();
    world.manager.remove_player(after.id()).await.unwrap();

    assert_eq!(world.players.roster_size(), 1);
    assert_eq!(world.logger.journal().len(), 1);
    assert_eq!(world.players.base().active_subscriptions(), 0);
    assert_eq!(world.logger.base().active_subscriptions(), 0);
}

#[tokio::test]
async fn removed_player_leaves_the_roster() {
    let world = world(Duration::ZERO);
    let player = world.manager.create_player("Leaver").await.unwrap();

    world.manager.remove_player(player.id()).await.unwrap();

    assert!(world.players.known_player(player.id()).is_none());
    assert!(world.manager.get_player(player.id()).is_none());
}
