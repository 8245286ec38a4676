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
use std::time::Duration;

use anyhow::{Context, Result};
use herald_core::{EventBusConfig, EventHandler, EventRegistry};
use herald_game::workflow::run_demo;
use herald_game::{LoggerEventHandler, PlayerEventHandler, PlayerManager};

/// Environment variable holding the async publish timeout in milliseconds.
const PUBLISH_TIMEOUT_ENV: &str = "HERALD_PUBLISH_TIMEOUT_MS";

fn load_config() -> Result<EventBusConfig> {
    let mut config = EventBusConfig::default();
    if let Ok(raw) = std::env::var(PUBLISH_TIMEOUT_ENV) {
        let millis: u64 = raw.trim().parse().with_context(|| {
            format!("{PUBLISH_TIMEOUT_ENV} must be a number of milliseconds, got {raw:?}")
        })?;
        config = config.with_publish_timeout(Duration::from_millis(millis));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    log::info!("Starting Herald sandbox with {config:?}.");
    let registry = Arc::new(EventRegistry::with_config(config));

    let player_handler =
        PlayerEventHandler::with_processing_delay(&registry, Duration::from_millis(100))?;
    let logger_handler = LoggerEventHandler::new(&registry)?;
    let manager = PlayerManager::new(Arc::clone(&registry));

    run_demo(&manager).await?;

    log::info!("All players:");
    for player in manager.all_players() {
        log::info!("  {player}");
    }

    player_handler.revoke_all();
    logger_handler.revoke_all();
    log::info!("Sandbox finished.");
    Ok(())
}
