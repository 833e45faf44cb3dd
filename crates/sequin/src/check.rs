// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sequin check`: validates configuration and storage without connecting
//! to Telegram.

use sequin_config::SequinConfig;
use sequin_config::loader::existing_sources;
use sequin_core::{
    HealthStatus, PluginAdapter, SequinError, StatsStore, StorageAdapter, UserStore,
};
use sequin_storage::SqliteStorage;

pub async fn run_check(config: &SequinConfig) -> Result<(), SequinError> {
    let sources = existing_sources();
    if sources.is_empty() {
        println!("config: no files found, using defaults and environment");
    }
    for (path, _) in &sources {
        println!("config: loaded {path}");
    }

    if config.telegram.bot_token.is_none() {
        println!("warning: telegram.bot_token is not set; `sequin serve` will refuse to start");
    }

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let health = storage.health_check().await?;
    let stats = storage.stats().await?;
    let users = storage.count_users().await?;
    storage.close().await?;

    println!("storage: {} ({})", config.storage.database_path, describe(&health));
    println!("users: {users}, files sorted: {}", stats.total_sorted_files);
    if config.keepalive.enabled {
        println!(
            "keep-alive: http://{}:{}/",
            config.keepalive.bind_address, config.keepalive.port
        );
    }
    println!("ok");
    Ok(())
}

fn describe(health: &HealthStatus) -> String {
    match health {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}"),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
    }
}
