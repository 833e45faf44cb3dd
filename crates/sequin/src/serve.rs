// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sequin serve`: wires storage, the dispatch pipeline and Telegram together.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sequin_config::SequinConfig;
use sequin_core::{DeliveryChannel, SequinError, StatsStore, StorageAdapter};
use sequin_dispatch::{DispatchPipeline, QueueManager};
use sequin_leaderboard::Leaderboard;
use sequin_storage::SqliteStorage;
use sequin_telegram::{BotState, Services, TelegramChannel};
use tracing::{info, warn};

use crate::{keepalive, shutdown};

/// How long shutdown waits for sort runs that already drained their queue.
const RUN_DRAIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Crates whose logs follow `bot.log_level`; everything else stays at warn.
const LOG_TARGETS: &[&str] = &[
    "sequin",
    "sequin_config",
    "sequin_storage",
    "sequin_dispatch",
    "sequin_leaderboard",
    "sequin_telegram",
];

pub async fn run_serve(config: SequinConfig) -> Result<(), SequinError> {
    init_tracing(&config.bot.log_level);
    info!("starting sequin serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    if let Err(e) = storage.mark_restarted(Utc::now()).await {
        warn!(error = %e, "failed to record restart time");
    }

    let channel = TelegramChannel::new(&config.telegram)?;
    let state = Arc::new(build_state(&config, storage.clone(), Arc::new(channel.delivery())));

    let cancel = shutdown::install_signal_handler();

    let keepalive = if config.keepalive.enabled {
        let listener = keepalive::bind(&config.keepalive).await?;
        Some(tokio::spawn(keepalive::serve_on(listener, cancel.clone())))
    } else {
        info!("keep-alive endpoint disabled");
        None
    };

    channel.run(state.clone(), cancel.clone()).await;
    cancel.cancel();
    state.drain_runs(RUN_DRAIN_TIMEOUT).await;

    if let Some(handle) = keepalive {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "keep-alive server stopped with an error"),
            Err(e) => warn!(error = %e, "keep-alive task panicked"),
        }
    }

    storage.close().await?;
    info!("sequin serve shutdown complete");
    Ok(())
}

/// Builds the handler state on top of one storage backend.
pub fn build_state(
    config: &SequinConfig,
    storage: Arc<SqliteStorage>,
    delivery: Arc<dyn DeliveryChannel>,
) -> BotState {
    let leaderboard = Leaderboard::new(storage.clone());
    let pipeline = DispatchPipeline::new(
        Arc::new(QueueManager::new()),
        delivery,
        storage.clone(),
        storage.clone(),
        leaderboard.clone(),
    );
    let services = Services {
        pipeline: Arc::new(pipeline),
        settings: storage.clone(),
        stats: storage.clone(),
        users: storage,
        leaderboard,
    };
    BotState::new(services, config.bot.owner_id, config.leaderboard.limit)
}

fn env_filter_directives(log_level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env_filter_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
