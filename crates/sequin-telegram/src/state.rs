// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state injected into every update handler.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashSet;
use sequin_core::{SettingsStore, StatsStore, UserId, UserStore};
use sequin_dispatch::{DispatchPipeline, QueueManager};
use sequin_leaderboard::Leaderboard;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

/// Stores and services the front end needs.
pub struct Services {
    pub pipeline: Arc<DispatchPipeline>,
    pub settings: Arc<dyn SettingsStore>,
    pub stats: Arc<dyn StatsStore>,
    pub users: Arc<dyn UserStore>,
    pub leaderboard: Leaderboard,
}

pub struct BotState {
    services: Services,
    owner_id: Option<i64>,
    leaderboard_limit: usize,
    started_at: Instant,
    /// Users who ran `/setdump` without an id and whose next message is the answer.
    awaiting_dump: DashSet<UserId>,
    /// Sort runs in flight. A run owns an already drained queue.
    runs: TaskTracker,
}

impl BotState {
    pub fn new(services: Services, owner_id: Option<i64>, leaderboard_limit: usize) -> Self {
        Self {
            services,
            owner_id,
            leaderboard_limit,
            started_at: Instant::now(),
            awaiting_dump: DashSet::new(),
            runs: TaskTracker::new(),
        }
    }

    pub fn pipeline(&self) -> &Arc<DispatchPipeline> {
        &self.services.pipeline
    }

    pub fn queues(&self) -> &QueueManager {
        self.services.pipeline.queues()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.services.settings.as_ref()
    }

    pub fn stats(&self) -> &dyn StatsStore {
        self.services.stats.as_ref()
    }

    pub fn users(&self) -> &dyn UserStore {
        self.services.users.as_ref()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.services.leaderboard
    }

    pub fn leaderboard_limit(&self) -> usize {
        self.leaderboard_limit
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner_id == Some(user.0)
    }

    pub fn await_dump(&self, user: UserId) {
        self.awaiting_dump.insert(user);
    }

    pub fn is_awaiting_dump(&self, user: UserId) -> bool {
        self.awaiting_dump.contains(&user)
    }

    pub fn stop_awaiting_dump(&self, user: UserId) {
        self.awaiting_dump.remove(&user);
    }

    /// Spawns a dispatch run that [`drain_runs`](Self::drain_runs) waits for.
    pub fn spawn_run<F>(&self, run: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runs.spawn(run);
    }

    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    /// Waits up to `timeout` for in-flight runs to finish.
    ///
    /// Returns `false` when the timeout elapsed with runs still active.
    pub async fn drain_runs(&self, timeout: Duration) -> bool {
        self.runs.close();
        let active = self.runs.len();
        if active == 0 {
            info!("no sort runs to drain");
            return true;
        }

        info!(count = active, "waiting for sort runs to complete");
        match tokio::time::timeout(timeout, self.runs.wait()).await {
            Ok(()) => {
                info!("all sort runs drained");
                true
            }
            Err(_) => {
                warn!(remaining = self.runs.len(), "timeout reached, sort runs interrupted");
                false
            }
        }
    }
}
