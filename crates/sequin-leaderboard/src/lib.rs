// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leaderboard aggregation over day, ISO week, month and lifetime buckets.
//!
//! Every period counter is stored next to the key of the bucket it belongs
//! to. A counter whose key no longer matches the current bucket counts as
//! zero: reads skip it and the next increment restarts it.

pub mod entry;
pub mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sequin_core::{LeaderboardStore, Period, PeriodKeys, RankedUser, SequinError, UserId};
use tracing::debug;

pub use entry::{LeaderboardEntry, PeriodCount};
pub use memory::MemoryLeaderboard;

/// Front door for leaderboard updates and ranked views.
///
/// Computes the current period keys from UTC wall-clock time and delegates
/// storage to a [`LeaderboardStore`].
#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn LeaderboardStore>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self { store }
    }

    /// Adds `amount` sorted files to `user`. Non-positive amounts are ignored.
    pub async fn increment(
        &self,
        user: UserId,
        display_name: &str,
        amount: i64,
    ) -> Result<(), SequinError> {
        self.increment_at(user, display_name, amount, Utc::now())
            .await
    }

    pub async fn increment_at(
        &self,
        user: UserId,
        display_name: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<(), SequinError> {
        let Ok(amount) = u64::try_from(amount) else {
            return Ok(());
        };
        if amount == 0 {
            return Ok(());
        }

        let keys = PeriodKeys::at(now);
        debug!(user = %user, amount, day = %keys.day, "leaderboard increment");
        self.store
            .increment(user, display_name, &keys, amount)
            .await
    }

    /// Top `limit` users for `period`, highest count first.
    pub async fn rank(&self, period: Period, limit: usize) -> Result<Vec<RankedUser>, SequinError> {
        self.rank_at(period, limit, Utc::now()).await
    }

    pub async fn rank_at(
        &self,
        period: Period,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedUser>, SequinError> {
        self.store.rank(period, &PeriodKeys::at(now), limit).await
    }

    /// Sum of every user's count for the current `period`.
    pub async fn total(&self, period: Period) -> Result<u64, SequinError> {
        self.total_at(period, Utc::now()).await
    }

    pub async fn total_at(&self, period: Period, now: DateTime<Utc>) -> Result<u64, SequinError> {
        self.store.total(period, &PeriodKeys::at(now)).await
    }
}
