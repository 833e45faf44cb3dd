// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process leaderboard store.

use std::collections::HashMap;

use async_trait::async_trait;
use sequin_core::{LeaderboardStore, Period, PeriodKeys, RankedUser, SequinError, UserId};
use tokio::sync::Mutex;

use crate::entry::LeaderboardEntry;

/// Leaderboard kept in memory behind a single lock.
///
/// Holding the lock for the whole read-reset-add step makes increments
/// atomic across concurrent runs.
#[derive(Default)]
pub struct MemoryLeaderboard {
    entries: Mutex<HashMap<UserId, LeaderboardEntry>>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one user's record.
    pub async fn entry(&self, user: UserId) -> Option<LeaderboardEntry> {
        self.entries.lock().await.get(&user).cloned()
    }
}

#[async_trait]
impl LeaderboardStore for MemoryLeaderboard {
    async fn increment(
        &self,
        user: UserId,
        display_name: &str,
        keys: &PeriodKeys,
        amount: u64,
    ) -> Result<(), SequinError> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .entry(user)
            .or_insert_with(|| LeaderboardEntry::new(user, display_name));
        entry.display_name = display_name.to_string();
        entry.record(keys, amount);
        Ok(())
    }

    async fn rank(
        &self,
        period: Period,
        keys: &PeriodKeys,
        limit: usize,
    ) -> Result<Vec<RankedUser>, SequinError> {
        let entries = self.entries.lock().await;
        let mut rows: Vec<RankedUser> = entries
            .values()
            .filter_map(|e| {
                let count = e.count_for(period, keys);
                (count > 0).then(|| RankedUser {
                    user_id: e.user_id,
                    display_name: e.display_name.clone(),
                    count,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.user_id.cmp(&b.user_id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn total(&self, period: Period, keys: &PeriodKeys) -> Result<u64, SequinError> {
        let entries = self.entries.lock().await;
        Ok(entries.values().map(|e| e.count_for(period, keys)).sum())
    }
}
