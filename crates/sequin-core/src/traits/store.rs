// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits: per-user settings, leaderboard counters, lifetime
//! stats and user bookkeeping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SequinError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    BotStats, ChatId, Period, PeriodKeys, RankedUser, SortMode, StickerMode, UserId, UserProfile,
    UserSettings,
};

/// Lifecycle of a persistent storage backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Opens connections and applies pending migrations.
    async fn initialize(&self) -> Result<(), SequinError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), SequinError>;
}

/// Per-user settings. Getters return defaults for unknown users.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn settings(&self, user: UserId) -> Result<UserSettings, SequinError>;

    /// `None` removes the alternate destination.
    async fn set_dump_chat(&self, user: UserId, chat: Option<ChatId>) -> Result<(), SequinError>;

    /// `None` restores the original captions on dispatch.
    async fn set_caption_template(
        &self,
        user: UserId,
        template: Option<String>,
    ) -> Result<(), SequinError>;

    async fn set_sticker_id(&self, user: UserId, sticker: Option<String>)
    -> Result<(), SequinError>;

    async fn set_sort_mode(&self, user: UserId, mode: SortMode) -> Result<(), SequinError>;

    async fn set_sticker_mode(&self, user: UserId, mode: StickerMode) -> Result<(), SequinError>;
}

/// Time-bucketed per-user counters.
///
/// Implementations must apply an increment atomically: a stale period key
/// resets that period's count before the amount is added, and concurrent
/// increments for the same user must not lose updates.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn increment(
        &self,
        user: UserId,
        display_name: &str,
        keys: &PeriodKeys,
        amount: u64,
    ) -> Result<(), SequinError>;

    /// Entries whose `period` key equals the current key and whose count is
    /// positive, highest count first.
    async fn rank(
        &self,
        period: Period,
        keys: &PeriodKeys,
        limit: usize,
    ) -> Result<Vec<RankedUser>, SequinError>;

    async fn total(&self, period: Period, keys: &PeriodKeys) -> Result<u64, SequinError>;
}

/// Bot-wide lifetime counters.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Atomically adds `amount` to the lifetime sorted-files counter.
    async fn add_sorted_files(&self, amount: u64) -> Result<(), SequinError>;

    async fn stats(&self) -> Result<BotStats, SequinError>;

    async fn mark_restarted(&self, at: DateTime<Utc>) -> Result<(), SequinError>;
}

/// Known users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user or refreshes their names, keeping the first-seen time.
    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), SequinError>;

    async fn count_users(&self) -> Result<u64, SequinError>;
}
