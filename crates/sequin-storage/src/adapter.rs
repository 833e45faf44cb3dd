// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use sequin_config::model::StorageConfig;
use sequin_core::{
    AdapterType, BotStats, ChatId, HealthStatus, LeaderboardStore, Period, PeriodKeys,
    PluginAdapter, RankedUser, SequinError, SettingsStore, SortMode, StatsStore, StickerMode,
    StorageAdapter, UserId, UserProfile, UserSettings, UserStore,
};

use crate::database::{Database, map_tr_err};
use crate::queries;
use crate::queries::settings::{SettingColumn, text_value};

/// SQLite-backed store for settings, users, leaderboard and stats.
///
/// The connection is opened by [`StorageAdapter::initialize`]; every other
/// call fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wraps an already-open database. Used by tests.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, SequinError> {
        self.db.get().ok_or_else(|| SequinError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    pub async fn user(&self, user: UserId) -> Result<Option<UserProfile>, SequinError> {
        queries::users::get_user(self.db()?, user).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SequinError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SequinError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), SequinError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| SequinError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), SequinError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SqliteStorage {
    async fn settings(&self, user: UserId) -> Result<UserSettings, SequinError> {
        queries::settings::get_settings(self.db()?, user).await
    }

    async fn set_dump_chat(&self, user: UserId, chat: Option<ChatId>) -> Result<(), SequinError> {
        let value = chat.map_or(Value::Null, |c| Value::Integer(c.0));
        queries::settings::set_setting(self.db()?, user, SettingColumn::DumpChat, value).await
    }

    async fn set_caption_template(
        &self,
        user: UserId,
        template: Option<String>,
    ) -> Result<(), SequinError> {
        queries::settings::set_setting(
            self.db()?,
            user,
            SettingColumn::CaptionTemplate,
            text_value(template),
        )
        .await
    }

    async fn set_sticker_id(
        &self,
        user: UserId,
        sticker: Option<String>,
    ) -> Result<(), SequinError> {
        queries::settings::set_setting(self.db()?, user, SettingColumn::StickerId, text_value(sticker))
            .await
    }

    async fn set_sort_mode(&self, user: UserId, mode: SortMode) -> Result<(), SequinError> {
        queries::settings::set_setting(
            self.db()?,
            user,
            SettingColumn::SortMode,
            Value::Text(mode.to_string()),
        )
        .await
    }

    async fn set_sticker_mode(&self, user: UserId, mode: StickerMode) -> Result<(), SequinError> {
        queries::settings::set_setting(
            self.db()?,
            user,
            SettingColumn::StickerMode,
            Value::Text(mode.to_string()),
        )
        .await
    }
}

#[async_trait]
impl LeaderboardStore for SqliteStorage {
    async fn increment(
        &self,
        user: UserId,
        display_name: &str,
        keys: &PeriodKeys,
        amount: u64,
    ) -> Result<(), SequinError> {
        queries::leaderboard::increment(self.db()?, user, display_name, keys, amount).await
    }

    async fn rank(
        &self,
        period: Period,
        keys: &PeriodKeys,
        limit: usize,
    ) -> Result<Vec<RankedUser>, SequinError> {
        queries::leaderboard::rank(self.db()?, period, keys, limit).await
    }

    async fn total(&self, period: Period, keys: &PeriodKeys) -> Result<u64, SequinError> {
        queries::leaderboard::total(self.db()?, period, keys).await
    }
}

#[async_trait]
impl StatsStore for SqliteStorage {
    async fn add_sorted_files(&self, amount: u64) -> Result<(), SequinError> {
        queries::stats::add_sorted_files(self.db()?, amount).await
    }

    async fn stats(&self) -> Result<BotStats, SequinError> {
        queries::stats::get_stats(self.db()?).await
    }

    async fn mark_restarted(&self, at: DateTime<Utc>) -> Result<(), SequinError> {
        queries::stats::mark_restarted(self.db()?, at).await
    }
}

#[async_trait]
impl UserStore for SqliteStorage {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), SequinError> {
        queries::users::upsert_user(self.db()?, profile).await
    }

    async fn count_users(&self) -> Result<u64, SequinError> {
        queries::users::count_users(self.db()?).await
    }
}
