// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory settings, stats and user stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use sequin_core::{
    BotStats, ChatId, SequinError, SettingsStore, SortMode, StatsStore, StickerMode, UserId,
    UserProfile, UserSettings, UserStore,
};

/// Settings map with a switch that makes every lookup fail.
#[derive(Default)]
pub struct MemorySettings {
    settings: Mutex<HashMap<UserId, UserSettings>>,
    unavailable: AtomicBool,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, user: UserId, settings: UserSettings) {
        self.settings.lock().await.insert(user, settings);
    }

    /// Makes reads and writes fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), SequinError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(SequinError::Storage {
                source: Box::new(std::io::Error::other("settings store offline")),
            })
        } else {
            Ok(())
        }
    }

    async fn update(
        &self,
        user: UserId,
        f: impl FnOnce(&mut UserSettings),
    ) -> Result<(), SequinError> {
        self.check()?;
        f(self.settings.lock().await.entry(user).or_default());
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn settings(&self, user: UserId) -> Result<UserSettings, SequinError> {
        self.check()?;
        Ok(self
            .settings
            .lock()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_dump_chat(&self, user: UserId, chat: Option<ChatId>) -> Result<(), SequinError> {
        self.update(user, |s| s.dump_chat = chat).await
    }

    async fn set_caption_template(
        &self,
        user: UserId,
        template: Option<String>,
    ) -> Result<(), SequinError> {
        self.update(user, |s| s.caption_template = template).await
    }

    async fn set_sticker_id(
        &self,
        user: UserId,
        sticker: Option<String>,
    ) -> Result<(), SequinError> {
        self.update(user, |s| s.sticker_id = sticker).await
    }

    async fn set_sort_mode(&self, user: UserId, mode: SortMode) -> Result<(), SequinError> {
        self.update(user, |s| s.sort_mode = mode).await
    }

    async fn set_sticker_mode(&self, user: UserId, mode: StickerMode) -> Result<(), SequinError> {
        self.update(user, |s| s.sticker_mode = mode).await
    }
}

#[derive(Default)]
pub struct MemoryStats {
    stats: Mutex<BotStats>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsStore for MemoryStats {
    async fn add_sorted_files(&self, amount: u64) -> Result<(), SequinError> {
        self.stats.lock().await.total_sorted_files += amount;
        Ok(())
    }

    async fn stats(&self) -> Result<BotStats, SequinError> {
        Ok(self.stats.lock().await.clone())
    }

    async fn mark_restarted(&self, at: DateTime<Utc>) -> Result<(), SequinError> {
        self.stats.lock().await.last_restarted = Some(at);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<HashMap<UserId, UserProfile>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user: UserId) -> Option<UserProfile> {
        self.users.lock().await.get(&user).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), SequinError> {
        self.users
            .lock()
            .await
            .insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, SequinError> {
        Ok(self.users.lock().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_user_gets_defaults() {
        let store = MemorySettings::new();
        let s = store.settings(UserId(1)).await.unwrap();
        assert_eq!(s, UserSettings::default());
        assert_eq!(s.sort_mode, SortMode::Episode);
        assert_eq!(s.sticker_mode, StickerMode::Default);
    }

    #[tokio::test]
    async fn setters_update_one_field() {
        let store = MemorySettings::new();
        store.set_sort_mode(UserId(1), SortMode::Season).await.unwrap();
        store
            .set_caption_template(UserId(1), Some("{episode}".into()))
            .await
            .unwrap();
        store.set_caption_template(UserId(1), None).await.unwrap();

        let s = store.settings(UserId(1)).await.unwrap();
        assert_eq!(s.sort_mode, SortMode::Season);
        assert_eq!(s.caption_template, None);
    }

    #[tokio::test]
    async fn unavailable_store_errors() {
        let store = MemorySettings::new();
        store.set_unavailable(true);
        assert!(store.settings(UserId(1)).await.is_err());
        assert!(store.set_sort_mode(UserId(1), SortMode::Title).await.is_err());
    }

    #[tokio::test]
    async fn stats_accumulate() {
        let stats = MemoryStats::new();
        stats.add_sorted_files(3).await.unwrap();
        stats.add_sorted_files(4).await.unwrap();
        assert_eq!(stats.stats().await.unwrap().total_sorted_files, 7);
    }

    #[tokio::test]
    async fn users_upsert_by_id() {
        let users = MemoryUsers::new();
        let mut p = UserProfile {
            user_id: UserId(3),
            first_name: "Ada".into(),
            username: None,
        };
        users.upsert_user(&p).await.unwrap();
        p.username = Some("ada".into());
        users.upsert_user(&p).await.unwrap();
        assert_eq!(users.count_users().await.unwrap(), 1);
        assert_eq!(users.get(UserId(3)).await.unwrap().username.as_deref(), Some("ada"));
    }
}
