// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sequin file sequencing bot.
//!
//! This crate provides the error types, shared domain types, and the
//! collaborator traits that the dispatch pipeline talks to. Storage and
//! transport crates implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DeliveryError, SequinError};
pub use types::{
    AdapterType, BotStats, ChatId, HealthStatus, MessageRef, Period, PeriodKeys, QueueItem,
    RankedUser, SortMode, StickerMode, UserId, UserProfile, UserSettings,
};

pub use traits::{
    DeliveryChannel, LeaderboardStore, PluginAdapter, SettingsStore, StatsStore, StorageAdapter,
    UserStore,
};
