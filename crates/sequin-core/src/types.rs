// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the queue, the dispatch pipeline, and the stores.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of the user who owns a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identifier of a chat (private chat, channel or group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Handle of a message inside a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file captured at ingestion time.
///
/// Holds only the location of the original message and its text metadata;
/// the media itself is copied by the delivery channel at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub origin_chat: ChatId,
    pub origin_message: MessageRef,
    pub raw_text: String,
}

impl QueueItem {
    pub fn new(origin_chat: ChatId, origin_message: MessageRef, raw_text: impl Into<String>) -> Self {
        Self {
            origin_chat,
            origin_message,
            raw_text: raw_text.into(),
        }
    }
}

/// Ordering applied to a queue when it is dispatched.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Episode,
    Quality,
    Title,
    Both,
    Season,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Quality,
        SortMode::Title,
        SortMode::Both,
        SortMode::Episode,
        SortMode::Season,
    ];

    /// Parses a stored mode name; anything unrecognized falls back to `Episode`.
    pub fn parse_or_default(value: &str) -> Self {
        Self::from_str(value.trim()).unwrap_or_default()
    }

    /// Whether the quality rank is part of this mode's sort key.
    pub fn uses_quality(self) -> bool {
        matches!(self, SortMode::Quality | SortMode::Both | SortMode::Season)
    }
}

/// Controls where marker stickers are placed in a dispatched sequence.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StickerMode {
    /// One marker after the whole run.
    #[default]
    Default,
    /// A marker at every quality-group boundary.
    Quality,
}

impl StickerMode {
    pub const ALL: [StickerMode; 2] = [StickerMode::Default, StickerMode::Quality];

    /// Parses a stored sticker mode; anything unrecognized falls back to `Default`.
    pub fn parse_or_default(value: &str) -> Self {
        Self::from_str(value.trim()).unwrap_or_default()
    }
}

/// Per-user settings resolved at the start of every dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettings {
    /// Alternate destination overriding the requester's chat.
    pub dump_chat: Option<ChatId>,
    pub caption_template: Option<String>,
    /// Sticker file id used as a marker.
    pub sticker_id: Option<String>,
    pub sort_mode: SortMode,
    pub sticker_mode: StickerMode,
}

/// A leaderboard time bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    #[strum(to_string = "all")]
    #[serde(rename = "all")]
    AllTime,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Today, Period::Week, Period::Month, Period::AllTime];

    /// Human readable label used in leaderboard headers.
    pub fn label(self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "This Week",
            Period::Month => "This Month",
            Period::AllTime => "All Time",
        }
    }
}

/// Day, ISO week and month bucket keys for one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodKeys {
    /// `YYYY-MM-DD`
    pub day: String,
    /// `YYYY-Www` using the ISO week-numbering year.
    pub week: String,
    /// `YYYY-MM`
    pub month: String,
}

impl PeriodKeys {
    pub fn at(now: DateTime<Utc>) -> Self {
        let iso = now.iso_week();
        Self {
            day: now.format("%Y-%m-%d").to_string(),
            week: format!("{}-W{:02}", iso.year(), iso.week()),
            month: now.format("%Y-%m").to_string(),
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// The key stored for `period`, or `None` for the lifetime bucket.
    pub fn key_for(&self, period: Period) -> Option<&str> {
        match period {
            Period::Today => Some(&self.day),
            Period::Week => Some(&self.week),
            Period::Month => Some(&self.month),
            Period::AllTime => None,
        }
    }
}

/// One row of a ranked leaderboard view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedUser {
    pub user_id: UserId,
    pub display_name: String,
    pub count: u64,
}

/// Lifetime counters kept across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotStats {
    pub total_sorted_files: u64,
    pub last_restarted: Option<DateTime<Utc>>,
}

/// A user seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub username: Option<String>,
}

impl UserProfile {
    /// Name shown on the leaderboard.
    pub fn display_name(&self) -> &str {
        if self.first_name.trim().is_empty() {
            self.username.as_deref().unwrap_or("User")
        } else {
            &self.first_name
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}
