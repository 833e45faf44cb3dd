// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the Sequin collaborator traits.
//!
//! - [`MockDelivery`]: a scriptable delivery channel that records every call.
//! - [`MemorySettings`], [`MemoryStats`], [`MemoryUsers`]: in-memory stores.
//! - [`MemoryLeaderboard`]: re-exported from `sequin-leaderboard`.

pub mod mock_delivery;
pub mod stores;

use sequin_core::{ChatId, MessageRef, QueueItem};

pub use mock_delivery::{DeliveryEvent, MockDelivery, Script};
pub use sequin_leaderboard::MemoryLeaderboard;
pub use stores::{MemorySettings, MemoryStats, MemoryUsers};

/// Builds a queued file sitting at `chat/message`.
pub fn item(chat: i64, message: i32, text: &str) -> QueueItem {
    QueueItem::new(ChatId(chat), MessageRef(message), text)
}
