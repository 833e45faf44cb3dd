// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile per-user ingestion queues.

use dashmap::DashMap;
use sequin_core::{ChatId, MessageRef, QueueItem, UserId};
use tracing::debug;

/// An acknowledgement message posted while the queue was filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub chat: ChatId,
    pub message: MessageRef,
}

/// Everything queued for one user, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQueue {
    pub items: Vec<QueueItem>,
    pub notices: Vec<Notice>,
}

impl UserQueue {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Owns every user's queue.
///
/// Drain and clear take the whole queue out of the map in one removal, so
/// a concurrent append either lands in the removed queue or in a fresh one,
/// never in between. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct QueueManager {
    queues: DashMap<UserId, UserQueue>,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` and returns the new queue length.
    pub fn append(&self, user: UserId, item: QueueItem) -> usize {
        let mut queue = self.queues.entry(user).or_default();
        queue.items.push(item);
        queue.items.len()
    }

    pub fn append_notice(&self, user: UserId, notice: Notice) {
        self.queues.entry(user).or_default().notices.push(notice);
    }

    /// Takes the user's queue, leaving nothing behind.
    pub fn drain(&self, user: UserId) -> UserQueue {
        let queue = self
            .queues
            .remove(&user)
            .map(|(_, q)| q)
            .unwrap_or_default();
        debug!(user = %user, items = queue.items.len(), "queue drained");
        queue
    }

    /// Discards the user's queue and hands back what was in it so the
    /// caller can clean up the related chat messages.
    pub fn clear(&self, user: UserId) -> UserQueue {
        let queue = self
            .queues
            .remove(&user)
            .map(|(_, q)| q)
            .unwrap_or_default();
        debug!(user = %user, items = queue.items.len(), "queue cleared");
        queue
    }

    pub fn is_empty(&self, user: UserId) -> bool {
        self.queues.get(&user).is_none_or(|q| q.items.is_empty())
    }

    pub fn len(&self, user: UserId) -> usize {
        self.queues.get(&user).map_or(0, |q| q.items.len())
    }
}
