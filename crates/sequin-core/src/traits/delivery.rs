// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery channel.

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, MessageRef};

/// Transport used by the dispatch pipeline to re-emit queued files.
///
/// Every call is independent. A failing call must never leave the channel
/// unusable for the next one.
#[async_trait]
pub trait DeliveryChannel: PluginAdapter {
    /// Copies the message at `source_chat/source` into `destination` and
    /// returns the handle of the newly created message.
    async fn deliver(
        &self,
        destination: ChatId,
        source_chat: ChatId,
        source: MessageRef,
    ) -> Result<MessageRef, DeliveryError>;

    /// Replaces the caption of a message previously returned by [`deliver`](Self::deliver).
    async fn rewrite_caption(
        &self,
        destination: ChatId,
        message: MessageRef,
        text: &str,
    ) -> Result<(), DeliveryError>;

    /// Sends a marker (sticker) identified by `marker_id`.
    async fn emit_marker(
        &self,
        destination: ChatId,
        marker_id: &str,
    ) -> Result<MessageRef, DeliveryError>;

    async fn remove_message(&self, chat: ChatId, message: MessageRef)
    -> Result<(), DeliveryError>;
}
