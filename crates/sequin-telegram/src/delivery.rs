// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`DeliveryChannel`] over the Telegram Bot API.
//!
//! Items are re-posted with `copyMessage`, so the copy carries no
//! "forwarded from" header. Markers are stickers sent by file id.

use async_trait::async_trait;
use sequin_core::{
    AdapterType, ChatId, DeliveryChannel, DeliveryError, HealthStatus, MessageRef, PluginAdapter,
    SequinError,
};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId};
use tracing::debug;

/// Sends dispatch output through a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramDelivery {
    bot: Bot,
}

impl TelegramDelivery {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Maps a Bot API failure, keeping flood-control waits distinguishable.
pub fn map_request_err(action: &str, e: RequestError) -> DeliveryError {
    match e {
        RequestError::RetryAfter(wait) => DeliveryError::RateLimited {
            retry_after: wait.duration(),
        },
        other => DeliveryError::Failed {
            message: format!("{action}: {other}"),
            source: Some(Box::new(other)),
        },
    }
}

fn tg_chat(chat: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.0)
}

#[async_trait]
impl PluginAdapter for TelegramDelivery {
    fn name(&self) -> &str {
        "telegram-delivery"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, SequinError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), SequinError> {
        debug!("Telegram delivery shutting down");
        Ok(())
    }
}

#[async_trait]
impl DeliveryChannel for TelegramDelivery {
    async fn deliver(
        &self,
        destination: ChatId,
        source_chat: ChatId,
        source: MessageRef,
    ) -> Result<MessageRef, DeliveryError> {
        let copied = self
            .bot
            .copy_message(tg_chat(destination), tg_chat(source_chat), MessageId(source.0))
            .await
            .map_err(|e| map_request_err("copy message", e))?;
        Ok(MessageRef(copied.0))
    }

    async fn rewrite_caption(
        &self,
        destination: ChatId,
        message: MessageRef,
        text: &str,
    ) -> Result<(), DeliveryError> {
        self.bot
            .edit_message_caption(tg_chat(destination), MessageId(message.0))
            .caption(text)
            .await
            .map_err(|e| map_request_err("edit caption", e))?;
        Ok(())
    }

    async fn emit_marker(
        &self,
        destination: ChatId,
        marker_id: &str,
    ) -> Result<MessageRef, DeliveryError> {
        let sent = self
            .bot
            .send_sticker(
                tg_chat(destination),
                InputFile::file_id(FileId(marker_id.to_owned())),
            )
            .await
            .map_err(|e| map_request_err("send sticker", e))?;
        Ok(MessageRef(sent.id.0))
    }

    async fn remove_message(&self, chat: ChatId, message: MessageRef) -> Result<(), DeliveryError> {
        self.bot
            .delete_message(tg_chat(chat), MessageId(message.0))
            .await
            .map_err(|e| map_request_err("delete message", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use teloxide::types::Seconds;

    use super::*;

    #[test]
    fn retry_after_maps_to_rate_limited() {
        let err = map_request_err("copy message", RequestError::RetryAfter(Seconds::from_seconds(7)));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn other_errors_map_to_failed() {
        let err = map_request_err(
            "delete message",
            RequestError::Api(teloxide::ApiError::MessageToDeleteNotFound),
        );
        assert!(err.retry_after().is_none());
        assert!(err.to_string().contains("delete message"), "{err}");
    }
}
