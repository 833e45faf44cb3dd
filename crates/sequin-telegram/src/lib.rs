// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram front end for Sequin.
//!
//! Long-polls the Bot API with teloxide, queues incoming files, answers
//! commands and inline keyboards, and provides the [`TelegramDelivery`]
//! channel the dispatch pipeline posts through.

pub mod callbacks;
pub mod commands;
pub mod delivery;
pub mod handler;
pub mod render;
pub mod state;

use std::error::Error;
use std::sync::Arc;

use sequin_config::model::TelegramConfig;
use sequin_core::SequinError;
use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use commands::Command;
pub use delivery::TelegramDelivery;
pub use state::{BotState, Services};

/// Result type shared by all update endpoints.
pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Owns the bot handle and runs the update dispatcher.
pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, SequinError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            SequinError::Config("telegram.bot_token is required to serve".into())
        })?;
        if token.is_empty() {
            return Err(SequinError::Config("telegram.bot_token cannot be empty".into()));
        }
        Ok(Self {
            bot: Bot::new(token),
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Delivery channel sharing this bot's connection.
    pub fn delivery(&self) -> TelegramDelivery {
        TelegramDelivery::new(self.bot.clone())
    }

    /// Polls until `cancel` fires.
    pub async fn run(&self, state: Arc<BotState>, cancel: CancellationToken) {
        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!(error = %e, "failed to register bot commands");
        }

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), schema())
            .dependencies(dptree::deps![state])
            .default_handler(|_| async {})
            .build();

        let shutdown = dispatcher.shutdown_token();
        tokio::spawn(async move {
            cancel.cancelled().await;
            match shutdown.shutdown() {
                Ok(stopped) => stopped.await,
                Err(e) => warn!(error = ?e, "dispatcher was not running at shutdown"),
            }
        });

        info!("starting Telegram long polling");
        dispatcher.dispatch().await;
        info!("Telegram polling stopped");
    }
}

/// Routing tree: commands first, then other messages, then button presses.
pub fn schema() -> UpdateHandler<Box<dyn Error + Send + Sync + 'static>> {
    let messages = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(commands::handle),
        )
        .branch(dptree::endpoint(handler::on_message));

    dptree::entry()
        .branch(messages)
        .branch(Update::filter_callback_query().endpoint(callbacks::on_callback))
}

#[cfg(test)]
mod tests {
    use sequin_core::PluginAdapter;

    use super::*;

    #[test]
    fn new_requires_bot_token() {
        let config = TelegramConfig { bot_token: None };
        assert!(TelegramChannel::new(&config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
        };
        assert!(TelegramChannel::new(&config).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
        };
        let channel = TelegramChannel::new(&config).unwrap();
        assert_eq!(channel.delivery().name(), "telegram-delivery");
    }

    #[test]
    fn schema_builds() {
        let _ = schema();
    }
}
