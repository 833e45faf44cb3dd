// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboard presses.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::debug;

use crate::HandlerResult;
use crate::commands::leaderboard_page;
use crate::handler::user_id;
use crate::render::{self, Callback};
use crate::state::BotState;

async fn edit_page(
    bot: &Bot,
    message: &Message,
    text: String,
    keyboard: InlineKeyboardMarkup,
) -> HandlerResult {
    let result = bot
        .edit_message_text(message.chat.id, message.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await;
    match result {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Endpoint for callback queries.
pub async fn on_callback(bot: Bot, query: CallbackQuery, state: Arc<BotState>) -> HandlerResult {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(callback) = query.data.as_deref().and_then(Callback::parse) else {
        debug!(data = ?query.data, "ignoring unknown callback");
        return Ok(());
    };
    let Some(message) = query.regular_message() else {
        return Ok(());
    };
    let uid = user_id(&query.from);

    match callback {
        Callback::Close => {
            if let Err(e) = bot.delete_message(message.chat.id, message.id).await {
                debug!(error = %e, "failed to close message");
            }
            Ok(())
        }
        Callback::Mode(mode) => {
            state.settings().set_sort_mode(uid, mode).await?;
            edit_page(&bot, message, render::mode_text(mode), render::mode_keyboard(mode)).await
        }
        Callback::StickerMode(mode) => {
            state.settings().set_sticker_mode(uid, mode).await?;
            edit_page(&bot, message, render::smode_text(mode), render::smode_keyboard(mode)).await
        }
        Callback::Leaderboard(period) => {
            let text = leaderboard_page(&state, period).await?;
            edit_page(&bot, message, text, render::leaderboard_keyboard(period)).await
        }
    }
}
