// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Non-command private messages: file ingestion and dump-channel answers.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use sequin_core::{ChatId, MessageRef, QueueItem, UserId, UserProfile};
use sequin_dispatch::Notice;
use teloxide::prelude::*;
use teloxide::payloads::SendMessage;
use teloxide::requests::JsonRequest;
use teloxide::types::{ChatKind, MessageOrigin, ParseMode, ReplyParameters, User};
use tracing::{debug, warn};

use crate::HandlerResult;
use crate::render::ack_text;
use crate::state::BotState;

/// Supergroup and channel ids as typed by users.
static DUMP_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-100\d{6,}$").unwrap());

/// Checks whether the message is from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Documents, videos, audio and photos are queued; anything else is ignored.
pub fn is_file(msg: &Message) -> bool {
    msg.document().is_some()
        || msg.video().is_some()
        || msg.audio().is_some()
        || msg.photo().is_some()
}

/// Joins the caption, text and attachment file names that metadata is
/// extracted from.
pub fn message_meta(msg: &Message) -> String {
    let parts = [
        msg.caption(),
        msg.text(),
        msg.document().and_then(|d| d.file_name.as_deref()),
        msg.video().and_then(|v| v.file_name.as_deref()),
        msg.audio().and_then(|a| a.file_name.as_deref()),
    ];
    parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn user_id(user: &User) -> UserId {
    UserId(user.id.0 as i64)
}

pub fn profile_of(user: &User) -> UserProfile {
    UserProfile {
        user_id: user_id(user),
        first_name: user.first_name.clone(),
        username: user.username.clone(),
    }
}

/// Accepts `-100` followed by at least six digits.
pub fn parse_dump_id(text: &str) -> Option<ChatId> {
    let text = text.trim();
    if !DUMP_ID.is_match(text) {
        return None;
    }
    text.parse().ok().map(ChatId)
}

/// The channel or chat a forwarded message originally came from.
pub fn forwarded_chat(msg: &Message) -> Option<ChatId> {
    match msg.forward_origin()? {
        MessageOrigin::Channel { chat, .. } => Some(ChatId(chat.id.0)),
        MessageOrigin::Chat { sender_chat, .. } => Some(ChatId(sender_chat.id.0)),
        _ => None,
    }
}

/// Upserts the sender, logging instead of failing the update.
pub async fn remember_user(state: &BotState, user: &User) {
    if let Err(e) = state.users().upsert_user(&profile_of(user)).await {
        warn!(error = %e, user = user.id.0, "failed to record user");
    }
}

/// Saves `chat` as the user's dump channel and confirms it.
pub async fn confirm_dump(bot: &Bot, msg: &Message, state: &BotState, user: UserId, chat: ChatId) -> HandlerResult {
    state.settings().set_dump_chat(user, Some(chat)).await?;
    state.stop_awaiting_dump(user);
    bot.send_message(
        msg.chat.id,
        format!(
            "Dump Channel Added: <code>{chat}</code>\n\n\
             Your Files Will Now Be Sent To The Selected Channel."
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

async fn receive_dump(bot: &Bot, msg: &Message, state: &BotState, user: UserId) -> HandlerResult {
    let chat = msg
        .text()
        .and_then(parse_dump_id)
        .or_else(|| forwarded_chat(msg));
    match chat {
        Some(chat) => confirm_dump(bot, msg, state, user, chat).await,
        None => {
            bot.send_message(
                msg.chat.id,
                "Please send a valid channel ID like <code>-1001234567890</code> \
                 or forward a message from the channel.",
            )
            .parse_mode(ParseMode::Html)
            .await?;
            Ok(())
        }
    }
}

/// Queue count notice, sent as a reply to the file it counts.
fn ack_request(bot: &Bot, msg: &Message, queued: usize) -> JsonRequest<SendMessage> {
    bot.send_message(msg.chat.id, ack_text(queued))
        .reply_parameters(ReplyParameters::new(msg.id))
}

/// Endpoint for private messages that are not recognized commands.
pub async fn on_message(bot: Bot, msg: Message, state: Arc<BotState>) -> HandlerResult {
    if !is_dm(&msg) {
        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if msg.text().is_some_and(|t| t.trim_start().starts_with('/')) {
        debug!(msg_id = msg.id.0, "ignoring unknown command");
        return Ok(());
    }

    let uid = user_id(user);
    if state.is_awaiting_dump(uid) {
        return receive_dump(&bot, &msg, &state, uid).await;
    }
    if !is_file(&msg) {
        debug!(msg_id = msg.id.0, "ignoring non-file message");
        return Ok(());
    }

    remember_user(&state, user).await;
    let chat = ChatId(msg.chat.id.0);
    let queued = state
        .queues()
        .append(uid, QueueItem::new(chat, MessageRef(msg.id.0), message_meta(&msg)));
    let ack = ack_request(&bot, &msg, queued).await?;
    state.queues().append_notice(
        uid,
        Notice {
            chat,
            message: MessageRef(ack.id.0),
        },
    );
    debug!(user = %uid, queued, "file queued");
    Ok(())
}
