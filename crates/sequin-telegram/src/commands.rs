// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slash commands available in private chats.

use std::sync::Arc;

use sequin_core::{ChatId, MessageRef, Period, SequinError, UserId};
use sequin_dispatch::{Requester as RunRequester, UserQueue};
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId, ParseMode, User};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::HandlerResult;
use crate::handler::{
    confirm_dump, forwarded_chat, is_dm, parse_dump_id, profile_of, remember_user, user_id,
};
use crate::render;
use crate::state::BotState;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "show this message")]
    Help,
    #[command(description = "send your queued files back in order")]
    Sort,
    #[command(description = "clear your file queue")]
    Clear,
    #[command(description = "bot status (owner only)")]
    Status,
    #[command(description = "set a dump channel, e.g. /setdump -1001234567890")]
    Setdump(String),
    #[command(description = "show your dump channel")]
    Getdump,
    #[command(description = "delete your dump channel")]
    Deldump,
    #[command(description = "set a caption template using {file_name}, {episode}, {quality}")]
    Setcap(String),
    #[command(description = "show your caption template")]
    Getcap,
    #[command(description = "remove your caption template")]
    Resetcap,
    #[command(description = "reply to a sticker to use it as a separator")]
    Setsticker,
    #[command(description = "show your separator sticker")]
    Getsticker,
    #[command(description = "delete your separator sticker")]
    Delsticker,
    #[command(description = "choose the sorting mode")]
    Mode,
    #[command(description = "choose where separator stickers go")]
    Smode,
    #[command(description = "top sorters")]
    Leaderboard,
}

async fn reply(bot: &Bot, msg: &Message, text: impl Into<String>) -> HandlerResult {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Endpoint for parsed commands.
pub async fn handle(bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>) -> HandlerResult {
    if !is_dm(&msg) {
        return Ok(());
    }
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };
    let uid = user_id(&user);
    debug!(user = %uid, command = ?cmd, "command received");

    match cmd {
        Command::Start => {
            remember_user(&state, &user).await;
            reply(&bot, &msg, render::START_TEXT).await
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
            Ok(())
        }
        Command::Sort => {
            let requester = run_requester(&user, &msg);
            sort(bot, &msg, state, requester).await
        }
        Command::Clear => clear(&bot, &msg, &state, uid).await,
        Command::Status => status(&bot, &msg, &state, uid).await,
        Command::Setdump(arg) => setdump(&bot, &msg, &state, uid, &arg).await,
        Command::Getdump => match state.settings().settings(uid).await?.dump_chat {
            Some(chat) => reply(&bot, &msg, format!("Your Dump Channel:\n\n<code>{chat}</code>")).await,
            None => {
                reply(&bot, &msg, "You have not set a Dump Channel. Please set one using /setdump.")
                    .await
            }
        },
        Command::Deldump => {
            if state.settings().settings(uid).await?.dump_chat.is_none() {
                return reply(&bot, &msg, "You don't have a dump channel set. Please set one using /setdump.")
                    .await;
            }
            state.settings().set_dump_chat(uid, None).await?;
            reply(&bot, &msg, "Dump Channel Deleted.\n\nPlease Set A New One using /setdump.").await
        }
        Command::Setcap(template) => {
            let template = template.trim();
            if template.is_empty() {
                return reply(&bot, &msg, render::caption_help_text()).await;
            }
            state
                .settings()
                .set_caption_template(uid, Some(template.to_string()))
                .await?;
            reply(&bot, &msg, "Your caption has been saved successfully!").await
        }
        Command::Getcap => match state.settings().settings(uid).await?.caption_template {
            Some(template) => {
                let text = format!(
                    "Your current format is:\n\n<code>{}</code>",
                    render::escape_html(&template)
                );
                reply(&bot, &msg, text).await
            }
            None => {
                reply(
                    &bot,
                    &msg,
                    "You don't have a custom format set.\n\nOriginal captions will be kept.",
                )
                .await
            }
        },
        Command::Resetcap => {
            state.settings().set_caption_template(uid, None).await?;
            reply(&bot, &msg, "Your custom format has been removed.").await
        }
        Command::Setsticker => {
            let Some(sticker) = msg.reply_to_message().and_then(Message::sticker) else {
                return reply(&bot, &msg, "Please reply to a sticker to set it as your custom sticker.")
                    .await;
            };
            state
                .settings()
                .set_sticker_id(uid, Some(sticker.file.id.to_string()))
                .await?;
            reply(&bot, &msg, "Your custom sticker has been saved successfully.").await
        }
        Command::Getsticker => match state.settings().settings(uid).await?.sticker_id {
            Some(sticker) => {
                bot.send_sticker(msg.chat.id, InputFile::file_id(FileId(sticker)))
                    .await?;
                Ok(())
            }
            None => reply(&bot, &msg, "You don't have a custom sticker set.").await,
        },
        Command::Delsticker => {
            state.settings().set_sticker_id(uid, None).await?;
            reply(&bot, &msg, "Your custom sticker has been deleted.").await
        }
        Command::Mode => {
            let current = state.settings().settings(uid).await?.sort_mode;
            bot.send_message(msg.chat.id, render::mode_text(current))
                .parse_mode(ParseMode::Html)
                .reply_markup(render::mode_keyboard(current))
                .await?;
            Ok(())
        }
        Command::Smode => {
            let current = state.settings().settings(uid).await?.sticker_mode;
            bot.send_message(msg.chat.id, render::smode_text(current))
                .parse_mode(ParseMode::Html)
                .reply_markup(render::smode_keyboard(current))
                .await?;
            Ok(())
        }
        Command::Leaderboard => {
            let text = leaderboard_page(&state, Period::Today).await?;
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(render::leaderboard_keyboard(Period::Today))
                .await?;
            Ok(())
        }
    }
}

/// Rendered leaderboard for the current `period` bucket.
pub async fn leaderboard_page(state: &BotState, period: Period) -> Result<String, SequinError> {
    let limit = state.leaderboard_limit();
    let rows = state.leaderboard().rank(period, limit).await?;
    let total = state.leaderboard().total(period).await?;
    Ok(render::leaderboard_text(period, &rows, limit, total))
}

/// The run credited to `user`, delivering to the chat `msg` came from.
fn run_requester(user: &User, msg: &Message) -> RunRequester {
    RunRequester {
        user: user_id(user),
        display_name: profile_of(user).display_name().to_string(),
        chat: ChatId(msg.chat.id.0),
    }
}

/// Starts a dispatch run in the background and reports when it ends.
///
/// The run is tracked by [`BotState`] so shutdown waits for it instead of
/// dropping a queue that was already drained.
async fn sort(
    bot: Bot,
    msg: &Message,
    state: Arc<BotState>,
    requester: RunRequester,
) -> HandlerResult {
    let pending = state.queues().len(requester.user);
    if pending == 0 {
        return reply(&bot, msg, "Your file queue is empty. Send some files first.").await;
    }
    let progress = bot
        .send_message(msg.chat.id, format!("Sorting {pending} files..."))
        .await?;
    let chat = msg.chat.id;

    let tracked = state.clone();
    tracked.spawn_run(async move {
        let text = match state.pipeline().run(&requester).await {
            Ok(report) => {
                info!(user = %requester.user, sent = report.sent, total = report.total, "sort finished");
                report.to_string()
            }
            Err(SequinError::QueueEmpty) => "Your file queue is empty.".to_string(),
            Err(e) => {
                error!(user = %requester.user, error = %e, "sort run failed");
                "Sorting failed, please try again.".to_string()
            }
        };
        if let Err(e) = bot.edit_message_text(chat, progress.id, text).await {
            warn!(error = %e, "failed to post sort summary");
        }
    });
    Ok(())
}

async fn delete_quietly(bot: &Bot, chat: ChatId, message: MessageRef) {
    if let Err(e) = bot
        .delete_message(teloxide::types::ChatId(chat.0), MessageId(message.0))
        .await
    {
        debug!(chat = %chat, message = message.0, error = %e, "delete failed");
    }
}

async fn clear(bot: &Bot, msg: &Message, state: &BotState, uid: UserId) -> HandlerResult {
    let UserQueue { items, notices } = state.queues().clear(uid);
    if items.is_empty() && notices.is_empty() {
        return reply(bot, msg, "Your file queue is already empty.").await;
    }
    for item in &items {
        delete_quietly(bot, item.origin_chat, item.origin_message).await;
    }
    for notice in &notices {
        delete_quietly(bot, notice.chat, notice.message).await;
    }
    info!(user = %uid, items = items.len(), "queue cleared");
    reply(bot, msg, "Your file queue has been cleared.").await
}

async fn status(bot: &Bot, msg: &Message, state: &BotState, uid: UserId) -> HandlerResult {
    if !state.is_owner(uid) {
        debug!(user = %uid, "ignoring /status from non-owner");
        return Ok(());
    }
    let stats = state.stats().stats().await?;
    let users = state.users().count_users().await?;
    reply(bot, msg, render::status_text(state.uptime(), &stats, users)).await
}

async fn setdump(bot: &Bot, msg: &Message, state: &BotState, uid: UserId, arg: &str) -> HandlerResult {
    if let Some(chat) = parse_dump_id(arg) {
        return confirm_dump(bot, msg, state, uid, chat).await;
    }
    if let Some(chat) = msg.reply_to_message().and_then(forwarded_chat) {
        return confirm_dump(bot, msg, state, uid, chat).await;
    }
    state.await_dump(uid);
    reply(
        bot,
        msg,
        "Please provide a channel ID as a parameter (e.g., /setdump -1001234567890) \
         or forward a message from the channel.",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(Command::parse("/sort", "sequinbot").unwrap(), Command::Sort);
        assert_eq!(Command::parse("/leaderboard", "sequinbot").unwrap(), Command::Leaderboard);
        assert_eq!(Command::parse("/smode@sequinbot", "sequinbot").unwrap(), Command::Smode);
    }

    #[test]
    fn setcap_keeps_whole_template() {
        assert_eq!(
            Command::parse("/setcap Episode {episode} [{quality}]", "sequinbot").unwrap(),
            Command::Setcap("Episode {episode} [{quality}]".into())
        );
    }

    #[test]
    fn setdump_takes_the_id() {
        assert_eq!(
            Command::parse("/setdump -1001234567890", "sequinbot").unwrap(),
            Command::Setdump("-1001234567890".into())
        );
    }

    #[test]
    fn unknown_commands_do_not_parse() {
        assert!(Command::parse("/broadcast hi", "sequinbot").is_err());
    }

    #[test]
    fn help_lists_every_command() {
        let help = Command::descriptions().to_string();
        for name in ["/sort", "/clear", "/setdump", "/setcap", "/setsticker", "/mode", "/smode", "/leaderboard"] {
            assert!(help.contains(name), "missing {name}");
        }
    }

    #[test]
    fn sort_requester_credits_the_sender_in_their_chat() {
        use serde_json::json;

        let msg = crate::handler::fixtures::private_message(json!({ "text": "/sort" }));
        let requester = run_requester(msg.from.as_ref().unwrap(), &msg);
        assert_eq!(requester.user, UserId(4242));
        assert_eq!(requester.display_name, "Ann");
        assert_eq!(requester.chat, ChatId(4242));
    }

    #[tokio::test]
    async fn leaderboard_page_renders_current_counts() {
        let state = crate::state::test_support::state(None);
        state
            .leaderboard()
            .increment(UserId(1), "alice", 4)
            .await
            .unwrap();
        let page = leaderboard_page(&state, Period::AllTime).await.unwrap();
        assert!(page.contains("alice"));
        assert!(page.contains("<code>4</code>"));
    }
}
