// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply texts, inline keyboards and callback payloads.
//!
//! Everything here is pure so it can be tested without a bot.

use std::str::FromStr;
use std::time::Duration;

use sequin_core::{BotStats, Period, RankedUser, SortMode, StickerMode};
use sequin_dispatch::format_elapsed;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CLOSE_DATA: &str = "close";

/// Parsed inline-button payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Mode(SortMode),
    StickerMode(StickerMode),
    Leaderboard(Period),
    Close,
}

impl Callback {
    /// Unknown or malformed payloads yield `None` and are ignored.
    pub fn parse(data: &str) -> Option<Self> {
        if data == CLOSE_DATA {
            return Some(Self::Close);
        }
        let (kind, value) = data.split_once(':')?;
        match kind {
            "mode" => SortMode::from_str(value).ok().map(Self::Mode),
            "smode" => StickerMode::from_str(value).ok().map(Self::StickerMode),
            "lb" => Period::from_str(value).ok().map(Self::Leaderboard),
            _ => None,
        }
    }

    pub fn data(&self) -> String {
        match self {
            Self::Mode(mode) => format!("mode:{mode}"),
            Self::StickerMode(mode) => format!("smode:{mode}"),
            Self::Leaderboard(period) => format!("lb:{period}"),
            Self::Close => CLOSE_DATA.to_string(),
        }
    }
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn button(label: String, callback: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, callback.data())
}

fn close_row() -> Vec<InlineKeyboardButton> {
    vec![InlineKeyboardButton::callback("Close", CLOSE_DATA)]
}

pub fn ack_text(queued: usize) -> String {
    format!("{queued} File Added In Queue")
}

pub const START_TEXT: &str = "<b>Welcome!</b>\n\n\
    Send me your files and I will queue them. \
    When you're done, use /sort and I'll post them back in order, \
    optionally with new captions and a sticker between batches.\n\n\
    Use /help to see every command.";

pub fn mode_text(current: SortMode) -> String {
    format!(
        "<b>Select Sorting Mode (Current: {})</b>\n\n\
         <blockquote>• Quality: Sort by quality then episode\n\
         • Title: Sort by title then episode\n\
         • Both: Sort by title, quality, then episode\n\
         • Episode: Default sorting by episode only\n\
         • Season: Sort by season, then quality, then episode</blockquote>",
        capitalize(&current.to_string())
    )
}

pub fn mode_keyboard(current: SortMode) -> InlineKeyboardMarkup {
    let label = |mode: SortMode| {
        let name = capitalize(&mode.to_string());
        if mode == current { format!("✓ {name}") } else { name }
    };
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SortMode::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|&mode| button(label(mode), Callback::Mode(mode)))
                .collect()
        })
        .collect();
    rows.push(close_row());
    InlineKeyboardMarkup::new(rows)
}

pub fn smode_text(current: StickerMode) -> String {
    format!(
        "<b>Sticker Display Settings</b>\n\n\
         <blockquote>• Quality: Send stickers between quality groups\n\
         • Default: Send sticker at end of processing</blockquote>\n\n\
         <b>Current mode:</b> {}",
        capitalize(&current.to_string())
    )
}

pub fn smode_keyboard(current: StickerMode) -> InlineKeyboardMarkup {
    let row = StickerMode::ALL
        .iter()
        .map(|&mode| {
            let name = capitalize(&mode.to_string());
            let label = if mode == current { format!("✓ {name}") } else { name };
            button(label, Callback::StickerMode(mode))
        })
        .collect();
    InlineKeyboardMarkup::new(vec![row, close_row()])
}

fn leaderboard_title(period: Period) -> &'static str {
    match period {
        Period::Today => "LEADERBOARD: TODAY",
        Period::Week => "LEADERBOARD: WEEKLY",
        Period::Month => "LEADERBOARD: MONTHLY",
        Period::AllTime => "LEADERBOARD: ALL TIME",
    }
}

/// HTML leaderboard: one clickable mention per ranked user, then the total.
pub fn leaderboard_text(period: Period, rows: &[RankedUser], limit: usize, total: u64) -> String {
    let mut lines = vec![
        format!("<b>{}</b>\n", leaderboard_title(period)),
        format!("<b>Top {limit} Users With Most Files Sorted:</b>\n"),
    ];
    if rows.is_empty() {
        lines.push("<blockquote>No data yet.</blockquote>\n".to_string());
    }
    for row in rows {
        let name = if row.display_name.trim().is_empty() {
            "User".to_string()
        } else {
            escape_html(&row.display_name)
        };
        lines.push(format!(
            "« <a href='tg://user?id={}'>{name}</a> » <b>{}</b>",
            row.user_id, row.count
        ));
    }
    lines.push(format!("\n<b>Total Sorted Files:</b> <code>{total}</code>"));
    lines.join("\n")
}

pub fn leaderboard_keyboard(active: Period) -> InlineKeyboardMarkup {
    let label = |period: Period| {
        let name = match period {
            Period::Today => "Today",
            Period::Week => "Weekly",
            Period::Month => "Monthly",
            Period::AllTime => "All Time",
        };
        if period == active { format!("• {name} •") } else { name.to_string() }
    };
    let rows = Period::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|&period| button(label(period), Callback::Leaderboard(period)))
                .collect()
        })
        .chain(std::iter::once(close_row()))
        .collect::<Vec<Vec<_>>>();
    InlineKeyboardMarkup::new(rows)
}

/// Owner-only `/status` body.
pub fn status_text(uptime: Duration, stats: &BotStats, users: u64) -> String {
    let restarted = stats
        .last_restarted
        .map(|at| format!("{} UTC", at.format("%d-%m-%Y %H:%M:%S")))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "<b>BOT STATUS</b>\n\n\
         <b>Uptime:</b> <code>{}</code>\n\
         <b>Last Restarted:</b> <code>{restarted}</code>\n\
         <b>Total Users:</b> <code>{users}</code>\n\
         <b>Total Files Sorted:</b> <code>{}</code>",
        format_elapsed(uptime),
        stats.total_sorted_files
    )
}

pub fn caption_help_text() -> &'static str {
    "<b>Set a caption format like this.</b>\n\n\
     <code>{file_name}</code> - File name\n\
     <code>{episode}</code> - Episode number\n\
     <code>{quality}</code> - Quality\n\n\
     Example: <code>/setcap Episode {episode} [{quality}]</code>"
}
