// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::SequinConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Validates `config`, collecting every problem instead of stopping at the first.
pub fn validate_config(config: &SequinConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.bot.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "bot.log_level `{}` must be one of {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if let Some(owner) = config.bot.owner_id
        && owner <= 0
    {
        fail(format!("bot.owner_id must be a positive user id, got {owner}"));
    }

    if let Some(token) = config.telegram.bot_token.as_deref()
        && !looks_like_bot_token(token)
    {
        fail("telegram.bot_token must look like `<bot id>:<secret>`".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.keepalive.enabled {
        let addr = config.keepalive.bind_address.trim();
        let is_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = !addr.is_empty()
            && addr
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "keepalive.bind_address `{addr}` is not a valid IP address or hostname"
            ));
        }
        if config.keepalive.port == 0 {
            fail("keepalive.port must not be 0 while keepalive is enabled".to_string());
        }
    }

    if !(1..=MAX_LEADERBOARD_LIMIT).contains(&config.leaderboard.limit) {
        fail(format!(
            "leaderboard.limit must be between 1 and {MAX_LEADERBOARD_LIMIT}, got {}",
            config.leaderboard.limit
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn looks_like_bot_token(token: &str) -> bool {
    match token.split_once(':') {
        Some((id, secret)) => {
            !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) && !secret.is_empty()
        }
        None => false,
    }
}
