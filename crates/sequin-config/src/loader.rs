// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based loading.
//!
//! Merge order, later wins:
//! 1. Compiled defaults
//! 2. `/etc/sequin/sequin.toml`
//! 3. `<config dir>/sequin/sequin.toml`
//! 4. `./sequin.toml`
//! 5. `PORT` (hosting platforms hand the keep-alive port over this way)
//! 6. `SEQUIN_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SequinConfig;

const SYSTEM_CONFIG: &str = "/etc/sequin/sequin.toml";
const LOCAL_CONFIG: &str = "sequin.toml";

/// Top-level sections addressable from `SEQUIN_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &["bot", "telegram", "storage", "keepalive", "leaderboard"];

pub fn load_config() -> Result<SequinConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults overlaid with a single TOML string. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<SequinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SequinConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, one explicit file, then env overrides.
pub fn load_config_from_path(path: &Path) -> Result<SequinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SequinConfig::default()))
        .merge(Toml::file(path))
        .merge(port_provider())
        .merge(env_provider())
        .extract()
}

/// The full layered figment, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(SequinConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(port_provider())
        .merge(env_provider())
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sequin").join("sequin.toml"))
}

/// Paths and contents of the config files that exist, for diagnostics.
pub fn existing_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join(LOCAL_CONFIG))
        .unwrap_or_else(|_| PathBuf::from(LOCAL_CONFIG));
    [Some(local), user_config_path(), Some(PathBuf::from(SYSTEM_CONFIG))]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}

fn port_provider() -> Env {
    Env::raw().only(&["PORT"]).map(|_| "keepalive.port".into())
}

/// Maps `SEQUIN_TELEGRAM_BOT_TOKEN` to `telegram.bot_token`.
///
/// Only the leading section name is split off; underscores inside key
/// names are kept.
fn env_provider() -> Env {
    Env::prefixed("SEQUIN_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key.strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key)
            .into()
    })
}
