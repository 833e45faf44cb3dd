// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Sequin configuration system.

use sequin_config::diagnostic::ConfigError;
use sequin_config::model::SequinConfig;
use sequin_config::{load_and_validate_str, load_config, load_config_from_str};
use serial_test::serial;

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[bot]
log_level = "debug"
owner_id = 123456

[telegram]
bot_token = "123:ABC"

[storage]
database_path = "/tmp/sequin-test.db"
wal_mode = false

[keepalive]
enabled = true
bind_address = "127.0.0.1"
port = 8080

[leaderboard]
limit = 10
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.bot.owner_id, Some(123456));
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.storage.database_path, "/tmp/sequin-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.keepalive.bind_address, "127.0.0.1");
    assert_eq!(config.keepalive.port, 8080);
    assert_eq!(config.leaderboard.limit, 10);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.bot.log_level, "info");
    assert_eq!(config.bot.owner_id, None);
    assert!(config.telegram.bot_token.is_none());
    assert!(config.storage.wal_mode);
    assert!(config.storage.database_path.ends_with("sequin.db"));
    assert!(config.keepalive.enabled);
    assert_eq!(config.keepalive.bind_address, "0.0.0.0");
    assert_eq!(config.keepalive.port, 10000);
    assert_eq!(config.leaderboard.limit, 20);
}

#[test]
fn unknown_key_gets_a_suggestion() {
    let errors = load_and_validate_str("[telegram]\nbot_tken = \"1:a\"\n")
        .expect_err("unknown key should be rejected");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "bot_tken");
            assert_eq!(suggestion.as_deref(), Some("bot_token"));
            assert!(span.is_some(), "inline source should be labelled");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[leaderbord]\nlimit = 5\n").unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("leaderboard"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[keepalive]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { key, .. } if key == "keepalive.port"),
        "got {:?}",
        errors[0]
    );
}

#[test]
fn validation_errors_surface_through_loader() {
    let errors = load_and_validate_str("[bot]\nlog_level = \"chatty\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("log_level")));
}

#[test]
#[serial]
fn env_overrides_keep_underscores_in_key_names() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("SEQUIN_TELEGRAM_BOT_TOKEN", "42:secret");
        jail.set_env("SEQUIN_STORAGE_DATABASE_PATH", "/var/lib/sequin/env.db");
        jail.set_env("SEQUIN_LEADERBOARD_LIMIT", "5");

        let config = load_config()?;
        assert_eq!(config.telegram.bot_token.as_deref(), Some("42:secret"));
        assert_eq!(config.storage.database_path, "/var/lib/sequin/env.db");
        assert_eq!(config.leaderboard.limit, 5);
        Ok(())
    });
}

#[test]
#[serial]
fn local_file_then_port_then_prefixed_env() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "sequin.toml",
            r#"
[bot]
owner_id = 7

[keepalive]
port = 9000
"#,
        )?;
        let config = load_config()?;
        assert_eq!(config.bot.owner_id, Some(7));
        assert_eq!(config.keepalive.port, 9000);

        jail.set_env("PORT", "9100");
        assert_eq!(load_config()?.keepalive.port, 9100);

        jail.set_env("SEQUIN_KEEPALIVE_PORT", "9200");
        assert_eq!(load_config()?.keepalive.port, 9200);
        Ok(())
    });
}

#[test]
fn serialized_defaults_round_trip_through_toml() {
    let rendered = toml::to_string(&SequinConfig::default()).expect("defaults serialize");
    let parsed = load_config_from_str(&rendered).expect("rendered defaults parse");
    assert_eq!(parsed.keepalive.port, 10000);
    assert_eq!(parsed.leaderboard.limit, 20);
}
