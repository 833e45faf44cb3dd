// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user settings. A missing row reads back as `UserSettings::default()`.

use rusqlite::OptionalExtension;
use rusqlite::types::Value;
use sequin_core::{ChatId, SequinError, SortMode, StickerMode, UserId, UserSettings};

use crate::database::{Database, map_tr_err};

/// Columns that may be written individually.
#[derive(Debug, Clone, Copy)]
pub enum SettingColumn {
    DumpChat,
    CaptionTemplate,
    StickerId,
    SortMode,
    StickerMode,
}

impl SettingColumn {
    fn name(self) -> &'static str {
        match self {
            Self::DumpChat => "dump_chat_id",
            Self::CaptionTemplate => "caption_template",
            Self::StickerId => "sticker_id",
            Self::SortMode => "sort_mode",
            Self::StickerMode => "sticker_mode",
        }
    }
}

pub async fn get_settings(db: &Database, user: UserId) -> Result<UserSettings, SequinError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT dump_chat_id, caption_template, sticker_id, sort_mode, sticker_mode
                 FROM user_settings WHERE user_id = ?1",
                rusqlite::params![user.0],
                |row| {
                    let sort_mode: String = row.get(3)?;
                    let sticker_mode: String = row.get(4)?;
                    Ok(UserSettings {
                        dump_chat: row.get::<_, Option<i64>>(0)?.map(ChatId),
                        caption_template: row.get(1)?,
                        sticker_id: row.get(2)?,
                        sort_mode: SortMode::parse_or_default(&sort_mode),
                        sticker_mode: StickerMode::parse_or_default(&sticker_mode),
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
        .map(Option::unwrap_or_default)
}

/// Upserts a single column, leaving the rest of the row untouched.
pub async fn set_setting(
    db: &Database,
    user: UserId,
    column: SettingColumn,
    value: Value,
) -> Result<(), SequinError> {
    let sql = format!(
        "INSERT INTO user_settings (user_id, {col}) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET
             {col} = excluded.{col},
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        col = column.name()
    );
    db.connection()
        .call(move |conn| {
            conn.execute(&sql, rusqlite::params![user.0, value])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Maps an optional text setting to a nullable SQL value.
pub fn text_value(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_row_reads_as_defaults() {
        let db = Database::open_in_memory().await.unwrap();
        let settings = get_settings(&db, UserId(1)).await.unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[tokio::test]
    async fn columns_are_written_independently() {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserId(7);
        set_setting(&db, user, SettingColumn::DumpChat, Value::Integer(-1001234567))
            .await
            .unwrap();
        set_setting(&db, user, SettingColumn::SortMode, Value::Text("both".into()))
            .await
            .unwrap();
        set_setting(
            &db,
            user,
            SettingColumn::CaptionTemplate,
            text_value(Some("{file_name}".into())),
        )
        .await
        .unwrap();

        let settings = get_settings(&db, user).await.unwrap();
        assert_eq!(settings.dump_chat, Some(ChatId(-1001234567)));
        assert_eq!(settings.sort_mode, SortMode::Both);
        assert_eq!(settings.caption_template.as_deref(), Some("{file_name}"));
        assert_eq!(settings.sticker_mode, StickerMode::Default);

        set_setting(&db, user, SettingColumn::DumpChat, Value::Null)
            .await
            .unwrap();
        let settings = get_settings(&db, user).await.unwrap();
        assert_eq!(settings.dump_chat, None);
        assert_eq!(settings.sort_mode, SortMode::Both);
    }

    #[tokio::test]
    async fn unknown_stored_mode_falls_back() {
        let db = Database::open_in_memory().await.unwrap();
        set_setting(&db, UserId(3), SettingColumn::SortMode, Value::Text("bogus".into()))
            .await
            .unwrap();
        let settings = get_settings(&db, UserId(3)).await.unwrap();
        assert_eq!(settings.sort_mode, SortMode::Episode);
    }
}
