// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use rusqlite::OptionalExtension;
use sequin_core::{SequinError, UserId, UserProfile};

use super::to_count;
use crate::database::{Database, map_tr_err};

/// Records a user, refreshing their name on repeat visits.
pub async fn upsert_user(db: &Database, profile: &UserProfile) -> Result<(), SequinError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, first_name, username) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET
                     first_name = excluded.first_name,
                     username = excluded.username,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                rusqlite::params![profile.user_id.0, profile.first_name, profile.username],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_user(db: &Database, user: UserId) -> Result<Option<UserProfile>, SequinError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT user_id, first_name, username FROM users WHERE user_id = ?1",
                rusqlite::params![user.0],
                |row| {
                    Ok(UserProfile {
                        user_id: UserId(row.get(0)?),
                        first_name: row.get(1)?,
                        username: row.get(2)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_users(db: &Database) -> Result<u64, SequinError> {
    let count: i64 = db
        .connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)?;
    Ok(to_count(count))
}
