// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot-wide counters kept in the single `stats` row.

use chrono::{DateTime, Utc};
use sequin_core::{BotStats, SequinError};

use super::{to_count, to_sql_count};
use crate::database::{Database, map_tr_err};

pub async fn add_sorted_files(db: &Database, amount: u64) -> Result<(), SequinError> {
    let amount = to_sql_count(amount);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE stats SET total_sorted_files = total_sorted_files + ?1 WHERE id = 1",
                rusqlite::params![amount],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_stats(db: &Database) -> Result<BotStats, SequinError> {
    let (total, restarted): (i64, Option<String>) = db
        .connection()
        .call(|conn| {
            conn.query_row(
                "SELECT total_sorted_files, last_restarted FROM stats WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
        })
        .await
        .map_err(map_tr_err)?;

    Ok(BotStats {
        total_sorted_files: to_count(total),
        last_restarted: restarted
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

pub async fn mark_restarted(db: &Database, at: DateTime<Utc>) -> Result<(), SequinError> {
    let stamp = at.to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE stats SET last_restarted = ?1 WHERE id = 1",
                rusqlite::params![stamp],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
