// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leaderboard counters.
//!
//! Every bump is one UPSERT, so a period count either keeps accumulating
//! under its current key or restarts at the bumped amount when the key has
//! rolled over. SQLite evaluates the SET list against the pre-update row.

use sequin_core::{Period, PeriodKeys, RankedUser, SequinError, UserId};

use super::{to_count, to_sql_count};
use crate::database::{Database, map_tr_err};

const INCREMENT_SQL: &str = "
    INSERT INTO leaderboard
        (user_id, display_name, day_key, day_count, week_key, week_count, month_key, month_count, all_time)
    VALUES (?1, ?2, ?3, ?6, ?4, ?6, ?5, ?6, ?6)
    ON CONFLICT(user_id) DO UPDATE SET
        display_name = excluded.display_name,
        day_count = CASE WHEN leaderboard.day_key = excluded.day_key
                         THEN leaderboard.day_count + excluded.day_count
                         ELSE excluded.day_count END,
        day_key = excluded.day_key,
        week_count = CASE WHEN leaderboard.week_key = excluded.week_key
                          THEN leaderboard.week_count + excluded.week_count
                          ELSE excluded.week_count END,
        week_key = excluded.week_key,
        month_count = CASE WHEN leaderboard.month_key = excluded.month_key
                           THEN leaderboard.month_count + excluded.month_count
                           ELSE excluded.month_count END,
        month_key = excluded.month_key,
        all_time = leaderboard.all_time + excluded.all_time";

/// Key and count columns backing a period. All-time has no key.
fn columns(period: Period) -> (Option<&'static str>, &'static str) {
    match period {
        Period::Today => (Some("day_key"), "day_count"),
        Period::Week => (Some("week_key"), "week_count"),
        Period::Month => (Some("month_key"), "month_count"),
        Period::AllTime => (None, "all_time"),
    }
}

pub async fn increment(
    db: &Database,
    user: UserId,
    display_name: &str,
    keys: &PeriodKeys,
    amount: u64,
) -> Result<(), SequinError> {
    let name = display_name.to_string();
    let keys = keys.clone();
    let amount = to_sql_count(amount);
    db.connection()
        .call(move |conn| {
            conn.execute(
                INCREMENT_SQL,
                rusqlite::params![user.0, name, keys.day, keys.week, keys.month, amount],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Top `limit` users for the period, highest count first, ties by user id.
pub async fn rank(
    db: &Database,
    period: Period,
    keys: &PeriodKeys,
    limit: usize,
) -> Result<Vec<RankedUser>, SequinError> {
    let (key_col, count_col) = columns(period);
    let key = keys.key_for(period).map(str::to_string);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let filter = key_col
        .map(|col| format!("{col} = ?2 AND "))
        .unwrap_or_default();
    let sql = format!(
        "SELECT user_id, display_name, {count_col} FROM leaderboard
         WHERE {filter}{count_col} > 0
         ORDER BY {count_col} DESC, user_id ASC
         LIMIT ?1"
    );

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let map_row = |row: &rusqlite::Row<'_>| {
                Ok(RankedUser {
                    user_id: UserId(row.get(0)?),
                    display_name: row.get(1)?,
                    count: to_count(row.get(2)?),
                })
            };
            let rows = match &key {
                Some(key) => stmt.query_map(rusqlite::params![limit, key], map_row)?,
                None => stmt.query_map(rusqlite::params![limit], map_row)?,
            };
            let ranked = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(ranked)
        })
        .await
        .map_err(map_tr_err)
}

/// Sum of all users' counts for the period.
pub async fn total(db: &Database, period: Period, keys: &PeriodKeys) -> Result<u64, SequinError> {
    let (key_col, count_col) = columns(period);
    let key = keys.key_for(period).map(str::to_string);
    let sql = match key_col {
        Some(col) => format!("SELECT COALESCE(SUM({count_col}), 0) FROM leaderboard WHERE {col} = ?1"),
        None => format!("SELECT COALESCE(SUM({count_col}), 0) FROM leaderboard"),
    };

    let sum: i64 = db
        .connection()
        .call(move |conn| match &key {
            Some(key) => conn.query_row(&sql, rusqlite::params![key], |row| row.get(0)),
            None => conn.query_row(&sql, [], |row| row.get(0)),
        })
        .await
        .map_err(map_tr_err)?;
    Ok(to_count(sum))
}
