// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User library entry CRUD operations.
//!
//! Entries are addressed primarily by (user, platform, session id) because
//! the platform label string may be rewritten between syncs; the compound
//! (user, game, platform) key is the fallback.

use chrono::Utc;
use rusqlite::{params, types::Value};

use ludex_core::traits::store::NewLibraryEntry;
use ludex_core::types::{LibraryEntryUpdate, Platform};
use ludex_core::LudexError;

use crate::database::{map_tr_err, Database};
use crate::models::{
    locked_fields_to_json, parse_locked_fields, parse_opt_ts, parse_platform, parse_status,
    parse_ts, ts, UserLibraryEntry,
};

const ENTRY_COLUMNS: &str = "id, user_id, game_id, platform, platform_label, session_id, \
     status, completion_percentage, achievements_earned, achievements_total, \
     playtime_hours, last_played_at, completed_at, locked_fields, created_at, updated_at";

fn map_entry_row(row: &rusqlite::Row<'_>) -> Result<UserLibraryEntry, rusqlite::Error> {
    Ok(UserLibraryEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        game_id: row.get(2)?,
        platform: parse_platform(3, row.get(3)?)?,
        platform_label: row.get(4)?,
        session_id: row.get(5)?,
        status: parse_status(6, row.get(6)?)?,
        completion_percentage: row.get(7)?,
        achievements_earned: row.get(8)?,
        achievements_total: row.get(9)?,
        playtime_hours: row.get(10)?,
        last_played_at: parse_opt_ts(11, row.get(11)?)?,
        completed_at: parse_opt_ts(12, row.get(12)?)?,
        locked_fields: parse_locked_fields(&row.get::<_, String>(13)?),
        created_at: parse_ts(14, row.get(14)?)?,
        updated_at: parse_ts(15, row.get(15)?)?,
    })
}

/// Primary lookup: by platform-native session id.
pub async fn find_by_session_id(
    db: &Database,
    user_id: &str,
    platform: Platform,
    session_id: &str,
) -> Result<Option<UserLibraryEntry>, LudexError> {
    let user_id = user_id.to_string();
    let platform = platform.to_string();
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM user_games \
                 WHERE user_id = ?1 AND platform = ?2 AND session_id = ?3"
            ))?;
            match stmt.query_row(params![user_id, platform, session_id], map_entry_row) {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fallback lookup: by the compound (user, game, platform) key.
pub async fn find_entry(
    db: &Database,
    user_id: &str,
    game_id: i64,
    platform: Platform,
) -> Result<Option<UserLibraryEntry>, LudexError> {
    let user_id = user_id.to_string();
    let platform = platform.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM user_games \
                 WHERE user_id = ?1 AND game_id = ?2 AND platform = ?3"
            ))?;
            match stmt.query_row(params![user_id, game_id, platform], map_entry_row) {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all of a user's entries on one platform, newest first.
pub async fn list_entries(
    db: &Database,
    user_id: &str,
    platform: Platform,
) -> Result<Vec<UserLibraryEntry>, LudexError> {
    let user_id = user_id.to_string();
    let platform = platform.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<UserLibraryEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM user_games \
                 WHERE user_id = ?1 AND platform = ?2 ORDER BY updated_at DESC"
            ))?;
            let rows = stmt.query_map(params![user_id, platform], map_entry_row)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new entry with remote-derived initial values.
pub async fn insert_entry(
    db: &Database,
    entry: &NewLibraryEntry,
) -> Result<UserLibraryEntry, LudexError> {
    let entry = entry.clone();
    let now = ts(Utc::now());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO user_games (user_id, game_id, platform, platform_label, \
                 session_id, status, completion_percentage, achievements_earned, \
                 achievements_total, playtime_hours, last_played_at, locked_fields, \
                 created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
                params![
                    entry.user_id,
                    entry.game_id,
                    entry.platform.to_string(),
                    entry.platform_label,
                    entry.session_id,
                    entry.status.to_string(),
                    entry.completion_percentage,
                    entry.achievements_earned,
                    entry.achievements_total,
                    entry.playtime_hours,
                    entry.last_played_at.map(ts),
                    locked_fields_to_json(&Default::default()),
                    now,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM user_games WHERE id = ?1"
            ))?;
            stmt.query_row(params![id], map_entry_row)
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update; `None` fields are left unchanged. `updated_at` is
/// always bumped.
pub async fn update_entry(
    db: &Database,
    entry_id: i64,
    update: &LibraryEntryUpdate,
) -> Result<(), LudexError> {
    let update = update.clone();
    let now = ts(Utc::now());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let mut sets: Vec<String> = Vec::new();
            let mut values: Vec<Value> = Vec::new();

            let mut push = |column: &str, value: Value, values: &mut Vec<Value>| {
                values.push(value);
                sets.push(format!("{column} = ?{}", values.len()));
            };

            if let Some(v) = update.platform_label {
                push("platform_label", Value::Text(v), &mut values);
            }
            if let Some(v) = update.session_id {
                push("session_id", Value::Text(v), &mut values);
            }
            if let Some(v) = update.status {
                push("status", Value::Text(v.to_string()), &mut values);
            }
            if let Some(v) = update.completion_percentage {
                push("completion_percentage", Value::Real(v), &mut values);
            }
            if let Some(v) = update.achievements_earned {
                push("achievements_earned", Value::Integer(v), &mut values);
            }
            if let Some(v) = update.achievements_total {
                push("achievements_total", Value::Integer(v), &mut values);
            }
            if let Some(v) = update.playtime_hours {
                push("playtime_hours", Value::Real(v), &mut values);
            }
            if let Some(v) = update.last_played_at {
                push("last_played_at", Value::Text(ts(v)), &mut values);
            }
            if let Some(v) = update.completed_at {
                push("completed_at", Value::Text(ts(v)), &mut values);
            }

            values.push(Value::Text(now));
            sets.push(format!("updated_at = ?{}", values.len()));

            values.push(Value::Integer(entry_id));
            let sql = format!(
                "UPDATE user_games SET {} WHERE id = ?{}",
                sets.join(", "),
                values.len()
            );
            conn.execute(&sql, rusqlite::params_from_iter(values))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the locked-field set (user action, not sync).
pub async fn set_locked_fields(
    db: &Database,
    entry_id: i64,
    fields: &std::collections::BTreeSet<ludex_core::LockedField>,
) -> Result<(), LudexError> {
    let json = locked_fields_to_json(fields);
    let now = ts(Utc::now());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "UPDATE user_games SET locked_fields = ?1, updated_at = ?2 WHERE id = ?3",
                params![json, now, entry_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
