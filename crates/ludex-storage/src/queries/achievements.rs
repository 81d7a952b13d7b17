// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Achievement upsert and listing.
//!
//! Upserts are keyed by (entry id, platform achievement id). The unlocked
//! flag only moves false -> true during sync, never true -> false, and the
//! original unlock date is preserved once set.

use rusqlite::params;

use ludex_core::LudexError;

use crate::database::{map_tr_err, Database};
use crate::models::{parse_opt_ts, ts, AchievementRecord};

fn map_achievement_row(row: &rusqlite::Row<'_>) -> Result<AchievementRecord, rusqlite::Error> {
    Ok(AchievementRecord {
        entry_id: row.get(0)?,
        platform_achievement_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        icon_url: row.get(4)?,
        unlocked: row.get(5)?,
        unlocked_at: parse_opt_ts(6, row.get(6)?)?,
        rarity_percent: row.get(7)?,
        points: row.get(8)?,
    })
}

/// Upsert one achievement record.
pub async fn upsert_achievement(
    db: &Database,
    record: &AchievementRecord,
) -> Result<(), LudexError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO user_achievements (entry_id, platform_achievement_id, name, \
                 description, icon_url, unlocked, unlocked_at, rarity_percent, points) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                 ON CONFLICT (entry_id, platform_achievement_id) DO UPDATE SET \
                   name = excluded.name, \
                   description = excluded.description, \
                   icon_url = excluded.icon_url, \
                   rarity_percent = excluded.rarity_percent, \
                   points = excluded.points, \
                   unlocked = MAX(user_achievements.unlocked, excluded.unlocked), \
                   unlocked_at = CASE \
                     WHEN user_achievements.unlocked = 1 THEN user_achievements.unlocked_at \
                     ELSE excluded.unlocked_at \
                   END",
                params![
                    record.entry_id,
                    record.platform_achievement_id,
                    record.name,
                    record.description,
                    record.icon_url,
                    record.unlocked,
                    record.unlocked_at.map(ts),
                    record.rarity_percent,
                    record.points,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List all achievements for one library entry.
pub async fn list_achievements(
    db: &Database,
    entry_id: i64,
) -> Result<Vec<AchievementRecord>, LudexError> {
    db.connection()
        .call(move |conn| -> Result<Vec<AchievementRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT entry_id, platform_achievement_id, name, description, icon_url, \
                 unlocked, unlocked_at, rarity_percent, points \
                 FROM user_achievements WHERE entry_id = ?1 \
                 ORDER BY platform_achievement_id",
            )?;
            let rows = stmt.query_map(params![entry_id], map_achievement_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}
