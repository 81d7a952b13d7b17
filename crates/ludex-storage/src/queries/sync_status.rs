// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-(user, platform) last-sync bookkeeping.

use chrono::{DateTime, Utc};
use rusqlite::params;

use ludex_core::types::Platform;
use ludex_core::LudexError;

use crate::database::{map_tr_err, Database};
use crate::models::{parse_ts, ts};

/// Record the completion time of a sync pass.
pub async fn set_last_synced(
    db: &Database,
    user_id: &str,
    platform: Platform,
    at: DateTime<Utc>,
) -> Result<(), LudexError> {
    let user = user_id.to_string();
    let platform = platform.to_string();
    let at = ts(at);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO sync_status (user_id, platform, last_synced_at) \
                 VALUES (?1, ?2, ?3)",
                params![user, platform, at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The completion time of the most recent sync pass, if any.
pub async fn get_last_synced(
    db: &Database,
    user_id: &str,
    platform: Platform,
) -> Result<Option<DateTime<Utc>>, LudexError> {
    let user = user_id.to_string();
    let platform = platform.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT last_synced_at FROM sync_status WHERE user_id = ?1 AND platform = ?2",
                params![user, platform],
                |row| parse_ts(0, row.get(0)?),
            );
            match result {
                Ok(at) => Ok(Some(at)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_synced_round_trips_and_replaces() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(get_last_synced(&db, "local", Platform::Psn)
            .await
            .unwrap()
            .is_none());

        let first = Utc::now();
        set_last_synced(&db, "local", Platform::Psn, first).await.unwrap();
        assert_eq!(
            get_last_synced(&db, "local", Platform::Psn).await.unwrap(),
            Some(first)
        );

        let second = first + chrono::Duration::minutes(5);
        set_last_synced(&db, "local", Platform::Psn, second).await.unwrap();
        assert_eq!(
            get_last_synced(&db, "local", Platform::Psn).await.unwrap(),
            Some(second)
        );

        // Other platforms are unaffected.
        assert!(get_last_synced(&db, "local", Platform::Epic)
            .await
            .unwrap()
            .is_none());
    }
}
