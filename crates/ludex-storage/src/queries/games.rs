// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical game CRUD operations.

use chrono::Utc;
use rusqlite::params;

use ludex_core::traits::store::NewCanonicalGame;
use ludex_core::types::Platform;
use ludex_core::LudexError;

use crate::database::{map_tr_err, Database};
use crate::models::{
    parse_opt_platform, parse_platform_labels, parse_ts, platform_labels_to_json, ts,
    CanonicalGame,
};

const GAME_COLUMNS: &str = "id, title, cover_url, description, developer, steam_app_id, \
     psn_communication_id, xbox_title_id, epic_catalog_item_id, platforms, \
     metadata_source, created_at, updated_at";

/// The stable-id column for a platform family.
fn stable_id_column(platform: Platform) -> &'static str {
    match platform {
        Platform::Steam => "steam_app_id",
        Platform::Psn => "psn_communication_id",
        Platform::Xbox => "xbox_title_id",
        Platform::Epic => "epic_catalog_item_id",
    }
}

fn map_game_row(row: &rusqlite::Row<'_>) -> Result<CanonicalGame, rusqlite::Error> {
    Ok(CanonicalGame {
        id: row.get(0)?,
        title: row.get(1)?,
        cover_url: row.get(2)?,
        description: row.get(3)?,
        developer: row.get(4)?,
        steam_app_id: row.get(5)?,
        psn_communication_id: row.get(6)?,
        xbox_title_id: row.get(7)?,
        epic_catalog_item_id: row.get(8)?,
        platforms: parse_platform_labels(&row.get::<_, String>(9)?),
        metadata_source: parse_opt_platform(10, row.get(10)?)?,
        created_at: parse_ts(11, row.get(11)?)?,
        updated_at: parse_ts(12, row.get(12)?)?,
    })
}

/// Look up a canonical game by its stable id for the given platform.
pub async fn find_by_stable_id(
    db: &Database,
    platform: Platform,
    stable_id: &str,
) -> Result<Option<CanonicalGame>, LudexError> {
    let stable_id = stable_id.to_string();
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM games WHERE {} = ?1",
        stable_id_column(platform)
    );
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            match stmt.query_row(params![stable_id], map_game_row) {
                Ok(game) => Ok(Some(game)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_game(db: &Database, id: i64) -> Result<Option<CanonicalGame>, LudexError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"))?;
            match stmt.query_row(params![id], map_game_row) {
                Ok(game) => Ok(Some(game)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new canonical game seeded from a remote record. The seeding
/// platform becomes the metadata source and its stable id is attached.
pub async fn insert_game(
    db: &Database,
    game: &NewCanonicalGame,
) -> Result<CanonicalGame, LudexError> {
    let game = game.clone();
    let now = ts(Utc::now());
    db.connection()
        .call(move |conn| {
            let platforms = platform_labels_to_json(&[game.platform_label.clone()].into());
            let sql = format!(
                "INSERT INTO games (title, cover_url, description, developer, {}, \
                 platforms, metadata_source, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                stable_id_column(game.platform)
            );
            conn.execute(
                &sql,
                params![
                    game.title,
                    game.cover_url,
                    game.description,
                    game.developer,
                    game.stable_id,
                    platforms,
                    game.platform.to_string(),
                    now,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let mut stmt =
                conn.prepare(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"))?;
            stmt.query_row(params![id], map_game_row)
        })
        .await
        .map_err(map_tr_err)
}

/// Add a platform label to a game's label set, if not already present.
pub async fn add_platform_label(
    db: &Database,
    game_id: i64,
    label: &str,
) -> Result<(), LudexError> {
    let label = label.to_string();
    let now = ts(Utc::now());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let raw: String = conn.query_row(
                "SELECT platforms FROM games WHERE id = ?1",
                params![game_id],
                |row| row.get(0),
            )?;
            let mut labels = parse_platform_labels(&raw);
            if !labels.insert(label) {
                return Ok(());
            }
            conn.execute(
                "UPDATE games SET platforms = ?1, updated_at = ?2 WHERE id = ?3",
                params![platform_labels_to_json(&labels), now, game_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn hades_seed() -> NewCanonicalGame {
        NewCanonicalGame {
            title: "Hades".into(),
            cover_url: Some("https://cdn.example/hades.jpg".into()),
            description: None,
            developer: Some("Supergiant Games".into()),
            platform: Platform::Steam,
            stable_id: "1145360".into(),
            platform_label: "Steam".into(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_stable_id() {
        let db = setup_db().await;
        let inserted = insert_game(&db, &hades_seed()).await.unwrap();
        assert_eq!(inserted.title, "Hades");
        assert_eq!(inserted.steam_app_id.as_deref(), Some("1145360"));
        assert_eq!(inserted.metadata_source, Some(Platform::Steam));
        assert!(inserted.platforms.contains("Steam"));

        let found = find_by_stable_id(&db, Platform::Steam, "1145360")
            .await
            .unwrap()
            .expect("game should be found");
        assert_eq!(found.id, inserted.id);

        // The same id under a different platform family finds nothing.
        assert!(find_by_stable_id(&db, Platform::Xbox, "1145360")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn stable_id_is_unique_per_platform() {
        let db = setup_db().await;
        insert_game(&db, &hades_seed()).await.unwrap();
        let duplicate = insert_game(&db, &hades_seed()).await;
        assert!(duplicate.is_err(), "duplicate stable id must be rejected");
    }

    #[tokio::test]
    async fn add_platform_label_is_idempotent() {
        let db = setup_db().await;
        let game = insert_game(&db, &hades_seed()).await.unwrap();

        add_platform_label(&db, game.id, "PS5").await.unwrap();
        add_platform_label(&db, game.id, "PS5").await.unwrap();

        let reread = get_game(&db, game.id).await.unwrap().unwrap();
        assert_eq!(reread.platforms.len(), 2);
        assert!(reread.platforms.contains("PS5"));
    }
}
