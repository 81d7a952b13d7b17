// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `LibraryStore` and `CredentialStore` traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ludex_core::traits::store::{NewCanonicalGame, NewLibraryEntry};
use ludex_core::types::{
    AchievementRecord, CanonicalGame, Credential, LibraryEntryUpdate, Platform,
    UserLibraryEntry,
};
use ludex_core::{CredentialStore, LibraryStore, LudexError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Opens (creating and migrating if necessary) the store at `path`.
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self, LudexError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Opens an in-memory store. Used by tests.
    pub async fn open_in_memory() -> Result<Self, LudexError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoints and closes the database.
    pub async fn close(&self) -> Result<(), LudexError> {
        self.db.close().await
    }

    /// Replaces an entry's locked-field set. Locks are a user action, not
    /// part of the sync write path, so this lives outside [`LibraryStore`].
    pub async fn set_locked_fields(
        &self,
        entry_id: i64,
        fields: &std::collections::BTreeSet<ludex_core::LockedField>,
    ) -> Result<(), LudexError> {
        queries::library::set_locked_fields(&self.db, entry_id, fields).await
    }
}

#[async_trait]
impl LibraryStore for SqliteStore {
    async fn find_game_by_stable_id(
        &self,
        platform: Platform,
        stable_id: &str,
    ) -> Result<Option<CanonicalGame>, LudexError> {
        queries::games::find_by_stable_id(&self.db, platform, stable_id).await
    }

    async fn insert_game(&self, game: &NewCanonicalGame) -> Result<CanonicalGame, LudexError> {
        queries::games::insert_game(&self.db, game).await
    }

    async fn add_game_platform_label(
        &self,
        game_id: i64,
        label: &str,
    ) -> Result<(), LudexError> {
        queries::games::add_platform_label(&self.db, game_id, label).await
    }

    async fn find_entry_by_session_id(
        &self,
        user_id: &str,
        platform: Platform,
        session_id: &str,
    ) -> Result<Option<UserLibraryEntry>, LudexError> {
        queries::library::find_by_session_id(&self.db, user_id, platform, session_id).await
    }

    async fn find_entry(
        &self,
        user_id: &str,
        game_id: i64,
        platform: Platform,
    ) -> Result<Option<UserLibraryEntry>, LudexError> {
        queries::library::find_entry(&self.db, user_id, game_id, platform).await
    }

    async fn list_entries(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Vec<UserLibraryEntry>, LudexError> {
        queries::library::list_entries(&self.db, user_id, platform).await
    }

    async fn insert_entry(
        &self,
        entry: &NewLibraryEntry,
    ) -> Result<UserLibraryEntry, LudexError> {
        queries::library::insert_entry(&self.db, entry).await
    }

    async fn update_entry(
        &self,
        entry_id: i64,
        update: &LibraryEntryUpdate,
    ) -> Result<(), LudexError> {
        queries::library::update_entry(&self.db, entry_id, update).await
    }

    async fn upsert_achievement(&self, record: &AchievementRecord) -> Result<(), LudexError> {
        queries::achievements::upsert_achievement(&self.db, record).await
    }

    async fn list_achievements(
        &self,
        entry_id: i64,
    ) -> Result<Vec<AchievementRecord>, LudexError> {
        queries::achievements::list_achievements(&self.db, entry_id).await
    }

    async fn set_last_synced(
        &self,
        user_id: &str,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> Result<(), LudexError> {
        queries::sync_status::set_last_synced(&self.db, user_id, platform, at).await
    }

    async fn get_last_synced(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<DateTime<Utc>>, LudexError> {
        queries::sync_status::get_last_synced(&self.db, user_id, platform).await
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn get_credential(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<Credential>, LudexError> {
        queries::credentials::get_credential(&self.db, user_id, platform).await
    }

    async fn save_credential(&self, credential: &Credential) -> Result<(), LudexError> {
        queries::credentials::save_credential(&self.db, credential).await
    }

    async fn clear_credential(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<(), LudexError> {
        queries::credentials::clear_credential(&self.db, user_id, platform).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludex_core::types::PlayStatus;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_store_at_configured_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.db");
        let store = SqliteStore::open(&path).await.unwrap();
        assert!(path.exists(), "database file should be created");
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn full_sync_lifecycle_through_store_traits() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        // Resolve-or-create a game.
        assert!(store
            .find_game_by_stable_id(Platform::Psn, "NPWR20188_00")
            .await
            .unwrap()
            .is_none());
        let game = store
            .insert_game(&NewCanonicalGame {
                title: "Bloodborne".into(),
                cover_url: None,
                description: None,
                developer: Some("FromSoftware".into()),
                platform: Platform::Psn,
                stable_id: "NPWR20188_00".into(),
                platform_label: "PS4".into(),
            })
            .await
            .unwrap();

        // Create the user's entry.
        let entry = store
            .insert_entry(&NewLibraryEntry {
                user_id: "local".into(),
                game_id: game.id,
                platform: Platform::Psn,
                platform_label: "PS4".into(),
                session_id: Some("NPWR20188_00".into()),
                status: PlayStatus::Playing,
                completion_percentage: None,
                achievements_earned: Some(10),
                achievements_total: Some(40),
                playtime_hours: Some(61.5),
                last_played_at: None,
            })
            .await
            .unwrap();

        // Update it with a later sync's values.
        store
            .update_entry(
                entry.id,
                &LibraryEntryUpdate {
                    platform_label: Some("PS5".into()),
                    achievements_earned: Some(12),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reread = store
            .find_entry_by_session_id("local", Platform::Psn, "NPWR20188_00")
            .await
            .unwrap()
            .expect("session-id lookup survives label rewrite");
        assert_eq!(reread.platform_label, "PS5");
        assert_eq!(reread.achievements_earned, Some(12));

        // Bookkeeping.
        let now = Utc::now();
        LibraryStore::set_last_synced(&store, "local", Platform::Psn, now)
            .await
            .unwrap();
        assert_eq!(
            store.get_last_synced("local", Platform::Psn).await.unwrap(),
            Some(now)
        );

        store.close().await.unwrap();
    }
}
