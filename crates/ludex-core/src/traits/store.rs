// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Library store trait for the canonical game / library entry / achievement
//! persistence consumed by the sync engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::LudexError;
use crate::types::{
    AchievementRecord, CanonicalGame, LibraryEntryUpdate, Platform, UserLibraryEntry,
};

/// Seed values for a lazily-created canonical game.
#[derive(Debug, Clone)]
pub struct NewCanonicalGame {
    pub title: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub platform: Platform,
    pub stable_id: String,
    pub platform_label: String,
}

/// Seed values for a lazily-created library entry.
#[derive(Debug, Clone)]
pub struct NewLibraryEntry {
    pub user_id: String,
    pub game_id: i64,
    pub platform: Platform,
    pub platform_label: String,
    pub session_id: Option<String>,
    pub status: crate::types::PlayStatus,
    pub completion_percentage: Option<f64>,
    pub achievements_earned: Option<i64>,
    pub achievements_total: Option<i64>,
    pub playtime_hours: Option<f64>,
    pub last_played_at: Option<DateTime<Utc>>,
}

/// Persistence seam for canonical games, per-user library entries,
/// achievements, and sync bookkeeping.
///
/// The sync engine never deletes games or entries; deletion is an explicit
/// user action outside the engine.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    // --- Canonical games ---

    /// Looks up a canonical game by its stable id for the given platform.
    async fn find_game_by_stable_id(
        &self,
        platform: Platform,
        stable_id: &str,
    ) -> Result<Option<CanonicalGame>, LudexError>;

    /// Inserts a new canonical game seeded from a remote record and returns
    /// the stored row.
    async fn insert_game(&self, game: &NewCanonicalGame) -> Result<CanonicalGame, LudexError>;

    /// Adds a platform label to an existing game's label set.
    async fn add_game_platform_label(&self, game_id: i64, label: &str)
        -> Result<(), LudexError>;

    // --- Library entries ---

    /// Primary entry lookup: by platform-native session id.
    async fn find_entry_by_session_id(
        &self,
        user_id: &str,
        platform: Platform,
        session_id: &str,
    ) -> Result<Option<UserLibraryEntry>, LudexError>;

    /// Fallback entry lookup: by the compound (user, game, platform) key.
    async fn find_entry(
        &self,
        user_id: &str,
        game_id: i64,
        platform: Platform,
    ) -> Result<Option<UserLibraryEntry>, LudexError>;

    /// Lists all of a user's entries on one platform.
    async fn list_entries(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Vec<UserLibraryEntry>, LudexError>;

    async fn insert_entry(&self, entry: &NewLibraryEntry)
        -> Result<UserLibraryEntry, LudexError>;

    /// Applies a partial update. `None` fields are left unchanged.
    async fn update_entry(
        &self,
        entry_id: i64,
        update: &LibraryEntryUpdate,
    ) -> Result<(), LudexError>;

    // --- Achievements ---

    /// Upserts by (entry id, platform achievement id). Implementations must
    /// preserve the unlock monotonicity invariant: a stored `unlocked = true`
    /// is never reverted to false.
    async fn upsert_achievement(&self, record: &AchievementRecord) -> Result<(), LudexError>;

    async fn list_achievements(
        &self,
        entry_id: i64,
    ) -> Result<Vec<AchievementRecord>, LudexError>;

    // --- Sync bookkeeping ---

    async fn set_last_synced(
        &self,
        user_id: &str,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> Result<(), LudexError>;

    async fn get_last_synced(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<DateTime<Utc>>, LudexError>;
}
