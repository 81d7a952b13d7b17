// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Ludex workspace.
//!
//! The canonical library model (games, entries, achievements, credentials)
//! lives here alongside the normalized DTOs that platform clients return.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A supported platform family.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Steam,
    Psn,
    Xbox,
    Epic,
}

/// A user's play status for one library entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    #[default]
    Unplayed,
    Playing,
    Played,
    Completed,
    OnHold,
}

/// A library-entry field the user can freeze against sync overwrites.
///
/// Persisted as a string-keyed JSON object (`{"status": true}`) for storage
/// compatibility; held in memory as a typed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LockedField {
    Status,
    CompletionPercentage,
    Achievements,
    PlaytimeHours,
    LastPlayedAt,
    Rating,
    Notes,
}

/// One game, deduplicated across platforms.
///
/// At most one stable id per platform family. A stable id, once attached, is
/// never reassigned to a different canonical game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalGame {
    pub id: i64,
    pub title: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub steam_app_id: Option<String>,
    pub psn_communication_id: Option<String>,
    pub xbox_title_id: Option<String>,
    pub epic_catalog_item_id: Option<String>,
    /// Platform labels this game has been seen on (e.g. "Steam", "PS5").
    pub platforms: BTreeSet<String>,
    /// Which platform family wrote the descriptive metadata (title, cover).
    /// Generic enrichment must not overwrite platform-sourced metadata.
    pub metadata_source: Option<Platform>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalGame {
    /// The stable id this game carries for the given platform family, if any.
    pub fn stable_id(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Steam => self.steam_app_id.as_deref(),
            Platform::Psn => self.psn_communication_id.as_deref(),
            Platform::Xbox => self.xbox_title_id.as_deref(),
            Platform::Epic => self.epic_catalog_item_id.as_deref(),
        }
    }
}

/// One user's relationship to one canonical game on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLibraryEntry {
    pub id: i64,
    pub user_id: String,
    pub game_id: i64,
    pub platform: Platform,
    /// Display label, rewritable between syncs ("PS4" -> "PS5").
    pub platform_label: String,
    /// Platform-native session id (steam appid, xbox title id, np
    /// communication id, epic catalog item id). Primary lookup key when
    /// present; written regardless of locks.
    pub session_id: Option<String>,
    pub status: PlayStatus,
    pub completion_percentage: Option<f64>,
    pub achievements_earned: Option<i64>,
    pub achievements_total: Option<i64>,
    pub playtime_hours: Option<f64>,
    pub last_played_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub locked_fields: BTreeSet<LockedField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserLibraryEntry {
    /// Capability check for the lock invariant: locked fields are never
    /// changed by sync, regardless of what the remote reports.
    pub fn is_locked(&self, field: LockedField) -> bool {
        self.locked_fields.contains(&field)
    }
}

/// A partial update to a [`UserLibraryEntry`]. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryEntryUpdate {
    pub platform_label: Option<String>,
    pub session_id: Option<String>,
    pub status: Option<PlayStatus>,
    pub completion_percentage: Option<f64>,
    pub achievements_earned: Option<i64>,
    pub achievements_total: Option<i64>,
    pub playtime_hours: Option<f64>,
    pub last_played_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl LibraryEntryUpdate {
    /// True if no field would change.
    pub fn is_empty(&self) -> bool {
        *self == LibraryEntryUpdate::default()
    }
}

/// Per-user, per-platform authentication material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: String,
    pub platform: Platform,
    pub material: CredentialMaterial,
}

/// The shape of a credential varies by platform: static ids/keys for Steam
/// and Xbox, refreshable OAuth pairs for PSN and Epic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialMaterial {
    /// Steam: the linked 64-bit Steam id. No stored secret.
    SteamId { steam_id: String },
    /// Xbox: a static third-party gateway API key.
    ApiKey { api_key: String },
    /// PSN and Epic: a refreshable OAuth token pair.
    OAuthTokens(TokenPair),
}

/// A refreshable OAuth access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    /// Epic tracks refresh-token expiry separately; `None` means unknown
    /// (treated as not yet expired).
    pub refresh_expires_at: Option<DateTime<Utc>>,
    /// Remote account id, where the platform requires one on API paths.
    pub account_id: Option<String>,
}

impl TokenPair {
    /// True if the refresh token itself is past its expiry, making the
    /// credential unrecoverable.
    pub fn refresh_expired(&self, now: DateTime<Utc>) -> bool {
        self.refresh_expires_at.is_some_and(|at| at <= now)
    }
}

/// One achievement definition/state, scoped to a library entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub entry_id: i64,
    pub platform_achievement_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Global unlock rarity, 0.0-100.0.
    pub rarity_percent: Option<f64>,
    /// Platform-specific weight: gamerscore for Xbox, trophy tier value for
    /// PSN, unset where the platform has no point concept.
    pub points: Option<i64>,
}

/// Outcome of one orchestration pass. Always returned, even on total failure
/// (counts default to zero, errors non-empty).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncResult {
    pub platform: Option<Platform>,
    pub games_added: u32,
    pub games_updated: u32,
    pub games_skipped: u32,
    /// Total remote items seen before filtering.
    pub total_remote: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SyncResult {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..Default::default()
        }
    }

    /// A result representing total failure with a single top-level error.
    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform: Some(platform),
            errors: vec![error.into()],
            ..Default::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.games_added == 0 && self.games_updated == 0 && !self.errors.is_empty()
    }
}

// --- Normalized remote DTOs ---

/// A remote player profile, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProfile {
    pub platform: Platform,
    /// Platform-native account identifier (steamid64, xuid, PSN account id,
    /// Epic account id).
    pub external_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// One remote library item, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteGame {
    pub platform: Platform,
    /// The platform's stable id for this title (appid, np communication id,
    /// xbox title id, epic catalog item id).
    pub stable_id: String,
    pub title: String,
    /// Display label for the concrete platform ("Steam", "PS5", ...).
    pub platform_label: String,
    pub cover_url: Option<String>,
    pub developer: Option<String>,
    pub playtime_minutes: Option<u64>,
    pub last_played_at: Option<DateTime<Utc>>,
    /// Aggregate counts, when the library endpoint exposes them directly
    /// (Xbox and PSN do; Steam and Epic require the achievements call).
    pub achievements_earned: Option<u32>,
    pub achievements_total: Option<u32>,
    /// Remote signals current or recent activity.
    pub recently_played: bool,
    /// Xbox title history includes PC-only entries; flagged here so the
    /// orchestrator can drop them from console sync while the comparison
    /// engine keeps them.
    pub pc_only: bool,
}

impl RemoteGame {
    pub fn new(platform: Platform, stable_id: impl Into<String>, title: impl Into<String>) -> Self {
        let platform_label = match platform {
            Platform::Steam => "Steam",
            Platform::Psn => "PlayStation",
            Platform::Xbox => "Xbox",
            Platform::Epic => "Epic",
        };
        Self {
            platform,
            stable_id: stable_id.into(),
            title: title.into(),
            platform_label: platform_label.to_string(),
            cover_url: None,
            developer: None,
            playtime_minutes: None,
            last_played_at: None,
            achievements_earned: None,
            achievements_total: None,
            recently_played: false,
            pc_only: false,
        }
    }
}

/// One remote achievement, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteAchievement {
    pub platform_achievement_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub rarity_percent: Option<f64>,
    pub points: Option<i64>,
}

/// Serialize a locked-field set into the persisted JSON object shape.
pub fn locked_fields_to_json(fields: &BTreeSet<LockedField>) -> String {
    let map: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|f| (f.to_string(), serde_json::Value::Bool(true)))
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// Parse the persisted JSON object shape back into a typed set.
///
/// Unknown keys are ignored rather than erroring, so a newer schema can read
/// rows written by an older one.
pub fn locked_fields_from_json(raw: &str) -> BTreeSet<LockedField> {
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str(raw) else {
        return BTreeSet::new();
    };
    map.iter()
        .filter(|(_, v)| v.as_bool() == Some(true))
        .filter_map(|(k, _)| k.parse().ok())
        .collect()
}
