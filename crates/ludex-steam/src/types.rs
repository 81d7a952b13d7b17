// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Steam Web API.

use serde::Deserialize;

// --- GetPlayerSummaries ---

#[derive(Debug, Deserialize)]
pub struct PlayerSummariesEnvelope {
    pub response: PlayerSummariesResponse,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSummariesResponse {
    #[serde(default)]
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSummary {
    pub steamid: String,
    pub personaname: Option<String>,
    pub avatarfull: Option<String>,
    /// 1 = private, 3 = public.
    #[serde(rename = "communityvisibilitystate")]
    pub visibility: Option<i64>,
}

// --- GetOwnedGames ---

#[derive(Debug, Deserialize)]
pub struct OwnedGamesEnvelope {
    pub response: OwnedGamesResponse,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnedGamesResponse {
    #[serde(default)]
    pub game_count: u32,
    #[serde(default)]
    pub games: Vec<OwnedGame>,
}

#[derive(Debug, Deserialize)]
pub struct OwnedGame {
    pub appid: u64,
    pub name: Option<String>,
    /// Total minutes on record.
    #[serde(default)]
    pub playtime_forever: u64,
    /// Minutes in the last two weeks; nonzero signals recent activity.
    #[serde(default)]
    pub playtime_2weeks: u64,
    /// Unix timestamp of the last session, 0 if never played.
    #[serde(default)]
    pub rtime_last_played: i64,
    pub img_icon_url: Option<String>,
}

// --- GetPlayerAchievements ---

#[derive(Debug, Deserialize)]
pub struct PlayerAchievementsEnvelope {
    pub playerstats: PlayerAchievementsResponse,
}

#[derive(Debug, Deserialize)]
pub struct PlayerAchievementsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub achievements: Vec<PlayerAchievement>,
    /// Set when success is false, e.g. "Profile is not public".
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerAchievement {
    pub apiname: String,
    /// 1 if unlocked.
    pub achieved: i64,
    /// Unix timestamp, 0 if locked.
    #[serde(default)]
    pub unlocktime: i64,
}

// --- GetSchemaForGame ---

#[derive(Debug, Deserialize)]
pub struct SchemaEnvelope {
    #[serde(default)]
    pub game: SchemaGame,
}

#[derive(Debug, Default, Deserialize)]
pub struct SchemaGame {
    #[serde(rename = "availableGameStats", default)]
    pub stats: SchemaStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct SchemaStats {
    #[serde(default)]
    pub achievements: Vec<SchemaAchievement>,
}

#[derive(Debug, Deserialize)]
pub struct SchemaAchievement {
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

// --- ResolveVanityURL ---

#[derive(Debug, Deserialize)]
pub struct VanityEnvelope {
    pub response: VanityResponse,
}

#[derive(Debug, Deserialize)]
pub struct VanityResponse {
    pub success: i64,
    pub steamid: Option<String>,
}
