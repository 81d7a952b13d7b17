// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the PlayStation Network mobile API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- OAuth token exchange ---

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    /// Seconds until the refresh token expires.
    #[serde(default)]
    pub refresh_token_expires_in: Option<i64>,
}

// --- Trophy titles ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrophyTitlesEnvelope {
    #[serde(default)]
    pub trophy_titles: Vec<TrophyTitle>,
    #[serde(default)]
    pub total_item_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrophyTitle {
    pub np_communication_id: String,
    pub trophy_title_name: String,
    pub trophy_title_icon_url: Option<String>,
    /// `trophy` (PS3/PS4 legacy service) or `trophy2` (PS5).
    pub np_service_name: String,
    pub trophy_title_platform: Option<String>,
    pub defined_trophies: TrophyCounts,
    pub earned_trophies: TrophyCounts,
    pub last_updated_date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrophyCounts {
    #[serde(default)]
    pub bronze: u32,
    #[serde(default)]
    pub silver: u32,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub platinum: u32,
}

impl TrophyCounts {
    pub fn total(&self) -> u32 {
        self.bronze + self.silver + self.gold + self.platinum
    }
}

// --- Trophy details ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrophiesEnvelope {
    #[serde(default)]
    pub trophies: Vec<Trophy>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trophy {
    pub trophy_id: i64,
    pub trophy_name: Option<String>,
    pub trophy_detail: Option<String>,
    pub trophy_icon_url: Option<String>,
    /// `bronze` / `silver` / `gold` / `platinum`.
    pub trophy_type: Option<String>,
    #[serde(default)]
    pub earned: bool,
    pub earned_date_time: Option<DateTime<Utc>>,
    /// Percentage of players who earned it, serialized as a string.
    pub trophy_earned_rate: Option<String>,
}

// --- Played titles (game list with durations) ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameListEnvelope {
    #[serde(default)]
    pub titles: Vec<PlayedTitle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedTitle {
    pub title_id: String,
    pub name: String,
    /// ISO 8601 duration, e.g. `PT52H13M8S`.
    pub play_duration: Option<String>,
    pub last_played_date_time: Option<DateTime<Utc>>,
}

// --- Profile / search ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub online_id: String,
    pub account_id: Option<String>,
    #[serde(default)]
    pub avatars: Vec<Avatar>,
}

#[derive(Debug, Deserialize)]
pub struct Avatar {
    pub size: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnvelope {
    #[serde(default)]
    pub domain_responses: Vec<SearchDomain>,
}

#[derive(Debug, Deserialize)]
pub struct SearchDomain {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub social_metadata: Option<SocialMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMetadata {
    pub account_id: String,
    pub online_id: String,
    pub avatar_url: Option<String>,
}
