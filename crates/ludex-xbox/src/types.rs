// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Xbox Live gateway API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- Account / profile ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEnvelope {
    #[serde(default)]
    pub profile_users: Vec<ProfileUser>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUser {
    pub id: String,
    #[serde(default)]
    pub settings: Vec<ProfileSetting>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileSetting {
    pub id: String,
    pub value: String,
}

impl ProfileUser {
    pub fn setting(&self, id: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.value.as_str())
    }
}

// --- Title history ---

#[derive(Debug, Deserialize)]
pub struct TitleHistoryEnvelope {
    #[serde(default)]
    pub titles: Vec<Title>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub title_id: String,
    pub name: String,
    pub display_image: Option<String>,
    /// Device families the title was played on, e.g. `PC`, `XboxSeriesX`.
    #[serde(default)]
    pub devices: Vec<String>,
    pub achievement: Option<TitleAchievementSummary>,
    pub title_history: Option<TitlePlayHistory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleAchievementSummary {
    #[serde(default)]
    pub current_achievements: u32,
    #[serde(default)]
    pub total_achievements: u32,
    #[serde(default)]
    pub current_gamerscore: u32,
    #[serde(default)]
    pub total_gamerscore: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlePlayHistory {
    pub last_time_played: Option<DateTime<Utc>>,
}

// --- Achievements ---

#[derive(Debug, Deserialize)]
pub struct AchievementsEnvelope {
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// `Achieved` or `NotStarted` / `InProgress`.
    pub progress_state: Option<String>,
    pub progression: Option<Progression>,
    #[serde(default)]
    pub rewards: Vec<Reward>,
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub media_assets: Vec<MediaAsset>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.progress_state.as_deref() == Some("Achieved")
    }

    pub fn gamerscore(&self) -> Option<i64> {
        self.rewards
            .iter()
            .find(|r| r.kind.as_deref() == Some("Gamerscore"))
            .and_then(|r| r.value.as_deref())
            .and_then(|v| v.parse().ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub time_unlocked: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct Reward {
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rarity {
    pub current_percentage: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct MediaAsset {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// --- Gamertag search ---

#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    pub people: Vec<Person>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub xuid: String,
    pub gamertag: String,
    pub display_pic_raw: Option<String>,
}
