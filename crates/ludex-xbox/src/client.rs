// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Xbox Live via a third-party gateway.
//!
//! Xbox Live's first-party auth chain (XSTS token dance) is out of scope;
//! access goes through an OpenXBL-compatible gateway authenticated with a
//! static API key in the `x-authorization` header. Title history mixes PC
//! and console entries, so each game is flagged `pc_only` and the filtering
//! policy is left to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use ludex_core::types::{
    Credential, CredentialMaterial, Platform, RemoteAchievement, RemoteGame, RemoteProfile,
};
use ludex_core::{LudexError, PlatformClient};
use ludex_ratelimit::SlidingWindowLimiter;

use crate::types::{AccountEnvelope, AchievementsEnvelope, SearchEnvelope, TitleHistoryEnvelope};

const RECENT_ACTIVITY_WINDOW_DAYS: i64 = 14;

/// Device families that indicate a Windows-only entry in title history.
const PC_DEVICES: &[&str] = &["PC", "Win32"];

/// Xbox Live gateway client.
pub struct XboxClient {
    http: reqwest::Client,
    limiter: Arc<SlidingWindowLimiter>,
    base_url: String,
}

impl XboxClient {
    /// `base_url` comes from configuration (default `https://xbl.io/api/v2`),
    /// which also makes the client testable against a local mock.
    pub fn new(base_url: String, limiter: Arc<SlidingWindowLimiter>) -> Result<Self, LudexError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LudexError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            http,
            limiter,
            base_url,
        })
    }

    fn api_key<'a>(&self, credential: &'a Credential) -> Result<&'a str, LudexError> {
        match &credential.material {
            CredentialMaterial::ApiKey { api_key } => Ok(api_key),
            _ => Err(LudexError::Auth {
                platform: Platform::Xbox,
                message: "credential does not carry an Xbox gateway API key".into(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
    ) -> Result<T, LudexError> {
        self.limiter.reserve_or_fail(Platform::Xbox)?;
        let api_key = self.api_key(credential)?;
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("x-authorization", api_key)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| LudexError::Api {
                message: format!("Xbox request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(%status, path, "xbox response received");
        if !status.is_success() {
            return Err(map_error_status(status));
        }
        response.json::<T>().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse Xbox response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn map_error_status(status: reqwest::StatusCode) -> LudexError {
    match status.as_u16() {
        401 | 403 => LudexError::Auth {
            platform: Platform::Xbox,
            message: format!("Xbox gateway rejected the API key ({status})"),
        },
        404 => LudexError::NotFound("Xbox entity not found".into()),
        429 => LudexError::RateLimited {
            platform: Platform::Xbox,
            wait: Duration::from_secs(60),
        },
        _ => LudexError::api(format!("Xbox gateway returned {status}")),
    }
}

fn is_pc_only(devices: &[String]) -> bool {
    !devices.is_empty() && devices.iter().all(|d| PC_DEVICES.contains(&d.as_str()))
}

fn map_title_history(history: TitleHistoryEnvelope) -> Vec<RemoteGame> {
    let cutoff = Utc::now() - TimeDelta::days(RECENT_ACTIVITY_WINDOW_DAYS);
    history
        .titles
        .into_iter()
        .map(|t| {
            let mut game = RemoteGame::new(Platform::Xbox, t.title_id.clone(), t.name.clone());
            game.cover_url = t.display_image.clone();
            game.pc_only = is_pc_only(&t.devices);
            if let Some(summary) = &t.achievement {
                game.achievements_earned = Some(summary.current_achievements);
                game.achievements_total = Some(summary.total_achievements);
            }
            game.last_played_at = t.title_history.and_then(|h| h.last_time_played);
            game.recently_played = game.last_played_at.is_some_and(|ts| ts > cutoff);
            game
        })
        .collect()
}

#[async_trait]
impl PlatformClient for XboxClient {
    fn platform(&self) -> Platform {
        Platform::Xbox
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<RemoteProfile, LudexError> {
        let account: AccountEnvelope = self.get_json(credential, "/account").await?;
        let user = account
            .profile_users
            .into_iter()
            .next()
            .ok_or_else(|| LudexError::NotFound("Xbox account profile".into()))?;
        Ok(RemoteProfile {
            platform: Platform::Xbox,
            external_id: user.id.clone(),
            display_name: user.setting("Gamertag").map(str::to_string),
            avatar_url: user.setting("GameDisplayPicRaw").map(str::to_string),
        })
    }

    async fn fetch_library(&self, credential: &Credential) -> Result<Vec<RemoteGame>, LudexError> {
        let history: TitleHistoryEnvelope =
            self.get_json(credential, "/player/titleHistory").await?;
        Ok(map_title_history(history))
    }

    async fn fetch_library_for(
        &self,
        credential: &Credential,
        player_external_id: &str,
    ) -> Result<Vec<RemoteGame>, LudexError> {
        let history: TitleHistoryEnvelope = self
            .get_json(credential, &format!("/player/titleHistory/{player_external_id}"))
            .await?;
        Ok(map_title_history(history))
    }

    async fn fetch_achievements(
        &self,
        credential: &Credential,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        let envelope: AchievementsEnvelope = self
            .get_json(credential, &format!("/achievements/title/{external_game_id}"))
            .await?;
        Ok(map_achievements(envelope))
    }

    async fn fetch_achievements_for(
        &self,
        credential: &Credential,
        player_external_id: &str,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        let envelope: AchievementsEnvelope = self
            .get_json(
                credential,
                &format!("/achievements/player/{player_external_id}/{external_game_id}"),
            )
            .await?;
        Ok(map_achievements(envelope))
    }

    async fn search_player(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<RemoteProfile, LudexError> {
        let envelope: SearchEnvelope = self
            .get_json(credential, &format!("/search/{query}"))
            .await?;
        envelope
            .people
            .into_iter()
            .find(|p| p.gamertag.eq_ignore_ascii_case(query))
            .map(|p| RemoteProfile {
                platform: Platform::Xbox,
                external_id: p.xuid,
                display_name: Some(p.gamertag),
                avatar_url: p.display_pic_raw,
            })
            .ok_or_else(|| LudexError::NotFound(format!("Xbox gamertag `{query}`")))
    }
}

fn map_achievements(envelope: AchievementsEnvelope) -> Vec<RemoteAchievement> {
    envelope
        .achievements
        .into_iter()
        .map(|a| RemoteAchievement {
            unlocked: a.is_unlocked(),
            unlocked_at: a
                .progression
                .as_ref()
                .and_then(|p| p.time_unlocked)
                // The gateway reports epoch zero for locked entries.
                .filter(|ts| ts.timestamp() > 0 && a.is_unlocked()),
            rarity_percent: a.rarity.as_ref().and_then(|r| r.current_percentage),
            points: a.gamerscore(),
            icon_url: a.media_assets.iter().find_map(|m| m.url.clone()),
            platform_achievement_id: a.id,
            name: a.name,
            description: a.description,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> XboxClient {
        XboxClient::new(base_url.to_string(), Arc::new(SlidingWindowLimiter::new())).unwrap()
    }

    fn test_credential() -> Credential {
        Credential {
            user_id: "local".into(),
            platform: Platform::Xbox,
            material: CredentialMaterial::ApiKey {
                api_key: "xbl-key".into(),
            },
        }
    }

    #[test]
    fn pc_only_detection() {
        assert!(is_pc_only(&["PC".into()]));
        assert!(is_pc_only(&["PC".into(), "Win32".into()]));
        assert!(!is_pc_only(&["PC".into(), "XboxSeriesX".into()]));
        assert!(!is_pc_only(&[]));
    }

    #[tokio::test]
    async fn fetch_library_flags_pc_only_titles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player/titleHistory"))
            .and(header("x-authorization", "xbl-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "titles": [
                    {"titleId": "1144039928", "name": "Halo Infinite",
                     "devices": ["PC", "XboxSeriesX"],
                     "achievement": {"currentAchievements": 11, "totalAchievements": 12,
                                     "currentGamerscore": 950, "totalGamerscore": 1000},
                     "titleHistory": {"lastTimePlayed": "2026-08-25T20:00:00Z"}},
                    {"titleId": "414700", "name": "Outlast",
                     "devices": ["PC"],
                     "achievement": {"currentAchievements": 0, "totalAchievements": 13}}
                ]
            })))
            .mount(&server)
            .await;

        let games = test_client(&server.uri())
            .fetch_library(&test_credential())
            .await
            .unwrap();
        assert_eq!(games.len(), 2);
        assert!(!games[0].pc_only);
        assert_eq!(games[0].achievements_earned, Some(11));
        assert_eq!(games[0].achievements_total, Some(12));
        assert!(games[0].recently_played);
        assert!(games[1].pc_only);
    }

    #[tokio::test]
    async fn fetch_achievements_maps_gamerscore_and_rarity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/achievements/title/1144039928"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "achievements": [
                    {"id": "1", "name": "Medic!", "description": "Revive a teammate",
                     "progressState": "Achieved",
                     "progression": {"timeUnlocked": "2026-07-01T12:00:00Z"},
                     "rewards": [{"value": "10", "type": "Gamerscore"}],
                     "rarity": {"currentPercentage": 64.2},
                     "mediaAssets": [{"url": "https://img.example/1.png", "type": "Icon"}]},
                    {"id": "2", "name": "Legend",
                     "progressState": "NotStarted",
                     "progression": {"timeUnlocked": "0001-01-01T00:00:00Z"},
                     "rewards": [{"value": "100", "type": "Gamerscore"}]}
                ]
            })))
            .mount(&server)
            .await;

        let achievements = test_client(&server.uri())
            .fetch_achievements(&test_credential(), "1144039928")
            .await
            .unwrap();
        assert_eq!(achievements.len(), 2);
        assert!(achievements[0].unlocked);
        assert_eq!(achievements[0].points, Some(10));
        assert_eq!(achievements[0].rarity_percent, Some(64.2));
        assert!(achievements[0].unlocked_at.is_some());
        assert!(!achievements[1].unlocked);
        assert!(achievements[1].unlocked_at.is_none());
    }

    #[tokio::test]
    async fn search_matches_gamertag_case_insensitively() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/MajorNelson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "people": [
                    {"xuid": "2533274810000000", "gamertag": "majornelson"}
                ]
            })))
            .mount(&server)
            .await;

        let profile = test_client(&server.uri())
            .search_player(&test_credential(), "MajorNelson")
            .await
            .unwrap();
        assert_eq!(profile.external_id, "2533274810000000");
    }

    #[tokio::test]
    async fn rejected_key_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .fetch_library(&test_credential())
            .await
            .unwrap_err();
        assert!(matches!(err, LudexError::Auth { .. }), "got: {err}");
    }
}
