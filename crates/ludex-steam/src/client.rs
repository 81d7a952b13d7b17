// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Steam Web API.
//!
//! Steam splits achievement data across two endpoints: player achievements
//! only carry the earned flags, and the game schema carries the definitions
//! (and thus the total count). [`SteamClient::fetch_achievements`] merges
//! both, treating an empty player list against a non-empty schema as a
//! likely privacy misconfiguration rather than "no achievements".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use ludex_core::types::{
    Credential, CredentialMaterial, Platform, RemoteAchievement, RemoteGame, RemoteProfile,
};
use ludex_core::{LudexError, PlatformClient};
use ludex_ratelimit::SlidingWindowLimiter;

use crate::types::{
    OwnedGamesEnvelope, PlayerAchievementsEnvelope, PlayerSummariesEnvelope, SchemaEnvelope,
    VanityEnvelope,
};

const API_BASE_URL: &str = "https://api.steampowered.com";

/// A 64-bit Steam id is 17 decimal digits.
pub fn validate_steam_id(raw: &str) -> Result<(), LudexError> {
    if raw.len() == 17 && raw.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(LudexError::Validation(format!(
            "`{raw}` is not a 64-bit Steam id (expected 17 digits)"
        )))
    }
}

/// Steam Web API client.
pub struct SteamClient {
    http: reqwest::Client,
    api_key: String,
    limiter: Arc<SlidingWindowLimiter>,
    base_url: String,
}

impl SteamClient {
    pub fn new(api_key: String, limiter: Arc<SlidingWindowLimiter>) -> Result<Self, LudexError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LudexError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            http,
            api_key,
            limiter,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn steam_id<'a>(&self, credential: &'a Credential) -> Result<&'a str, LudexError> {
        match &credential.material {
            CredentialMaterial::SteamId { steam_id } => Ok(steam_id),
            _ => Err(LudexError::Auth {
                platform: Platform::Steam,
                message: "credential does not carry a linked Steam id".into(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LudexError> {
        self.limiter.reserve_or_fail(Platform::Steam)?;

        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| LudexError::Api {
                message: format!("Steam request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(%status, path, "steam response received");
        if !status.is_success() {
            return Err(map_error_status(status));
        }

        response.json::<T>().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse Steam response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn map_error_status(status: reqwest::StatusCode) -> LudexError {
    match status.as_u16() {
        401 | 403 => LudexError::Auth {
            platform: Platform::Steam,
            message: format!("Steam rejected the API key or profile access ({status})"),
        },
        404 => LudexError::NotFound("Steam entity not found".into()),
        429 => LudexError::RateLimited {
            platform: Platform::Steam,
            wait: Duration::from_secs(30),
        },
        _ => LudexError::api(format!("Steam API returned {status}")),
    }
}

fn unix_ts(secs: i64) -> Option<DateTime<Utc>> {
    (secs > 0).then(|| DateTime::from_timestamp(secs, 0)).flatten()
}

#[async_trait]
impl PlatformClient for SteamClient {
    fn platform(&self) -> Platform {
        Platform::Steam
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<RemoteProfile, LudexError> {
        let steam_id = self.steam_id(credential)?;
        let envelope: PlayerSummariesEnvelope = self
            .get_json(
                "/ISteamUser/GetPlayerSummaries/v2/",
                &[("steamids", steam_id)],
            )
            .await?;
        let player = envelope
            .response
            .players
            .into_iter()
            .next()
            .ok_or_else(|| LudexError::NotFound(format!("Steam profile {steam_id}")))?;
        if player.visibility == Some(1) {
            return Err(LudexError::Privacy {
                platform: Platform::Steam,
                message: "profile is private".into(),
                remediation: "set your Steam profile visibility to Public".into(),
            });
        }
        Ok(RemoteProfile {
            platform: Platform::Steam,
            external_id: player.steamid,
            display_name: player.personaname,
            avatar_url: player.avatarfull,
        })
    }

    async fn fetch_library(&self, credential: &Credential) -> Result<Vec<RemoteGame>, LudexError> {
        let steam_id = self.steam_id(credential)?;
        self.library_of(steam_id).await
    }

    async fn fetch_library_for(
        &self,
        _credential: &Credential,
        player_external_id: &str,
    ) -> Result<Vec<RemoteGame>, LudexError> {
        validate_steam_id(player_external_id)?;
        self.library_of(player_external_id).await
    }

    async fn fetch_achievements(
        &self,
        credential: &Credential,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        let steam_id = self.steam_id(credential)?;
        self.achievements_of(steam_id, external_game_id).await
    }

    async fn fetch_achievements_for(
        &self,
        _credential: &Credential,
        player_external_id: &str,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        validate_steam_id(player_external_id)?;
        self.achievements_of(player_external_id, external_game_id).await
    }

    async fn search_player(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<RemoteProfile, LudexError> {
        let steam_id = if validate_steam_id(query).is_ok() {
            query.to_string()
        } else {
            let envelope: VanityEnvelope = self
                .get_json("/ISteamUser/ResolveVanityURL/v1/", &[("vanityurl", query)])
                .await?;
            match envelope.response.steamid {
                Some(id) if envelope.response.success == 1 => id,
                _ => return Err(LudexError::NotFound(format!("Steam player `{query}`"))),
            }
        };
        let lookup = Credential {
            user_id: credential.user_id.clone(),
            platform: Platform::Steam,
            material: CredentialMaterial::SteamId { steam_id },
        };
        self.fetch_profile(&lookup).await
    }
}

impl SteamClient {
    async fn library_of(&self, steam_id: &str) -> Result<Vec<RemoteGame>, LudexError> {
        let envelope: OwnedGamesEnvelope = self
            .get_json(
                "/IPlayerService/GetOwnedGames/v1/",
                &[
                    ("steamid", steam_id),
                    ("include_appinfo", "1"),
                    ("include_played_free_games", "1"),
                ],
            )
            .await?;

        let games = envelope
            .response
            .games
            .into_iter()
            .map(|g| {
                let appid = g.appid.to_string();
                let mut game = RemoteGame::new(
                    Platform::Steam,
                    appid.clone(),
                    g.name.unwrap_or_else(|| format!("App {appid}")),
                );
                game.cover_url = Some(format!(
                    "https://steamcdn-a.akamaihd.net/steam/apps/{appid}/header.jpg"
                ));
                game.playtime_minutes = Some(g.playtime_forever);
                game.last_played_at = unix_ts(g.rtime_last_played);
                game.recently_played = g.playtime_2weeks > 0;
                game
            })
            .collect();
        Ok(games)
    }

    async fn achievements_of(
        &self,
        steam_id: &str,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        let player: PlayerAchievementsEnvelope = self
            .get_json(
                "/ISteamUserStats/GetPlayerAchievements/v1/",
                &[("steamid", steam_id), ("appid", external_game_id)],
            )
            .await?;
        let stats = player.playerstats;
        if !stats.success {
            let error = stats.error.unwrap_or_default();
            // "Requested app has no stats" is a legitimate empty set.
            if error.to_lowercase().contains("no stats") {
                return Ok(Vec::new());
            }
            return Err(LudexError::Privacy {
                platform: Platform::Steam,
                message: format!("achievements unavailable: {error}"),
                remediation: "set Game Details to Public in Steam privacy settings".into(),
            });
        }

        let schema: SchemaEnvelope = self
            .get_json(
                "/ISteamUserStats/GetSchemaForGame/v2/",
                &[("appid", external_game_id)],
            )
            .await?;
        let definitions = schema.game.stats.achievements;

        if definitions.is_empty() {
            return Ok(Vec::new());
        }
        if stats.achievements.is_empty() {
            // The schema says this game has achievements; an empty player
            // list here is almost always a privacy misconfiguration.
            return Err(LudexError::Privacy {
                platform: Platform::Steam,
                message: "player achievements empty although the game defines achievements"
                    .into(),
                remediation: "set Game Details to Public in Steam privacy settings".into(),
            });
        }

        let earned: std::collections::HashMap<&str, i64> = stats
            .achievements
            .iter()
            .filter(|a| a.achieved == 1)
            .map(|a| (a.apiname.as_str(), a.unlocktime))
            .collect();

        let merged = definitions
            .into_iter()
            .map(|def| {
                let unlocktime = earned.get(def.name.as_str()).copied();
                RemoteAchievement {
                    platform_achievement_id: def.name.clone(),
                    name: def.display_name.unwrap_or(def.name),
                    description: def.description,
                    icon_url: def.icon,
                    unlocked: unlocktime.is_some(),
                    unlocked_at: unlocktime.and_then(unix_ts),
                    rarity_percent: None,
                    points: None,
                }
            })
            .collect();
        Ok(merged)
    }
}
