// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the PlayStation Network mobile API.
//!
//! Authentication starts from a one-time NPSSO cookie, exchanged for an
//! OAuth access/refresh pair. Trophy data is served by two service variants
//! (`trophy` for PS3/PS4-era titles, `trophy2` for PS5); per-title calls try
//! `trophy2` first and fall back to the legacy service on a miss.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use ludex_core::types::{
    Credential, CredentialMaterial, Platform, RemoteAchievement, RemoteGame, RemoteProfile,
    TokenPair,
};
use ludex_core::{LudexError, PlatformClient};
use ludex_ratelimit::SlidingWindowLimiter;

use crate::types::{
    GameListEnvelope, ProfileResponse, SearchEnvelope, TokenResponse, TrophiesEnvelope,
    TrophyTitlesEnvelope,
};

const AUTH_BASE_URL: &str = "https://ca.account.sony.com";
const API_BASE_URL: &str = "https://m.np.playstation.com";

/// Client id/secret of the official PlayStation mobile app, pre-encoded for
/// HTTP basic auth. These are public constants, not user secrets.
const CLIENT_ID: &str = "09515159-7237-4370-9b40-3806e67c0891";
const BASIC_AUTH: &str = "MDk1MTUxNTktNzIzNy00MzcwLTliNDAtMzgwNmU2N2MwODkxOnVjUGprYTV0bnRCMktxc1A=";
const REDIRECT_URI: &str = "com.scee.psxandroid.scecompcall://redirect";

const RECENT_ACTIVITY_WINDOW_DAYS: i64 = 14;

/// PlayStation Network client.
pub struct PsnClient {
    http: reqwest::Client,
    limiter: Arc<SlidingWindowLimiter>,
    auth_base_url: String,
    api_base_url: String,
}

impl PsnClient {
    pub fn new(limiter: Arc<SlidingWindowLimiter>) -> Result<Self, LudexError> {
        // Redirects stay manual: the NPSSO authorize step delivers its code
        // in a 302 Location header that must be read, not followed.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| LudexError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            http,
            limiter,
            auth_base_url: AUTH_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides both base URLs (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_urls(mut self, auth: String, api: String) -> Self {
        self.auth_base_url = auth;
        self.api_base_url = api;
        self
    }

    /// Exchanges a one-time NPSSO cookie for an OAuth token pair. Used at
    /// link time; the resulting pair is what gets persisted.
    pub async fn exchange_npsso(&self, npsso: &str) -> Result<TokenPair, LudexError> {
        self.limiter.reserve_or_fail(Platform::Psn)?;
        let authorize_url = format!(
            "{}/api/authz/v3/oauth/authorize?access_type=offline&client_id={CLIENT_ID}\
             &response_type=code&scope=psn%3Amobile.v2.core%20psn%3Aclientapp\
             &redirect_uri={REDIRECT_URI}",
            self.auth_base_url
        );
        let response = self
            .http
            .get(&authorize_url)
            .header("Cookie", format!("npsso={npsso}"))
            .send()
            .await
            .map_err(transport_error)?;

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let code = location
            .split("code=")
            .nth(1)
            .map(|rest| rest.split('&').next().unwrap_or(rest))
            .ok_or_else(|| LudexError::Auth {
                platform: Platform::Psn,
                message: "NPSSO rejected; obtain a fresh token from the PlayStation site".into(),
            })?;

        self.request_tokens(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("token_format", "jwt"),
        ])
        .await
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenPair, LudexError> {
        let url = format!("{}/api/authz/v3/oauth/token", self.auth_base_url);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Basic {BASIC_AUTH}"))
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LudexError::Auth {
                platform: Platform::Psn,
                message: format!("token exchange failed ({status})"),
            });
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse PSN token response: {e}"),
            source: Some(Box::new(e)),
        })?;
        let now = Utc::now();
        Ok(TokenPair {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: now + TimeDelta::seconds(tokens.expires_in),
            refresh_expires_at: tokens
                .refresh_token_expires_in
                .map(|secs| now + TimeDelta::seconds(secs)),
            account_id: None,
        })
    }

    fn tokens<'a>(&self, credential: &'a Credential) -> Result<&'a TokenPair, LudexError> {
        match &credential.material {
            CredentialMaterial::OAuthTokens(pair) => Ok(pair),
            _ => Err(LudexError::Auth {
                platform: Platform::Psn,
                message: "credential does not carry PSN tokens".into(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
    ) -> Result<T, LudexError> {
        self.limiter.reserve_or_fail(Platform::Psn)?;
        let tokens = self.tokens(credential)?;
        let url = format!("{}{path}", self.api_base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(%status, path, "psn response received");
        if !status.is_success() {
            return Err(map_error_status(status));
        }
        response.json::<T>().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse PSN response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    async fn fetch_trophies(
        &self,
        credential: &Credential,
        user: &str,
        np_communication_id: &str,
        service: &str,
    ) -> Result<(TrophiesEnvelope, TrophiesEnvelope), LudexError> {
        let definitions: TrophiesEnvelope = self
            .get_json(
                credential,
                &format!(
                    "/api/trophy/v1/npCommunicationIds/{np_communication_id}\
                     /trophyGroups/all/trophies?npServiceName={service}"
                ),
            )
            .await?;
        let earned: TrophiesEnvelope = self
            .get_json(
                credential,
                &format!(
                    "/api/trophy/v1/users/{user}/npCommunicationIds/{np_communication_id}\
                     /trophyGroups/all/trophies?npServiceName={service}"
                ),
            )
            .await?;
        Ok((definitions, earned))
    }

    /// Both trophy service variants, newest first. `user` is `me` or a PSN
    /// account id.
    async fn trophies_of(
        &self,
        credential: &Credential,
        user: &str,
        np_communication_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        // PS5 titles live under trophy2; older titles 404 there and need
        // the legacy service.
        let (definitions, earned) = match self
            .fetch_trophies(credential, user, np_communication_id, "trophy2")
            .await
        {
            Ok(pair) => pair,
            Err(LudexError::NotFound(_)) => {
                self.fetch_trophies(credential, user, np_communication_id, "trophy")
                    .await?
            }
            Err(e) => return Err(e),
        };

        let earned_by_id: std::collections::HashMap<i64, &crate::types::Trophy> =
            earned.trophies.iter().map(|t| (t.trophy_id, t)).collect();

        let merged = definitions
            .trophies
            .into_iter()
            .map(|def| {
                let state = earned_by_id.get(&def.trophy_id);
                RemoteAchievement {
                    platform_achievement_id: def.trophy_id.to_string(),
                    name: def.trophy_name.unwrap_or_else(|| format!("Trophy {}", def.trophy_id)),
                    description: def.trophy_detail,
                    icon_url: def.trophy_icon_url,
                    unlocked: state.is_some_and(|s| s.earned),
                    unlocked_at: state.and_then(|s| s.earned_date_time),
                    rarity_percent: state
                        .and_then(|s| s.trophy_earned_rate.as_deref())
                        .and_then(|r| r.parse::<f64>().ok()),
                    points: trophy_points(def.trophy_type.as_deref()),
                }
            })
            .collect();
        Ok(merged)
    }
}

fn transport_error(err: reqwest::Error) -> LudexError {
    LudexError::Api {
        message: format!("PSN request failed: {err}"),
        source: Some(Box::new(err)),
    }
}

fn map_error_status(status: reqwest::StatusCode) -> LudexError {
    match status.as_u16() {
        401 => LudexError::Auth {
            platform: Platform::Psn,
            message: "PSN access token rejected".into(),
        },
        403 => LudexError::Privacy {
            platform: Platform::Psn,
            message: "PSN denied access to this data".into(),
            remediation: "set trophy and game visibility to Anyone in PSN privacy settings"
                .into(),
        },
        404 => LudexError::NotFound("PSN entity not found".into()),
        429 => LudexError::RateLimited {
            platform: Platform::Psn,
            wait: Duration::from_secs(60),
        },
        _ => LudexError::api(format!("PSN API returned {status}")),
    }
}

/// Parses an ISO 8601 duration such as `PT52H13M8S` into whole minutes.
pub fn parse_play_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix("PT")?;
    let mut minutes = 0u64;
    let mut digits = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();
        match c {
            'H' => minutes += value * 60,
            'M' => minutes += value,
            'S' => {} // sub-minute remainder is dropped
            _ => return None,
        }
    }
    Some(minutes)
}

fn trophy_points(tier: Option<&str>) -> Option<i64> {
    match tier? {
        "bronze" => Some(15),
        "silver" => Some(30),
        "gold" => Some(90),
        "platinum" => Some(300),
        _ => None,
    }
}

fn playtime_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl PlatformClient for PsnClient {
    fn platform(&self) -> Platform {
        Platform::Psn
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<RemoteProfile, LudexError> {
        let profile: ProfileResponse = self
            .get_json(credential, "/api/userProfile/v1/internal/users/me/profiles")
            .await?;
        let avatar_url = profile.avatars.into_iter().find_map(|a| {
            (a.size.as_deref() == Some("xl") || a.size.as_deref() == Some("l"))
                .then_some(a.url)
                .flatten()
        });
        Ok(RemoteProfile {
            platform: Platform::Psn,
            external_id: profile.account_id.unwrap_or_else(|| "me".into()),
            display_name: Some(profile.online_id),
            avatar_url,
        })
    }

    async fn fetch_library(&self, credential: &Credential) -> Result<Vec<RemoteGame>, LudexError> {
        let titles: TrophyTitlesEnvelope = self
            .get_json(credential, "/api/trophy/v1/users/me/trophyTitles?limit=800")
            .await?;

        // Playtime lives on a separate endpoint keyed by title id, not
        // np communication id, so the merge goes through normalized names.
        let played: GameListEnvelope = self
            .get_json(
                credential,
                "/api/gamelist/v2/users/me/titles?categories=ps4_game,ps5_game&limit=200",
            )
            .await
            .unwrap_or(GameListEnvelope { titles: Vec::new() });
        let durations: std::collections::HashMap<String, (Option<u64>, Option<chrono::DateTime<Utc>>)> =
            played
                .titles
                .iter()
                .map(|t| {
                    (
                        playtime_key(&t.name),
                        (
                            t.play_duration.as_deref().and_then(parse_play_duration),
                            t.last_played_date_time,
                        ),
                    )
                })
                .collect();

        let cutoff = Utc::now() - TimeDelta::days(RECENT_ACTIVITY_WINDOW_DAYS);
        let games = titles
            .trophy_titles
            .into_iter()
            .map(|t| {
                let mut game = RemoteGame::new(
                    Platform::Psn,
                    t.np_communication_id.clone(),
                    t.trophy_title_name.clone(),
                );
                if let Some(platform) = t.trophy_title_platform.clone() {
                    game.platform_label = platform;
                }
                game.cover_url = t.trophy_title_icon_url.clone();
                game.achievements_earned = Some(t.earned_trophies.total());
                game.achievements_total = Some(t.defined_trophies.total());
                let mut last_seen = t.last_updated_date_time;
                if let Some((duration, last_played)) = durations.get(&playtime_key(&t.trophy_title_name)) {
                    game.playtime_minutes = *duration;
                    if last_played.is_some() {
                        last_seen = *last_played;
                    }
                }
                game.last_played_at = last_seen;
                game.recently_played = last_seen.is_some_and(|ts| ts > cutoff);
                game
            })
            .collect();
        Ok(games)
    }

    async fn fetch_achievements(
        &self,
        credential: &Credential,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        self.trophies_of(credential, "me", external_game_id).await
    }

    async fn fetch_achievements_for(
        &self,
        credential: &Credential,
        player_external_id: &str,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        self.trophies_of(credential, player_external_id, external_game_id)
            .await
    }

    async fn fetch_library_for(
        &self,
        credential: &Credential,
        player_external_id: &str,
    ) -> Result<Vec<RemoteGame>, LudexError> {
        // Another player's playtime is not visible; their trophy list is,
        // subject to their privacy settings.
        let titles: TrophyTitlesEnvelope = self
            .get_json(
                credential,
                &format!("/api/trophy/v1/users/{player_external_id}/trophyTitles?limit=800"),
            )
            .await?;
        let games = titles
            .trophy_titles
            .into_iter()
            .map(|t| {
                let mut game = RemoteGame::new(
                    Platform::Psn,
                    t.np_communication_id.clone(),
                    t.trophy_title_name.clone(),
                );
                if let Some(platform) = t.trophy_title_platform.clone() {
                    game.platform_label = platform;
                }
                game.cover_url = t.trophy_title_icon_url.clone();
                game.achievements_earned = Some(t.earned_trophies.total());
                game.achievements_total = Some(t.defined_trophies.total());
                game.last_played_at = t.last_updated_date_time;
                game
            })
            .collect();
        Ok(games)
    }

    async fn search_player(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<RemoteProfile, LudexError> {
        self.limiter.reserve_or_fail(Platform::Psn)?;
        let tokens = self.tokens(credential)?;
        let url = format!("{}/api/search/v1/universalSearch", self.api_base_url);
        let body = serde_json::json!({
            "searchTerm": query,
            "domainRequests": [{"domain": "SocialAllAccounts"}]
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(&tokens.access_token)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(map_error_status(status));
        }
        let envelope: SearchEnvelope = response.json().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse PSN search response: {e}"),
            source: Some(Box::new(e)),
        })?;

        envelope
            .domain_responses
            .into_iter()
            .flat_map(|d| d.results)
            .find_map(|r| r.social_metadata)
            .map(|m| RemoteProfile {
                platform: Platform::Psn,
                external_id: m.account_id,
                display_name: Some(m.online_id),
                avatar_url: m.avatar_url,
            })
            .ok_or_else(|| LudexError::NotFound(format!("PSN player `{query}`")))
    }

    async fn refresh_credential(&self, credential: &Credential) -> Result<Credential, LudexError> {
        let current = self.tokens(credential)?;
        self.limiter.reserve_or_fail(Platform::Psn)?;
        let mut refreshed = self
            .request_tokens(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
                ("scope", "psn:mobile.v2.core psn:clientapp"),
                ("token_format", "jwt"),
            ])
            .await?;
        refreshed.account_id = current.account_id.clone();
        Ok(Credential {
            user_id: credential.user_id.clone(),
            platform: Platform::Psn,
            material: CredentialMaterial::OAuthTokens(refreshed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(auth: &str, api: &str) -> PsnClient {
        PsnClient::new(Arc::new(SlidingWindowLimiter::new()))
            .unwrap()
            .with_base_urls(auth.to_string(), api.to_string())
    }

    fn test_credential() -> Credential {
        Credential {
            user_id: "local".into(),
            platform: Platform::Psn,
            material: CredentialMaterial::OAuthTokens(TokenPair {
                access_token: "access".into(),
                refresh_token: "refresh".into(),
                expires_at: Utc::now() + TimeDelta::hours(1),
                refresh_expires_at: None,
                account_id: Some("1234567890".into()),
            }),
        }
    }

    #[test]
    fn play_duration_parsing() {
        assert_eq!(parse_play_duration("PT52H13M8S"), Some(52 * 60 + 13));
        assert_eq!(parse_play_duration("PT45M"), Some(45));
        assert_eq!(parse_play_duration("PT30S"), Some(0));
        assert_eq!(parse_play_duration("52H"), None);
    }

    #[test]
    fn trophy_tiers_map_to_points() {
        assert_eq!(trophy_points(Some("bronze")), Some(15));
        assert_eq!(trophy_points(Some("platinum")), Some(300));
        assert_eq!(trophy_points(None), None);
    }

    #[tokio::test]
    async fn fetch_library_merges_playtime_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/trophy/v1/users/me/trophyTitles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "trophyTitles": [{
                    "npCommunicationId": "NPWR20188_00",
                    "trophyTitleName": "Ghost of Tsushima™",
                    "npServiceName": "trophy",
                    "trophyTitlePlatform": "PS4",
                    "definedTrophies": {"bronze": 40, "silver": 9, "gold": 2, "platinum": 1},
                    "earnedTrophies": {"bronze": 12, "silver": 1, "gold": 0, "platinum": 0}
                }],
                "totalItemCount": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/gamelist/v2/users/me/titles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "titles": [{
                    "titleId": "CUSA13323_00",
                    "name": "Ghost of Tsushima",
                    "playDuration": "PT52H13M8S",
                    "lastPlayedDateTime": "2026-08-20T18:00:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let games = test_client(&server.uri(), &server.uri())
            .fetch_library(&test_credential())
            .await
            .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].stable_id, "NPWR20188_00");
        assert_eq!(games[0].playtime_minutes, Some(52 * 60 + 13));
        assert_eq!(games[0].achievements_earned, Some(13));
        assert_eq!(games[0].achievements_total, Some(52));
        assert!(games[0].recently_played);
    }

    #[tokio::test]
    async fn fetch_achievements_falls_back_to_legacy_service() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/api/trophy/v1/npCommunicationIds/NPWR20188_00/trophyGroups/all/trophies",
            ))
            .and(query_param("npServiceName", "trophy2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(
                "/api/trophy/v1/npCommunicationIds/NPWR20188_00/trophyGroups/all/trophies",
            ))
            .and(query_param("npServiceName", "trophy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "trophies": [
                    {"trophyId": 0, "trophyName": "Living Legend", "trophyType": "platinum"},
                    {"trophyId": 1, "trophyName": "A Warrior Once", "trophyType": "bronze"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(
                "/api/trophy/v1/users/me/npCommunicationIds/NPWR20188_00/trophyGroups/all/trophies",
            ))
            .and(query_param("npServiceName", "trophy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "trophies": [
                    {"trophyId": 0, "earned": false},
                    {"trophyId": 1, "earned": true,
                     "earnedDateTime": "2026-08-01T10:00:00Z", "trophyEarnedRate": "88.3"}
                ]
            })))
            .mount(&server)
            .await;

        let trophies = test_client(&server.uri(), &server.uri())
            .fetch_achievements(&test_credential(), "NPWR20188_00")
            .await
            .unwrap();
        assert_eq!(trophies.len(), 2);
        let warrior = trophies.iter().find(|t| t.platform_achievement_id == "1").unwrap();
        assert!(warrior.unlocked);
        assert_eq!(warrior.rarity_percent, Some(88.3));
        assert_eq!(warrior.points, Some(15));
        assert!(!trophies[0].unlocked);
    }

    #[tokio::test]
    async fn refresh_rotates_the_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authz/v3/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-2",
                "refresh_token": "refresh-2",
                "expires_in": 3600,
                "refresh_token_expires_in": 5356800
            })))
            .mount(&server)
            .await;

        let refreshed = test_client(&server.uri(), &server.uri())
            .refresh_credential(&test_credential())
            .await
            .unwrap();
        match refreshed.material {
            CredentialMaterial::OAuthTokens(pair) => {
                assert_eq!(pair.access_token, "access-2");
                assert_eq!(pair.refresh_token, "refresh-2");
                assert!(pair.expires_at > Utc::now());
                assert!(pair.refresh_expires_at.is_some());
                assert_eq!(pair.account_id.as_deref(), Some("1234567890"));
            }
            other => panic!("unexpected material: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_failure_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authz/v3/oauth/token"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let err = test_client(&server.uri(), &server.uri())
            .refresh_credential(&test_credential())
            .await
            .unwrap_err();
        assert!(matches!(err, LudexError::Auth { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn forbidden_maps_to_privacy_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = test_client(&server.uri(), &server.uri())
            .fetch_library(&test_credential())
            .await
            .unwrap_err();
        assert!(matches!(err, LudexError::Privacy { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn npsso_exchange_follows_the_authorize_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/authz/v3/oauth/authorize"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "Location",
                "com.scee.psxandroid.scecompcall://redirect?code=v3.ABCDEF&cid=x",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/authz/v3/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let pair = test_client(&server.uri(), &server.uri())
            .exchange_npsso("npsso-cookie")
            .await
            .unwrap();
        assert_eq!(pair.access_token, "access-1");
        assert!(pair.refresh_expires_at.is_none());
    }
}
