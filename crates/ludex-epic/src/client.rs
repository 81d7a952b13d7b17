// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Epic Games Store launcher APIs.
//!
//! Library records are paginated behind a cursor, with a configurable delay
//! between pages instead of a request window. Titles come from a separate
//! catalog service whose bulk lookup can miss entries, so a broader
//! search-style query serves as fallback, and records that resolve to
//! non-game catalog entries or to literal internal identifiers are dropped.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ludex_core::types::{
    Credential, CredentialMaterial, Platform, RemoteAchievement, RemoteGame, RemoteProfile,
    TokenPair,
};
use ludex_core::{LudexError, PlatformClient};
use ludex_ratelimit::SlidingWindowLimiter;

use crate::types::{
    AccountResponse, CatalogItem, CatalogSearchEnvelope, LibraryEnvelope, PlaytimeRecord,
    TokenResponse,
};

const AUTH_BASE_URL: &str = "https://account-public-service-prod03.ol.epicgames.com";
const LIBRARY_BASE_URL: &str = "https://library-service.live.use1a.on.epicgames.com";
const CATALOG_BASE_URL: &str = "https://catalog-public-service-prod06.ol.epicgames.com";

/// Unreal Engine assets share the library endpoint with games.
const ENGINE_NAMESPACE: &str = "ue";

static UUID_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap_or_else(|e| unreachable!("invalid uuid pattern: {e}"))
});
static HEX_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{16,}$").unwrap_or_else(|e| unreachable!("invalid hex pattern: {e}"))
});

/// True for titles that are internal identifiers rather than names.
pub fn looks_like_internal_id(title: &str) -> bool {
    UUID_TITLE.is_match(title) || HEX_TITLE.is_match(title)
}

/// True for known non-game companion content.
pub fn is_non_game_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    lower.contains("soundtrack")
        || lower.contains("wallpaper")
        || lower.ends_with(" ost")
        || lower.contains("artbook")
}

struct CachedServiceToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Epic Games Store client.
pub struct EpicClient {
    http: reqwest::Client,
    limiter: Arc<SlidingWindowLimiter>,
    client_id: String,
    client_secret: String,
    page_delay: Duration,
    auth_base_url: String,
    library_base_url: String,
    catalog_base_url: String,
    /// Client-credentials token for catalog lookups, refreshed on expiry.
    /// The mutex is held across the refresh so concurrent callers
    /// single-flight instead of racing the token endpoint.
    service_token: Mutex<Option<CachedServiceToken>>,
}

impl EpicClient {
    pub fn new(
        client_id: String,
        client_secret: String,
        page_delay_ms: u64,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Result<Self, LudexError> {
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
            client_id,
            client_secret,
            page_delay: Duration::from_millis(page_delay_ms),
            auth_base_url: AUTH_BASE_URL.to_string(),
            library_base_url: LIBRARY_BASE_URL.to_string(),
            catalog_base_url: CATALOG_BASE_URL.to_string(),
            service_token: Mutex::new(None),
        })
    }

    /// Overrides all base URLs (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_urls(mut self, auth: String, library: String, catalog: String) -> Self {
        self.auth_base_url = auth;
        self.library_base_url = library;
        self.catalog_base_url = catalog;
        self
    }

    /// Exchanges a launcher authorization code for a token pair. Used at
    /// link time.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<TokenPair, LudexError> {
        self.request_tokens(&[("grant_type", "authorization_code"), ("code", code)])
            .await
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<TokenPair, LudexError> {
        self.limiter.reserve_or_fail(Platform::Epic)?;
        let url = format!("{}/account/api/oauth/token", self.auth_base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LudexError::Auth {
                platform: Platform::Epic,
                message: format!("token exchange failed ({status})"),
            });
        }
        let tokens: TokenResponse = response.json().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse Epic token response: {e}"),
            source: Some(Box::new(e)),
        })?;
        let refresh_token = tokens.refresh_token.ok_or_else(|| LudexError::Auth {
            platform: Platform::Epic,
            message: "Epic token response carried no refresh token".into(),
        })?;
        let now = Utc::now();
        Ok(TokenPair {
            access_token: tokens.access_token,
            refresh_token,
            expires_at: now + TimeDelta::seconds(tokens.expires_in),
            refresh_expires_at: tokens.refresh_expires.map(|s| now + TimeDelta::seconds(s)),
            account_id: tokens.account_id,
        })
    }

    async fn service_token(&self) -> Result<String, LudexError> {
        let mut guard = self.service_token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Utc::now() + TimeDelta::seconds(60) {
                return Ok(cached.access_token.clone());
            }
        }

        self.limiter.reserve_or_fail(Platform::Epic)?;
        let url = format!("{}/account/api/oauth/token", self.auth_base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LudexError::Auth {
                platform: Platform::Epic,
                message: format!("catalog token request failed ({status})"),
            });
        }
        let tokens: TokenResponse = response.json().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse Epic token response: {e}"),
            source: Some(Box::new(e)),
        })?;
        let access_token = tokens.access_token.clone();
        *guard = Some(CachedServiceToken {
            access_token: tokens.access_token,
            expires_at: Utc::now() + TimeDelta::seconds(tokens.expires_in),
        });
        Ok(access_token)
    }

    fn tokens<'a>(&self, credential: &'a Credential) -> Result<&'a TokenPair, LudexError> {
        match &credential.material {
            CredentialMaterial::OAuthTokens(pair) => Ok(pair),
            _ => Err(LudexError::Auth {
                platform: Platform::Epic,
                message: "credential does not carry Epic tokens".into(),
            }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        bearer: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LudexError> {
        self.limiter.reserve_or_fail(Platform::Epic)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        debug!(%status, url, "epic response received");
        if !status.is_success() {
            return Err(map_error_status(status));
        }
        response.json::<T>().await.map_err(|e| LudexError::Api {
            message: format!("failed to parse Epic response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Bulk catalog lookup for one namespace; misses fall back to a broader
    /// search query per item.
    async fn catalog_items(
        &self,
        namespace: &str,
        ids: &[(String, String)], // (catalog_item_id, app_name)
    ) -> Result<HashMap<String, CatalogItem>, LudexError> {
        let token = self.service_token().await?;
        let url = format!(
            "{}/catalog/api/shared/namespace/{namespace}/bulk/items",
            self.catalog_base_url
        );
        let mut query: Vec<(&str, &str)> = vec![("country", "US"), ("locale", "en-US")];
        for (id, _) in ids {
            query.push(("id", id.as_str()));
        }
        let mut found: HashMap<String, CatalogItem> = self.get_json(&token, &url, &query).await?;

        for (id, app_name) in ids {
            if found.contains_key(id) {
                continue;
            }
            let search_url = format!(
                "{}/catalog/api/shared/namespace/{namespace}/items",
                self.catalog_base_url
            );
            let result: Result<CatalogSearchEnvelope, _> = self
                .get_json(
                    &token,
                    &search_url,
                    &[
                        ("keywords", app_name.as_str()),
                        ("country", "US"),
                        ("locale", "en-US"),
                    ],
                )
                .await;
            match result {
                Ok(envelope) => {
                    if let Some(item) = envelope.elements.into_iter().find(CatalogItem::is_game) {
                        found.insert(id.clone(), item);
                    }
                }
                Err(e) => {
                    warn!(catalog_item_id = %id, error = %e, "epic catalog fallback failed");
                }
            }
        }
        Ok(found)
    }
}

fn transport_error(err: reqwest::Error) -> LudexError {
    LudexError::Api {
        message: format!("Epic request failed: {err}"),
        source: Some(Box::new(err)),
    }
}

fn map_error_status(status: reqwest::StatusCode) -> LudexError {
    match status.as_u16() {
        401 | 403 => LudexError::Auth {
            platform: Platform::Epic,
            message: format!("Epic rejected the access token ({status})"),
        },
        404 => LudexError::NotFound("Epic entity not found".into()),
        429 => LudexError::RateLimited {
            platform: Platform::Epic,
            wait: Duration::from_secs(60),
        },
        _ => LudexError::api(format!("Epic API returned {status}")),
    }
}

#[async_trait]
impl PlatformClient for EpicClient {
    fn platform(&self) -> Platform {
        Platform::Epic
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<RemoteProfile, LudexError> {
        let tokens = self.tokens(credential)?;
        let account_id = tokens.account_id.as_deref().ok_or_else(|| LudexError::Auth {
            platform: Platform::Epic,
            message: "Epic credential carries no account id".into(),
        })?;
        let url = format!(
            "{}/account/api/public/account/{account_id}",
            self.auth_base_url
        );
        let account: AccountResponse = self
            .get_json(&tokens.access_token, &url, &[])
            .await
            .map_err(|e| match e {
                LudexError::NotFound(_) => LudexError::NotFound(format!("Epic account {account_id}")),
                other => other,
            })?;
        Ok(RemoteProfile {
            platform: Platform::Epic,
            external_id: account.id,
            display_name: account.display_name,
            avatar_url: None,
        })
    }

    async fn fetch_library(&self, credential: &Credential) -> Result<Vec<RemoteGame>, LudexError> {
        let tokens = self.tokens(credential)?;

        // Page through library records, pausing between pages.
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let url = format!("{}/library/api/public/items", self.library_base_url);
            let mut query: Vec<(&str, &str)> = vec![("includeMetadata", "true")];
            if let Some(c) = cursor.as_deref() {
                query.push(("cursor", c));
            }
            let page: LibraryEnvelope = self.get_json(&tokens.access_token, &url, &query).await?;
            records.extend(
                page.records
                    .into_iter()
                    .filter(|r| r.namespace != ENGINE_NAMESPACE),
            );
            match page.response_metadata.next_cursor {
                Some(next) => {
                    cursor = Some(next);
                    tokio::time::sleep(self.page_delay).await;
                }
                None => break,
            }
        }

        // Playtime is keyed by artifact id, which matches the record's
        // app name.
        let playtime: HashMap<String, u64> = match tokens.account_id.as_deref() {
            Some(account_id) => {
                let url = format!(
                    "{}/library/api/public/playtime/account/{account_id}/all",
                    self.library_base_url
                );
                let result: Result<Vec<PlaytimeRecord>, _> =
                    self.get_json(&tokens.access_token, &url, &[]).await;
                match result {
                    Ok(rows) => rows
                        .into_iter()
                        .map(|r| (r.artifact_id, r.total_time / 60))
                        .collect(),
                    Err(e) => {
                        warn!(error = %e, "epic playtime fetch failed; continuing without");
                        HashMap::new()
                    }
                }
            }
            None => HashMap::new(),
        };

        // Catalog metadata, grouped by namespace to keep bulk calls small.
        let mut by_namespace: HashMap<String, Vec<(String, String)>> = HashMap::new();
        for record in &records {
            by_namespace
                .entry(record.namespace.clone())
                .or_default()
                .push((record.catalog_item_id.clone(), record.app_name.clone()));
        }
        let mut catalog: HashMap<String, CatalogItem> = HashMap::new();
        for (namespace, ids) in &by_namespace {
            match self.catalog_items(namespace, ids).await {
                Ok(items) => catalog.extend(items),
                Err(e) => {
                    warn!(namespace, error = %e, "epic catalog lookup failed; using app names");
                }
            }
        }

        let games = records
            .into_iter()
            .filter_map(|record| {
                let item = catalog.get(&record.catalog_item_id);
                if item.is_some_and(|i| !i.is_game()) {
                    return None;
                }
                let title = item
                    .and_then(|i| i.title.clone())
                    .unwrap_or_else(|| record.app_name.clone());
                if looks_like_internal_id(&title) || is_non_game_title(&title) {
                    return None;
                }
                let mut game =
                    RemoteGame::new(Platform::Epic, record.catalog_item_id.clone(), title);
                if let Some(item) = item {
                    game.cover_url = item.cover_url();
                    game.developer = item.developer.clone();
                }
                game.playtime_minutes = playtime.get(&record.app_name).copied();
                Some(game)
            })
            .collect();
        Ok(games)
    }

    async fn fetch_achievements(
        &self,
        _credential: &Credential,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        // The launcher APIs expose no per-achievement data; callers fall
        // back to counts-only comparison for Epic titles.
        debug!(external_game_id, "epic exposes no per-achievement data");
        Ok(Vec::new())
    }

    async fn search_player(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<RemoteProfile, LudexError> {
        let tokens = self.tokens(credential)?;
        let url = format!(
            "{}/account/api/public/account/displayName/{query}",
            self.auth_base_url
        );
        let account: AccountResponse = self
            .get_json(&tokens.access_token, &url, &[])
            .await
            .map_err(|e| match e {
                LudexError::NotFound(_) => LudexError::NotFound(format!("Epic player `{query}`")),
                other => other,
            })?;
        Ok(RemoteProfile {
            platform: Platform::Epic,
            external_id: account.id,
            display_name: account.display_name,
            avatar_url: None,
        })
    }

    async fn refresh_credential(&self, credential: &Credential) -> Result<Credential, LudexError> {
        let current = self.tokens(credential)?;
        let mut refreshed = self
            .request_tokens(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .await?;
        if refreshed.account_id.is_none() {
            refreshed.account_id = current.account_id.clone();
        }
        Ok(Credential {
            user_id: credential.user_id.clone(),
            platform: Platform::Epic,
            material: CredentialMaterial::OAuthTokens(refreshed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base: &str) -> EpicClient {
        EpicClient::new(
            "launcher-id".into(),
            "launcher-secret".into(),
            0,
            Arc::new(SlidingWindowLimiter::new()),
        )
        .unwrap()
        .with_base_urls(base.to_string(), base.to_string(), base.to_string())
    }

    fn test_credential() -> Credential {
        Credential {
            user_id: "local".into(),
            platform: Platform::Epic,
            material: CredentialMaterial::OAuthTokens(TokenPair {
                access_token: "user-access".into(),
                refresh_token: "user-refresh".into(),
                expires_at: Utc::now() + TimeDelta::hours(1),
                refresh_expires_at: Some(Utc::now() + TimeDelta::days(30)),
                account_id: Some("abc123".into()),
            }),
        }
    }

    fn mount_service_token(server: &MockServer) -> impl std::future::Future<Output = ()> + '_ {
        Mock::given(method("POST"))
            .and(path("/account/api/oauth/token"))
            .and(body_string_contains("client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "svc-access",
                "expires_in": 14400
            })))
            .mount(server)
    }

    #[test]
    fn internal_id_titles_are_recognized() {
        assert!(looks_like_internal_id("6c6b9b73f0e84ab1b4a6d7a2e9c5f8d0"));
        assert!(looks_like_internal_id("0584d2013f0149a791e7b9bad0eec102"));
        assert!(looks_like_internal_id("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!looks_like_internal_id("Celeste"));
        assert!(!looks_like_internal_id("Deadbeef Adventures"));
    }

    #[test]
    fn non_game_titles_are_recognized() {
        assert!(is_non_game_title("Hades Original Soundtrack"));
        assert!(is_non_game_title("Control Wallpaper Pack"));
        assert!(is_non_game_title("Celeste OST"));
        assert!(!is_non_game_title("Ostwind"));
    }

    #[tokio::test]
    async fn fetch_library_pages_filters_and_enriches() {
        let server = MockServer::start().await;
        mount_service_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/library/api/public/items"))
            .and(query_param("cursor", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [
                    {"namespace": "min", "catalogItemId": "item-ost", "appName": "Min-OST"}
                ],
                "responseMetadata": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/library/api/public/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [
                    {"namespace": "min", "catalogItemId": "item-1", "appName": "Min"},
                    {"namespace": "ue", "catalogItemId": "engine-1", "appName": "UE_4.27"}
                ],
                "responseMetadata": {"nextCursor": "page2"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/library/api/public/playtime/account/abc123/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"artifactId": "Min", "totalTime": 7200}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/catalog/api/shared/namespace/min/bulk/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "item-1": {
                    "id": "item-1",
                    "title": "Minit",
                    "developer": "Vlambeer",
                    "categories": [{"path": "games/edition/base"}],
                    "keyImages": [{"type": "DieselGameBoxTall", "url": "https://img.example/minit.jpg"}]
                },
                "item-ost": {
                    "id": "item-ost",
                    "title": "Minit Soundtrack",
                    "categories": [{"path": "audio"}]
                }
            })))
            .mount(&server)
            .await;

        let games = test_client(&server.uri())
            .fetch_library(&test_credential())
            .await
            .unwrap();
        assert_eq!(games.len(), 1, "engine and soundtrack entries are dropped");
        assert_eq!(games[0].title, "Minit");
        assert_eq!(games[0].stable_id, "item-1");
        assert_eq!(games[0].playtime_minutes, Some(120));
        assert_eq!(games[0].developer.as_deref(), Some("Vlambeer"));
        assert_eq!(
            games[0].cover_url.as_deref(),
            Some("https://img.example/minit.jpg")
        );
    }

    #[tokio::test]
    async fn catalog_miss_uses_search_fallback() {
        let server = MockServer::start().await;
        mount_service_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/library/api/public/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": [
                    {"namespace": "cel", "catalogItemId": "item-9", "appName": "Salt"}
                ],
                "responseMetadata": {}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/library/api/public/playtime/account/abc123/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/catalog/api/shared/namespace/cel/bulk/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/catalog/api/shared/namespace/cel/items"))
            .and(query_param("keywords", "Salt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "elements": [{
                    "id": "item-9",
                    "title": "Celeste",
                    "categories": [{"path": "games"}]
                }]
            })))
            .mount(&server)
            .await;

        let games = test_client(&server.uri())
            .fetch_library(&test_credential())
            .await
            .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].title, "Celeste");
    }

    #[tokio::test]
    async fn service_token_is_cached_across_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/account/api/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "svc-access",
                "expires_in": 14400
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let first = client.service_token().await.unwrap();
        let second = client.service_token().await.unwrap();
        assert_eq!(first, "svc-access");
        assert_eq!(second, "svc-access");
    }

    #[tokio::test]
    async fn refresh_rotates_tokens_and_keeps_account_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/account/api/oauth/token"))
            .and(body_string_contains("refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "user-access-2",
                "refresh_token": "user-refresh-2",
                "expires_in": 28800,
                "refresh_expires": 1987200
            })))
            .mount(&server)
            .await;

        let refreshed = test_client(&server.uri())
            .refresh_credential(&test_credential())
            .await
            .unwrap();
        match refreshed.material {
            CredentialMaterial::OAuthTokens(pair) => {
                assert_eq!(pair.access_token, "user-access-2");
                assert_eq!(pair.account_id.as_deref(), Some("abc123"));
                assert!(pair.refresh_expires_at.is_some());
            }
            other => panic!("unexpected material: {other:?}"),
        }
    }

    #[tokio::test]
    async fn achievements_are_empty_for_epic() {
        let server = MockServer::start().await;
        let achievements = test_client(&server.uri())
            .fetch_achievements(&test_credential(), "item-1")
            .await
            .unwrap();
        assert!(achievements.is_empty());
    }
}
