// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for the Ludex workspace.
//!
//! [`MockPlatformClient`] is a scriptable [`PlatformClient`]: tests load it
//! with canned libraries, achievement lists, and failure injections, then
//! drive the sync engine against it without any HTTP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use ludex_core::types::{
    Credential, CredentialMaterial, Platform, RemoteAchievement, RemoteGame, RemoteProfile,
    TokenPair,
};
use ludex_core::{LudexError, PlatformClient};

type ErrorFactory = Box<dyn Fn() -> LudexError + Send + Sync>;

/// How the mock answers `refresh_credential`.
pub enum RefreshBehavior {
    /// Return the credential unchanged (the static-credential default).
    Identity,
    /// Return the credential with this token pair swapped in.
    Rotate(TokenPair),
    /// Fail with an auth error.
    Fail,
}

/// A scriptable platform client.
pub struct MockPlatformClient {
    platform: Platform,
    profile: Option<RemoteProfile>,
    library: Vec<RemoteGame>,
    library_error: Option<ErrorFactory>,
    achievements: HashMap<String, Vec<RemoteAchievement>>,
    achievement_errors: HashMap<String, ErrorFactory>,
    players: HashMap<String, RemoteProfile>,
    friend_libraries: HashMap<String, Vec<RemoteGame>>,
    friend_achievements: HashMap<(String, String), Vec<RemoteAchievement>>,
    refresh: RefreshBehavior,
    refresh_calls: AtomicU32,
}

impl MockPlatformClient {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            profile: None,
            library: Vec::new(),
            library_error: None,
            achievements: HashMap::new(),
            achievement_errors: HashMap::new(),
            players: HashMap::new(),
            friend_libraries: HashMap::new(),
            friend_achievements: HashMap::new(),
            refresh: RefreshBehavior::Identity,
            refresh_calls: AtomicU32::new(0),
        }
    }

    pub fn with_profile(mut self, profile: RemoteProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_library(mut self, games: Vec<RemoteGame>) -> Self {
        self.library = games;
        self
    }

    /// Makes the whole library fetch fail (a top-level sync failure).
    pub fn with_library_error(
        mut self,
        factory: impl Fn() -> LudexError + Send + Sync + 'static,
    ) -> Self {
        self.library_error = Some(Box::new(factory));
        self
    }

    pub fn with_achievements(
        mut self,
        external_game_id: impl Into<String>,
        achievements: Vec<RemoteAchievement>,
    ) -> Self {
        self.achievements.insert(external_game_id.into(), achievements);
        self
    }

    /// Makes the achievement fetch for one game fail.
    pub fn with_achievement_error(
        mut self,
        external_game_id: impl Into<String>,
        factory: impl Fn() -> LudexError + Send + Sync + 'static,
    ) -> Self {
        self.achievement_errors
            .insert(external_game_id.into(), Box::new(factory));
        self
    }

    pub fn with_player(mut self, query: impl Into<String>, profile: RemoteProfile) -> Self {
        self.players.insert(query.into(), profile);
        self
    }

    pub fn with_friend_library(
        mut self,
        player_external_id: impl Into<String>,
        games: Vec<RemoteGame>,
    ) -> Self {
        self.friend_libraries.insert(player_external_id.into(), games);
        self
    }

    pub fn with_friend_achievements(
        mut self,
        player_external_id: impl Into<String>,
        external_game_id: impl Into<String>,
        achievements: Vec<RemoteAchievement>,
    ) -> Self {
        self.friend_achievements
            .insert((player_external_id.into(), external_game_id.into()), achievements);
        self
    }

    pub fn with_refresh(mut self, behavior: RefreshBehavior) -> Self {
        self.refresh = behavior;
        self
    }

    /// How many times `refresh_credential` was called.
    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformClient for MockPlatformClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<RemoteProfile, LudexError> {
        self.profile.clone().ok_or_else(|| {
            LudexError::NotFound(format!("no scripted profile for {}", credential.user_id))
        })
    }

    async fn fetch_library(&self, _credential: &Credential) -> Result<Vec<RemoteGame>, LudexError> {
        if let Some(factory) = &self.library_error {
            return Err(factory());
        }
        Ok(self.library.clone())
    }

    async fn fetch_achievements(
        &self,
        _credential: &Credential,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        if let Some(factory) = self.achievement_errors.get(external_game_id) {
            return Err(factory());
        }
        Ok(self
            .achievements
            .get(external_game_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_player(
        &self,
        _credential: &Credential,
        query: &str,
    ) -> Result<RemoteProfile, LudexError> {
        self.players
            .get(query)
            .cloned()
            .ok_or_else(|| LudexError::NotFound(format!("player `{query}`")))
    }

    async fn fetch_library_for(
        &self,
        _credential: &Credential,
        player_external_id: &str,
    ) -> Result<Vec<RemoteGame>, LudexError> {
        self.friend_libraries
            .get(player_external_id)
            .cloned()
            .ok_or_else(|| {
                LudexError::api("player-scoped library queries are not supported on this platform")
            })
    }

    async fn fetch_achievements_for(
        &self,
        _credential: &Credential,
        player_external_id: &str,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        self.friend_achievements
            .get(&(player_external_id.to_string(), external_game_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                LudexError::api(
                    "player-scoped achievement queries are not supported on this platform",
                )
            })
    }

    async fn refresh_credential(&self, credential: &Credential) -> Result<Credential, LudexError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match &self.refresh {
            RefreshBehavior::Identity => Ok(credential.clone()),
            RefreshBehavior::Rotate(pair) => Ok(Credential {
                user_id: credential.user_id.clone(),
                platform: credential.platform,
                material: CredentialMaterial::OAuthTokens(pair.clone()),
            }),
            RefreshBehavior::Fail => Err(LudexError::Auth {
                platform: credential.platform,
                message: "scripted refresh failure".into(),
            }),
        }
    }
}
