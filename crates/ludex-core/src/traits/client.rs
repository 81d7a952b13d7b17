// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform client trait for remote game-service integrations.

use async_trait::async_trait;

use crate::error::LudexError;
use crate::types::{Credential, Platform, RemoteAchievement, RemoteGame, RemoteProfile};

/// Typed remote-fetch adapter for one platform family (Steam, PSN, Xbox,
/// Epic).
///
/// Implementations wrap every outbound call with the shared rate limiter,
/// normalize platform-specific quirks into the `Remote*` DTOs, and surface
/// failures only through the [`LudexError`] taxonomy.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// The platform family this client talks to.
    fn platform(&self) -> Platform;

    /// Fetches the credential owner's profile.
    async fn fetch_profile(&self, credential: &Credential)
        -> Result<RemoteProfile, LudexError>;

    /// Fetches the full remote library for the credential owner.
    async fn fetch_library(&self, credential: &Credential)
        -> Result<Vec<RemoteGame>, LudexError>;

    /// Fetches the achievement list for one remote game, identified by its
    /// platform-native stable id.
    async fn fetch_achievements(
        &self,
        credential: &Credential,
        external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError>;

    /// Resolves another player by display name or platform-native id, for
    /// the achievement comparison flow.
    async fn search_player(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<RemoteProfile, LudexError>;

    /// Fetches another player's library using the caller's credential.
    ///
    /// Platforms without player-scoped queries (Epic) keep the default,
    /// which the comparison engine treats as "fall back to counts".
    async fn fetch_library_for(
        &self,
        _credential: &Credential,
        _player_external_id: &str,
    ) -> Result<Vec<RemoteGame>, LudexError> {
        Err(LudexError::api(
            "player-scoped library queries are not supported on this platform",
        ))
    }

    /// Fetches another player's achievement list for one remote game.
    async fn fetch_achievements_for(
        &self,
        _credential: &Credential,
        _player_external_id: &str,
        _external_game_id: &str,
    ) -> Result<Vec<RemoteAchievement>, LudexError> {
        Err(LudexError::api(
            "player-scoped achievement queries are not supported on this platform",
        ))
    }

    /// Exchanges a refresh token for a new access/refresh pair.
    ///
    /// Platforms with static credentials (Steam, Xbox) keep the default
    /// implementation, which returns the credential unchanged.
    async fn refresh_credential(
        &self,
        credential: &Credential,
    ) -> Result<Credential, LudexError> {
        Ok(credential.clone())
    }
}
