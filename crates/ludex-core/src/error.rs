// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ludex synchronization engine.

use std::time::Duration;

use thiserror::Error;

use crate::types::Platform;

/// The primary error type used across all Ludex adapter traits and the
/// synchronization core.
///
/// Platform clients must surface remote failures as one of the first six
/// variants; raw transport errors never cross the client boundary.
#[derive(Debug, Error)]
pub enum LudexError {
    /// Credential is expired, revoked, or invalid. The user must re-link.
    #[error("authentication failed for {platform}: {message}")]
    Auth { platform: Platform, message: String },

    /// Remote profile, library, or game details are not public.
    ///
    /// `remediation` tells the user which remote privacy setting to change.
    #[error("privacy error for {platform}: {message} ({remediation})")]
    Privacy {
        platform: Platform,
        message: String,
        remediation: String,
    },

    /// The local sliding-window governor refused the request.
    #[error("rate limited on {platform}, window clears in {wait:?}")]
    RateLimited { platform: Platform, wait: Duration },

    /// A remote entity (game, profile, achievement set) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed user-supplied input (e.g. a bad Steam id format).
    #[error("validation error: {0}")]
    Validation(String),

    /// Catch-all transport or remote API failure.
    #[error("API error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LudexError {
    /// Shorthand for an [`LudexError::Api`] without a source.
    pub fn api(message: impl Into<String>) -> Self {
        LudexError::Api {
            message: message.into(),
            source: None,
        }
    }

    /// True if this error means the credential cannot be used and the user
    /// must re-link the platform account.
    pub fn requires_relink(&self) -> bool {
        matches!(self, LudexError::Auth { .. })
    }
}
