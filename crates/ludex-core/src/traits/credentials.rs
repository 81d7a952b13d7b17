// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store trait for per-user, per-platform auth material.

use async_trait::async_trait;

use crate::error::LudexError;
use crate::types::{Credential, Platform};

/// Persistence seam for platform credentials.
///
/// Credentials are created on link, refreshed in place, and cleared on unlink
/// or irrecoverable refresh failure.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_credential(
        &self,
        user_id: &str,
        platform: Platform,
    ) -> Result<Option<Credential>, LudexError>;

    /// Inserts or replaces the stored credential for (user, platform).
    async fn save_credential(&self, credential: &Credential) -> Result<(), LudexError>;

    async fn clear_credential(&self, user_id: &str, platform: Platform)
        -> Result<(), LudexError>;
}
