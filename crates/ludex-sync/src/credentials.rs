// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential lifecycle: proactive refresh of token-based credentials.
//!
//! Static credentials (Steam id, Xbox API key) pass through untouched;
//! their validity only surfaces on the first failed call. OAuth pairs are
//! checked against expiry with a safety buffer and refreshed through the
//! platform client before use. Refresh is single-flight per
//! (user, platform): concurrent syncs serialize on a keyed mutex so two
//! refreshes cannot invalidate each other's tokens.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use ludex_core::types::{Credential, CredentialMaterial, Platform};
use ludex_core::{CredentialStore, LudexError, PlatformClient};

const REFRESH_BUFFER_SECS: i64 = 300;

/// Manages per-user, per-platform auth material on top of a
/// [`CredentialStore`].
pub struct CredentialLifecycle {
    store: Arc<dyn CredentialStore>,
    refresh_buffer: TimeDelta,
    locks: Mutex<HashMap<(String, Platform), Arc<Mutex<()>>>>,
}

impl CredentialLifecycle {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_buffer(store, REFRESH_BUFFER_SECS)
    }

    pub fn with_buffer(store: Arc<dyn CredentialStore>, buffer_secs: i64) -> Self {
        Self {
            store,
            refresh_buffer: TimeDelta::seconds(buffer_secs),
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, user_id: &str, platform: Platform) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((user_id.to_string(), platform))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Returns a credential ready for use, or `None` when the user must
    /// re-link.
    ///
    /// Token pairs inside the expiry buffer are refreshed via the client and
    /// persisted before returning. A refresh failure or an expired refresh
    /// token clears the stored credential; refresh is attempted at most once
    /// per call.
    pub async fn get_valid_credential(
        &self,
        client: &dyn PlatformClient,
        user_id: &str,
    ) -> Result<Option<Credential>, LudexError> {
        let platform = client.platform();
        let Some(credential) = self.store.get_credential(user_id, platform).await? else {
            return Ok(None);
        };

        let needs_refresh = match &credential.material {
            CredentialMaterial::OAuthTokens(pair) => {
                pair.expires_at <= Utc::now() + self.refresh_buffer
            }
            _ => false,
        };
        if !needs_refresh {
            return Ok(Some(credential));
        }

        let lock = self.lock_for(user_id, platform).await;
        let _guard = lock.lock().await;

        // Another flight may have refreshed while we waited.
        let Some(credential) = self.store.get_credential(user_id, platform).await? else {
            return Ok(None);
        };
        let CredentialMaterial::OAuthTokens(pair) = &credential.material else {
            return Ok(Some(credential));
        };
        let now = Utc::now();
        if pair.expires_at > now + self.refresh_buffer {
            debug!(user_id, %platform, "credential already refreshed by a concurrent sync");
            return Ok(Some(credential));
        }
        if pair.refresh_expired(now) {
            warn!(user_id, %platform, "refresh token expired; clearing credential");
            self.store.clear_credential(user_id, platform).await?;
            return Ok(None);
        }

        match client.refresh_credential(&credential).await {
            Ok(refreshed) => {
                self.store.save_credential(&refreshed).await?;
                debug!(user_id, %platform, "credential refreshed");
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!(user_id, %platform, error = %e, "credential refresh failed; clearing");
                self.store.clear_credential(user_id, platform).await?;
                Ok(None)
            }
        }
    }
}
