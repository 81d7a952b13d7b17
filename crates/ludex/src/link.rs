// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ludex link` / `ludex unlink` command implementations.
//!
//! Linking turns platform-specific material into a stored credential: the
//! Steam id is validated in place, the Xbox key is stored as-is, and the
//! PSN NPSSO token and Epic authorization code are exchanged for OAuth
//! token pairs before storage.

use tracing::warn;

use crate::app::App;
use ludex_core::types::{Credential, CredentialMaterial};
use ludex_core::{CredentialStore, LudexError, Platform};
use ludex_steam::validate_steam_id;

/// Run the `ludex link` command.
pub async fn run_link(
    app: &App,
    user: &str,
    platform: Platform,
    material: &str,
) -> Result<(), LudexError> {
    let material = match platform {
        Platform::Steam => {
            validate_steam_id(material)?;
            CredentialMaterial::SteamId {
                steam_id: material.to_string(),
            }
        }
        Platform::Psn => CredentialMaterial::OAuthTokens(app.psn().exchange_npsso(material).await?),
        Platform::Xbox => CredentialMaterial::ApiKey {
            api_key: material.to_string(),
        },
        Platform::Epic => CredentialMaterial::OAuthTokens(
            app.epic().exchange_authorization_code(material).await?,
        ),
    };

    let credential = Credential {
        user_id: user.to_string(),
        platform,
        material,
    };
    app.store.save_credential(&credential).await?;

    // Confirm the link with a profile fetch where a client is available;
    // a failure here leaves the stored credential in place.
    match app.client(platform) {
        Ok(client) => match client.fetch_profile(&credential).await {
            Ok(profile) => {
                let name = profile
                    .display_name
                    .unwrap_or_else(|| profile.external_id.clone());
                println!("linked {platform} as {name}");
            }
            Err(e) => {
                warn!(%platform, error = %e, "profile fetch after link failed");
                println!("linked {platform} (profile not verified: {e})");
            }
        },
        Err(_) => println!("linked {platform} (no client configured to verify)"),
    }
    Ok(())
}

/// Run the `ludex unlink` command.
pub async fn run_unlink(app: &App, user: &str, platform: Platform) -> Result<(), LudexError> {
    app.store.clear_credential(user, platform).await?;
    println!("unlinked {platform}");
    Ok(())
}
