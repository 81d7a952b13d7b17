// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./ludex.toml` > `~/.config/ludex/ludex.toml` with environment
//! variable overrides via `LUDEX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LudexConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/ludex/ludex.toml` (user XDG config)
/// 3. `./ludex.toml` (local directory)
/// 4. `LUDEX_*` environment variables
pub fn load_config() -> Result<LudexConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LudexConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ludex/ludex.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ludex.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<LudexConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LudexConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LudexConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LudexConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LUDEX_STEAM_API_KEY` must map to
/// `steam.api_key`, not `steam.api.key`.
fn env_provider() -> Env {
    Env::prefixed("LUDEX_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("general_", "general.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("steam_", "steam.", 1)
            .replacen("psn_", "psn.", 1)
            .replacen("xbox_", "xbox.", 1)
            .replacen("epic_", "epic.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.general.user_id, "local");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [general]
            user_id = "alice"

            [steam]
            api_key = "STEAMKEY123"
            "#,
        )
        .unwrap();
        assert_eq!(config.general.user_id, "alice");
        assert_eq!(config.steam.api_key.as_deref(), Some("STEAMKEY123"));
        // Untouched sections keep defaults.
        assert_eq!(config.psn.refresh_buffer_secs, 300);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
            [general]
            user_nam = "typo"
            "#,
        );
        assert!(result.is_err(), "deny_unknown_fields should reject typos");
    }
}
