// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Ludex.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Ludex configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LudexConfig {
    /// General settings (acting user, logging).
    #[serde(default)]
    pub general: GeneralConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Steam Web API settings.
    #[serde(default)]
    pub steam: SteamConfig,

    /// PlayStation Network settings.
    #[serde(default)]
    pub psn: PsnConfig,

    /// Xbox Live gateway settings.
    #[serde(default)]
    pub xbox: XboxConfig,

    /// Epic Games Store settings.
    #[serde(default)]
    pub epic: EpicConfig,
}

/// General settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// The acting user id. The engine is multi-user; the CLI defaults to a
    /// single local operator.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            log_level: default_log_level(),
        }
    }
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ludex").join("ludex.db"))
        .and_then(|p| p.to_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "ludex.db".to_string())
}

/// Steam Web API settings. The per-user credential is the linked Steam id;
/// the Web API key is application-level and lives here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SteamConfig {
    /// Steam Web API key. `None` disables Steam sync.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// PlayStation Network settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PsnConfig {
    /// Seconds to keep honoring an access token before its stated expiry
    /// (the proactive-refresh safety buffer).
    #[serde(default = "default_refresh_buffer_secs")]
    pub refresh_buffer_secs: u64,
}

impl Default for PsnConfig {
    fn default() -> Self {
        Self {
            refresh_buffer_secs: default_refresh_buffer_secs(),
        }
    }
}

fn default_refresh_buffer_secs() -> u64 {
    300
}

/// Xbox Live gateway settings. The per-user API key is a credential, stored
/// by the credential store; nothing app-level is required.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct XboxConfig {
    /// Base URL of the third-party Xbox gateway.
    #[serde(default = "default_xbox_base_url")]
    pub base_url: String,
}

impl Default for XboxConfig {
    fn default() -> Self {
        Self {
            base_url: default_xbox_base_url(),
        }
    }
}

fn default_xbox_base_url() -> String {
    "https://xbl.io/api/v2".to_string()
}

/// Epic Games Store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EpicConfig {
    /// OAuth client id. Defaults to the official launcher client.
    #[serde(default = "default_epic_client_id")]
    pub client_id: String,

    /// OAuth client secret. Defaults to the official launcher client.
    #[serde(default = "default_epic_client_secret")]
    pub client_secret: String,

    /// Delay between library pages, in milliseconds. Epic is uncapped but
    /// paginated; this paces the page loop.
    #[serde(default = "default_epic_page_delay_ms")]
    pub page_delay_ms: u64,
}

impl Default for EpicConfig {
    fn default() -> Self {
        Self {
            client_id: default_epic_client_id(),
            client_secret: default_epic_client_secret(),
            page_delay_ms: default_epic_page_delay_ms(),
        }
    }
}

// The Epic Games Launcher's public client credentials, required for the
// library and catalog endpoints.
fn default_epic_client_id() -> String {
    "34a02cf8f4414e29b15921876da36f9a".to_string()
}

fn default_epic_client_secret() -> String {
    "daafbccc737745039dffe53d94fc76cf".to_string()
}

fn default_epic_page_delay_ms() -> u64 {
    250
}
