// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and known log levels.

use crate::model::LudexConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or all collected validation
/// errors (does not fail fast).
pub fn validate_config(config: &LudexConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.general.user_id.trim().is_empty() {
        errors.push("general.user_id must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.general.log_level.as_str()) {
        errors.push(format!(
            "general.log_level `{}` is not one of {}",
            config.general.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push("storage.database_path must not be empty".to_string());
    }

    if let Some(key) = &config.steam.api_key
        && key.trim().is_empty()
    {
        errors.push("steam.api_key is set but empty; remove it or provide a key".to_string());
    }

    if config.epic.client_id.trim().is_empty() || config.epic.client_secret.trim().is_empty() {
        errors.push("epic.client_id and epic.client_secret must not be empty".to_string());
    }

    if config.xbox.base_url.trim().is_empty() {
        errors.push("xbox.base_url must not be empty".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&LudexConfig::default()).is_ok());
    }

    #[test]
    fn bad_log_level_is_reported() {
        let mut config = LudexConfig::default();
        config.general.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("log_level")));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = LudexConfig::default();
        config.general.user_id = "  ".into();
        config.storage.database_path = String::new();
        config.steam.api_key = Some(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "expected all errors collected, got {errors:?}");
    }
}
