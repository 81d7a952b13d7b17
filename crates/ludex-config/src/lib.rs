// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Ludex.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file lookup, and environment variable
//! overrides via the `LUDEX_` prefix.

#![allow(clippy::result_large_err)]

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::LudexConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid [`LudexConfig`] or a list of human-readable error
/// messages suitable for printing to stderr.
pub fn load_and_validate() -> Result<LudexConfig, Vec<String>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(err.into_iter().map(|e| e.to_string()).collect()),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LudexConfig, Vec<String>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(err.into_iter().map(|e| e.to_string()).collect()),
    }
}
