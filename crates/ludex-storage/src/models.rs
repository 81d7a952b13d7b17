// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-mapping helpers between SQLite values and the core domain types.
//!
//! The canonical types are defined in `ludex-core::types` for use across
//! adapter trait boundaries. Timestamps are persisted as RFC 3339 TEXT;
//! enums as their strum string forms; locked fields and platform label sets
//! as JSON.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

use ludex_core::types::{locked_fields_from_json, LockedField, Platform, PlayStatus};

pub use ludex_core::types::{
    locked_fields_to_json, AchievementRecord, CanonicalGame, Credential, CredentialMaterial,
    TokenPair, UserLibraryEntry,
};

/// Render a timestamp into the persisted RFC 3339 form.
pub fn ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn conversion_err(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Parse a required RFC 3339 timestamp column.
pub fn parse_ts(idx: usize, raw: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

/// Parse an optional RFC 3339 timestamp column.
pub fn parse_opt_ts(
    idx: usize,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| parse_ts(idx, s)).transpose()
}

/// Parse a platform column.
pub fn parse_platform(idx: usize, raw: String) -> Result<Platform, rusqlite::Error> {
    raw.parse().map_err(|e: strum::ParseError| conversion_err(idx, e))
}

/// Parse an optional platform column (e.g. `games.metadata_source`).
pub fn parse_opt_platform(
    idx: usize,
    raw: Option<String>,
) -> Result<Option<Platform>, rusqlite::Error> {
    raw.map(|s| parse_platform(idx, s)).transpose()
}

/// Parse a play-status column.
pub fn parse_status(idx: usize, raw: String) -> Result<PlayStatus, rusqlite::Error> {
    raw.parse().map_err(|e: strum::ParseError| conversion_err(idx, e))
}

/// Parse the `locked_fields` JSON object column. Lenient: unknown keys and
/// malformed JSON yield an empty set rather than failing the row.
pub fn parse_locked_fields(raw: &str) -> BTreeSet<LockedField> {
    locked_fields_from_json(raw)
}

/// Parse the `games.platforms` JSON array of labels. Lenient like
/// [`parse_locked_fields`].
pub fn parse_platform_labels(raw: &str) -> BTreeSet<String> {
    serde_json::from_str::<Vec<String>>(raw)
        .map(|v| v.into_iter().collect())
        .unwrap_or_default()
}

/// Render a platform label set into the persisted JSON array form.
pub fn platform_labels_to_json(labels: &BTreeSet<String>) -> String {
    serde_json::to_string(&labels.iter().collect::<Vec<_>>())
        .unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ts_round_trips() {
        let now = Utc::now();
        let parsed = parse_ts(0, ts(now)).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn bad_timestamp_is_a_conversion_error() {
        assert!(parse_ts(3, "yesterday".into()).is_err());
        assert_eq!(parse_opt_ts(3, None).unwrap(), None);
    }

    #[test]
    fn platform_labels_round_trip() {
        let labels: BTreeSet<String> = ["Steam".to_string(), "PS5".to_string()].into();
        let json = platform_labels_to_json(&labels);
        assert_eq!(parse_platform_labels(&json), labels);
        assert!(parse_platform_labels("garbage").is_empty());
    }
}
