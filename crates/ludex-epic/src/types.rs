// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Epic Games Store launcher APIs.

use serde::Deserialize;

// --- OAuth ---

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    /// Seconds until the refresh token expires.
    #[serde(default)]
    pub refresh_expires: Option<i64>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

// --- Account lookup ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub display_name: Option<String>,
}

// --- Library records ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEnvelope {
    #[serde(default)]
    pub records: Vec<LibraryRecord>,
    #[serde(default)]
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRecord {
    pub namespace: String,
    pub catalog_item_id: String,
    pub app_name: String,
    #[serde(default)]
    pub product_id: Option<String>,
}

// --- Catalog metadata ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub developer: Option<String>,
    #[serde(default)]
    pub categories: Vec<CatalogCategory>,
    #[serde(default)]
    pub key_images: Vec<KeyImage>,
}

impl CatalogItem {
    /// Catalog categories carry slash paths, e.g. `games/edition/base`.
    pub fn is_game(&self) -> bool {
        self.categories
            .iter()
            .any(|c| c.path.as_deref().is_some_and(|p| p.starts_with("games")))
    }

    pub fn cover_url(&self) -> Option<String> {
        const PREFERRED: &[&str] = &["DieselGameBoxTall", "DieselGameBox", "Thumbnail"];
        PREFERRED.iter().find_map(|kind| {
            self.key_images
                .iter()
                .find(|img| img.kind.as_deref() == Some(kind))
                .and_then(|img| img.url.clone())
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogCategory {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeyImage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogSearchEnvelope {
    #[serde(default)]
    pub elements: Vec<CatalogItem>,
}

// --- Playtime ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaytimeRecord {
    pub artifact_id: String,
    /// Total seconds on record.
    #[serde(default)]
    pub total_time: u64,
}
