// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ludex status` command implementation.
//!
//! One line per platform: linked or not, library size, last sync time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::App;
use ludex_core::{CredentialStore, LibraryStore, LudexError, Platform};

const PLATFORMS: [Platform; 4] = [
    Platform::Steam,
    Platform::Psn,
    Platform::Xbox,
    Platform::Epic,
];

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
struct PlatformStatus {
    platform: Platform,
    linked: bool,
    games: usize,
    last_synced: Option<DateTime<Utc>>,
}

/// Run the `ludex status` command.
pub async fn run_status(app: &App, user: &str, json: bool) -> Result<(), LudexError> {
    let mut rows = Vec::with_capacity(PLATFORMS.len());
    for platform in PLATFORMS {
        rows.push(PlatformStatus {
            platform,
            linked: app.store.get_credential(user, platform).await?.is_some(),
            games: app.store.list_entries(user, platform).await?.len(),
            last_synced: app.store.get_last_synced(user, platform).await?,
        });
    }

    if json {
        let rendered = serde_json::to_string_pretty(&rows)
            .map_err(|e| LudexError::Internal(format!("failed to serialize status: {e}")))?;
        println!("{rendered}");
    } else {
        println!("{:<8} {:<8} {:>6}  {}", "platform", "linked", "games", "last sync");
        for row in &rows {
            println!(
                "{:<8} {:<8} {:>6}  {}",
                row.platform.to_string(),
                if row.linked { "yes" } else { "no" },
                row.games,
                format_last_sync(row.last_synced),
            );
        }
    }
    Ok(())
}

fn format_last_sync(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never".to_string(),
    }
}
