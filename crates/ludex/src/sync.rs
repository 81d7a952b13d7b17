// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ludex sync` command implementation.

use crate::app::App;
use ludex_core::types::SyncResult;
use ludex_core::{LudexError, Platform};

/// Run the `ludex sync` command.
pub async fn run_sync(
    app: &App,
    user: &str,
    platform: Option<Platform>,
    all: bool,
) -> Result<(), LudexError> {
    let orchestrator = app.orchestrator();
    let results = match platform {
        Some(platform) if !all => {
            // Surface the Steam-without-api-key case up front instead of as
            // an unregistered-client sync failure.
            app.client(platform)?;
            vec![orchestrator.sync_library(user, platform).await]
        }
        _ => orchestrator.sync_all(user).await,
    };

    if results.is_empty() {
        println!("no linked platforms; run `ludex link` first");
        return Ok(());
    }
    for result in &results {
        print!("{}", render_result(result));
    }
    if results.iter().any(SyncResult::is_failure) {
        return Err(LudexError::api("one or more platforms failed to sync"));
    }
    Ok(())
}

fn render_result(result: &SyncResult) -> String {
    let platform = result
        .platform
        .map(|p| p.to_string())
        .unwrap_or_else(|| "unknown".into());
    let mut out = format!(
        "{platform}: {} added, {} updated, {} skipped ({} remote)\n",
        result.games_added, result.games_updated, result.games_skipped, result.total_remote
    );
    for warning in &result.warnings {
        out.push_str(&format!("  warning: {warning}\n"));
    }
    for error in &result.errors {
        out.push_str(&format!("  error: {error}\n"));
    }
    out
}
