// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ludex compare` command implementation.

use crate::app::App;
use ludex_core::{LudexError, Platform};
use ludex_sync::{AchievementComparisonEngine, ComparisonReport, CredentialLifecycle};

/// Run the `ludex compare` command.
pub async fn run_compare(
    app: &App,
    user: &str,
    platform: Platform,
    friend: &str,
    title: &str,
    json: bool,
) -> Result<(), LudexError> {
    let client = app.client(platform)?;
    let lifecycle = CredentialLifecycle::with_buffer(
        app.store.clone(),
        app.config.psn.refresh_buffer_secs as i64,
    );
    let Some(credential) = lifecycle.get_valid_credential(client.as_ref(), user).await? else {
        return Err(LudexError::Auth {
            platform,
            message: format!("no valid credential; run `ludex link {platform} ...` first"),
        });
    };

    let report = AchievementComparisonEngine::new(client)
        .compare(&credential, friend, title)
        .await?;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| LudexError::Internal(format!("failed to serialize report: {e}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_report(&report, user));
    }
    Ok(())
}

fn render_report(report: &ComparisonReport, user: &str) -> String {
    let friend = report
        .friend
        .display_name
        .as_deref()
        .unwrap_or(&report.friend.external_id);
    let mut out = format!(
        "{} ({}): {user} {}/{} vs {friend} {}/{}\n",
        report.title,
        report.platform,
        report.mine_earned,
        report.mine_total,
        report.friend_earned,
        report.friend_total,
    );
    if let Some(note) = &report.note {
        out.push_str(&format!("  note: {note}\n"));
    }
    for row in &report.rows {
        out.push_str(&format!(
            "  [{}|{}] {}\n",
            if row.mine_unlocked { 'x' } else { ' ' },
            if row.friend_unlocked { 'x' } else { ' ' },
            row.name
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludex_core::types::RemoteProfile;
    use ludex_sync::ComparisonRow;

    fn report() -> ComparisonReport {
        ComparisonReport {
            platform: Platform::Xbox,
            title: "Halo Infinite".into(),
            friend: RemoteProfile {
                platform: Platform::Xbox,
                external_id: "2535400000000000".into(),
                display_name: Some("MajorNelson".into()),
                avatar_url: None,
            },
            rows: vec![ComparisonRow {
                platform_achievement_id: "1".into(),
                name: "First Contact".into(),
                description: None,
                rarity_percent: None,
                points: Some(10),
                mine_unlocked: true,
                mine_unlocked_at: None,
                friend_unlocked: false,
                friend_unlocked_at: None,
            }],
            mine_earned: 1,
            mine_total: 1,
            friend_earned: 0,
            friend_total: 1,
            note: None,
        }
    }

    #[test]
    fn render_shows_both_sides() {
        let rendered = render_report(&report(), "local");
        assert!(rendered.contains("local 1/1 vs MajorNelson 0/1"));
        assert!(rendered.contains("[x| ] First Contact"));
    }

    #[test]
    fn counts_only_note_is_rendered() {
        let mut report = report();
        report.rows.clear();
        report.note = Some("comparing totals only".into());
        let rendered = render_report(&report, "local");
        assert!(rendered.contains("note: comparing totals only"));
    }
}
