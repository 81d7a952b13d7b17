// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure reconciliation of remote state against stored library entries.
//!
//! [`reconcile`] builds a partial update (or a new-entry seed) without
//! touching storage; the orchestrator applies the result. Locked fields are
//! never written. Platform-native session ids are sync bookkeeping, not user
//! data, and are written regardless of locks.

use chrono::{DateTime, Utc};

use ludex_core::types::{
    LibraryEntryUpdate, LockedField, PlayStatus, RemoteGame, UserLibraryEntry,
};
use ludex_core::NewLibraryEntry;

/// Outcome of reconciling one remote record.
#[derive(Debug)]
pub enum EntryChange {
    /// No stored entry; insert this seed.
    Insert(NewLibraryEntry),
    /// Apply this partial update to the stored entry.
    Update {
        entry_id: i64,
        update: LibraryEntryUpdate,
    },
    /// Remote state matches the stored entry; nothing to write.
    Skip,
}

/// Remote playtime in whole minutes, to hours at one-decimal precision.
pub fn minutes_to_hours(minutes: u64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

fn is_complete(earned: Option<i64>, total: Option<i64>) -> bool {
    matches!((earned, total), (Some(e), Some(t)) if t > 0 && e == t)
}

/// Reconciles one remote record against the stored entry, if any.
///
/// Field order for existing entries: playtime and session bookkeeping,
/// then status, then achievement counts and completion, then last-played.
/// `completed_at` is set only on the transition into 100% completion, never
/// re-fired on later syncs that still report 100%.
pub fn reconcile(
    existing: Option<&UserLibraryEntry>,
    user_id: &str,
    game_id: i64,
    remote: &RemoteGame,
    now: DateTime<Utc>,
) -> EntryChange {
    let Some(entry) = existing else {
        return EntryChange::Insert(NewLibraryEntry {
            user_id: user_id.to_string(),
            game_id,
            platform: remote.platform,
            platform_label: remote.platform_label.clone(),
            session_id: Some(remote.stable_id.clone()),
            status: if remote.recently_played {
                PlayStatus::Playing
            } else {
                PlayStatus::Unplayed
            },
            completion_percentage: None,
            achievements_earned: remote.achievements_earned.map(i64::from),
            achievements_total: remote.achievements_total.map(i64::from),
            playtime_hours: remote.playtime_minutes.map(minutes_to_hours),
            last_played_at: remote.last_played_at,
        });
    };

    let mut update = LibraryEntryUpdate::default();

    // Bookkeeping, written regardless of locks.
    if entry.session_id.as_deref() != Some(remote.stable_id.as_str()) {
        update.session_id = Some(remote.stable_id.clone());
    }
    if entry.platform_label != remote.platform_label {
        update.platform_label = Some(remote.platform_label.clone());
    }

    if !entry.is_locked(LockedField::PlaytimeHours) {
        if let Some(minutes) = remote.playtime_minutes {
            let hours = minutes_to_hours(minutes);
            if entry.playtime_hours != Some(hours) {
                update.playtime_hours = Some(hours);
            }
        }
    }

    if !entry.is_locked(LockedField::Status)
        && remote.recently_played
        && entry.status != PlayStatus::Playing
    {
        update.status = Some(PlayStatus::Playing);
    }

    if !entry.is_locked(LockedField::Achievements)
        && !entry.is_locked(LockedField::CompletionPercentage)
    {
        if let (Some(remote_earned), Some(remote_total)) =
            (remote.achievements_earned, remote.achievements_total)
        {
            merge_counts(
                &mut update,
                entry,
                i64::from(remote_earned),
                i64::from(remote_total),
                now,
            );
        }
    }

    if !entry.is_locked(LockedField::LastPlayedAt) {
        if let Some(at) = remote.last_played_at {
            if entry.last_played_at != Some(at) {
                update.last_played_at = Some(at);
            }
        }
    }

    if update.is_empty() {
        EntryChange::Skip
    } else {
        EntryChange::Update {
            entry_id: entry.id,
            update,
        }
    }
}

/// Builds the lock-gated count update applied after an achievements fetch.
///
/// Returns an empty update when the achievement fields are locked or
/// nothing changed.
pub fn merge_achievement_counts(
    entry: &UserLibraryEntry,
    earned: i64,
    total: i64,
    now: DateTime<Utc>,
) -> LibraryEntryUpdate {
    let mut update = LibraryEntryUpdate::default();
    if entry.is_locked(LockedField::Achievements)
        || entry.is_locked(LockedField::CompletionPercentage)
    {
        return update;
    }
    merge_counts(&mut update, entry, earned, total, now);
    update
}

fn merge_counts(
    update: &mut LibraryEntryUpdate,
    entry: &UserLibraryEntry,
    remote_earned: i64,
    remote_total: i64,
    now: DateTime<Utc>,
) {
    // Earned counts never decrease, whatever the remote reports.
    let earned = remote_earned.max(entry.achievements_earned.unwrap_or(0));
    if entry.achievements_earned != Some(earned) {
        update.achievements_earned = Some(earned);
    }
    if entry.achievements_total != Some(remote_total) {
        update.achievements_total = Some(remote_total);
    }
    if remote_total > 0 {
        let completion = (earned as f64 / remote_total as f64) * 100.0;
        if entry.completion_percentage != Some(completion) {
            update.completion_percentage = Some(completion);
        }
    }

    let was_complete = is_complete(entry.achievements_earned, entry.achievements_total);
    if !was_complete && is_complete(Some(earned), Some(remote_total)) {
        update.completed_at = Some(now);
    }
}
