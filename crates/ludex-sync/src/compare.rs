// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Head-to-head achievement comparison between the local user and a friend.
//!
//! Orthogonal to the sync path: everything is fetched live from the platform
//! client, nothing is persisted. The two users share no library rows, so the
//! target title is located independently in each library by fuzzy match.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use ludex_core::types::{Platform, RemoteAchievement, RemoteGame, RemoteProfile};
use ludex_core::{Credential, LudexError, PlatformClient};

use crate::resolver;

/// One achievement annotated with both users' unlock state.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub platform_achievement_id: String,
    pub name: String,
    pub description: Option<String>,
    pub rarity_percent: Option<f64>,
    pub points: Option<i64>,
    pub mine_unlocked: bool,
    pub mine_unlocked_at: Option<chrono::DateTime<chrono::Utc>>,
    pub friend_unlocked: bool,
    pub friend_unlocked_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// The outcome of one comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub platform: Platform,
    pub title: String,
    pub friend: RemoteProfile,
    /// Per-achievement rows, empty when only counts are available.
    pub rows: Vec<ComparisonRow>,
    pub mine_earned: u32,
    pub mine_total: u32,
    pub friend_earned: u32,
    pub friend_total: u32,
    /// Set when the platform exposes no per-achievement breakdown and the
    /// report fell back to aggregate counts.
    pub note: Option<String>,
}

/// Compares achievement progress for one title between the credential's
/// owner and a searched-for friend.
pub struct AchievementComparisonEngine {
    client: Arc<dyn PlatformClient>,
}

impl AchievementComparisonEngine {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    pub async fn compare(
        &self,
        credential: &Credential,
        friend_query: &str,
        title: &str,
    ) -> Result<ComparisonReport, LudexError> {
        let friend = self.client.search_player(credential, friend_query).await?;
        debug!(
            platform = %self.client.platform(),
            friend = friend.external_id,
            "resolved friend for comparison"
        );

        let my_library = self.client.fetch_library(credential).await?;
        let friend_library = self
            .client
            .fetch_library_for(credential, &friend.external_id)
            .await?;

        let mine = resolver::match_by_title(&my_library, title, |g| g.title.as_str())
            .ok_or_else(|| LudexError::NotFound(format!("`{title}` in your library")))?;
        let theirs = resolver::match_by_title(&friend_library, title, |g| g.title.as_str())
            .ok_or_else(|| {
                LudexError::NotFound(format!(
                    "`{title}` in {}'s library",
                    friend.display_name.as_deref().unwrap_or(friend_query)
                ))
            })?;

        let my_achievements = self
            .client
            .fetch_achievements(credential, &mine.stable_id)
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "own achievement list unavailable");
                Vec::new()
            });
        let friend_achievements = self
            .client
            .fetch_achievements_for(credential, &friend.external_id, &theirs.stable_id)
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "friend achievement list unavailable");
                Vec::new()
            });

        if my_achievements.is_empty() && friend_achievements.is_empty() {
            return Ok(counts_only_report(mine, theirs, friend));
        }

        Ok(merged_report(mine, friend, my_achievements, friend_achievements))
    }
}

fn counts_only_report(
    mine: &RemoteGame,
    theirs: &RemoteGame,
    friend: RemoteProfile,
) -> ComparisonReport {
    ComparisonReport {
        platform: mine.platform,
        title: mine.title.clone(),
        friend,
        rows: Vec::new(),
        mine_earned: mine.achievements_earned.unwrap_or(0),
        mine_total: mine.achievements_total.unwrap_or(0),
        friend_earned: theirs.achievements_earned.unwrap_or(0),
        friend_total: theirs.achievements_total.unwrap_or(0),
        note: Some(
            "per-achievement data is not available for this title; comparing totals only"
                .to_string(),
        ),
    }
}

fn merged_report(
    mine: &RemoteGame,
    friend: RemoteProfile,
    my_achievements: Vec<RemoteAchievement>,
    friend_achievements: Vec<RemoteAchievement>,
) -> ComparisonReport {
    // Merge by platform achievement id; either side may carry definitions
    // the other lacks.
    let mut rows: Vec<ComparisonRow> = my_achievements
        .iter()
        .map(|a| ComparisonRow {
            platform_achievement_id: a.platform_achievement_id.clone(),
            name: a.name.clone(),
            description: a.description.clone(),
            rarity_percent: a.rarity_percent,
            points: a.points,
            mine_unlocked: a.unlocked,
            mine_unlocked_at: a.unlocked_at,
            friend_unlocked: false,
            friend_unlocked_at: None,
        })
        .collect();

    for theirs_a in &friend_achievements {
        match rows
            .iter_mut()
            .find(|r| r.platform_achievement_id == theirs_a.platform_achievement_id)
        {
            Some(row) => {
                row.friend_unlocked = theirs_a.unlocked;
                row.friend_unlocked_at = theirs_a.unlocked_at;
            }
            None => rows.push(ComparisonRow {
                platform_achievement_id: theirs_a.platform_achievement_id.clone(),
                name: theirs_a.name.clone(),
                description: theirs_a.description.clone(),
                rarity_percent: theirs_a.rarity_percent,
                points: theirs_a.points,
                mine_unlocked: false,
                mine_unlocked_at: None,
                friend_unlocked: theirs_a.unlocked,
                friend_unlocked_at: theirs_a.unlocked_at,
            }),
        }
    }

    let mine_earned = rows.iter().filter(|r| r.mine_unlocked).count() as u32;
    let friend_earned = rows.iter().filter(|r| r.friend_unlocked).count() as u32;
    let total = rows.len() as u32;
    ComparisonReport {
        platform: mine.platform,
        title: mine.title.clone(),
        friend,
        mine_earned,
        mine_total: total,
        friend_earned,
        friend_total: total,
        rows,
        note: None,
    }
}
