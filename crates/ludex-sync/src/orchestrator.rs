// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync orchestration: one state machine pass per (user, platform).
//!
//! `Idle -> FetchingLibrary -> ProcessingItems -> FetchingAchievements ->
//! Finalizing -> Done | Failed`. A top-level fetch failure fails the whole
//! pass with a single error; per-item failures are isolated and recorded
//! against the item. The last-sync timestamp is written only after every
//! item has been attempted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use ludex_core::types::{
    AchievementRecord, Platform, RemoteGame, SyncResult, UserLibraryEntry,
};
use ludex_core::{CredentialStore, LibraryStore, LudexError, PlatformClient};

use crate::credentials::CredentialLifecycle;
use crate::reconcile::{self, EntryChange};
use crate::resolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Idle,
    FetchingLibrary,
    ProcessingItems,
    FetchingAchievements,
    Finalizing,
    Done,
    Failed,
}

enum ItemOutcome {
    Added,
    Updated,
    Skipped,
}

/// Drives library syncs across the registered platform clients.
pub struct SyncOrchestrator {
    library: Arc<dyn LibraryStore>,
    credentials: Arc<dyn CredentialStore>,
    lifecycle: CredentialLifecycle,
    clients: HashMap<Platform, Arc<dyn PlatformClient>>,
}

impl SyncOrchestrator {
    pub fn new(library: Arc<dyn LibraryStore>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            library,
            lifecycle: CredentialLifecycle::new(credentials.clone()),
            credentials,
            clients: HashMap::new(),
        }
    }

    /// Like [`SyncOrchestrator::new`] with a configured proactive-refresh
    /// buffer in seconds.
    pub fn with_refresh_buffer(
        library: Arc<dyn LibraryStore>,
        credentials: Arc<dyn CredentialStore>,
        buffer_secs: i64,
    ) -> Self {
        Self {
            library,
            lifecycle: CredentialLifecycle::with_buffer(credentials.clone(), buffer_secs),
            credentials,
            clients: HashMap::new(),
        }
    }

    pub fn register_client(&mut self, client: Arc<dyn PlatformClient>) {
        self.clients.insert(client.platform(), client);
    }

    /// Syncs every linked platform for the user. Platforms are independent
    /// and run concurrently; the rate limiter is the only shared state.
    pub async fn sync_all(&self, user_id: &str) -> Vec<SyncResult> {
        let mut linked = Vec::new();
        for platform in self.clients.keys().copied() {
            match self.credentials.get_credential(user_id, platform).await {
                Ok(Some(_)) => linked.push(platform),
                Ok(None) => {}
                Err(e) => warn!(%platform, error = %e, "credential lookup failed"),
            }
        }
        linked.sort();
        futures::future::join_all(
            linked
                .into_iter()
                .map(|platform| self.sync_library(user_id, platform)),
        )
        .await
    }

    /// Runs one full sync pass. Always returns a [`SyncResult`]; failures
    /// land in its error list rather than an `Err`.
    pub async fn sync_library(&self, user_id: &str, platform: Platform) -> SyncResult {
        let mut state = SyncState::Idle;
        let Some(client) = self.clients.get(&platform) else {
            return SyncResult::failed(platform, format!("no client registered for {platform}"));
        };

        let credential = match self.lifecycle.get_valid_credential(client.as_ref(), user_id).await
        {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                return SyncResult::failed(
                    platform,
                    format!("no valid {platform} credential; link the account and retry"),
                );
            }
            Err(e) => return SyncResult::failed(platform, e.to_string()),
        };

        transition(&mut state, SyncState::FetchingLibrary, platform);
        let remote_games = match client.fetch_library(&credential).await {
            Ok(games) => games,
            Err(e) => {
                transition(&mut state, SyncState::Failed, platform);
                return SyncResult::failed(platform, e.to_string());
            }
        };

        let mut result = SyncResult::new(platform);
        result.total_remote = remote_games.len() as u32;
        let mut privacy_failures = 0u32;

        transition(&mut state, SyncState::ProcessingItems, platform);
        for remote in &remote_games {
            // Console library sync drops PC-only title-history entries; the
            // comparison engine sees them through its own fetch.
            if remote.pc_only {
                result.games_skipped += 1;
                continue;
            }

            let entry = match self.process_item(user_id, remote).await {
                Ok((outcome, entry)) => {
                    match outcome {
                        ItemOutcome::Added => result.games_added += 1,
                        ItemOutcome::Updated => result.games_updated += 1,
                        ItemOutcome::Skipped => result.games_skipped += 1,
                    }
                    entry
                }
                Err(e) => {
                    result.errors.push(format!("{}: {e}", remote.title));
                    continue;
                }
            };

            // Per-item achievements, skipped when the platform already told
            // us there are none. Failures never fail the owning item.
            if remote.achievements_total == Some(0) {
                continue;
            }
            transition(&mut state, SyncState::FetchingAchievements, platform);
            match client.fetch_achievements(&credential, &remote.stable_id).await {
                Ok(achievements) if !achievements.is_empty() => {
                    if let Err(e) = self.apply_achievements(&entry, &achievements).await {
                        result
                            .warnings
                            .push(format!("{}: achievements not stored: {e}", remote.title));
                    }
                }
                Ok(_) => {}
                Err(LudexError::Privacy { .. }) => privacy_failures += 1,
                Err(e) => {
                    result
                        .warnings
                        .push(format!("{}: achievements not synced: {e}", remote.title));
                }
            }
            transition(&mut state, SyncState::ProcessingItems, platform);
        }

        transition(&mut state, SyncState::Finalizing, platform);
        if privacy_failures > 0 {
            result.warnings.push(format!(
                "{privacy_failures} games had unreadable achievement data; check the platform's privacy settings"
            ));
        }
        if let Err(e) = self.library.set_last_synced(user_id, platform, Utc::now()).await {
            result.errors.push(format!("failed to record sync time: {e}"));
        }

        transition(&mut state, SyncState::Done, platform);
        info!(
            user_id, %platform,
            added = result.games_added, updated = result.games_updated,
            skipped = result.games_skipped, errors = result.errors.len(),
            "sync pass finished"
        );
        result
    }

    async fn process_item(
        &self,
        user_id: &str,
        remote: &RemoteGame,
    ) -> Result<(ItemOutcome, UserLibraryEntry), LudexError> {
        if remote.stable_id.is_empty() {
            return Err(LudexError::Validation(
                "remote record carries no stable id".into(),
            ));
        }

        let game = resolver::resolve_canonical_game(self.library.as_ref(), remote).await?;

        let existing = match self
            .library
            .find_entry_by_session_id(user_id, remote.platform, &remote.stable_id)
            .await?
        {
            Some(entry) => Some(entry),
            None => self.library.find_entry(user_id, game.id, remote.platform).await?,
        };

        match reconcile::reconcile(existing.as_ref(), user_id, game.id, remote, Utc::now()) {
            EntryChange::Insert(seed) => {
                let entry = self.library.insert_entry(&seed).await?;
                Ok((ItemOutcome::Added, entry))
            }
            EntryChange::Update { entry_id, update } => {
                self.library.update_entry(entry_id, &update).await?;
                let entry = self
                    .library
                    .find_entry(user_id, game.id, remote.platform)
                    .await?
                    .ok_or_else(|| {
                        LudexError::Internal(format!("entry {entry_id} vanished mid-sync"))
                    })?;
                Ok((ItemOutcome::Updated, entry))
            }
            EntryChange::Skip => {
                let entry = existing.ok_or_else(|| {
                    LudexError::Internal("skip outcome without an existing entry".into())
                })?;
                Ok((ItemOutcome::Skipped, entry))
            }
        }
    }

    /// Upserts the fetched achievement list and folds its counts back onto
    /// the entry, subject to locks.
    async fn apply_achievements(
        &self,
        entry: &UserLibraryEntry,
        achievements: &[ludex_core::types::RemoteAchievement],
    ) -> Result<(), LudexError> {
        for achievement in achievements {
            self.library
                .upsert_achievement(&AchievementRecord {
                    entry_id: entry.id,
                    platform_achievement_id: achievement.platform_achievement_id.clone(),
                    name: achievement.name.clone(),
                    description: achievement.description.clone(),
                    icon_url: achievement.icon_url.clone(),
                    unlocked: achievement.unlocked,
                    unlocked_at: achievement.unlocked_at,
                    rarity_percent: achievement.rarity_percent,
                    points: achievement.points,
                })
                .await?;
        }

        let earned = achievements.iter().filter(|a| a.unlocked).count() as i64;
        let total = achievements.len() as i64;
        let update = reconcile::merge_achievement_counts(entry, earned, total, Utc::now());
        if !update.is_empty() {
            self.library.update_entry(entry.id, &update).await?;
        }
        Ok(())
    }
}

fn transition(state: &mut SyncState, next: SyncState, platform: Platform) {
    debug!(%platform, from = ?state, to = ?next, "sync state transition");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta};
    use ludex_core::types::{
        Credential, CredentialMaterial, LockedField, PlayStatus, RemoteAchievement, TokenPair,
    };
    use ludex_storage::SqliteStore;
    use ludex_test_utils::{MockPlatformClient, RefreshBehavior};

    fn steam_credential() -> Credential {
        Credential {
            user_id: "local".into(),
            platform: Platform::Steam,
            material: CredentialMaterial::SteamId {
                steam_id: "76561198000000001".into(),
            },
        }
    }

    fn remote(platform: Platform, stable_id: &str, title: &str) -> RemoteGame {
        RemoteGame::new(platform, stable_id, title)
    }

    fn unlocked(id: &str, at: DateTime<Utc>) -> RemoteAchievement {
        RemoteAchievement {
            platform_achievement_id: id.into(),
            name: id.into(),
            description: None,
            icon_url: None,
            unlocked: true,
            unlocked_at: Some(at),
            rarity_percent: None,
            points: None,
        }
    }

    fn locked(id: &str) -> RemoteAchievement {
        RemoteAchievement {
            platform_achievement_id: id.into(),
            name: id.into(),
            description: None,
            icon_url: None,
            unlocked: false,
            unlocked_at: None,
            rarity_percent: None,
            points: None,
        }
    }

    async fn orchestrator_with(
        store: Arc<SqliteStore>,
        client: MockPlatformClient,
    ) -> SyncOrchestrator {
        let mut orchestrator = SyncOrchestrator::new(store.clone(), store);
        orchestrator.register_client(Arc::new(client));
        orchestrator
    }

    #[tokio::test]
    async fn fresh_steam_sync_adds_both_games() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let mut played = remote(Platform::Steam, "10", "Counter-Strike");
        played.playtime_minutes = Some(120);
        let fresh = remote(Platform::Steam, "20", "Team Fortress Classic");

        let client = MockPlatformClient::new(Platform::Steam)
            .with_library(vec![played, fresh])
            .with_achievements("20", vec![unlocked("ACH_WIN", Utc::now()), locked("ACH_LOSE")]);
        let orchestrator = orchestrator_with(store.clone(), client).await;

        let result = orchestrator.sync_library("local", Platform::Steam).await;
        assert_eq!(result.games_added, 2, "errors: {:?}", result.errors);
        assert!(result.errors.is_empty());

        let entries = store.list_entries("local", Platform::Steam).await.unwrap();
        assert_eq!(entries.len(), 2);
        let cs = entries.iter().find(|e| e.session_id.as_deref() == Some("10")).unwrap();
        assert_eq!(cs.playtime_hours, Some(2.0));
        let tfc = entries.iter().find(|e| e.session_id.as_deref() == Some("20")).unwrap();
        assert_eq!(tfc.achievements_earned, Some(1));
        assert_eq!(tfc.achievements_total, Some(2));
        assert_eq!(tfc.completion_percentage, Some(50.0));
        assert_eq!(tfc.status, PlayStatus::Unplayed);
    }

    #[tokio::test]
    async fn syncing_twice_is_idempotent() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let mut game = remote(Platform::Steam, "10", "Counter-Strike");
        game.playtime_minutes = Some(120);
        let client = MockPlatformClient::new(Platform::Steam).with_library(vec![game]);
        let orchestrator = orchestrator_with(store.clone(), client).await;

        let first = orchestrator.sync_library("local", Platform::Steam).await;
        assert_eq!(first.games_added, 1);
        let after_first = store.list_entries("local", Platform::Steam).await.unwrap();

        let second = orchestrator.sync_library("local", Platform::Steam).await;
        assert_eq!(second.games_added, 0);
        assert_eq!(second.games_skipped, 1);

        let after_second = store.list_entries("local", Platform::Steam).await.unwrap();
        assert_eq!(after_second.len(), 1, "no duplicate entries");
        assert_eq!(after_first[0].playtime_hours, after_second[0].playtime_hours);
        assert_eq!(after_first[0].status, after_second[0].status);
    }

    #[tokio::test]
    async fn one_bad_item_does_not_abort_the_batch() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let bad = remote(Platform::Steam, "", "Corrupted Record");
        let client = MockPlatformClient::new(Platform::Steam).with_library(vec![
            remote(Platform::Steam, "10", "Counter-Strike"),
            bad,
            remote(Platform::Steam, "30", "Day of Defeat"),
        ]);
        let orchestrator = orchestrator_with(store.clone(), client).await;

        let result = orchestrator.sync_library("local", Platform::Steam).await;
        assert_eq!(result.games_added, 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Corrupted Record"));
        assert_eq!(store.list_entries("local", Platform::Steam).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reaching_full_completion_sets_completed_at() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store
            .save_credential(&Credential {
                user_id: "local".into(),
                platform: Platform::Xbox,
                material: CredentialMaterial::ApiKey { api_key: "k".into() },
            })
            .await
            .unwrap();

        let mut partial = remote(Platform::Xbox, "1144039928", "Halo Infinite");
        partial.achievements_earned = Some(11);
        partial.achievements_total = Some(12);
        let client = MockPlatformClient::new(Platform::Xbox).with_library(vec![partial.clone()]);
        let orchestrator = orchestrator_with(store.clone(), client).await;
        orchestrator.sync_library("local", Platform::Xbox).await;

        let entries = store.list_entries("local", Platform::Xbox).await.unwrap();
        assert!(entries[0].completed_at.is_none());

        let mut complete = partial;
        complete.achievements_earned = Some(12);
        let client = MockPlatformClient::new(Platform::Xbox).with_library(vec![complete]);
        let orchestrator = orchestrator_with(store.clone(), client).await;
        let result = orchestrator.sync_library("local", Platform::Xbox).await;
        assert_eq!(result.games_updated, 1);

        let entries = store.list_entries("local", Platform::Xbox).await.unwrap();
        assert_eq!(entries[0].achievements_earned, Some(12));
        assert!(entries[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn locked_fields_survive_sync() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let mut game = remote(Platform::Steam, "10", "Counter-Strike");
        game.playtime_minutes = Some(60);
        let client = MockPlatformClient::new(Platform::Steam).with_library(vec![game.clone()]);
        let orchestrator = orchestrator_with(store.clone(), client).await;
        orchestrator.sync_library("local", Platform::Steam).await;

        let entry = &store.list_entries("local", Platform::Steam).await.unwrap()[0];
        store
            .set_locked_fields(entry.id, &[LockedField::PlaytimeHours].into())
            .await
            .unwrap();

        game.playtime_minutes = Some(6000);
        let client = MockPlatformClient::new(Platform::Steam).with_library(vec![game]);
        let orchestrator = orchestrator_with(store.clone(), client).await;
        orchestrator.sync_library("local", Platform::Steam).await;

        let entry = &store.list_entries("local", Platform::Steam).await.unwrap()[0];
        assert_eq!(entry.playtime_hours, Some(1.0), "locked playtime must not move");
    }

    #[tokio::test]
    async fn pc_only_titles_are_skipped_in_console_sync() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store
            .save_credential(&Credential {
                user_id: "local".into(),
                platform: Platform::Xbox,
                material: CredentialMaterial::ApiKey { api_key: "k".into() },
            })
            .await
            .unwrap();

        let mut pc = remote(Platform::Xbox, "414700", "Outlast");
        pc.pc_only = true;
        let client = MockPlatformClient::new(Platform::Xbox)
            .with_library(vec![pc, remote(Platform::Xbox, "1144039928", "Halo Infinite")]);
        let orchestrator = orchestrator_with(store.clone(), client).await;

        let result = orchestrator.sync_library("local", Platform::Xbox).await;
        assert_eq!(result.games_added, 1);
        assert_eq!(result.games_skipped, 1);
        let entries = store.list_entries("local", Platform::Xbox).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_id.as_deref(), Some("1144039928"));
    }

    #[tokio::test]
    async fn top_level_fetch_failure_fails_the_pass() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let client = MockPlatformClient::new(Platform::Steam).with_library_error(|| {
            LudexError::Auth {
                platform: Platform::Steam,
                message: "key revoked".into(),
            }
        });
        let orchestrator = orchestrator_with(store.clone(), client).await;

        let result = orchestrator.sync_library("local", Platform::Steam).await;
        assert!(result.is_failure());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.games_added + result.games_updated + result.games_skipped, 0);
        assert!(store.get_last_synced("local", Platform::Steam).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_credential_refresh_yields_a_single_auth_error() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store
            .save_credential(&Credential {
                user_id: "local".into(),
                platform: Platform::Psn,
                material: CredentialMaterial::OAuthTokens(TokenPair {
                    access_token: "stale".into(),
                    refresh_token: "stale-refresh".into(),
                    // Two minutes out, inside the refresh buffer.
                    expires_at: Utc::now() + TimeDelta::minutes(2),
                    refresh_expires_at: None,
                    account_id: None,
                }),
            })
            .await
            .unwrap();

        let client = MockPlatformClient::new(Platform::Psn)
            .with_library(vec![remote(Platform::Psn, "NPWR1_00", "Some Game")])
            .with_refresh(RefreshBehavior::Fail);
        let orchestrator = orchestrator_with(store.clone(), client).await;

        let result = orchestrator.sync_library("local", Platform::Psn).await;
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("credential"), "got: {:?}", result.errors);
        assert!(store.list_entries("local", Platform::Psn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn privacy_failures_batch_into_one_warning() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let privacy = || LudexError::Privacy {
            platform: Platform::Steam,
            message: "game details hidden".into(),
            remediation: "set Game Details to Public".into(),
        };
        let client = MockPlatformClient::new(Platform::Steam)
            .with_library(vec![
                remote(Platform::Steam, "10", "Counter-Strike"),
                remote(Platform::Steam, "20", "Team Fortress Classic"),
            ])
            .with_achievement_error("10", privacy)
            .with_achievement_error("20", privacy);
        let orchestrator = orchestrator_with(store.clone(), client).await;

        let result = orchestrator.sync_library("local", Platform::Steam).await;
        assert_eq!(result.games_added, 2);
        assert!(result.errors.is_empty(), "privacy issues are warnings, not errors");
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("2 games had unreadable achievement data")));
    }

    #[tokio::test]
    async fn unlocked_achievements_never_relock() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let game = remote(Platform::Steam, "10", "Counter-Strike");
        let unlock_time = Utc::now();
        let client = MockPlatformClient::new(Platform::Steam)
            .with_library(vec![game.clone()])
            .with_achievements("10", vec![unlocked("ACH_WIN", unlock_time)]);
        let orchestrator = orchestrator_with(store.clone(), client).await;
        orchestrator.sync_library("local", Platform::Steam).await;

        // The remote now claims the achievement is locked again.
        let client = MockPlatformClient::new(Platform::Steam)
            .with_library(vec![game])
            .with_achievements("10", vec![locked("ACH_WIN")]);
        let orchestrator = orchestrator_with(store.clone(), client).await;
        orchestrator.sync_library("local", Platform::Steam).await;

        let entry = &store.list_entries("local", Platform::Steam).await.unwrap()[0];
        let achievements = store.list_achievements(entry.id).await.unwrap();
        assert_eq!(achievements.len(), 1);
        assert!(achievements[0].unlocked, "unlock state is monotonic");
    }

    #[tokio::test]
    async fn sync_all_covers_only_linked_platforms() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        store.save_credential(&steam_credential()).await.unwrap();

        let steam = MockPlatformClient::new(Platform::Steam)
            .with_library(vec![remote(Platform::Steam, "10", "Counter-Strike")]);
        let xbox = MockPlatformClient::new(Platform::Xbox);
        let mut orchestrator = SyncOrchestrator::new(store.clone(), store.clone());
        orchestrator.register_client(Arc::new(steam));
        orchestrator.register_client(Arc::new(xbox));

        let results = orchestrator.sync_all("local").await;
        assert_eq!(results.len(), 1, "xbox is not linked");
        assert_eq!(results[0].platform, Some(Platform::Steam));
        assert_eq!(results[0].games_added, 1);
    }
}
