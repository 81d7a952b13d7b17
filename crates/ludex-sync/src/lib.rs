// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync engine for Ludex: credential lifecycle, canonical-game identity
//! resolution, reconciliation of remote records against stored entries, the
//! per-platform sync orchestrator, and the achievement comparison engine.

pub mod compare;
pub mod credentials;
pub mod orchestrator;
pub mod reconcile;
pub mod resolver;

pub use compare::{AchievementComparisonEngine, ComparisonReport, ComparisonRow};
pub use credentials::CredentialLifecycle;
pub use orchestrator::SyncOrchestrator;
pub use reconcile::{minutes_to_hours, reconcile, EntryChange};
pub use resolver::{match_by_title, normalize_title, resolve_canonical_game};
