// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ludex game-library synchronizer.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Ludex workspace. Platform clients and the
//! storage backend implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LudexError;
pub use traits::{CredentialStore, LibraryStore, NewCanonicalGame, NewLibraryEntry, PlatformClient};
pub use types::{
    AchievementRecord, CanonicalGame, Credential, CredentialMaterial, LibraryEntryUpdate,
    LockedField, Platform, PlayStatus, RemoteAchievement, RemoteGame, RemoteProfile,
    SyncResult, TokenPair, UserLibraryEntry,
};
