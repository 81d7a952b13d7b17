// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Ludex synchronization core.
//!
//! All seams use `#[async_trait]` for dynamic dispatch compatibility: the
//! orchestrator selects a [`PlatformClient`] by platform tag at runtime and
//! talks to persistence through [`LibraryStore`] and [`CredentialStore`].

pub mod client;
pub mod credentials;
pub mod store;

pub use client::PlatformClient;
pub use credentials::CredentialStore;
pub use store::{LibraryStore, NewCanonicalGame, NewLibraryEntry};
