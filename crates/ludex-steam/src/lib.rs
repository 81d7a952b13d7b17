// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Steam platform client for Ludex.

pub mod client;
pub mod types;

pub use client::{SteamClient, validate_steam_id};
