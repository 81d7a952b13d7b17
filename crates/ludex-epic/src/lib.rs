// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Epic Games Store platform client for Ludex.

pub mod client;
pub mod types;

pub use client::{EpicClient, is_non_game_title, looks_like_internal_id};
