// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Xbox Live platform client for Ludex.

pub mod client;
pub mod types;

pub use client::XboxClient;
