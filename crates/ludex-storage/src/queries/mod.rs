// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table group.

pub mod achievements;
pub mod credentials;
pub mod games;
pub mod library;
pub mod sync_status;
