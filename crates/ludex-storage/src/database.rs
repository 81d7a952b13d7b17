// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::debug;

use ludex_core::LudexError;

use crate::migrations;

/// Handle to the Ludex SQLite database.
///
/// Opening runs PRAGMA setup and all pending migrations.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if necessary) the database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LudexError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| LudexError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(map_tr_err)?;
        Self::setup(conn).await
    }

    /// Opens an in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, LudexError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(map_tr_err)?;
        Self::setup(conn).await
    }

    async fn setup(conn: tokio_rusqlite::Connection) -> Result<Self, LudexError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| {
            migrations::run_migrations(conn).map_err(|e| {
                rusqlite::Error::ToSqlConversionFailure(format!("migration: {e}").into())
            })
        })
        .await
        .map_err(map_tr_err)?;

        debug!("database open, migrations applied");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(&self) -> Result<(), LudexError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into the storage error variant.
pub fn map_tr_err<E>(err: E) -> LudexError
where
    E: std::error::Error + Send + Sync + 'static,
{
    LudexError::Storage {
        source: Box::new(err),
    }
}
