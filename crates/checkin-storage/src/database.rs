// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes: claims and
//! status compare-and-swap rely on that serialization.

use checkin_core::CheckinError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Handle to the single SQLite writer connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, CheckinError> {
        Self::open_with(path, true).await
    }

    /// Open the database with an explicit journal mode choice.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, CheckinError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CheckinError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| CheckinError::Storage {
                source: Box::new(e),
            })?;
        Self::prepare(conn, wal_mode).await
    }

    /// Open a private in-memory database with migrations applied.
    pub async fn open_in_memory() -> Result<Self, CheckinError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| CheckinError::Storage {
                source: Box::new(e),
            })?;
        Self::prepare(conn, false).await
    }

    async fn prepare(
        conn: tokio_rusqlite::Connection,
        wal_mode: bool,
    ) -> Result<Self, CheckinError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<_, rusqlite::Error> { Ok(run_migrations(conn)) })
            .await
            .map_err(map_tr_err)??;

        debug!(wal_mode, "database opened and migrated");
        Ok(Self { conn })
    }

    /// The underlying async connection. Query modules call through this.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), CheckinError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(|e| CheckinError::Storage {
            source: Box::new(e),
        })
    }
}

/// Map a tokio-rusqlite call error into the crate error type.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CheckinError {
    CheckinError::Storage {
        source: Box::new(e),
    }
}
