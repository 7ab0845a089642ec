// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The [`Database`] struct IS the single writer: query modules
//! accept `&Database` and go through `connection().call()`. Do NOT create
//! additional `Connection` instances for writes.

use learnflow_core::LearnFlowError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Cheap to clone; all clones share the same background writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (or creates) the database at `path` with WAL mode enabled and
    /// runs all pending migrations.
    pub async fn open(path: &str) -> Result<Self, LearnFlowError> {
        Self::open_with_options(path, true).await
    }

    /// Opens the database from a [`learnflow_config::model::StorageConfig`].
    pub async fn from_config(
        config: &learnflow_config::model::StorageConfig,
    ) -> Result<Self, LearnFlowError> {
        Self::open_with_options(&config.database_path, config.wal_mode).await
    }

    /// Opens the database with explicit journal-mode selection.
    pub async fn open_with_options(path: &str, wal_mode: bool) -> Result<Self, LearnFlowError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| LearnFlowError::Storage {
                source: Box::new(e),
            })?;

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

        conn.call(
            |conn| -> Result<Result<(), refinery::Error>, rusqlite::Error> {
                Ok(migrations::run_migrations(conn))
            },
        )
        .await
        .map_err(map_tr_err)?
        .map_err(|e| LearnFlowError::Storage {
            source: Box::new(e),
        })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Returns the shared connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flushes the WAL back into the main database file.
    ///
    /// The connection itself is closed when the last handle drops.
    pub async fn close(&self) -> Result<(), LearnFlowError> {
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
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error) -> LearnFlowError {
    LearnFlowError::Storage {
        source: Box::new(err),
    }
}

/// True when the error is a SQLite uniqueness/constraint violation.
///
/// Used inside `call` closures, where the raw rusqlite error is available,
/// to turn duplicate-key inserts into domain conflicts.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
