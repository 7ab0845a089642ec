// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth session CRUD operations.
//!
//! Validity checks live in `learnflow-auth`; this module only moves rows.

use learnflow_core::LearnFlowError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::AuthSession;

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuthSession> {
    Ok(AuthSession {
        token: row.get(0)?,
        student_id: row.get(1)?,
        created_at: row.get(2)?,
        expires_at: row.get(3)?,
    })
}

/// Insert a new auth session.
pub async fn insert_session(db: &Database, session: &AuthSession) -> Result<(), LearnFlowError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO auth_sessions (token, student_id, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token,
                    session.student_id,
                    session.created_at,
                    session.expires_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by its opaque token.
pub async fn get_session(
    db: &Database,
    token: &str,
) -> Result<Option<AuthSession>, LearnFlowError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT token, student_id, created_at, expires_at
                 FROM auth_sessions WHERE token = ?1",
                params![token],
                row_to_session,
            );
            match result {
                Ok(session) => Ok(Some(session)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a session by token. Deleting an unknown token is a no-op.
pub async fn delete_session(db: &Database, token: &str) -> Result<(), LearnFlowError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM auth_sessions WHERE token = ?1", params![token])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every session whose expiry is at or before `now`.
///
/// Returns the number of rows removed.
pub async fn delete_expired(db: &Database, now: &str) -> Result<u64, LearnFlowError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM auth_sessions WHERE expires_at <= ?1",
                params![now],
            )?;
            Ok(removed as u64)
        })
        .await
        .map_err(map_tr_err)
}
