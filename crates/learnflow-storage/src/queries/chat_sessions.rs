// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session container operations.

use learnflow_core::LearnFlowError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::ChatSession;

pub(crate) fn row_to_chat_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatSession> {
    Ok(ChatSession {
        id: row.get(0)?,
        student_id: row.get(1)?,
        topic: row.get(2)?,
        agent_kind: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
        created_at: row.get(5)?,
        ended_at: row.get(6)?,
    })
}

const SESSION_COLUMNS: &str = "id, student_id, topic, agent_kind, is_active, created_at, ended_at";

/// Insert a fresh chat session and return the stored row.
pub async fn create_chat_session(
    db: &Database,
    id: &str,
    student_id: i64,
    topic: Option<&str>,
    agent_kind: &str,
) -> Result<ChatSession, LearnFlowError> {
    let id = id.to_string();
    let topic = topic.map(|t| t.to_string());
    let agent_kind = agent_kind.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chat_sessions (id, student_id, topic, agent_kind, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, 1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![id, student_id, topic, agent_kind],
            )?;
            let session = conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = ?1"),
                params![id],
                row_to_chat_session,
            )?;
            Ok(session)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a chat session by ID.
pub async fn get_chat_session(
    db: &Database,
    id: &str,
) -> Result<Option<ChatSession>, LearnFlowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = ?1"),
                params![id],
                row_to_chat_session,
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

/// List a student's chat sessions, newest first.
pub async fn list_for_student(
    db: &Database,
    student_id: i64,
    limit: i64,
) -> Result<Vec<ChatSession>, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM chat_sessions
                 WHERE student_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![student_id, limit], row_to_chat_session)?;
            let mut sessions = Vec::new();
            for row in rows {
                sessions.push(row?);
            }
            Ok(sessions)
        })
        .await
        .map_err(map_tr_err)
}

/// Close a chat session.
///
/// Idempotent: `ended_at` is set only on the first call; later calls leave
/// the row untouched. Returns the row after the update, or `None` if no such
/// session exists.
pub async fn close_chat_session(
    db: &Database,
    id: &str,
) -> Result<Option<ChatSession>, LearnFlowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE chat_sessions
                 SET is_active = 0,
                     ended_at = COALESCE(ended_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 WHERE id = ?1",
                params![id],
            )?;
            let result = conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = ?1"),
                params![id],
                row_to_chat_session,
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
