// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat message append and transcript reads.
//!
//! Appends run inside a single transaction on the background writer, which
//! is what guarantees the per-session monotonic timestamp invariant: no two
//! appends for the same session can interleave between the MAX read and the
//! INSERT.

use learnflow_core::LearnFlowError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::ChatMessage;

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        metadata: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const MESSAGE_COLUMNS: &str = "id, session_id, role, content, metadata, created_at";

/// Append a message to an open chat session and return the stored row.
///
/// The stored `created_at` is `max(now, latest created_at in the session)`,
/// so timestamps never run backwards even if the wall clock does.
///
/// Fails with [`LearnFlowError::NotFound`] when the session does not exist
/// and [`LearnFlowError::SessionClosed`] when it has been closed.
pub async fn append_message(
    db: &Database,
    id: &str,
    session_id: &str,
    role: &str,
    content: &str,
    metadata: Option<&str>,
) -> Result<ChatMessage, LearnFlowError> {
    let id = id.to_string();
    let session_id = session_id.to_string();
    let role = role.to_string();
    let content = content.to_string();
    let metadata = metadata.map(|m| m.to_string());
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let is_active: Option<i64> = tx
                .query_row(
                    "SELECT is_active FROM chat_sessions WHERE id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()?;
            match is_active {
                None => {
                    return Ok(Err(LearnFlowError::NotFound(format!(
                        "chat session {session_id}"
                    ))));
                }
                Some(0) => {
                    return Ok(Err(LearnFlowError::SessionClosed {
                        session_id: session_id.clone(),
                    }));
                }
                Some(_) => {}
            }

            let now: String = tx.query_row(
                "SELECT strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                [],
                |row| row.get(0),
            )?;
            let latest: Option<String> = tx.query_row(
                "SELECT MAX(created_at) FROM chat_messages WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            // Clamp to the latest stored timestamp; RFC 3339 strings with a
            // fixed format compare lexicographically in time order.
            let created_at = match latest {
                Some(latest) if latest > now => latest,
                _ => now,
            };

            tx.execute(
                "INSERT INTO chat_messages (id, session_id, role, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, session_id, role, content, metadata, created_at],
            )?;
            tx.commit()?;

            Ok(Ok(ChatMessage {
                id,
                session_id,
                role,
                content,
                metadata,
                created_at,
            }))
        })
        .await
        .map_err(map_tr_err)?
}

/// Get messages for a session in chronological order.
pub async fn get_messages_for_session(
    db: &Database,
    session_id: &str,
    limit: Option<i64>,
) -> Result<Vec<ChatMessage>, LearnFlowError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM chat_messages
                         WHERE session_id = ?1
                         ORDER BY created_at ASC, rowid ASC
                         LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![session_id, lim], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM chat_messages
                         WHERE session_id = ?1
                         ORDER BY created_at ASC, rowid ASC"
                    ))?;
                    let rows = stmt.query_map(params![session_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Get the most recent `limit` messages, returned in chronological order
/// (oldest first) for use as model context.
pub async fn recent_messages(
    db: &Database,
    session_id: &str,
    limit: i64,
) -> Result<Vec<ChatMessage>, LearnFlowError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM chat_messages
                 WHERE session_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![session_id, limit], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            // Reverse back into chronological order.
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{chat_sessions, students};
    use tempfile::tempdir;

    async fn setup_session() -> (Database, String, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let student =
            students::create_student(&db, "pub-1", "s@example.com", "S", "hash", None)
                .await
                .unwrap();
        let session =
            chat_sessions::create_chat_session(&db, "cs-1", student.id, None, "general")
                .await
                .unwrap();
        (db, session.id, dir)
    }

    #[tokio::test]
    async fn append_and_read_back_in_order() {
        let (db, sid, _dir) = setup_session().await;

        append_message(&db, "m1", &sid, "user", "what is a for loop?", None)
            .await
            .unwrap();
        append_message(&db, "m2", &sid, "assistant", "a loop that iterates", None)
            .await
            .unwrap();

        let messages = get_messages_for_session(&db, &sid, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
        assert!(messages[0].created_at <= messages[1].created_at);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn timestamps_never_decrease() {
        let (db, sid, _dir) = setup_session().await;

        let mut previous = String::new();
        for i in 0..5 {
            let msg = append_message(&db, &format!("m{i}"), &sid, "user", "hi", None)
                .await
                .unwrap();
            assert!(msg.created_at >= previous, "timestamp went backwards");
            previous = msg.created_at;
        }

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_clamps_to_latest_stored_timestamp() {
        let (db, sid, _dir) = setup_session().await;

        // Plant a message from the future; the next append must not
        // produce a smaller timestamp.
        let future = "2099-01-01T00:00:00.000Z";
        db.connection()
            .call({
                let sid = sid.clone();
                move |conn| -> Result<(), rusqlite::Error> {
                    conn.execute(
                        "INSERT INTO chat_messages (id, session_id, role, content, created_at)
                         VALUES ('mf', ?1, 'user', 'from the future', ?2)",
                        params![sid, future],
                    )?;
                    Ok(())
                }
            })
            .await
            .unwrap();

        let msg = append_message(&db, "m1", &sid, "assistant", "reply", None)
            .await
            .unwrap();
        assert_eq!(msg.created_at, future);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_to_closed_session_fails() {
        let (db, sid, _dir) = setup_session().await;

        chat_sessions::close_chat_session(&db, &sid).await.unwrap();
        let err = append_message(&db, "m1", &sid, "user", "hello?", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LearnFlowError::SessionClosed { .. }));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn append_to_unknown_session_fails() {
        let (db, _sid, _dir) = setup_session().await;

        let err = append_message(&db, "m1", "no-such-session", "user", "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LearnFlowError::NotFound(_)));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_messages_returns_last_n_chronologically() {
        let (db, sid, _dir) = setup_session().await;

        for i in 0..5 {
            append_message(&db, &format!("m{i}"), &sid, "user", &format!("msg {i}"), None)
                .await
                .unwrap();
        }

        let recent = recent_messages(&db, &sid, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "msg 2");
        assert_eq!(recent[2].content, "msg 4");

        // Fewer stored than requested: return them all.
        let all = recent_messages(&db, &sid, 50).await.unwrap();
        assert_eq!(all.len(), 5);

        db.close().await.unwrap();
    }
}
