// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session lifecycle: OPEN -> CLOSED, with ordered message appends.
//!
//! Sessions never reopen. Appends inherit the storage layer's monotonic
//! timestamp guarantee, so a transcript read back in `created_at` order is
//! deterministic.

use learnflow_core::LearnFlowError;
use learnflow_core::types::{ChatMessage, ChatSession, MessageRole};
use learnflow_storage::Database;
use learnflow_storage::queries::{chat_messages, chat_sessions};
use tracing::{debug, info};

use crate::persona::AgentKind;

/// Manages conversation containers and their transcripts.
///
/// Cheap to clone; clones share the same database handle.
#[derive(Clone)]
pub struct ChatService {
    db: Database,
}

impl ChatService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open a fresh chat session.
    ///
    /// Always creates a new record; prior sessions for the same student and
    /// topic are never reused or merged.
    pub async fn open(
        &self,
        student_id: i64,
        topic: Option<&str>,
        agent_kind: AgentKind,
    ) -> Result<ChatSession, LearnFlowError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = chat_sessions::create_chat_session(
            &self.db,
            &id,
            student_id,
            topic,
            &agent_kind.to_string(),
        )
        .await?;
        info!(session_id = %session.id, student_id, agent_kind = %agent_kind, "chat session opened");
        Ok(session)
    }

    /// Append a message to an open session.
    ///
    /// Fails with [`LearnFlowError::SessionClosed`] once the session has
    /// been closed, and [`LearnFlowError::NotFound`] if it never existed.
    pub async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<ChatMessage, LearnFlowError> {
        if content.trim().is_empty() {
            return Err(LearnFlowError::Validation(
                "message content must not be empty".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let metadata = metadata.map(|m| m.to_string());
        let message = chat_messages::append_message(
            &self.db,
            &id,
            session_id,
            &role.to_string(),
            content,
            metadata.as_deref(),
        )
        .await?;
        debug!(session_id, role = %role, "message appended");
        Ok(message)
    }

    /// Close a session. Idempotent: the end timestamp is set by the first
    /// call only; later calls are no-ops.
    pub async fn close(&self, session_id: &str) -> Result<ChatSession, LearnFlowError> {
        let Some(session) = chat_sessions::close_chat_session(&self.db, session_id).await? else {
            return Err(LearnFlowError::NotFound(format!("chat session {session_id}")));
        };
        info!(session_id, "chat session closed");
        Ok(session)
    }

    /// The most recent `limit` messages in chronological order (oldest
    /// first), ready to be used as model context.
    pub async fn recent_context(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, LearnFlowError> {
        chat_messages::recent_messages(&self.db, session_id, i64::from(limit)).await
    }

    /// Full transcript in chronological order, optionally capped.
    pub async fn transcript(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, LearnFlowError> {
        chat_messages::get_messages_for_session(&self.db, session_id, limit).await
    }

    /// Look up a session by ID.
    pub async fn get(&self, session_id: &str) -> Result<Option<ChatSession>, LearnFlowError> {
        chat_sessions::get_chat_session(&self.db, session_id).await
    }

    /// A student's sessions, newest first.
    pub async fn list_for_student(
        &self,
        student_id: i64,
        limit: i64,
    ) -> Result<Vec<ChatSession>, LearnFlowError> {
        chat_sessions::list_for_student(&self.db, student_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnflow_storage::queries::students;
    use tempfile::tempdir;

    async fn setup() -> (ChatService, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let student =
            students::create_student(&db, "pub-1", "s@example.com", "S", "hash", None)
                .await
                .unwrap();
        (ChatService::new(db), student.id, dir)
    }

    #[tokio::test]
    async fn open_always_creates_a_fresh_session() {
        let (chat, student_id, _dir) = setup().await;

        let first = chat
            .open(student_id, Some("loops"), AgentKind::General)
            .await
            .unwrap();
        let second = chat
            .open(student_id, Some("loops"), AgentKind::General)
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let sessions = chat.list_for_student(student_id, 10).await.unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[tokio::test]
    async fn closed_session_rejects_appends_and_close_stays_idempotent() {
        let (chat, student_id, _dir) = setup().await;

        let session = chat.open(student_id, None, AgentKind::Debug).await.unwrap();
        chat.append_message(&session.id, MessageRole::User, "hello", None)
            .await
            .unwrap();

        let closed = chat.close(&session.id).await.unwrap();
        let ended_at = closed.ended_at.clone().unwrap();

        let err = chat
            .append_message(&session.id, MessageRole::User, "anyone?", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LearnFlowError::SessionClosed { .. }));

        // Second close neither errors nor moves the end timestamp.
        let again = chat.close(&session.id).await.unwrap();
        assert_eq!(again.ended_at.as_deref(), Some(ended_at.as_str()));
    }

    #[tokio::test]
    async fn transcript_order_is_monotonic() {
        let (chat, student_id, _dir) = setup().await;

        let session = chat.open(student_id, None, AgentKind::General).await.unwrap();
        for i in 0..4 {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            chat.append_message(&session.id, role, &format!("turn {i}"), None)
                .await
                .unwrap();
        }

        let transcript = chat.transcript(&session.id, None).await.unwrap();
        assert_eq!(transcript.len(), 4);
        for pair in transcript.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
        assert_eq!(transcript[0].content, "turn 0");
        assert_eq!(transcript[3].content, "turn 3");
    }

    #[tokio::test]
    async fn recent_context_caps_and_orders() {
        let (chat, student_id, _dir) = setup().await;

        let session = chat.open(student_id, None, AgentKind::General).await.unwrap();
        for i in 0..6 {
            chat.append_message(&session.id, MessageRole::User, &format!("m{i}"), None)
                .await
                .unwrap();
        }

        let context = chat.recent_context(&session.id, 3).await.unwrap();
        assert_eq!(context.len(), 3);
        assert_eq!(context[0].content, "m3");
        assert_eq!(context[2].content, "m5");

        // Fewer messages than the limit: all of them, still oldest first.
        let all = chat.recent_context(&session.id, 100).await.unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].content, "m0");
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let (chat, student_id, _dir) = setup().await;

        let session = chat.open(student_id, None, AgentKind::General).await.unwrap();
        let err = chat
            .append_message(&session.id, MessageRole::User, "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LearnFlowError::Validation(_)));
    }

    #[tokio::test]
    async fn metadata_is_stored_verbatim() {
        let (chat, student_id, _dir) = setup().await;

        let session = chat.open(student_id, None, AgentKind::General).await.unwrap();
        let metadata = serde_json::json!({"client": "web", "latency_ms": 12});
        let message = chat
            .append_message(&session.id, MessageRole::User, "hi", Some(&metadata))
            .await
            .unwrap();

        let stored: serde_json::Value =
            serde_json::from_str(message.metadata.as_deref().unwrap()).unwrap();
        assert_eq!(stored, metadata);
    }
}
