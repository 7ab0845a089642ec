// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete service stack on a temp SQLite
//! database with mock provider and recording bus, so tests can drive the
//! same wiring the binary uses without any network or API keys.

use std::sync::Arc;

use learnflow_assistant::AssistantResponder;
use learnflow_auth::{CredentialStore, SessionManager};
use learnflow_bus::EventPublisher;
use learnflow_chat::{AgentKind, ChatService};
use learnflow_config::model::AuthConfig;
use learnflow_core::types::{AuthSession, ChatMessage, MessageRole, NewStudent, Student};
use learnflow_core::{EventSink, LearnFlowError};
use learnflow_exercises::ExerciseService;
use learnflow_storage::Database;

use crate::mock_bus::RecordingSink;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<String>,
    failing_bus: bool,
    context_window: u32,
    session_ttl_hours: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            failing_bus: false,
            context_window: 10,
            session_ttl_hours: 24,
        }
    }

    /// Set mock provider replies.
    pub fn with_mock_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    /// Start with the bus in failure mode.
    pub fn with_failing_bus(mut self) -> Self {
        self.failing_bus = true;
        self
    }

    /// Override the assistant context window.
    pub fn with_context_window(mut self, window: u32) -> Self {
        self.context_window = window;
        self
    }

    /// Override the session TTL.
    pub fn with_session_ttl_hours(mut self, hours: u32) -> Self {
        self.session_ttl_hours = hours;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, LearnFlowError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| LearnFlowError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;

        let bus_sink = Arc::new(RecordingSink::new());
        if self.failing_bus {
            bus_sink.set_failing(true);
        }
        let publisher = EventPublisher::new(Arc::clone(&bus_sink) as Arc<dyn EventSink>);

        let provider = Arc::new(MockProvider::with_replies(self.replies));

        let credentials = CredentialStore::new(db.clone());
        let sessions = SessionManager::new(
            db.clone(),
            &AuthConfig {
                session_ttl_hours: self.session_ttl_hours,
                ..AuthConfig::default()
            },
        );
        let chat = ChatService::new(db.clone());
        let responder = AssistantResponder::new(
            chat.clone(),
            Arc::clone(&provider) as Arc<dyn learnflow_core::CompletionProvider>,
            publisher.clone(),
            self.context_window,
        );
        let exercises = ExerciseService::new(db.clone(), publisher.clone());

        Ok(TestHarness {
            db,
            credentials,
            sessions,
            chat,
            responder,
            exercises,
            publisher,
            provider,
            bus_sink,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired LearnFlow stack on a temp database.
pub struct TestHarness {
    pub db: Database,
    pub credentials: CredentialStore,
    pub sessions: SessionManager,
    pub chat: ChatService,
    pub responder: AssistantResponder,
    pub exercises: ExerciseService,
    pub publisher: EventPublisher,
    pub provider: Arc<MockProvider>,
    pub bus_sink: Arc<RecordingSink>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Register a student and log them in, returning both records.
    pub async fn register_and_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Student, AuthSession), LearnFlowError> {
        let student = self
            .credentials
            .register(&NewStudent {
                email: email.to_string(),
                name: email.split('@').next().unwrap_or("student").to_string(),
                password: password.to_string(),
                grade_level: None,
            })
            .await?;
        let authenticated = self.credentials.authenticate(email, password).await?;
        let session = self.sessions.issue(authenticated.id).await?;
        Ok((student, session))
    }

    /// Append a user message and generate the assistant reply, mirroring the
    /// gateway's chat message flow.
    pub async fn send_chat_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<ChatMessage, LearnFlowError> {
        self.chat
            .append_message(session_id, MessageRole::User, content, None)
            .await?;
        self.responder.respond(session_id).await
    }

    /// Open a chat session for a student with the given persona tag.
    pub async fn open_chat(
        &self,
        student_id: i64,
        topic: Option<&str>,
        agent_kind: &str,
    ) -> Result<learnflow_core::types::ChatSession, LearnFlowError> {
        self.chat
            .open(student_id, topic, AgentKind::parse_or_general(agent_kind))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_and_registers() {
        let harness = TestHarness::builder().build().await.unwrap();
        let (student, session) = harness
            .register_and_login("alice@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(student.email, "alice@example.com");
        let validated = harness.sessions.validate(&session.token).await.unwrap();
        assert_eq!(validated.id, student.id);
    }

    #[tokio::test]
    async fn two_harnesses_are_isolated() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        h1.register_and_login("a@example.com", "hunter2hunter2")
            .await
            .unwrap();
        // Same email in the second harness must not conflict.
        h2.register_and_login("a@example.com", "hunter2hunter2")
            .await
            .unwrap();
    }
}
