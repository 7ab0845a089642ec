// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The assistant responder: context in, persisted assistant message out.
//!
//! One completion call per reply. An upstream failure leaves the session
//! and its transcript untouched; the student retries by sending another
//! message. A request that disconnects mid-call changes nothing here: the
//! call runs to completion and the reply is still persisted.

use std::sync::Arc;

use learnflow_bus::{DomainEvent, EventPublisher};
use learnflow_chat::{AgentKind, ChatService};
use learnflow_core::types::{ChatMessage, CompletionMessage, MessageRole};
use learnflow_core::{CompletionProvider, LearnFlowError};
use tracing::{debug, info, warn};

use crate::canned::CannedResponder;
use crate::client::CompletionClient;

/// Generates and persists assistant replies for chat sessions.
#[derive(Clone)]
pub struct AssistantResponder {
    chat: ChatService,
    provider: Arc<dyn CompletionProvider>,
    publisher: EventPublisher,
    context_window: u32,
}

impl AssistantResponder {
    pub fn new(
        chat: ChatService,
        provider: Arc<dyn CompletionProvider>,
        publisher: EventPublisher,
        context_window: u32,
    ) -> Self {
        Self {
            chat,
            provider,
            publisher,
            context_window,
        }
    }

    /// Generate a reply for the session's current context and append it as
    /// an assistant-role message.
    ///
    /// Fails with [`LearnFlowError::UpstreamUnavailable`] if the completion
    /// service fails or times out; nothing is persisted in that case.
    pub async fn respond(&self, session_id: &str) -> Result<ChatMessage, LearnFlowError> {
        let Some(session) = self.chat.get(session_id).await? else {
            return Err(LearnFlowError::NotFound(format!("chat session {session_id}")));
        };
        if !session.is_active {
            return Err(LearnFlowError::SessionClosed {
                session_id: session_id.to_string(),
            });
        }

        let persona = AgentKind::parse_or_general(&session.agent_kind);
        let context = self.chat.recent_context(session_id, self.context_window).await?;
        let turns: Vec<CompletionMessage> =
            context.iter().map(CompletionMessage::from_chat).collect();

        debug!(
            session_id,
            persona = %persona,
            context_len = turns.len(),
            provider = self.provider.name(),
            "requesting completion"
        );

        let reply = self
            .provider
            .complete(persona.system_prompt(), &turns)
            .await?;

        let message = self
            .chat
            .append_message(session_id, MessageRole::Assistant, &reply, None)
            .await?;

        self.publisher
            .publish(DomainEvent::chat_message(session.student_id, &message));

        info!(session_id, message_id = %message.id, "assistant reply persisted");
        Ok(message)
    }
}

/// Build the completion provider selected by configuration.
///
/// With an API key the HTTP client is used; without one the deterministic
/// canned responder stands in (development mode).
pub fn provider_from_config(
    config: &learnflow_config::model::AssistantConfig,
) -> Result<Arc<dyn CompletionProvider>, LearnFlowError> {
    if config.api_key.is_some() {
        Ok(Arc::new(CompletionClient::from_config(config)?))
    } else {
        warn!("assistant.api_key not configured, falling back to canned replies");
        Ok(Arc::new(CannedResponder::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnflow_storage::Database;
    use learnflow_storage::queries::students;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Provider that replays scripted replies, or fails on demand.
    struct ScriptedProvider {
        replies: Mutex<Vec<String>>,
        fail: bool,
        seen_context: Mutex<Vec<usize>>,
    }

    impl ScriptedProvider {
        fn with_replies(replies: Vec<&str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(String::from).collect()),
                fail: false,
                seen_context: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                replies: Mutex::new(Vec::new()),
                fail: true,
                seen_context: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _system: &str,
            messages: &[CompletionMessage],
        ) -> Result<String, LearnFlowError> {
            self.seen_context.lock().unwrap().push(messages.len());
            if self.fail {
                return Err(LearnFlowError::UpstreamUnavailable {
                    message: "simulated outage".to_string(),
                    source: None,
                });
            }
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Ok("scripted reply".to_string())
            } else {
                Ok(replies.remove(0))
            }
        }
    }

    async fn setup(provider: Arc<dyn CompletionProvider>) -> (AssistantResponder, ChatService, i64, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let student =
            students::create_student(&db, "pub-1", "s@example.com", "S", "hash", None)
                .await
                .unwrap();
        let chat = ChatService::new(db);
        let responder = AssistantResponder::new(
            chat.clone(),
            provider,
            EventPublisher::disabled(),
            10,
        );
        (responder, chat, student.id, dir)
    }

    #[tokio::test]
    async fn respond_appends_assistant_message_after_user_message() {
        let provider = Arc::new(ScriptedProvider::with_replies(vec!["a loop iterates"]));
        let (responder, chat, student_id, _dir) = setup(provider).await;

        let session = chat
            .open(student_id, Some("loops"), AgentKind::General)
            .await
            .unwrap();
        chat.append_message(&session.id, MessageRole::User, "what is a for loop?", None)
            .await
            .unwrap();

        let reply = responder.respond(&session.id).await.unwrap();
        assert_eq!(reply.role, "assistant");
        assert_eq!(reply.content, "a loop iterates");

        // The assistant message is the most recent one.
        let context = chat.recent_context(&session.id, 1).await.unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].id, reply.id);
    }

    #[tokio::test]
    async fn upstream_failure_leaves_transcript_untouched() {
        let provider = Arc::new(ScriptedProvider::failing());
        let (responder, chat, student_id, _dir) = setup(provider).await;

        let session = chat.open(student_id, None, AgentKind::General).await.unwrap();
        chat.append_message(&session.id, MessageRole::User, "hello", None)
            .await
            .unwrap();

        let err = responder.respond(&session.id).await.unwrap_err();
        assert!(matches!(err, LearnFlowError::UpstreamUnavailable { .. }));

        // Session still open, only the user message stored.
        let stored = chat.get(&session.id).await.unwrap().unwrap();
        assert!(stored.is_active);
        let transcript = chat.transcript(&session.id, None).await.unwrap();
        assert_eq!(transcript.len(), 1);

        // The student may retry.
        chat.append_message(&session.id, MessageRole::User, "hello again", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn respond_on_closed_session_fails() {
        let provider = Arc::new(ScriptedProvider::with_replies(vec![]));
        let (responder, chat, student_id, _dir) = setup(provider).await;

        let session = chat.open(student_id, None, AgentKind::General).await.unwrap();
        chat.close(&session.id).await.unwrap();

        let err = responder.respond(&session.id).await.unwrap_err();
        assert!(matches!(err, LearnFlowError::SessionClosed { .. }));
    }

    #[tokio::test]
    async fn respond_on_unknown_session_fails() {
        let provider = Arc::new(ScriptedProvider::with_replies(vec![]));
        let (responder, _chat, _student_id, _dir) = setup(provider).await;

        let err = responder.respond("no-such-session").await.unwrap_err();
        assert!(matches!(err, LearnFlowError::NotFound(_)));
    }

    #[tokio::test]
    async fn context_window_caps_what_the_provider_sees() {
        let provider = Arc::new(ScriptedProvider::with_replies(vec![]));
        let (_responder, chat, student_id, _dir) = setup(provider.clone()).await;
        let responder = AssistantResponder::new(
            chat.clone(),
            provider.clone(),
            EventPublisher::disabled(),
            2,
        );

        let session = chat.open(student_id, None, AgentKind::General).await.unwrap();
        for i in 0..5 {
            chat.append_message(&session.id, MessageRole::User, &format!("m{i}"), None)
                .await
                .unwrap();
        }

        responder.respond(&session.id).await.unwrap();
        assert_eq!(*provider.seen_context.lock().unwrap(), vec![2]);
    }
}
