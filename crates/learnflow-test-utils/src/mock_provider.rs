// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements `CompletionProvider` with pre-configured
//! responses, enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use learnflow_core::types::CompletionMessage;
use learnflow_core::{CompletionProvider, LearnFlowError};

/// A mock completion provider that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty, a default
/// "mock response" text is returned. Flipping `set_unavailable(true)` makes
/// every call fail with `UpstreamUnavailable`.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<String>>>,
    unavailable: AtomicBool,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_reply(&self, text: String) {
        self.replies.lock().await.push_back(text);
    }

    /// Make subsequent calls fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    async fn next_reply(&self) -> String {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn complete(
        &self,
        _system: &str,
        _messages: &[CompletionMessage],
    ) -> Result<String, LearnFlowError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LearnFlowError::UpstreamUnavailable {
                message: "mock provider marked unavailable".to_string(),
                source: None,
            });
        }
        Ok(self.next_reply().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_come_back_in_fifo_order() {
        let provider = MockProvider::with_replies(vec!["one".into(), "two".into()]);
        assert_eq!(provider.complete("s", &[]).await.unwrap(), "one");
        assert_eq!(provider.complete("s", &[]).await.unwrap(), "two");
        assert_eq!(provider.complete("s", &[]).await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn unavailable_mode_fails_every_call() {
        let provider = MockProvider::new();
        provider.set_unavailable(true);
        let err = provider.complete("s", &[]).await.unwrap_err();
        assert!(matches!(err, LearnFlowError::UpstreamUnavailable { .. }));

        provider.set_unavailable(false);
        provider.complete("s", &[]).await.unwrap();
    }
}
