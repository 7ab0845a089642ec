// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for external text-generation services.

use async_trait::async_trait;

use crate::error::LearnFlowError;
use crate::types::CompletionMessage;

/// A text-completion backend consulted for assistant replies.
///
/// The assistant responder hands over an ordered conversation window and
/// a persona system prompt, and receives plain reply text. Failures map
/// to [`LearnFlowError::UpstreamUnavailable`] and are never retried here;
/// the student retries by sending another message.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short identifier for logs ("gemini", "canned", "mock").
    fn name(&self) -> &str;

    /// Generates a reply for the given system prompt and conversation turns.
    async fn complete(
        &self,
        system: &str,
        messages: &[CompletionMessage],
    ) -> Result<String, LearnFlowError>;
}
