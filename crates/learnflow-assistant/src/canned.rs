// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned replies for keyless development setups.
//!
//! When no API key is configured the responder still has to answer, so this
//! provider cycles through a fixed reply list per persona. Selection is
//! deterministic (by conversation length), which keeps tests stable.

use async_trait::async_trait;
use learnflow_chat::AgentKind;
use learnflow_core::types::CompletionMessage;
use learnflow_core::{CompletionProvider, LearnFlowError};

const GENERAL_REPLIES: &[&str] = &[
    "I'm here to help! What would you like to learn about?",
    "That's a great question! Try focusing on the core concepts first.",
    "Let me help you break this down into smaller parts.",
    "Good thinking! Have you tried practicing with some examples?",
];

const CONCEPTS_REPLIES: &[&str] = &[
    "This concept is fundamental to programming. Think of it like a recipe.",
    "Let me explain this step by step so it makes sense.",
    "This is similar to something you might see in real-world programming.",
    "The key insight here is understanding how these parts work together.",
];

const DEBUG_REPLIES: &[&str] = &[
    "I see what might be happening. What output are you getting?",
    "Let's trace through your code step by step. What happens first?",
    "Here's a hint: check the value of that variable at this point.",
    "Try running this part of your code separately to isolate the problem.",
];

const EXERCISE_REPLIES: &[&str] = &[
    "Great effort! Let's work through this together. Where are you stuck?",
    "You're on the right track! Let me guide you through the next step.",
    "Think about what this step should do. What do you expect to happen?",
    "Good! Now apply the same logic to the rest of the problem.",
];

/// Deterministic per-persona canned replies.
#[derive(Debug, Clone, Default)]
pub struct CannedResponder;

impl CannedResponder {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the reply list for a persona's system prompt.
    ///
    /// Unknown prompts fall back to the general list, matching how unknown
    /// persona tags degrade at the API boundary.
    fn replies_for(system: &str) -> &'static [&'static str] {
        if system == AgentKind::Concepts.system_prompt() {
            CONCEPTS_REPLIES
        } else if system == AgentKind::Debug.system_prompt() {
            DEBUG_REPLIES
        } else if system == AgentKind::Exercise.system_prompt() {
            EXERCISE_REPLIES
        } else {
            GENERAL_REPLIES
        }
    }
}

#[async_trait]
impl CompletionProvider for CannedResponder {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[CompletionMessage],
    ) -> Result<String, LearnFlowError> {
        let replies = Self::replies_for(system);
        let reply = replies[messages.len() % replies.len()];
        Ok(reply.to_string())
    }
}
