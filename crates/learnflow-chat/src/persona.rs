// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant personas.
//!
//! Personas are a closed set of tagged variants, not open-ended dynamic
//! dispatch: the responder only ever switches on this enum, and unknown
//! strings coming in over the API degrade to `General`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The kind of assistant a chat session talks to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// General learning companion.
    #[default]
    General,
    /// Explains concepts in simple terms.
    Concepts,
    /// Guides debugging without handing out solutions.
    Debug,
    /// Walks through exercises step by step.
    Exercise,
}

impl AgentKind {
    /// Parse a persona tag, falling back to `General` for unknown values.
    pub fn parse_or_general(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// System prompt injected ahead of the conversation context.
    pub fn system_prompt(self) -> &'static str {
        match self {
            AgentKind::General => {
                "You are a helpful educational assistant on the LearnFlow platform. \
                 Assist students with their learning queries."
            }
            AgentKind::Concepts => {
                "You are a subject matter expert. Explain complex concepts in simple \
                 terms for students."
            }
            AgentKind::Debug => {
                "You are a coding mentor. Help students debug their code by providing \
                 guidance and hints rather than direct solutions."
            }
            AgentKind::Exercise => {
                "You are a tutor. Help students work through their exercises \
                 step-by-step."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tags_round_trip() {
        for kind in [
            AgentKind::General,
            AgentKind::Concepts,
            AgentKind::Debug,
            AgentKind::Exercise,
        ] {
            let tag = kind.to_string();
            assert_eq!(AgentKind::from_str(&tag).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_tags_degrade_to_general() {
        assert_eq!(AgentKind::parse_or_general("quantum"), AgentKind::General);
        assert_eq!(AgentKind::parse_or_general("debug"), AgentKind::Debug);
    }

    #[test]
    fn every_persona_has_a_distinct_prompt() {
        let prompts = [
            AgentKind::General.system_prompt(),
            AgentKind::Concepts.system_prompt(),
            AgentKind::Debug.system_prompt(),
            AgentKind::Exercise.system_prompt(),
        ];
        for (i, a) in prompts.iter().enumerate() {
            assert!(!a.is_empty());
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
