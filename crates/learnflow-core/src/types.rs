// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain record types shared across the LearnFlow workspace.
//!
//! All timestamps are RFC 3339 UTC strings with millisecond precision,
//! matching what SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`
//! produces. The fixed format makes string comparison agree with
//! chronological order, which the chat transcript ordering relies on.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A registered student account.
///
/// Students are never hard-deleted; deactivation clears `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Row identifier.
    pub id: i64,
    /// Stable public identifier (UUID), safe to expose outside the API.
    pub public_id: String,
    /// Unique login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Argon2id PHC hash of the password. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional self-reported grade level.
    pub grade_level: Option<String>,
    /// Cleared on soft deactivation.
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for student registration.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub grade_level: Option<String>,
}

/// A server-issued, time-bounded proof of authentication.
///
/// The token is opaque: 32 random bytes, hex-encoded. Multiple concurrent
/// sessions per student are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub student_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

/// A bounded conversation thread between a student and an assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// UUID identifier.
    pub id: String,
    pub student_id: i64,
    /// Free-form topic label ("loops", "recursion", ...).
    pub topic: Option<String>,
    /// Persona tag, one of the closed set in `learnflow-chat::persona`.
    pub agent_kind: String,
    /// False once the session has been closed. Terminal.
    pub is_active: bool,
    pub created_at: String,
    pub ended_at: Option<String>,
}

/// Author role of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// An ordered, immutable entry in a chat session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// UUID identifier.
    pub id: String,
    pub session_id: String,
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    /// Arbitrary JSON metadata, stored verbatim.
    pub metadata: Option<String>,
    /// Monotonically non-decreasing within a session.
    pub created_at: String,
}

/// A practice exercise in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// "easy", "medium", or "hard".
    pub difficulty: String,
    pub topic: String,
    pub starter_code: Option<String>,
    pub expected_output: Option<String>,
    /// JSON array of hint strings, stored verbatim.
    pub hints: Option<String>,
    pub solution_code: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating an exercise.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExercise {
    pub title: String,
    pub description: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    pub topic: String,
    #[serde(default)]
    pub starter_code: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub hints: Option<String>,
    #[serde(default)]
    pub solution_code: Option<String>,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

/// Partial update for an exercise. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExercisePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub starter_code: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub hints: Option<String>,
    #[serde(default)]
    pub solution_code: Option<String>,
}

/// Lifecycle state of a code submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Passing,
    Failing,
}

/// A student's code submission against an exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub student_id: i64,
    pub exercise_id: i64,
    pub code: String,
    pub language: String,
    /// One of [`SubmissionStatus`], stored as text.
    pub status: String,
    /// 0-100 once graded.
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub submitted_at: String,
    pub completed_at: Option<String>,
}

/// Per-exercise mastery state of a student.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
    Mastered,
}

/// Progress row, unique per (student, exercise) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub id: i64,
    pub student_id: i64,
    pub exercise_id: i64,
    /// One of [`ProgressStatus`], stored as text.
    pub status: String,
    pub attempts: i64,
    pub best_score: Option<i64>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A single conversation turn handed to the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

impl CompletionMessage {
    /// Builds a turn from a stored chat message.
    pub fn from_chat(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.clone(),
            content: msg.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn message_role_round_trips_through_strings() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            assert_eq!(MessageRole::from_str(&s).unwrap(), role);
        }
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn progress_status_uses_snake_case() {
        assert_eq!(ProgressStatus::NotStarted.to_string(), "not_started");
        assert_eq!(
            ProgressStatus::from_str("in_progress").unwrap(),
            ProgressStatus::InProgress
        );
    }

    #[test]
    fn submission_status_round_trips() {
        for status in [
            SubmissionStatus::Draft,
            SubmissionStatus::Submitted,
            SubmissionStatus::Passing,
            SubmissionStatus::Failing,
        ] {
            let s = status.to_string();
            assert_eq!(SubmissionStatus::from_str(&s).unwrap(), status);
        }
    }

    #[test]
    fn student_serialization_omits_password_hash() {
        let student = Student {
            id: 1,
            public_id: "pub-1".into(),
            email: "alice@example.com".into(),
            name: "Alice".into(),
            password_hash: "$argon2id$secret".into(),
            grade_level: None,
            is_active: true,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_string(&student).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice@example.com"));
    }

    #[test]
    fn rfc3339_millis_strings_order_lexicographically() {
        // The transcript ordering invariant depends on this property.
        let earlier = "2026-01-01T00:00:01.500Z";
        let later = "2026-01-01T00:00:02.000Z";
        assert!(earlier < later);
    }
}
