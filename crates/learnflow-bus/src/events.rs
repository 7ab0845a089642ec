// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed domain event constructors.
//!
//! Each constructor pins the topic, partition key, and payload shape in one
//! place so handlers cannot drift apart in what they emit.

use chrono::Utc;
use learnflow_core::types::{ChatMessage, Progress, Student, Submission};

/// Topic names on the message bus.
pub mod topics {
    pub const STUDENT_EVENTS: &str = "student-events";
    pub const EXERCISE_SUBMISSIONS: &str = "exercise-submissions";
    pub const PROGRESS_UPDATES: &str = "progress-updates";
    pub const CHAT_MESSAGES: &str = "chat-messages";
    pub const SYSTEM_EVENTS: &str = "system-events";
}

/// A fire-and-forget notification describing a state change.
///
/// Not persisted by the core: once handed to the publisher it is owned by
/// the external bus (or dropped, if the bus is unreachable).
#[derive(Debug, Clone)]
pub struct DomainEvent {
    pub topic: String,
    pub key: String,
    pub payload: serde_json::Value,
}

fn now_rfc3339() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

impl DomainEvent {
    /// A new student registered.
    pub fn student_registered(student: &Student) -> Self {
        Self {
            topic: topics::STUDENT_EVENTS.to_string(),
            key: student.id.to_string(),
            payload: serde_json::json!({
                "event_type": "student_registered",
                "student_id": student.id,
                "email": student.email,
                "timestamp": now_rfc3339(),
            }),
        }
    }

    /// A code submission was received for an exercise.
    pub fn submission_received(submission: &Submission) -> Self {
        Self {
            topic: topics::EXERCISE_SUBMISSIONS.to_string(),
            key: submission.id.to_string(),
            payload: serde_json::json!({
                "event_type": "submission",
                "student_id": submission.student_id,
                "exercise_id": submission.exercise_id,
                "submission_id": submission.id,
                "status": submission.status,
                "timestamp": now_rfc3339(),
            }),
        }
    }

    /// A student's progress on an exercise changed.
    pub fn progress_updated(progress: &Progress) -> Self {
        Self {
            topic: topics::PROGRESS_UPDATES.to_string(),
            key: format!("{}:{}", progress.student_id, progress.exercise_id),
            payload: serde_json::json!({
                "event_type": "progress_update",
                "student_id": progress.student_id,
                "exercise_id": progress.exercise_id,
                "status": progress.status,
                "score": progress.best_score,
                "timestamp": now_rfc3339(),
            }),
        }
    }

    /// A chat message was appended (user or assistant).
    pub fn chat_message(student_id: i64, message: &ChatMessage) -> Self {
        Self {
            topic: topics::CHAT_MESSAGES.to_string(),
            key: message.session_id.clone(),
            payload: serde_json::json!({
                "event_type": "chat_message",
                "session_id": message.session_id,
                "student_id": student_id,
                "role": message.role,
                "content": message.content,
                "timestamp": now_rfc3339(),
            }),
        }
    }

    /// A service-level event (startup, shutdown, sweep results).
    pub fn system(component: &str, event_type: &str, details: serde_json::Value) -> Self {
        Self {
            topic: topics::SYSTEM_EVENTS.to_string(),
            key: component.to_string(),
            payload: serde_json::json!({
                "event_type": event_type,
                "component": component,
                "details": details,
                "timestamp": now_rfc3339(),
            }),
        }
    }
}
