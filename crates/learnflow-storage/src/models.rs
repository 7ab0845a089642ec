// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `learnflow-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use learnflow_core::types::{
    AuthSession, ChatMessage, ChatSession, Exercise, ExercisePatch, NewExercise, Progress,
    Student, Submission,
};
