// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exercise catalog, submissions, and progress tracking for the LearnFlow
//! backend. Straightforward persistence on top of `learnflow-storage`, with
//! domain events emitted for submissions and progress changes.

pub mod service;

pub use service::ExerciseService;
