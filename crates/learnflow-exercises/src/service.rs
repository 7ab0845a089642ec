// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exercise catalog, submission recording, and progress upkeep.
//!
//! Submissions and grades both fold into the per-student progress row and
//! emit domain events. Event publication is a side channel: it can never
//! fail the triggering call.

use learnflow_bus::{DomainEvent, EventPublisher};
use learnflow_core::LearnFlowError;
use learnflow_core::types::{
    Exercise, ExercisePatch, NewExercise, Progress, Submission, SubmissionStatus,
};
use learnflow_storage::Database;
use learnflow_storage::queries::{exercises, progress, submissions};
use tracing::info;

/// Catalog and submission operations.
///
/// Cheap to clone; clones share the database handle and publisher.
#[derive(Clone)]
pub struct ExerciseService {
    db: Database,
    publisher: EventPublisher,
}

impl ExerciseService {
    pub fn new(db: Database, publisher: EventPublisher) -> Self {
        Self { db, publisher }
    }

    // --- Catalog ---

    /// Add an exercise to the catalog.
    pub async fn create(&self, new: &NewExercise) -> Result<Exercise, LearnFlowError> {
        if new.title.trim().is_empty() {
            return Err(LearnFlowError::Validation(
                "exercise title must not be empty".to_string(),
            ));
        }
        let exercise = exercises::create_exercise(&self.db, new).await?;
        info!(exercise_id = exercise.id, title = %exercise.title, "exercise created");
        Ok(exercise)
    }

    /// Fetch one exercise.
    pub async fn get(&self, id: i64) -> Result<Exercise, LearnFlowError> {
        exercises::get_exercise(&self.db, id)
            .await?
            .ok_or_else(|| LearnFlowError::NotFound(format!("exercise {id}")))
    }

    /// List the catalog, optionally filtered.
    pub async fn list(
        &self,
        topic: Option<&str>,
        difficulty: Option<&str>,
    ) -> Result<Vec<Exercise>, LearnFlowError> {
        exercises::list_exercises(&self.db, topic, difficulty).await
    }

    /// Apply a partial update.
    pub async fn update(
        &self,
        id: i64,
        patch: &ExercisePatch,
    ) -> Result<Exercise, LearnFlowError> {
        exercises::update_exercise(&self.db, id, patch)
            .await?
            .ok_or_else(|| LearnFlowError::NotFound(format!("exercise {id}")))
    }

    /// Remove an exercise from the catalog.
    pub async fn delete(&self, id: i64) -> Result<(), LearnFlowError> {
        if !exercises::delete_exercise(&self.db, id).await? {
            return Err(LearnFlowError::NotFound(format!("exercise {id}")));
        }
        info!(exercise_id = id, "exercise deleted");
        Ok(())
    }

    // --- Submissions ---

    /// Record a code submission and bump the student's progress.
    pub async fn submit(
        &self,
        student_id: i64,
        exercise_id: i64,
        code: &str,
        language: &str,
    ) -> Result<Submission, LearnFlowError> {
        if code.trim().is_empty() {
            return Err(LearnFlowError::Validation(
                "submission code must not be empty".to_string(),
            ));
        }
        // The exercise must exist before anything is written.
        if exercises::get_exercise(&self.db, exercise_id).await?.is_none() {
            return Err(LearnFlowError::NotFound(format!("exercise {exercise_id}")));
        }

        let submission =
            submissions::insert_submission(&self.db, student_id, exercise_id, code, language)
                .await?;
        let updated = progress::record_attempt(&self.db, student_id, exercise_id).await?;

        self.publisher
            .publish(DomainEvent::submission_received(&submission));
        info!(
            submission_id = submission.id,
            student_id,
            exercise_id,
            attempts = updated.attempts,
            "submission recorded"
        );
        Ok(submission)
    }

    /// Fetch one submission.
    pub async fn get_submission(&self, id: i64) -> Result<Submission, LearnFlowError> {
        submissions::get_submission(&self.db, id)
            .await?
            .ok_or_else(|| LearnFlowError::NotFound(format!("submission {id}")))
    }

    /// A student's submissions, newest first.
    pub async fn submissions_for_student(
        &self,
        student_id: i64,
        limit: i64,
    ) -> Result<Vec<Submission>, LearnFlowError> {
        submissions::list_for_student(&self.db, student_id, limit).await
    }

    /// Record a grading outcome and fold it into progress.
    pub async fn grade(
        &self,
        submission_id: i64,
        passed: bool,
        score: Option<i64>,
        feedback: Option<&str>,
    ) -> Result<Submission, LearnFlowError> {
        if let Some(score) = score {
            if !(0..=100).contains(&score) {
                return Err(LearnFlowError::Validation(format!(
                    "score must be between 0 and 100, got {score}"
                )));
            }
        }

        let status = if passed {
            SubmissionStatus::Passing
        } else {
            SubmissionStatus::Failing
        };
        let Some(submission) = submissions::apply_grade(
            &self.db,
            submission_id,
            &status.to_string(),
            score,
            feedback,
        )
        .await?
        else {
            return Err(LearnFlowError::NotFound(format!(
                "submission {submission_id}"
            )));
        };

        let updated = progress::record_grade(
            &self.db,
            submission.student_id,
            submission.exercise_id,
            passed,
            score,
        )
        .await?;

        self.publisher.publish(DomainEvent::progress_updated(&updated));
        info!(
            submission_id,
            passed,
            score,
            status = %updated.status,
            "submission graded"
        );
        Ok(submission)
    }

    // --- Progress ---

    /// A student's progress rows, most recently updated first.
    pub async fn progress_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<Progress>, LearnFlowError> {
        progress::list_for_student(&self.db, student_id).await
    }
}
