// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exercise catalog, submission, and progress handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use learnflow_core::LearnFlowError;
use learnflow_core::types::{Exercise, ExercisePatch, NewExercise, Progress, Submission};
use serde::Deserialize;

use crate::auth::CurrentStudent;
use crate::error::ApiResult;
use crate::state::AppState;

/// Catalog filters for GET /api/exercises.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Request body for POST /api/exercises/{id}/submissions.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "python".to_string()
}

/// Listing cap for GET /api/submissions.
#[derive(Debug, Deserialize)]
pub struct SubmissionListQuery {
    #[serde(default = "default_submission_limit")]
    pub limit: i64,
}

fn default_submission_limit() -> i64 {
    50
}

/// Request body for POST /api/submissions/{id}/grade.
#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub passed: bool,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// POST /api/exercises
pub async fn create_exercise(
    State(state): State<AppState>,
    Json(body): Json<NewExercise>,
) -> ApiResult<(StatusCode, Json<Exercise>)> {
    let exercise = state.exercises.create(&body).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

/// GET /api/exercises
pub async fn list_exercises(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Json<Vec<Exercise>>> {
    let exercises = state
        .exercises
        .list(query.topic.as_deref(), query.difficulty.as_deref())
        .await?;
    Ok(Json(exercises))
}

/// GET /api/exercises/{id}
pub async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Exercise>> {
    Ok(Json(state.exercises.get(id).await?))
}

/// PUT /api/exercises/{id}
pub async fn update_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ExercisePatch>,
) -> ApiResult<Json<Exercise>> {
    Ok(Json(state.exercises.update(id, &body).await?))
}

/// DELETE /api/exercises/{id}
pub async fn delete_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.exercises.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/exercises/{id}/submissions
pub async fn submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Path(exercise_id): Path<i64>,
    Json(body): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<Submission>)> {
    let submission = state
        .exercises
        .submit(current.0.id, exercise_id, &body.code, &body.language)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Query(query): Query<SubmissionListQuery>,
) -> ApiResult<Json<Vec<Submission>>> {
    Ok(Json(
        state
            .exercises
            .submissions_for_student(current.0.id, query.limit)
            .await?,
    ))
}

/// GET /api/submissions/{id}
pub async fn get_submission(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Submission>> {
    let submission = state.exercises.get_submission(id).await?;
    // Submissions are private to their author.
    if submission.student_id != current.0.id {
        return Err(LearnFlowError::NotFound(format!("submission {id}")).into());
    }
    Ok(Json(submission))
}

/// POST /api/submissions/{id}/grade
pub async fn grade_submission(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
    Path(id): Path<i64>,
    Json(body): Json<GradeRequest>,
) -> ApiResult<Json<Submission>> {
    let submission = state.exercises.get_submission(id).await?;
    if submission.student_id != current.0.id {
        return Err(LearnFlowError::NotFound(format!("submission {id}")).into());
    }
    let graded = state
        .exercises
        .grade(id, body.passed, body.score, body.feedback.as_deref())
        .await?;
    Ok(Json(graded))
}

/// GET /api/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentStudent>,
) -> ApiResult<Json<Vec<Progress>>> {
    Ok(Json(
        state.exercises.progress_for_student(current.0.id).await?,
    ))
}
