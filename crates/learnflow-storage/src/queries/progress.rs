// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-student progress tracking.
//!
//! The (student, exercise) pair is unique; both mutation paths are upserts
//! executed atomically on the background writer.

use learnflow_core::LearnFlowError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Progress;

fn row_to_progress(row: &rusqlite::Row<'_>) -> rusqlite::Result<Progress> {
    Ok(Progress {
        id: row.get(0)?,
        student_id: row.get(1)?,
        exercise_id: row.get(2)?,
        status: row.get(3)?,
        attempts: row.get(4)?,
        best_score: row.get(5)?,
        completed_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const PROGRESS_COLUMNS: &str = "id, student_id, exercise_id, status, attempts, best_score, \
                                completed_at, created_at, updated_at";

/// Record one submission attempt.
///
/// Creates the row in `in_progress` with one attempt, or increments the
/// attempt counter. A row already `completed` or `mastered` keeps its status.
pub async fn record_attempt(
    db: &Database,
    student_id: i64,
    exercise_id: i64,
) -> Result<Progress, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO progress (student_id, exercise_id, status, attempts,
                                       created_at, updated_at)
                 VALUES (?1, ?2, 'in_progress', 1,
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT (student_id, exercise_id) DO UPDATE SET
                     attempts = attempts + 1,
                     status = CASE
                         WHEN status IN ('completed', 'mastered') THEN status
                         ELSE 'in_progress'
                     END,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![student_id, exercise_id],
            )?;
            let progress = conn.query_row(
                &format!(
                    "SELECT {PROGRESS_COLUMNS} FROM progress
                     WHERE student_id = ?1 AND exercise_id = ?2"
                ),
                params![student_id, exercise_id],
                row_to_progress,
            )?;
            Ok(progress)
        })
        .await
        .map_err(map_tr_err)
}

/// Fold a grading outcome into the progress row.
///
/// A passing grade marks the exercise `completed` (first completion stamps
/// `completed_at`); `best_score` only ever increases.
pub async fn record_grade(
    db: &Database,
    student_id: i64,
    exercise_id: i64,
    passed: bool,
    score: Option<i64>,
) -> Result<Progress, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO progress (student_id, exercise_id, status, attempts, best_score,
                                       completed_at, created_at, updated_at)
                 VALUES (?1, ?2,
                         CASE WHEN ?3 THEN 'completed' ELSE 'in_progress' END,
                         0, ?4,
                         CASE WHEN ?3 THEN strftime('%Y-%m-%dT%H:%M:%fZ', 'now') END,
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT (student_id, exercise_id) DO UPDATE SET
                     status = CASE
                         WHEN ?3 AND status != 'mastered' THEN 'completed'
                         ELSE status
                     END,
                     best_score = MAX(COALESCE(best_score, 0), COALESCE(?4, 0)),
                     completed_at = CASE
                         WHEN ?3 THEN COALESCE(completed_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                         ELSE completed_at
                     END,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![student_id, exercise_id, passed, score],
            )?;
            let progress = conn.query_row(
                &format!(
                    "SELECT {PROGRESS_COLUMNS} FROM progress
                     WHERE student_id = ?1 AND exercise_id = ?2"
                ),
                params![student_id, exercise_id],
                row_to_progress,
            )?;
            Ok(progress)
        })
        .await
        .map_err(map_tr_err)
}

/// Get the progress row for one (student, exercise) pair.
pub async fn get_progress(
    db: &Database,
    student_id: i64,
    exercise_id: i64,
) -> Result<Option<Progress>, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {PROGRESS_COLUMNS} FROM progress
                     WHERE student_id = ?1 AND exercise_id = ?2"
                ),
                params![student_id, exercise_id],
                row_to_progress,
            );
            match result {
                Ok(progress) => Ok(Some(progress)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List all progress rows for a student, most recently updated first.
pub async fn list_for_student(
    db: &Database,
    student_id: i64,
) -> Result<Vec<Progress>, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM progress
                 WHERE student_id = ?1
                 ORDER BY updated_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![student_id], row_to_progress)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}
