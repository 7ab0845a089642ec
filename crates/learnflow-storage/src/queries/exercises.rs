// SPDX-FileCopyrightText: 2026 LearnFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exercise catalog CRUD operations.

use learnflow_core::LearnFlowError;
use learnflow_core::types::{ExercisePatch, NewExercise};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Exercise;

fn row_to_exercise(row: &rusqlite::Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        difficulty: row.get(3)?,
        topic: row.get(4)?,
        starter_code: row.get(5)?,
        expected_output: row.get(6)?,
        hints: row.get(7)?,
        solution_code: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const EXERCISE_COLUMNS: &str = "id, title, description, difficulty, topic, starter_code, \
                                expected_output, hints, solution_code, created_at, updated_at";

/// Insert a new exercise and return the stored row.
pub async fn create_exercise(
    db: &Database,
    new: &NewExercise,
) -> Result<Exercise, LearnFlowError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO exercises (title, description, difficulty, topic, starter_code,
                                        expected_output, hints, solution_code,
                                        created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                         strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![
                    new.title,
                    new.description,
                    new.difficulty,
                    new.topic,
                    new.starter_code,
                    new.expected_output,
                    new.hints,
                    new.solution_code,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let exercise = conn.query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1"),
                params![id],
                row_to_exercise,
            )?;
            Ok(exercise)
        })
        .await
        .map_err(map_tr_err)
}

/// Get an exercise by ID.
pub async fn get_exercise(db: &Database, id: i64) -> Result<Option<Exercise>, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1"),
                params![id],
                row_to_exercise,
            );
            match result {
                Ok(exercise) => Ok(Some(exercise)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List exercises, optionally filtered by topic and/or difficulty.
pub async fn list_exercises(
    db: &Database,
    topic: Option<&str>,
    difficulty: Option<&str>,
) -> Result<Vec<Exercise>, LearnFlowError> {
    let topic = topic.map(|t| t.to_string());
    let difficulty = difficulty.map(|d| d.to_string());
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE 1=1");
            let mut args: Vec<String> = Vec::new();
            if let Some(t) = topic {
                args.push(t);
                sql.push_str(&format!(" AND topic = ?{}", args.len()));
            }
            if let Some(d) = difficulty {
                args.push(d);
                sql.push_str(&format!(" AND difficulty = ?{}", args.len()));
            }
            sql.push_str(" ORDER BY id ASC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                rusqlite::params_from_iter(args.iter()),
                row_to_exercise,
            )?;
            let mut exercises = Vec::new();
            for row in rows {
                exercises.push(row?);
            }
            Ok(exercises)
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update. Returns the updated row, or `None` when the
/// exercise does not exist.
pub async fn update_exercise(
    db: &Database,
    id: i64,
    patch: &ExercisePatch,
) -> Result<Option<Exercise>, LearnFlowError> {
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE exercises SET
                     title = COALESCE(?1, title),
                     description = COALESCE(?2, description),
                     difficulty = COALESCE(?3, difficulty),
                     topic = COALESCE(?4, topic),
                     starter_code = COALESCE(?5, starter_code),
                     expected_output = COALESCE(?6, expected_output),
                     hints = COALESCE(?7, hints),
                     solution_code = COALESCE(?8, solution_code),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?9",
                params![
                    patch.title,
                    patch.description,
                    patch.difficulty,
                    patch.topic,
                    patch.starter_code,
                    patch.expected_output,
                    patch.hints,
                    patch.solution_code,
                    id,
                ],
            )?;
            let result = conn.query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1"),
                params![id],
                row_to_exercise,
            );
            match result {
                Ok(exercise) => Ok(Some(exercise)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Delete an exercise. Returns true when a row was removed.
pub async fn delete_exercise(db: &Database, id: i64) -> Result<bool, LearnFlowError> {
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
