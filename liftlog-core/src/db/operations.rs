//! SQL for every store request. Each query that touches user-owned rows is
//! filtered by the caller's id; this is where ownership is enforced.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{
    Exercise, ExerciseRow, Goal, GoalDraft, GoalFilter, GoalRow, Profile, Workout, WorkoutDetail,
    WorkoutDraft, WorkoutExercise, WorkoutExerciseRow, WorkoutSummary,
};
use crate::error::{StoreError, StoreResult, from_sqlx};

// Profiles
pub async fn get_profile(pool: &SqlitePool, user_id: Uuid) -> StoreResult<Option<Profile>> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

pub async fn insert_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    full_name: Option<&str>,
) -> StoreResult<Profile> {
    let now = Utc::now();
    sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (id, full_name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)
         RETURNING *",
    )
    .bind(user_id)
    .bind(full_name)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(from_sqlx)
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    full_name: Option<&str>,
) -> StoreResult<Profile> {
    sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET full_name = ?1, updated_at = ?2 WHERE id = ?3 RETURNING *",
    )
    .bind(full_name)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::not_found("profile", user_id))
}

// Exercises
pub async fn get_all_exercises(pool: &SqlitePool) -> StoreResult<Vec<Exercise>> {
    sqlx::query_as::<_, ExerciseRow>("SELECT * FROM exercises ORDER BY name")
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Exercise::try_from)
        .collect()
}

// Workouts
const WORKOUT_SUMMARY_SELECT: &str = "SELECT w.id, w.user_id, w.name, w.date, w.duration_minutes,
        w.notes, w.created_at, w.updated_at, COUNT(we.id) AS exercise_count
     FROM workouts w
     LEFT JOIN workout_exercises we ON we.workout_id = w.id
     WHERE w.user_id = ?1
     GROUP BY w.id
     ORDER BY w.date DESC, w.id DESC
     LIMIT ?2";

/// Workouts newest first, each with its exercise count. `None` means no limit.
pub async fn get_workout_summaries(
    pool: &SqlitePool,
    user_id: Uuid,
    limit: Option<u32>,
) -> StoreResult<Vec<WorkoutSummary>> {
    // LIMIT -1 is "no limit" in SQLite.
    let limit = limit.map(i64::from).unwrap_or(-1);
    sqlx::query_as::<_, WorkoutSummary>(WORKOUT_SUMMARY_SELECT)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn get_workout_detail(
    pool: &SqlitePool,
    user_id: Uuid,
    workout_id: i64,
) -> StoreResult<Option<WorkoutDetail>> {
    let Some(workout) =
        sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = ?1 AND user_id = ?2")
            .bind(workout_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let exercises = sqlx::query_as::<_, WorkoutExerciseRow>(
        "SELECT id, workout_id, exercise_id, position, sets, rest_seconds, notes
         FROM workout_exercises WHERE workout_id = ?1 ORDER BY position, id",
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(WorkoutExercise::try_from)
    .collect::<StoreResult<Vec<_>>>()?;

    Ok(Some(WorkoutDetail { workout, exercises }))
}

/// Inserts or updates a workout and replaces its workout-exercises in one
/// transaction. Nothing is written unless every step succeeds.
pub async fn save_workout(
    pool: &SqlitePool,
    user_id: Uuid,
    draft: &WorkoutDraft,
) -> StoreResult<Workout> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let workout = match draft.id {
        Some(workout_id) => {
            let workout = sqlx::query_as::<_, Workout>(
                "UPDATE workouts
                 SET name = ?1, date = ?2, duration_minutes = ?3, notes = ?4, updated_at = ?5
                 WHERE id = ?6 AND user_id = ?7
                 RETURNING *",
            )
            .bind(&draft.name)
            .bind(draft.date)
            .bind(draft.duration_minutes)
            .bind(draft.notes.as_deref())
            .bind(now)
            .bind(workout_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("workout", workout_id))?;

            sqlx::query("DELETE FROM workout_exercises WHERE workout_id = ?1")
                .bind(workout_id)
                .execute(&mut *tx)
                .await?;
            workout
        }
        None => sqlx::query_as::<_, Workout>(
            "INSERT INTO workouts
                 (user_id, name, date, duration_minutes, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING *",
        )
        .bind(user_id)
        .bind(&draft.name)
        .bind(draft.date)
        .bind(draft.duration_minutes)
        .bind(draft.notes.as_deref())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(from_sqlx)?,
    };

    for (position, entry) in draft.exercises.iter().enumerate() {
        let sets = serde_json::to_string(&entry.sets)?;
        sqlx::query(
            "INSERT INTO workout_exercises
                 (workout_id, exercise_id, position, sets, rest_seconds, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(workout.id)
        .bind(entry.exercise_id)
        .bind(position as i64)
        .bind(sets)
        .bind(entry.rest_seconds)
        .bind(entry.notes.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(from_sqlx)?;
    }

    tx.commit().await?;
    Ok(workout)
}

/// Workout-exercises go with the workout through `ON DELETE CASCADE`.
pub async fn delete_workout(pool: &SqlitePool, user_id: Uuid, workout_id: i64) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM workouts WHERE id = ?1 AND user_id = ?2")
        .bind(workout_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("workout", workout_id));
    }
    Ok(())
}

// Goals
pub async fn get_goals(
    pool: &SqlitePool,
    user_id: Uuid,
    filter: GoalFilter,
) -> StoreResult<Vec<Goal>> {
    // AUTOINCREMENT ids follow creation order, and unlike the RFC 3339
    // text in created_at they compare correctly within the same second.
    let sql = match filter {
        GoalFilter::All => "SELECT * FROM goals WHERE user_id = ?1 ORDER BY id DESC",
        GoalFilter::Active => {
            "SELECT * FROM goals WHERE user_id = ?1 AND achieved = 0 ORDER BY id DESC"
        }
    };
    let rows = sqlx::query_as::<_, GoalRow>(sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Goal::from).collect())
}

pub async fn insert_goal(pool: &SqlitePool, user_id: Uuid, draft: &GoalDraft) -> StoreResult<Goal> {
    let now = Utc::now();
    sqlx::query_as::<_, GoalRow>(
        "INSERT INTO goals
             (user_id, goal_type, target_value, current_value, target_date, achieved,
              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)
         RETURNING *",
    )
    .bind(user_id)
    .bind(draft.goal_type.as_str())
    .bind(draft.target_value)
    .bind(draft.current_value)
    .bind(draft.target_date)
    .bind(now)
    .fetch_one(pool)
    .await
    .map(Goal::from)
    .map_err(from_sqlx)
}

pub async fn update_goal(
    pool: &SqlitePool,
    user_id: Uuid,
    goal_id: i64,
    draft: &GoalDraft,
) -> StoreResult<Goal> {
    sqlx::query_as::<_, GoalRow>(
        "UPDATE goals
         SET goal_type = ?1, target_value = ?2, current_value = ?3, target_date = ?4,
             updated_at = ?5
         WHERE id = ?6 AND user_id = ?7
         RETURNING *",
    )
    .bind(draft.goal_type.as_str())
    .bind(draft.target_value)
    .bind(draft.current_value)
    .bind(draft.target_date)
    .bind(Utc::now())
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .map(Goal::from)
    .ok_or_else(|| StoreError::not_found("goal", goal_id))
}

pub async fn set_goal_achieved(
    pool: &SqlitePool,
    user_id: Uuid,
    goal_id: i64,
    achieved: bool,
) -> StoreResult<Goal> {
    sqlx::query_as::<_, GoalRow>(
        "UPDATE goals SET achieved = ?1, updated_at = ?2
         WHERE id = ?3 AND user_id = ?4
         RETURNING *",
    )
    .bind(achieved)
    .bind(Utc::now())
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .map(Goal::from)
    .ok_or_else(|| StoreError::not_found("goal", goal_id))
}

pub async fn delete_goal(pool: &SqlitePool, user_id: Uuid, goal_id: i64) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM goals WHERE id = ?1 AND user_id = ?2")
        .bind(goal_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("goal", goal_id));
    }
    Ok(())
}
