use log::debug;
use sqlx::SqlitePool;

use crate::db::models::{
    Exercise, Goal, GoalDraft, GoalFilter, Profile, Workout, WorkoutDetail, WorkoutDraft,
    WorkoutSummary,
};
use crate::db::operations;
use crate::error::StoreResult;
use crate::identity::Identity;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn open(database_url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(crate::db::connect(database_url).await?))
    }

    pub async fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(crate::db::connect_in_memory().await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Store for SqliteStore {
    async fn get_profile(&self, who: &Identity) -> StoreResult<Option<Profile>> {
        operations::get_profile(&self.pool, who.id).await
    }

    async fn insert_profile(&self, who: &Identity, full_name: Option<&str>) -> StoreResult<Profile> {
        debug!("Creating profile for {}", who.email);
        operations::insert_profile(&self.pool, who.id, full_name).await
    }

    async fn update_profile(&self, who: &Identity, full_name: Option<&str>) -> StoreResult<Profile> {
        operations::update_profile(&self.pool, who.id, full_name).await
    }

    async fn list_exercises(&self, _who: &Identity) -> StoreResult<Vec<Exercise>> {
        operations::get_all_exercises(&self.pool).await
    }

    async fn list_workouts(
        &self,
        who: &Identity,
        limit: Option<u32>,
    ) -> StoreResult<Vec<WorkoutSummary>> {
        operations::get_workout_summaries(&self.pool, who.id, limit).await
    }

    async fn get_workout(&self, who: &Identity, workout_id: i64) -> StoreResult<Option<WorkoutDetail>> {
        operations::get_workout_detail(&self.pool, who.id, workout_id).await
    }

    async fn save_workout(&self, who: &Identity, draft: &WorkoutDraft) -> StoreResult<Workout> {
        debug!(
            "Saving workout {:?} with {} exercises",
            draft.id,
            draft.exercises.len()
        );
        operations::save_workout(&self.pool, who.id, draft).await
    }

    async fn delete_workout(&self, who: &Identity, workout_id: i64) -> StoreResult<()> {
        operations::delete_workout(&self.pool, who.id, workout_id).await
    }

    async fn list_goals(&self, who: &Identity, filter: GoalFilter) -> StoreResult<Vec<Goal>> {
        operations::get_goals(&self.pool, who.id, filter).await
    }

    async fn insert_goal(&self, who: &Identity, draft: &GoalDraft) -> StoreResult<Goal> {
        operations::insert_goal(&self.pool, who.id, draft).await
    }

    async fn update_goal(&self, who: &Identity, goal_id: i64, draft: &GoalDraft) -> StoreResult<Goal> {
        operations::update_goal(&self.pool, who.id, goal_id, draft).await
    }

    async fn set_goal_achieved(
        &self,
        who: &Identity,
        goal_id: i64,
        achieved: bool,
    ) -> StoreResult<Goal> {
        operations::set_goal_achieved(&self.pool, who.id, goal_id, achieved).await
    }

    async fn delete_goal(&self, who: &Identity, goal_id: i64) -> StoreResult<()> {
        operations::delete_goal(&self.pool, who.id, goal_id).await
    }
}
