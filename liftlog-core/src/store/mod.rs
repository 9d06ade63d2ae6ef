//! The data-access client handed to every view.
//!
//! Every request names the calling [`Identity`]; implementations only ever
//! return or touch rows owned by it (the exercise catalog is shared and
//! read-only). A row owned by someone else is reported as not found.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::db::models::{
    Exercise, Goal, GoalDraft, GoalFilter, Profile, Workout, WorkoutDetail, WorkoutDraft,
    WorkoutSummary,
};
use crate::error::StoreResult;
use crate::identity::Identity;

#[allow(async_fn_in_trait)]
pub trait Store {
    async fn get_profile(&self, who: &Identity) -> StoreResult<Option<Profile>>;
    async fn insert_profile(&self, who: &Identity, full_name: Option<&str>)
    -> StoreResult<Profile>;
    async fn update_profile(&self, who: &Identity, full_name: Option<&str>)
    -> StoreResult<Profile>;

    async fn list_exercises(&self, who: &Identity) -> StoreResult<Vec<Exercise>>;

    /// Newest first by date. `limit = None` returns every workout.
    async fn list_workouts(
        &self,
        who: &Identity,
        limit: Option<u32>,
    ) -> StoreResult<Vec<WorkoutSummary>>;
    async fn get_workout(&self, who: &Identity, workout_id: i64)
    -> StoreResult<Option<WorkoutDetail>>;
    /// Create when `draft.id` is `None`, otherwise update and replace the
    /// workout-exercises. All-or-nothing.
    async fn save_workout(&self, who: &Identity, draft: &WorkoutDraft) -> StoreResult<Workout>;
    async fn delete_workout(&self, who: &Identity, workout_id: i64) -> StoreResult<()>;

    /// Newest first by creation.
    async fn list_goals(&self, who: &Identity, filter: GoalFilter) -> StoreResult<Vec<Goal>>;
    async fn insert_goal(&self, who: &Identity, draft: &GoalDraft) -> StoreResult<Goal>;
    async fn update_goal(&self, who: &Identity, goal_id: i64, draft: &GoalDraft)
    -> StoreResult<Goal>;
    async fn set_goal_achieved(
        &self,
        who: &Identity,
        goal_id: i64,
        achieved: bool,
    ) -> StoreResult<Goal>;
    async fn delete_goal(&self, who: &Identity, goal_id: i64) -> StoreResult<()>;
}
