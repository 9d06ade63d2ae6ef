use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::models::{
    Exercise, Goal, GoalDraft, GoalFilter, Profile, Workout, WorkoutDetail, WorkoutDraft,
    WorkoutExercise, WorkoutSummary,
};
use crate::db::seed;
use crate::error::{StoreError, StoreResult};
use crate::identity::Identity;
use crate::store::Store;

#[derive(Debug)]
struct Inner {
    profiles: HashMap<Uuid, Profile>,
    exercises: Vec<Exercise>,
    workouts: BTreeMap<i64, Workout>,
    workout_exercises: Vec<WorkoutExercise>,
    goals: BTreeMap<i64, Goal>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_profile(&self, who: &Identity) -> StoreResult<()> {
        if self.profiles.contains_key(&who.id) {
            Ok(())
        } else {
            Err(StoreError::Constraint(format!("no profile for {}", who.id)))
        }
    }

    fn owned_workout(&self, who: &Identity, workout_id: i64) -> Option<&Workout> {
        self.workouts
            .get(&workout_id)
            .filter(|w| w.user_id == who.id)
    }

    fn owned_goal_mut(&mut self, who: &Identity, goal_id: i64) -> StoreResult<&mut Goal> {
        self.goals
            .get_mut(&goal_id)
            .filter(|g| g.user_id == who.id)
            .ok_or_else(|| StoreError::not_found("goal", goal_id))
    }

    fn exercise_count(&self, workout_id: i64) -> i64 {
        self.workout_exercises
            .iter()
            .filter(|we| we.workout_id == workout_id)
            .count() as i64
    }
}

/// In-process [`Store`] with the same ownership and cascade rules as the
/// SQLite store. `set_offline(true)` makes every request fail with
/// [`StoreError::Unavailable`].
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A store holding only the seeded exercise catalog.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                profiles: HashMap::new(),
                exercises: seed::catalog(),
                workouts: BTreeMap::new(),
                workout_exercises: Vec::new(),
                goals: BTreeMap::new(),
                next_id: 0,
            }),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }

    /// Removes the profile and, like the foreign keys do, everything it owns.
    pub async fn delete_profile(&self, who: &Identity) -> StoreResult<()> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        if inner.profiles.remove(&who.id).is_none() {
            return Err(StoreError::not_found("profile", who.id));
        }
        let owned: Vec<i64> = inner
            .workouts
            .values()
            .filter(|w| w.user_id == who.id)
            .map(|w| w.id)
            .collect();
        inner.workouts.retain(|_, w| w.user_id != who.id);
        inner
            .workout_exercises
            .retain(|we| !owned.contains(&we.workout_id));
        inner.goals.retain(|_, g| g.user_id != who.id);
        Ok(())
    }

    pub async fn workout_exercise_rows(&self) -> usize {
        self.inner.lock().await.workout_exercises.len()
    }
}

impl Store for MemoryStore {
    async fn get_profile(&self, who: &Identity) -> StoreResult<Option<Profile>> {
        self.check_online()?;
        Ok(self.inner.lock().await.profiles.get(&who.id).cloned())
    }

    async fn insert_profile(&self, who: &Identity, full_name: Option<&str>) -> StoreResult<Profile> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        if inner.profiles.contains_key(&who.id) {
            return Err(StoreError::Constraint(format!(
                "profile {} already exists",
                who.id
            )));
        }
        let now = Utc::now();
        let profile = Profile {
            id: who.id,
            full_name: full_name.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(who.id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, who: &Identity, full_name: Option<&str>) -> StoreResult<Profile> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        let profile = inner
            .profiles
            .get_mut(&who.id)
            .ok_or_else(|| StoreError::not_found("profile", who.id))?;
        profile.full_name = full_name.map(str::to_string);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn list_exercises(&self, _who: &Identity) -> StoreResult<Vec<Exercise>> {
        self.check_online()?;
        let mut exercises = self.inner.lock().await.exercises.clone();
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    async fn list_workouts(
        &self,
        who: &Identity,
        limit: Option<u32>,
    ) -> StoreResult<Vec<WorkoutSummary>> {
        self.check_online()?;
        let inner = self.inner.lock().await;
        let mut summaries: Vec<WorkoutSummary> = inner
            .workouts
            .values()
            .filter(|w| w.user_id == who.id)
            .map(|w| WorkoutSummary {
                workout: w.clone(),
                exercise_count: inner.exercise_count(w.id),
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.workout
                .date
                .cmp(&a.workout.date)
                .then(b.workout.id.cmp(&a.workout.id))
        });
        if let Some(limit) = limit {
            summaries.truncate(limit as usize);
        }
        Ok(summaries)
    }

    async fn get_workout(&self, who: &Identity, workout_id: i64) -> StoreResult<Option<WorkoutDetail>> {
        self.check_online()?;
        let inner = self.inner.lock().await;
        let Some(workout) = inner.owned_workout(who, workout_id).cloned() else {
            return Ok(None);
        };
        let mut exercises: Vec<WorkoutExercise> = inner
            .workout_exercises
            .iter()
            .filter(|we| we.workout_id == workout_id)
            .cloned()
            .collect();
        exercises.sort_by_key(|we| (we.position, we.id));
        Ok(Some(WorkoutDetail { workout, exercises }))
    }

    async fn save_workout(&self, who: &Identity, draft: &WorkoutDraft) -> StoreResult<Workout> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        inner.require_profile(who)?;

        // Validate everything up front so a rejected save changes nothing.
        if let Some(workout_id) = draft.id {
            if inner.owned_workout(who, workout_id).is_none() {
                return Err(StoreError::not_found("workout", workout_id));
            }
        }
        for entry in &draft.exercises {
            if !inner.exercises.iter().any(|e| e.id == entry.exercise_id) {
                return Err(StoreError::Constraint(format!(
                    "unknown exercise {}",
                    entry.exercise_id
                )));
            }
        }

        let now = Utc::now();
        let workout = match draft.id {
            Some(workout_id) => {
                let workout = inner
                    .workouts
                    .get_mut(&workout_id)
                    .ok_or_else(|| StoreError::not_found("workout", workout_id))?;
                workout.name = draft.name.clone();
                workout.date = draft.date;
                workout.duration_minutes = draft.duration_minutes;
                workout.notes = draft.notes.clone();
                workout.updated_at = now;
                let workout = workout.clone();
                inner
                    .workout_exercises
                    .retain(|we| we.workout_id != workout_id);
                workout
            }
            None => {
                let workout = Workout {
                    id: inner.next_id(),
                    user_id: who.id,
                    name: draft.name.clone(),
                    date: draft.date,
                    duration_minutes: draft.duration_minutes,
                    notes: draft.notes.clone(),
                    created_at: now,
                    updated_at: now,
                };
                inner.workouts.insert(workout.id, workout.clone());
                workout
            }
        };

        for (position, entry) in draft.exercises.iter().enumerate() {
            let id = inner.next_id();
            inner.workout_exercises.push(WorkoutExercise {
                id,
                workout_id: workout.id,
                exercise_id: entry.exercise_id,
                position: position as i64,
                sets: entry.sets.clone(),
                rest_seconds: entry.rest_seconds,
                notes: entry.notes.clone(),
            });
        }

        Ok(workout)
    }

    async fn delete_workout(&self, who: &Identity, workout_id: i64) -> StoreResult<()> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        if inner.owned_workout(who, workout_id).is_none() {
            return Err(StoreError::not_found("workout", workout_id));
        }
        inner.workouts.remove(&workout_id);
        inner
            .workout_exercises
            .retain(|we| we.workout_id != workout_id);
        Ok(())
    }

    async fn list_goals(&self, who: &Identity, filter: GoalFilter) -> StoreResult<Vec<Goal>> {
        self.check_online()?;
        let inner = self.inner.lock().await;
        Ok(inner
            .goals
            .values()
            .rev()
            .filter(|g| g.user_id == who.id)
            .filter(|g| filter == GoalFilter::All || !g.achieved)
            .cloned()
            .collect())
    }

    async fn insert_goal(&self, who: &Identity, draft: &GoalDraft) -> StoreResult<Goal> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        inner.require_profile(who)?;
        let now = Utc::now();
        let goal = Goal {
            id: inner.next_id(),
            user_id: who.id,
            goal_type: draft.goal_type.clone(),
            target_value: draft.target_value,
            current_value: draft.current_value,
            target_date: draft.target_date,
            achieved: false,
            created_at: now,
            updated_at: now,
        };
        inner.goals.insert(goal.id, goal.clone());
        Ok(goal)
    }

    async fn update_goal(&self, who: &Identity, goal_id: i64, draft: &GoalDraft) -> StoreResult<Goal> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        let goal = inner.owned_goal_mut(who, goal_id)?;
        goal.goal_type = draft.goal_type.clone();
        goal.target_value = draft.target_value;
        goal.current_value = draft.current_value;
        goal.target_date = draft.target_date;
        goal.updated_at = Utc::now();
        Ok(goal.clone())
    }

    async fn set_goal_achieved(
        &self,
        who: &Identity,
        goal_id: i64,
        achieved: bool,
    ) -> StoreResult<Goal> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        let goal = inner.owned_goal_mut(who, goal_id)?;
        goal.achieved = achieved;
        goal.updated_at = Utc::now();
        Ok(goal.clone())
    }

    async fn delete_goal(&self, who: &Identity, goal_id: i64) -> StoreResult<()> {
        self.check_online()?;
        let mut inner = self.inner.lock().await;
        inner.owned_goal_mut(who, goal_id)?;
        inner.goals.remove(&goal_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{GoalType, SetList, WorkoutExerciseDraft};
    use chrono::NaiveDate;

    fn draft(name: &str, exercise_ids: &[i64]) -> WorkoutDraft {
        WorkoutDraft {
            id: None,
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            duration_minutes: Some(30),
            notes: None,
            exercises: exercise_ids
                .iter()
                .map(|&exercise_id| WorkoutExerciseDraft {
                    exercise_id,
                    sets: SetList::default(),
                    rest_seconds: None,
                    notes: None,
                })
                .collect(),
        }
    }

    async fn signed_up(store: &MemoryStore, email: &str) -> Identity {
        let who = Identity::for_email(email, None);
        store.insert_profile(&who, None).await.unwrap();
        who
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let ana = signed_up(&store, "ana@example.com").await;
        let bo = signed_up(&store, "bo@example.com").await;

        let workout = store.save_workout(&ana, &draft("Legs", &[2])).await.unwrap();
        assert!(store.list_workouts(&bo, None).await.unwrap().is_empty());
        assert!(store.get_workout(&bo, workout.id).await.unwrap().is_none());
        assert!(
            store
                .delete_workout(&bo, workout.id)
                .await
                .unwrap_err()
                .is_not_found()
        );

        let mut edit = draft("Stolen", &[]);
        edit.id = Some(workout.id);
        assert!(store.save_workout(&bo, &edit).await.is_err());
        assert_eq!(store.list_workouts(&ana, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_save_changes_nothing() {
        let store = MemoryStore::new();
        let ana = signed_up(&store, "ana@example.com").await;
        let workout = store.save_workout(&ana, &draft("Push", &[1, 4])).await.unwrap();

        let mut edit = draft("Push", &[1, 999]);
        edit.id = Some(workout.id);
        assert!(store.save_workout(&ana, &edit).await.is_err());

        let detail = store.get_workout(&ana, workout.id).await.unwrap().unwrap();
        let ids: Vec<i64> = detail.exercises.iter().map(|e| e.exercise_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_delete_profile_cascades() {
        let store = MemoryStore::new();
        let ana = signed_up(&store, "ana@example.com").await;
        store.save_workout(&ana, &draft("Push", &[1])).await.unwrap();
        store
            .insert_goal(
                &ana,
                &GoalDraft {
                    goal_type: GoalType::Strength,
                    target_value: 100.0,
                    current_value: 0.0,
                    target_date: None,
                },
            )
            .await
            .unwrap();

        store.delete_profile(&ana).await.unwrap();
        assert_eq!(store.workout_exercise_rows().await, 0);
        assert!(store.list_goals(&ana, GoalFilter::All).await.unwrap().is_empty());
        assert!(store.list_workouts(&ana, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_request() {
        let store = MemoryStore::new();
        let ana = Identity::for_email("ana@example.com", None);
        store.set_offline(true);
        assert!(matches!(
            store.list_exercises(&ana).await,
            Err(StoreError::Unavailable)
        ));
        store.set_offline(false);
        assert_eq!(store.list_exercises(&ana).await.unwrap().len(), 8);
    }
}
