use log::{error, info};
use std::sync::Arc;

use crate::db::models::WorkoutSummary;
use crate::identity::Identity;
use crate::store::Store;
use crate::views::step_cursor;

/// All of the identity's workouts, newest first, with delete-on-confirm.
pub struct WorkoutList<S> {
    store: Arc<S>,
    identity: Identity,
    workouts: Vec<WorkoutSummary>,
    selected: usize,
    pending_delete: Option<i64>,
}

impl<S: Store> WorkoutList<S> {
    pub fn new(store: Arc<S>, identity: Identity) -> Self {
        Self {
            store,
            identity,
            workouts: Vec::new(),
            selected: 0,
            pending_delete: None,
        }
    }

    pub fn workouts(&self) -> &[WorkoutSummary] {
        &self.workouts
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_workout_id(&self) -> Option<i64> {
        self.workouts.get(self.selected).map(|s| s.workout.id)
    }

    pub fn scroll_down(&mut self) {
        self.selected = step_cursor(self.selected, self.workouts.len(), true);
    }

    pub fn scroll_up(&mut self) {
        self.selected = step_cursor(self.selected, self.workouts.len(), false);
    }

    pub async fn load(&mut self) {
        match self.store.list_workouts(&self.identity, None).await {
            Ok(workouts) => {
                self.workouts = workouts;
                if self.selected >= self.workouts.len() {
                    self.selected = self.workouts.len().saturating_sub(1);
                }
            }
            Err(e) => error!("Error fetching workouts: {}", e),
        }
    }

    /// Asks for confirmation before deleting. Unknown ids are ignored.
    pub fn request_delete(&mut self, workout_id: i64) -> bool {
        if self.workouts.iter().any(|s| s.workout.id == workout_id) {
            self.pending_delete = Some(workout_id);
            true
        } else {
            false
        }
    }

    pub fn pending_delete(&self) -> Option<&WorkoutSummary> {
        let id = self.pending_delete?;
        self.workouts.iter().find(|s| s.workout.id == id)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issues the pending delete and re-fetches. Returns whether a row was deleted.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(workout_id) = self.pending_delete.take() else {
            return false;
        };
        let deleted = match self.store.delete_workout(&self.identity, workout_id).await {
            Ok(()) => {
                info!("Deleted workout #{}", workout_id);
                true
            }
            Err(e) => {
                error!("Error deleting workout #{}: {}", workout_id, e);
                false
            }
        };
        self.load().await;
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{SetList, WorkoutDraft, WorkoutExerciseDraft};
    use crate::views::testing::store_with_user;
    use chrono::NaiveDate;

    fn draft(name: &str, day: u32) -> WorkoutDraft {
        WorkoutDraft {
            id: None,
            name: name.into(),
            date: NaiveDate::from_ymd_opt(2026, 4, day).unwrap(),
            duration_minutes: None,
            notes: None,
            exercises: vec![WorkoutExerciseDraft {
                exercise_id: 1,
                sets: SetList::default(),
                rest_seconds: None,
                notes: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (store, who) = store_with_user("ana@example.com").await;
        store.save_workout(&who, &draft("Old", 1)).await.unwrap();
        store.save_workout(&who, &draft("New", 20)).await.unwrap();
        store.save_workout(&who, &draft("Mid", 10)).await.unwrap();

        let mut list = WorkoutList::new(store, who);
        list.load().await;
        let names: Vec<&str> = list.workouts().iter().map(|s| s.workout.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Mid", "Old"]);
        assert!(list.workouts().iter().all(|s| s.exercise_count == 1));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (store, who) = store_with_user("ana@example.com").await;
        let workout = store.save_workout(&who, &draft("Legs", 3)).await.unwrap();

        let mut list = WorkoutList::new(store.clone(), who);
        list.load().await;

        assert!(!list.confirm_delete().await);
        assert!(list.request_delete(workout.id));
        list.cancel_delete();
        assert!(!list.confirm_delete().await);
        assert_eq!(list.workouts().len(), 1);

        assert!(list.request_delete(workout.id));
        assert_eq!(list.pending_delete().map(|s| s.workout.id), Some(workout.id));
        assert!(list.confirm_delete().await);
        assert!(list.workouts().is_empty());
        assert_eq!(store.workout_exercise_rows().await, 0);
    }

    #[tokio::test]
    async fn test_rejected_delete_is_swallowed() {
        let (store, who) = store_with_user("ana@example.com").await;
        let workout = store.save_workout(&who, &draft("Legs", 3)).await.unwrap();

        let mut list = WorkoutList::new(store.clone(), who);
        list.load().await;
        list.request_delete(workout.id);
        store.set_offline(true);
        assert!(!list.confirm_delete().await);
        assert_eq!(list.workouts().len(), 1);
        assert!(list.pending_delete().is_none());
    }

    #[tokio::test]
    async fn test_cursor_stays_in_range() {
        let (store, who) = store_with_user("ana@example.com").await;
        store.save_workout(&who, &draft("A", 1)).await.unwrap();
        store.save_workout(&who, &draft("B", 2)).await.unwrap();

        let mut list = WorkoutList::new(store, who);
        list.load().await;
        list.scroll_up();
        assert_eq!(list.selected(), 0);
        list.scroll_down();
        list.scroll_down();
        assert_eq!(list.selected(), 1);
        assert_eq!(list.selected_workout_id(), list.workouts().get(1).map(|s| s.workout.id));
    }
}
