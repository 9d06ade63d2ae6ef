use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::db::models::{
    DEFAULT_SET_COUNT, Exercise, SetList, Workout, WorkoutDraft, WorkoutExerciseDraft,
};
use crate::identity::Identity;
use crate::stats::filter_exercises;
use crate::store::Store;

pub const SAVE_ERROR_ALERT: &str = "Error saving workout";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Workout name is required")]
    MissingName,
    #[error("Duration cannot be negative")]
    NegativeDuration,
}

/// One exercise in the form, with its editable sets.
#[derive(Debug, Clone, PartialEq)]
pub struct FormEntry {
    pub exercise: Exercise,
    pub sets: SetList,
    pub rest_seconds: Option<i64>,
    pub notes: Option<String>,
}

/// Create/edit form for one workout and its ordered exercises.
pub struct WorkoutForm<S> {
    store: Arc<S>,
    identity: Identity,
    workout_id: Option<i64>,
    pub name: String,
    pub date: NaiveDate,
    pub duration_minutes: Option<i64>,
    pub notes: String,
    pub search: String,
    entries: Vec<FormEntry>,
    catalog: Vec<Exercise>,
    alert: Option<String>,
}

impl<S: Store> WorkoutForm<S> {
    /// A blank form dated today.
    pub fn create(store: Arc<S>, identity: Identity) -> Self {
        Self {
            store,
            identity,
            workout_id: None,
            name: String::new(),
            date: Local::now().date_naive(),
            duration_minutes: None,
            notes: String::new(),
            search: String::new(),
            entries: Vec::new(),
            catalog: Vec::new(),
            alert: None,
        }
    }

    /// A form for an existing workout; its rows are fetched by [`open`](Self::open).
    pub fn edit(store: Arc<S>, identity: Identity, workout_id: i64) -> Self {
        Self {
            workout_id: Some(workout_id),
            ..Self::create(store, identity)
        }
    }

    pub fn workout_id(&self) -> Option<i64> {
        self.workout_id
    }

    pub fn is_editing(&self) -> bool {
        self.workout_id.is_some()
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn catalog(&self) -> &[Exercise] {
        &self.catalog
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Loads the catalog once and, in edit mode, the workout being edited.
    pub async fn open(&mut self) {
        match self.store.list_exercises(&self.identity).await {
            Ok(catalog) => self.catalog = catalog,
            Err(e) => error!("Error fetching exercises: {}", e),
        }

        let Some(workout_id) = self.workout_id else {
            return;
        };
        match self.store.get_workout(&self.identity, workout_id).await {
            Ok(Some(detail)) => {
                self.name = detail.workout.name;
                self.date = detail.workout.date;
                self.duration_minutes = detail.workout.duration_minutes;
                self.notes = detail.workout.notes.unwrap_or_default();
                self.entries = detail
                    .exercises
                    .into_iter()
                    .map(|we| FormEntry {
                        exercise: self.lookup_exercise(we.exercise_id),
                        sets: we.sets,
                        rest_seconds: we.rest_seconds,
                        notes: we.notes,
                    })
                    .collect();
            }
            Ok(None) => {
                warn!("Workout #{} not found", workout_id);
                self.alert = Some("Workout not found".to_string());
            }
            Err(e) => {
                error!("Error fetching workout #{}: {}", workout_id, e);
                self.alert = Some("Error loading workout".to_string());
            }
        }
    }

    fn lookup_exercise(&self, exercise_id: i64) -> Exercise {
        self.catalog
            .iter()
            .find(|e| e.id == exercise_id)
            .cloned()
            .unwrap_or_else(|| Exercise {
                id: exercise_id,
                name: format!("Exercise #{}", exercise_id),
                category: String::new(),
                muscle_groups: Vec::new(),
                instructions: None,
            })
    }

    /// Catalog entries matching the current search text.
    pub fn search_results(&self) -> Vec<&Exercise> {
        filter_exercises(&self.catalog, &self.search)
    }

    /// Appends a catalog exercise seeded with three placeholder sets.
    pub fn add_exercise(&mut self, exercise_id: i64) -> bool {
        let Some(exercise) = self.catalog.iter().find(|e| e.id == exercise_id).cloned() else {
            return false;
        };
        self.entries.push(FormEntry {
            exercise,
            sets: SetList::with_placeholders(DEFAULT_SET_COUNT),
            rest_seconds: None,
            notes: None,
        });
        true
    }

    pub fn remove_exercise(&mut self, entry: usize) -> bool {
        if entry < self.entries.len() {
            self.entries.remove(entry);
            true
        } else {
            false
        }
    }

    pub fn add_set(&mut self, entry: usize) -> bool {
        match self.entries.get_mut(entry) {
            Some(e) => {
                e.sets.push_placeholder();
                true
            }
            None => false,
        }
    }

    /// Drops the entry's last set; a no-op once a single set is left.
    pub fn remove_set(&mut self, entry: usize) -> bool {
        self.entries
            .get_mut(entry)
            .map(|e| e.sets.pop())
            .unwrap_or(false)
    }

    pub fn set_reps(&mut self, entry: usize, set: usize, reps: u32) -> bool {
        self.entries
            .get_mut(entry)
            .map(|e| e.sets.set_reps(set, reps))
            .unwrap_or(false)
    }

    pub fn set_weight(&mut self, entry: usize, set: usize, weight: f64) -> bool {
        self.entries
            .get_mut(entry)
            .map(|e| e.sets.set_weight(set, weight))
            .unwrap_or(false)
    }

    pub fn set_rest(&mut self, entry: usize, rest_seconds: Option<i64>) -> bool {
        match self.entries.get_mut(entry) {
            Some(e) => {
                e.rest_seconds = rest_seconds.filter(|s| *s >= 0);
                true
            }
            None => false,
        }
    }

    pub fn draft(&self) -> Result<WorkoutDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        if self.duration_minutes.is_some_and(|m| m < 0) {
            return Err(FormError::NegativeDuration);
        }
        let notes = self.notes.trim();
        Ok(WorkoutDraft {
            id: self.workout_id,
            name: name.to_string(),
            date: self.date,
            duration_minutes: self.duration_minutes,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            exercises: self
                .entries
                .iter()
                .map(|e| WorkoutExerciseDraft {
                    exercise_id: e.exercise.id,
                    sets: e.sets.clone(),
                    rest_seconds: e.rest_seconds,
                    notes: e.notes.clone(),
                })
                .collect(),
        })
    }

    /// Writes the workout and all entries in one store transaction. On
    /// failure the form keeps its state and raises an alert.
    pub async fn save(&mut self) -> Option<Workout> {
        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.alert = Some(e.to_string());
                return None;
            }
        };

        match self.store.save_workout(&self.identity, &draft).await {
            Ok(workout) => {
                info!(
                    "Saved workout #{} with {} exercises",
                    workout.id,
                    draft.exercises.len()
                );
                self.workout_id = Some(workout.id);
                self.alert = None;
                Some(workout)
            }
            Err(e) => {
                error!("Error saving workout: {}", e);
                self.alert = Some(SAVE_ERROR_ALERT.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::store_with_user;

    #[tokio::test]
    async fn test_search_and_add_exercise() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut form = WorkoutForm::create(store, who);
        form.open().await;
        assert_eq!(form.catalog().len(), 8);

        form.search = "bench".into();
        let results = form.search_results();
        assert_eq!(results.len(), 1);
        let bench_id = results[0].id;

        assert!(form.add_exercise(bench_id));
        assert!(!form.add_exercise(12345));
        let entry = &form.entries()[0];
        assert_eq!(entry.sets.len(), 3);
        assert!(entry.sets.iter().all(|s| s.reps == 10 && s.weight == 0.0));
    }

    #[tokio::test]
    async fn test_set_editing() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut form = WorkoutForm::create(store, who);
        form.open().await;
        form.add_exercise(1);

        assert!(form.add_set(0));
        assert_eq!(form.entries()[0].sets.len(), 4);
        for _ in 0..5 {
            form.remove_set(0);
        }
        assert_eq!(form.entries()[0].sets.len(), 1);
        assert!(!form.remove_set(0));

        assert!(form.set_reps(0, 0, 12));
        assert!(form.set_weight(0, 0, 42.5));
        assert!(!form.set_reps(0, 1, 12));
        assert!(!form.set_weight(3, 0, 1.0));
        let set = form.entries()[0].sets.get(0).copied().unwrap();
        assert_eq!((set.index, set.reps, set.weight), (1, 12, 42.5));
    }

    #[tokio::test]
    async fn test_save_two_exercises_three_sets_each() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut form = WorkoutForm::create(store.clone(), who.clone());
        form.open().await;
        form.name = "Upper".into();
        form.add_exercise(1);
        form.add_exercise(4);

        let workout = form.save().await.unwrap();
        assert_eq!(form.workout_id(), Some(workout.id));

        let detail = store.get_workout(&who, workout.id).await.unwrap().unwrap();
        assert_eq!(detail.exercises.len(), 2);
        assert!(detail.exercises.iter().all(|e| e.sets.len() == 3));
    }

    #[tokio::test]
    async fn test_edit_replaces_entries() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut form = WorkoutForm::create(store.clone(), who.clone());
        form.open().await;
        form.name = "Legs".into();
        form.add_exercise(2);
        form.add_exercise(5);
        let workout = form.save().await.unwrap();

        let mut edit = WorkoutForm::edit(store.clone(), who.clone(), workout.id);
        edit.open().await;
        assert_eq!(edit.name, "Legs");
        assert_eq!(edit.entries().len(), 2);
        assert_eq!(edit.entries()[1].exercise.name, "Deadlift");

        edit.remove_exercise(0);
        edit.set_reps(0, 2, 5);
        edit.save().await.unwrap();

        let detail = store.get_workout(&who, workout.id).await.unwrap().unwrap();
        assert_eq!(detail.exercises.len(), 1);
        assert_eq!(detail.exercises[0].exercise_id, 5);
        assert_eq!(detail.exercises[0].sets.get(2).map(|s| s.reps), Some(5));
        assert_eq!(store.workout_exercise_rows().await, 1);
    }

    #[tokio::test]
    async fn test_save_failure_raises_alert_and_keeps_state() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut form = WorkoutForm::create(store.clone(), who);
        form.open().await;

        assert!(form.save().await.is_none());
        assert_eq!(form.alert(), Some("Workout name is required"));

        form.name = "Cardio".into();
        form.add_exercise(8);
        store.set_offline(true);
        assert!(form.save().await.is_none());
        assert_eq!(form.alert(), Some(SAVE_ERROR_ALERT));
        assert_eq!(form.entries().len(), 1);
        assert_eq!(form.workout_id(), None);
    }
}
