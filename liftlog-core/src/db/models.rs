use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StoreError;

pub const PLACEHOLDER_REPS: u32 = 10;
pub const PLACEHOLDER_WEIGHT: f64 = 0.0;
pub const DEFAULT_SET_COUNT: usize = 3;

// Profile
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Exercise catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub muscle_groups: Vec<String>,
    pub instructions: Option<String>,
}

#[derive(FromRow)]
pub(crate) struct ExerciseRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub muscle_groups: String,
    pub instructions: Option<String>,
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = StoreError;

    fn try_from(row: ExerciseRow) -> Result<Self, StoreError> {
        Ok(Exercise {
            id: row.id,
            name: row.name,
            category: row.category,
            muscle_groups: serde_json::from_str(&row.muscle_groups)?,
            instructions: row.instructions,
        })
    }
}

// Workouts
#[derive(FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A workout row annotated with the number of joined workout-exercise rows.
#[derive(FromRow, Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    #[sqlx(flatten)]
    pub workout: Workout,
    pub exercise_count: i64,
}

impl fmt::Display for WorkoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self
            .workout
            .duration_minutes
            .map(|m| format!(" - {} min", m))
            .unwrap_or_default();
        let plural = if self.exercise_count == 1 { "" } else { "s" };
        write!(
            f,
            "{} ({}){} - {} exercise{}",
            self.workout.name,
            self.workout.date.format("%Y-%m-%d"),
            duration,
            self.exercise_count,
            plural
        )
    }
}

/// One set of one exercise. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub index: u32,
    pub reps: u32,
    pub weight: f64,
}

impl ExerciseSet {
    pub fn placeholder(index: u32) -> Self {
        Self {
            index,
            reps: PLACEHOLDER_REPS,
            weight: PLACEHOLDER_WEIGHT,
        }
    }
}

impl fmt::Display for ExerciseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {:.1}kg x {} reps", self.index, self.weight, self.reps)
    }
}

/// Ordered sets of one workout-exercise.
///
/// Never empty, and set `i` (0-based position) always carries `index == i + 1`,
/// so the set count is simply `len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ExerciseSet>", into = "Vec<ExerciseSet>")]
pub struct SetList(Vec<ExerciseSet>);

impl SetList {
    /// `count` placeholder sets; a count of zero still yields one set.
    pub fn with_placeholders(count: usize) -> Self {
        let count = count.max(1);
        Self((1..=count as u32).map(ExerciseSet::placeholder).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExerciseSet> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ExerciseSet] {
        &self.0
    }

    pub fn get(&self, position: usize) -> Option<&ExerciseSet> {
        self.0.get(position)
    }

    pub fn push_placeholder(&mut self) {
        let index = self.0.len() as u32 + 1;
        self.0.push(ExerciseSet::placeholder(index));
    }

    /// Drops the last set. Returns false (and does nothing) at one set.
    pub fn pop(&mut self) -> bool {
        if self.0.len() <= 1 {
            return false;
        }
        self.0.pop();
        true
    }

    pub fn set_reps(&mut self, position: usize, reps: u32) -> bool {
        match self.0.get_mut(position) {
            Some(set) => {
                set.reps = reps;
                true
            }
            None => false,
        }
    }

    pub fn set_weight(&mut self, position: usize, weight: f64) -> bool {
        match self.0.get_mut(position) {
            Some(set) if weight.is_finite() => {
                set.weight = weight;
                true
            }
            _ => false,
        }
    }

    pub fn total_reps(&self) -> u32 {
        self.0.iter().map(|s| s.reps).sum()
    }

    pub fn volume(&self) -> f64 {
        self.0.iter().map(|s| s.reps as f64 * s.weight).sum()
    }
}

impl Default for SetList {
    fn default() -> Self {
        Self::with_placeholders(DEFAULT_SET_COUNT)
    }
}

impl TryFrom<Vec<ExerciseSet>> for SetList {
    type Error = StoreError;

    fn try_from(sets: Vec<ExerciseSet>) -> Result<Self, StoreError> {
        if sets.is_empty() {
            return Err(StoreError::InvalidSets("at least one set is required".into()));
        }
        for (position, set) in sets.iter().enumerate() {
            let expected = position as u32 + 1;
            if set.index != expected {
                return Err(StoreError::InvalidSets(format!(
                    "set at position {} has index {}, expected {}",
                    position, set.index, expected
                )));
            }
        }
        Ok(Self(sets))
    }
}

impl From<SetList> for Vec<ExerciseSet> {
    fn from(list: SetList) -> Self {
        list.0
    }
}

impl<'a> IntoIterator for &'a SetList {
    type Item = &'a ExerciseSet;
    type IntoIter = std::slice::Iter<'a, ExerciseSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub position: i64,
    pub sets: SetList,
    pub rest_seconds: Option<i64>,
    pub notes: Option<String>,
}

#[derive(FromRow)]
pub(crate) struct WorkoutExerciseRow {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub position: i64,
    pub sets: String,
    pub rest_seconds: Option<i64>,
    pub notes: Option<String>,
}

impl TryFrom<WorkoutExerciseRow> for WorkoutExercise {
    type Error = StoreError;

    fn try_from(row: WorkoutExerciseRow) -> Result<Self, StoreError> {
        Ok(WorkoutExercise {
            id: row.id,
            workout_id: row.workout_id,
            exercise_id: row.exercise_id,
            position: row.position,
            sets: serde_json::from_str(&row.sets)?,
            rest_seconds: row.rest_seconds,
            notes: row.notes,
        })
    }
}

/// A workout together with its ordered workout-exercises.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDetail {
    pub workout: Workout,
    pub exercises: Vec<WorkoutExercise>,
}

/// Everything the form submits for one workout. `id` is `None` in create mode.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub id: Option<i64>,
    pub name: String,
    pub date: NaiveDate,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub exercises: Vec<WorkoutExerciseDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExerciseDraft {
    pub exercise_id: i64,
    pub sets: SetList,
    pub rest_seconds: Option<i64>,
    pub notes: Option<String>,
}

// Goals
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalType {
    WeightLoss,
    MuscleGain,
    Strength,
    Endurance,
    WorkoutFrequency,
    Custom(String),
}

impl GoalType {
    /// The fixed list offered by the goal form.
    pub const CHOICES: [GoalType; 5] = [
        GoalType::WeightLoss,
        GoalType::MuscleGain,
        GoalType::Strength,
        GoalType::Endurance,
        GoalType::WorkoutFrequency,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            GoalType::WeightLoss => "weight_loss",
            GoalType::MuscleGain => "muscle_gain",
            GoalType::Strength => "strength",
            GoalType::Endurance => "endurance",
            GoalType::WorkoutFrequency => "workout_frequency",
            GoalType::Custom(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GoalType::WeightLoss => "Weight Loss",
            GoalType::MuscleGain => "Muscle Gain",
            GoalType::Strength => "Strength",
            GoalType::Endurance => "Endurance",
            GoalType::WorkoutFrequency => "Workout Frequency",
            GoalType::Custom(s) => s,
        }
    }
}

impl From<String> for GoalType {
    fn from(s: String) -> Self {
        GoalType::from_str(&s).unwrap_or(GoalType::Custom(s))
    }
}

impl From<GoalType> for String {
    fn from(t: GoalType) -> Self {
        t.as_str().to_string()
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "weight_loss" => Ok(GoalType::WeightLoss),
            "muscle_gain" => Ok(GoalType::MuscleGain),
            "strength" => Ok(GoalType::Strength),
            "endurance" => Ok(GoalType::Endurance),
            "workout_frequency" => Ok(GoalType::WorkoutFrequency),
            other => Err(format!("unknown goal type: {}", other)),
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: Uuid,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    pub target_date: Option<NaiveDate>,
    pub achieved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn progress_percent(&self) -> f64 {
        crate::stats::goal_progress(self.current_value, self.target_value)
    }
}

#[derive(FromRow)]
pub(crate) struct GoalRow {
    pub id: i64,
    pub user_id: Uuid,
    pub goal_type: String,
    pub target_value: f64,
    pub current_value: f64,
    pub target_date: Option<NaiveDate>,
    pub achieved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GoalRow> for Goal {
    fn from(row: GoalRow) -> Self {
        Goal {
            id: row.id,
            user_id: row.user_id,
            goal_type: GoalType::from(row.goal_type),
            target_value: row.target_value,
            current_value: row.current_value,
            target_date: row.target_date,
            achieved: row.achieved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoalFilter {
    #[default]
    All,
    /// Goals whose achieved flag is unset.
    Active,
}
