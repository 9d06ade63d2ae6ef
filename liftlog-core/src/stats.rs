//! Aggregates derived from already-fetched rows.

use chrono::{Days, NaiveDate};

use crate::db::models::{Exercise, Goal, Workout};

pub const WEEK_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_workouts: usize,
    pub total_minutes: i64,
    pub active_goals: usize,
    pub this_week: usize,
}

impl DashboardStats {
    pub fn compute<'a, W>(workouts: W, goals: &[Goal], today: NaiveDate) -> Self
    where
        W: IntoIterator<Item = &'a Workout> + Clone,
    {
        Self {
            total_workouts: workouts.clone().into_iter().count(),
            total_minutes: total_minutes(workouts.clone()),
            active_goals: goals.iter().filter(|g| !g.achieved).count(),
            this_week: workouts
                .into_iter()
                .filter(|w| is_within_last_week(w.date, today))
                .count(),
        }
    }
}

/// Sum of `duration_minutes`; workouts without a duration count as zero.
pub fn total_minutes<'a>(workouts: impl IntoIterator<Item = &'a Workout>) -> i64 {
    workouts
        .into_iter()
        .map(|w| w.duration_minutes.unwrap_or(0))
        .sum()
}

/// `date >= today - 7 days`. The boundary day is included.
pub fn is_within_last_week(date: NaiveDate, today: NaiveDate) -> bool {
    match today.checked_sub_days(Days::new(WEEK_WINDOW_DAYS)) {
        Some(cutoff) => date >= cutoff,
        None => true,
    }
}

/// `clamp(current / target * 100, 0, 100)`.
///
/// A non-positive target is treated as already met and reports 100.
pub fn goal_progress(current: f64, target: f64) -> f64 {
    if target.is_nan() || target <= 0.0 {
        return 100.0;
    }
    let pct = current / target * 100.0;
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Case-insensitive substring match on name or category. A blank query keeps everything.
pub fn filter_exercises<'a>(catalog: &'a [Exercise], query: &str) -> Vec<&'a Exercise> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return catalog.iter().collect();
    }
    catalog
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&needle) || e.category.to_lowercase().contains(&needle)
        })
        .collect()
}
