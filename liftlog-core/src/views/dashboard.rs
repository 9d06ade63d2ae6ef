use chrono::{Local, NaiveDate};
use log::{debug, error};
use std::sync::Arc;

use crate::db::models::{GoalFilter, WorkoutSummary};
use crate::identity::Identity;
use crate::stats::DashboardStats;
use crate::store::Store;

pub const RECENT_WORKOUTS: u32 = 5;

pub struct Dashboard<S> {
    store: Arc<S>,
    identity: Identity,
    stats: DashboardStats,
    recent: Vec<WorkoutSummary>,
}

impl<S: Store> Dashboard<S> {
    pub fn new(store: Arc<S>, identity: Identity) -> Self {
        Self {
            store,
            identity,
            stats: DashboardStats::default(),
            recent: Vec::new(),
        }
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn recent(&self) -> &[WorkoutSummary] {
        &self.recent
    }

    pub async fn load(&mut self) {
        self.load_at(Local::now().date_naive()).await
    }

    /// Fetches and recomputes against `today`. A failed fetch keeps the previous values.
    pub async fn load_at(&mut self, today: NaiveDate) {
        let who = &self.identity;
        let (workouts, goals, recent) = futures::join!(
            self.store.list_workouts(who, None),
            self.store.list_goals(who, GoalFilter::Active),
            self.store.list_workouts(who, Some(RECENT_WORKOUTS)),
        );

        match (workouts, goals) {
            (Ok(workouts), Ok(goals)) => {
                self.stats =
                    DashboardStats::compute(workouts.iter().map(|s| &s.workout), &goals, today);
                debug!("Dashboard stats for {}: {:?}", who.email, self.stats);
            }
            (Err(e), _) | (_, Err(e)) => error!("Error fetching dashboard stats: {}", e),
        }

        match recent {
            Ok(recent) => self.recent = recent,
            Err(e) => error!("Error fetching recent workouts: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{GoalDraft, GoalType, SetList, WorkoutDraft, WorkoutExerciseDraft};
    use crate::views::testing::store_with_user;
    use chrono::Days;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workout(name: &str, date: NaiveDate, minutes: Option<i64>, exercises: usize) -> WorkoutDraft {
        WorkoutDraft {
            id: None,
            name: name.into(),
            date,
            duration_minutes: minutes,
            notes: None,
            exercises: (0..exercises)
                .map(|i| WorkoutExerciseDraft {
                    exercise_id: i as i64 + 1,
                    sets: SetList::default(),
                    rest_seconds: None,
                    notes: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_empty_dashboard_is_zero() {
        let (store, who) = store_with_user("ana@example.com").await;
        let mut dashboard = Dashboard::new(store, who);
        dashboard.load_at(day(2026, 6, 10)).await;
        assert_eq!(*dashboard.stats(), DashboardStats::default());
        assert!(dashboard.recent().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_stats_and_recent() {
        let (store, who) = store_with_user("ana@example.com").await;
        let today = day(2026, 6, 10);
        for i in 0..7u64 {
            let date = today.checked_sub_days(Days::new(i * 2)).unwrap();
            store
                .save_workout(&who, &workout(&format!("w{}", i), date, Some(30), i as usize % 3))
                .await
                .unwrap();
        }
        for achieved in [false, true, false] {
            let goal = store
                .insert_goal(
                    &who,
                    &GoalDraft {
                        goal_type: GoalType::Endurance,
                        target_value: 10.0,
                        current_value: 1.0,
                        target_date: None,
                    },
                )
                .await
                .unwrap();
            if achieved {
                store.set_goal_achieved(&who, goal.id, true).await.unwrap();
            }
        }

        let mut dashboard = Dashboard::new(store, who);
        dashboard.load_at(today).await;

        let stats = dashboard.stats();
        assert_eq!(stats.total_workouts, 7);
        assert_eq!(stats.total_minutes, 210);
        assert_eq!(stats.active_goals, 2);
        // Offsets 0, 2, 4 and 6 days fall inside the window; 8 and beyond do not.
        assert_eq!(stats.this_week, 4);

        let recent = dashboard.recent();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].workout.name, "w0");
        assert_eq!(recent[1].exercise_count, 1);
        assert_eq!(recent[2].exercise_count, 2);
        assert!(recent.windows(2).all(|w| w[0].workout.date >= w[1].workout.date));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_last_known_stats() {
        let (store, who) = store_with_user("ana@example.com").await;
        let today = day(2026, 6, 10);
        store
            .save_workout(&who, &workout("Run", today, Some(25), 0))
            .await
            .unwrap();

        let mut dashboard = Dashboard::new(store.clone(), who);
        dashboard.load_at(today).await;
        assert_eq!(dashboard.stats().total_minutes, 25);

        store.set_offline(true);
        dashboard.load_at(today).await;
        assert_eq!(dashboard.stats().total_minutes, 25);
        assert_eq!(dashboard.recent().len(), 1);
    }
}
