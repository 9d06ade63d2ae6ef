use chrono::NaiveDate;
use liftlog::db::models::{
    GoalDraft, GoalFilter, GoalType, SetList, WorkoutDraft, WorkoutExerciseDraft,
};
use liftlog::error::StoreError;
use liftlog::identity::Identity;
use liftlog::store::{SqliteStore, Store};

async fn setup() -> (SqliteStore, Identity) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let who = Identity::for_email("ana@example.com", Some("Ana"));
    store.insert_profile(&who, Some("Ana")).await.unwrap();
    (store, who)
}

fn draft(name: &str, exercise_ids: &[i64]) -> WorkoutDraft {
    WorkoutDraft {
        id: None,
        name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
        duration_minutes: Some(45),
        notes: Some("felt good".into()),
        exercises: exercise_ids
            .iter()
            .map(|&exercise_id| WorkoutExerciseDraft {
                exercise_id,
                sets: SetList::default(),
                rest_seconds: Some(90),
                notes: None,
            })
            .collect(),
    }
}

fn goal(target: f64, current: f64) -> GoalDraft {
    GoalDraft {
        goal_type: GoalType::Strength,
        target_value: target,
        current_value: current,
        target_date: NaiveDate::from_ymd_opt(2026, 12, 31),
    }
}

async fn workout_exercise_rows(store: &SqliteStore) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM workout_exercises")
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_catalog_is_seeded() {
    let (store, who) = setup().await;
    let catalog = store.list_exercises(&who).await.unwrap();
    let mut names: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Bench Press",
            "Burpees",
            "Deadlift",
            "Lunges",
            "Plank",
            "Pull-ups",
            "Push-ups",
            "Squats"
        ]
    );
    assert!(catalog.iter().all(|e| !e.muscle_groups.is_empty()));
}

#[tokio::test]
async fn test_save_persists_one_row_per_exercise() {
    let (store, who) = setup().await;
    let workout = store.save_workout(&who, &draft("Upper", &[1, 4])).await.unwrap();

    assert_eq!(workout_exercise_rows(&store).await, 2);
    let detail = store.get_workout(&who, workout.id).await.unwrap().unwrap();
    assert_eq!(detail.workout.notes.as_deref(), Some("felt good"));
    assert_eq!(detail.exercises.len(), 2);
    for (position, entry) in detail.exercises.iter().enumerate() {
        assert_eq!(entry.position, position as i64);
        assert_eq!(entry.sets.len(), 3);
        assert_eq!(entry.rest_seconds, Some(90));
    }

    let summaries = store.list_workouts(&who, None).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].exercise_count, 2);
}

#[tokio::test]
async fn test_update_replaces_entries() {
    let (store, who) = setup().await;
    let workout = store.save_workout(&who, &draft("Legs", &[2, 5, 7])).await.unwrap();

    let mut edit = draft("Legs day", &[2]);
    edit.id = Some(workout.id);
    let mut sets = SetList::with_placeholders(1);
    sets.push_placeholder();
    sets.set_weight(1, 100.0);
    edit.exercises[0].sets = sets;
    let updated = store.save_workout(&who, &edit).await.unwrap();

    assert_eq!(updated.id, workout.id);
    assert_eq!(updated.name, "Legs day");
    assert_eq!(workout_exercise_rows(&store).await, 1);
    let detail = store.get_workout(&who, workout.id).await.unwrap().unwrap();
    assert_eq!(detail.exercises[0].sets.len(), 2);
    assert_eq!(detail.exercises[0].sets.get(1).map(|s| s.weight), Some(100.0));
}

#[tokio::test]
async fn test_failed_update_rolls_back() {
    let (store, who) = setup().await;
    let workout = store.save_workout(&who, &draft("Push", &[1, 4])).await.unwrap();

    let mut edit = draft("Renamed", &[1, 9999]);
    edit.id = Some(workout.id);
    let err = store.save_workout(&who, &edit).await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)), "got {err:?}");

    let detail = store.get_workout(&who, workout.id).await.unwrap().unwrap();
    assert_eq!(detail.workout.name, "Push");
    let ids: Vec<i64> = detail.exercises.iter().map(|e| e.exercise_id).collect();
    assert_eq!(ids, vec![1, 4]);
}

#[tokio::test]
async fn test_delete_cascades_to_workout_exercises() {
    let (store, who) = setup().await;
    let keep = store.save_workout(&who, &draft("Keep", &[3])).await.unwrap();
    let gone = store.save_workout(&who, &draft("Gone", &[1, 2])).await.unwrap();

    store.delete_workout(&who, gone.id).await.unwrap();
    assert_eq!(workout_exercise_rows(&store).await, 1);
    let ids: Vec<i64> = store
        .list_workouts(&who, None)
        .await
        .unwrap()
        .iter()
        .map(|s| s.workout.id)
        .collect();
    assert_eq!(ids, vec![keep.id]);
    assert!(store.delete_workout(&who, gone.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_rows_are_scoped_to_owner() {
    let (store, ana) = setup().await;
    let bo = Identity::for_email("bo@example.com", None);
    store.insert_profile(&bo, None).await.unwrap();

    let workout = store.save_workout(&ana, &draft("Mine", &[1])).await.unwrap();
    let ana_goal = store.insert_goal(&ana, &goal(10.0, 1.0)).await.unwrap();

    assert!(store.list_workouts(&bo, None).await.unwrap().is_empty());
    assert!(store.get_workout(&bo, workout.id).await.unwrap().is_none());
    assert!(store.list_goals(&bo, GoalFilter::All).await.unwrap().is_empty());

    let mut hijack = draft("Theirs", &[]);
    hijack.id = Some(workout.id);
    assert!(store.save_workout(&bo, &hijack).await.unwrap_err().is_not_found());
    assert!(store.delete_workout(&bo, workout.id).await.unwrap_err().is_not_found());
    assert!(
        store
            .update_goal(&bo, ana_goal.id, &goal(1.0, 1.0))
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        store
            .set_goal_achieved(&bo, ana_goal.id, true)
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(store.delete_goal(&bo, ana_goal.id).await.unwrap_err().is_not_found());

    let detail = store.get_workout(&ana, workout.id).await.unwrap().unwrap();
    assert_eq!(detail.workout.name, "Mine");
    assert_eq!(detail.exercises.len(), 1);
}

#[tokio::test]
async fn test_workouts_need_a_profile() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let stranger = Identity::for_email("nobody@example.com", None);
    let err = store.save_workout(&stranger, &draft("x", &[])).await.unwrap_err();
    assert!(matches!(err, StoreError::Constraint(_)), "got {err:?}");
}

#[tokio::test]
async fn test_goals_order_filter_and_zero_target() {
    let (store, who) = setup().await;
    let first = store.insert_goal(&who, &goal(200.0, 50.0)).await.unwrap();
    let second = store.insert_goal(&who, &goal(0.0, 5.0)).await.unwrap();
    store.set_goal_achieved(&who, first.id, true).await.unwrap();

    let all = store.list_goals(&who, GoalFilter::All).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(all[1].progress_percent(), 25.0);
    assert_eq!(all[1].target_date, NaiveDate::from_ymd_opt(2026, 12, 31));
    assert_eq!(all[0].progress_percent(), 100.0);

    let active = store.list_goals(&who, GoalFilter::Active).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);
}

#[tokio::test]
async fn test_profile_update_and_cascade() {
    let (store, who) = setup().await;
    let before = store.get_profile(&who).await.unwrap().unwrap();
    let after = store.update_profile(&who, Some("Ana Lima")).await.unwrap();
    assert_eq!(after.full_name.as_deref(), Some("Ana Lima"));
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);

    store.save_workout(&who, &draft("W", &[1])).await.unwrap();
    store.insert_goal(&who, &goal(5.0, 1.0)).await.unwrap();

    sqlx::query("DELETE FROM profiles WHERE id = ?1")
        .bind(who.id)
        .execute(store.pool())
        .await
        .unwrap();
    assert!(store.list_workouts(&who, None).await.unwrap().is_empty());
    assert!(store.list_goals(&who, GoalFilter::All).await.unwrap().is_empty());
    assert_eq!(workout_exercise_rows(&store).await, 0);
}

#[tokio::test]
async fn test_reset_keeps_catalog() {
    let (store, who) = setup().await;
    store.save_workout(&who, &draft("W", &[1])).await.unwrap();
    liftlog::db::reset_user_data(store.pool()).await.unwrap();

    assert!(store.get_profile(&who).await.unwrap().is_none());
    assert_eq!(store.list_exercises(&who).await.unwrap().len(), 8);
}
