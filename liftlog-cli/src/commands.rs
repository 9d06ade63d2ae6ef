use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use liftlog::config::IdentityConfig;
use liftlog::db::reset_user_data;
use liftlog::identity::LocalIdentityProvider;
use liftlog::store::SqliteStore;
use liftlog::views::Shell;

use crate::AppShell;
use crate::tui::goal_line;

const NOT_SIGNED_IN: &str = "Not signed in";

/// Signs in with the configured identity, creating the profile on first use.
pub async fn signed_in_shell(
    store: Arc<SqliteStore>,
    identity: Option<&IdentityConfig>,
) -> Result<AppShell> {
    let Some(identity) = identity else {
        bail!("No identity configured: pass --email or set LIFTLOG_EMAIL");
    };
    let mut shell = Shell::new(store, Arc::new(LocalIdentityProvider::default()));
    if !shell
        .sign_in(&identity.email, identity.full_name.as_deref())
        .await
    {
        bail!("'{}' is not a valid email address", identity.email);
    }
    Ok(shell)
}

pub async fn dashboard(shell: &AppShell) -> Result<()> {
    let mut dashboard = shell.dashboard().context(NOT_SIGNED_IN)?;
    dashboard.load().await;

    let stats = dashboard.stats();
    println!("Total workouts: {}", stats.total_workouts);
    println!("Total minutes:  {}", stats.total_minutes);
    println!("Active goals:   {}", stats.active_goals);
    println!("This week:      {}", stats.this_week);
    println!();
    println!("Recent workouts:");
    if dashboard.recent().is_empty() {
        println!("\tNo workouts yet");
    }
    for summary in dashboard.recent() {
        println!("\t{}", summary);
    }
    Ok(())
}

pub async fn list_workouts(shell: &AppShell, verbose: bool) -> Result<()> {
    let mut list = shell.workouts().context(NOT_SIGNED_IN)?;
    list.load().await;

    if list.workouts().is_empty() {
        println!("No workouts found");
    }
    for summary in list.workouts() {
        println!("{}, {}", summary.workout.id, summary);
        if !verbose {
            continue;
        }
        if let Some(notes) = &summary.workout.notes {
            println!("\tNotes: {}", notes);
        }
        let mut form = shell
            .edit_workout_form(summary.workout.id)
            .context(NOT_SIGNED_IN)?;
        form.open().await;
        for entry in form.entries() {
            let rest = entry
                .rest_seconds
                .map(|s| format!(" (rest {}s)", s))
                .unwrap_or_default();
            println!("\t{}{}", entry.exercise.name, rest);
            for set in &entry.sets {
                println!("\t\t{}", set);
            }
        }
    }
    Ok(())
}

pub async fn delete_workout(shell: &AppShell, workout_id: i64, yes: bool) -> Result<()> {
    let mut list = shell.workouts().context(NOT_SIGNED_IN)?;
    list.load().await;

    if !list.request_delete(workout_id) {
        bail!("Workout #{} not found", workout_id);
    }
    let label = list
        .pending_delete()
        .map(|s| s.workout.name.clone())
        .unwrap_or_default();

    if !yes && !confirm(&format!("Delete workout '{}' and its exercises?", label))? {
        list.cancel_delete();
        println!("Cancelled");
        return Ok(());
    }
    if !list.confirm_delete().await {
        bail!("Could not delete workout #{}", workout_id);
    }
    println!("Deleted workout: {}", label);
    Ok(())
}

pub async fn list_goals(shell: &AppShell) -> Result<()> {
    let mut view = shell.goals().context(NOT_SIGNED_IN)?;
    view.load().await;

    if view.goals().is_empty() {
        println!("No goals yet");
    }
    for goal in view.goals() {
        println!(
            "{}, {} ({:.0}%)",
            goal.id,
            goal_line(goal),
            goal.progress_percent()
        );
    }
    Ok(())
}

pub async fn list_exercises(shell: &AppShell, search: Option<&str>) -> Result<()> {
    let mut picker = shell.new_workout_form().context(NOT_SIGNED_IN)?;
    picker.search = search.unwrap_or_default().to_string();
    picker.open().await;

    let results = picker.search_results();
    if results.is_empty() {
        println!("No matching exercises");
    }
    for exercise in results {
        println!(
            "{}, {} [{}] - {}",
            exercise.id,
            exercise.name,
            exercise.category,
            exercise.muscle_groups.join(", ")
        );
        if let Some(instructions) = &exercise.instructions {
            println!("\t{}", instructions);
        }
    }
    Ok(())
}

pub async fn profile(shell: &AppShell, set_name: Option<String>) -> Result<()> {
    let mut view = shell.profile().context(NOT_SIGNED_IN)?;
    view.load().await;

    if let Some(name) = set_name {
        view.full_name = name;
        if !view.save().await {
            bail!("Could not update profile");
        }
    }

    println!("Email: {}", view.email());
    println!("Name:  {}", view.full_name);
    if let Some(profile) = view.profile() {
        println!("Since: {}", profile.created_at.format("%Y-%m-%d"));
    }
    Ok(())
}

pub async fn reset_db(store: &SqliteStore, yes: bool) -> Result<()> {
    if !yes && !confirm("Delete every profile, workout and goal?")? {
        println!("Cancelled");
        return Ok(());
    }
    reset_user_data(store.pool()).await?;
    println!("Database reset; the exercise catalog was kept");
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[tokio::test]
    async fn test_signed_in_shell_requires_identity() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        assert!(signed_in_shell(store.clone(), None).await.is_err());

        let bad = IdentityConfig {
            email: "ana".into(),
            full_name: None,
        };
        assert!(signed_in_shell(store.clone(), Some(&bad)).await.is_err());

        let good = IdentityConfig {
            email: "ana@example.com".into(),
            full_name: Some("Ana".into()),
        };
        let shell = signed_in_shell(store, Some(&good)).await.unwrap();
        assert_eq!(shell.identity().map(|i| i.email.as_str()), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_delete_unknown_workout_fails() {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        let good = IdentityConfig {
            email: "ana@example.com".into(),
            full_name: None,
        };
        let shell = signed_in_shell(store, Some(&good)).await.unwrap();
        assert!(delete_workout(&shell, 42, true).await.is_err());
    }
}
