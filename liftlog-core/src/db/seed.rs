use anyhow::Result;
use log::{debug, info};
use sqlx::SqlitePool;

use crate::db::models::Exercise;

pub struct SeedExercise {
    pub name: &'static str,
    pub category: &'static str,
    pub muscle_groups: &'static [&'static str],
    pub instructions: &'static str,
}

pub const SEED_EXERCISES: &[SeedExercise] = &[
    SeedExercise {
        name: "Push-ups",
        category: "Strength",
        muscle_groups: &["chest", "triceps", "shoulders"],
        instructions: "Keep the body straight and lower the chest to the floor, then push back up.",
    },
    SeedExercise {
        name: "Squats",
        category: "Strength",
        muscle_groups: &["quadriceps", "glutes", "hamstrings"],
        instructions: "Feet shoulder-width apart, sit back until thighs are parallel, stand up.",
    },
    SeedExercise {
        name: "Pull-ups",
        category: "Strength",
        muscle_groups: &["back", "biceps"],
        instructions: "Hang from the bar and pull until the chin clears it.",
    },
    SeedExercise {
        name: "Bench Press",
        category: "Strength",
        muscle_groups: &["chest", "triceps", "shoulders"],
        instructions: "Lower the bar to mid-chest and press it back to lockout.",
    },
    SeedExercise {
        name: "Deadlift",
        category: "Strength",
        muscle_groups: &["back", "glutes", "hamstrings"],
        instructions: "Hinge at the hips with a neutral spine and lift the bar from the floor.",
    },
    SeedExercise {
        name: "Plank",
        category: "Core",
        muscle_groups: &["core", "shoulders"],
        instructions: "Hold a straight line from head to heels on forearms and toes.",
    },
    SeedExercise {
        name: "Lunges",
        category: "Strength",
        muscle_groups: &["quadriceps", "glutes", "hamstrings"],
        instructions: "Step forward and lower the back knee towards the floor, alternate legs.",
    },
    SeedExercise {
        name: "Burpees",
        category: "Cardio",
        muscle_groups: &["full body"],
        instructions: "Squat, kick back to a plank, return and jump.",
    },
];

/// The seed catalog as rows, ids assigned in insertion order starting at 1.
pub fn catalog() -> Vec<Exercise> {
    SEED_EXERCISES
        .iter()
        .enumerate()
        .map(|(i, seed)| Exercise {
            id: i as i64 + 1,
            name: seed.name.to_string(),
            category: seed.category.to_string(),
            muscle_groups: seed.muscle_groups.iter().map(|m| m.to_string()).collect(),
            instructions: Some(seed.instructions.to_string()),
        })
        .collect()
}

/// Inserts any seed exercise that is not already present. Safe to run repeatedly.
pub async fn seed_exercise_catalog(pool: &SqlitePool) -> Result<()> {
    let mut inserted = 0u64;
    for seed in SEED_EXERCISES {
        let muscle_groups = serde_json::to_string(seed.muscle_groups)?;
        let result = sqlx::query(
            "INSERT OR IGNORE INTO exercises (name, category, muscle_groups, instructions)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(seed.name)
        .bind(seed.category)
        .bind(muscle_groups)
        .bind(seed.instructions)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    if inserted > 0 {
        info!("Seeded {} exercises into the catalog", inserted);
    } else {
        debug!("Exercise catalog already seeded");
    }
    Ok(())
}
