pub mod models;
pub mod operations;
pub mod seed;

use anyhow::Result;
use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Opens a pool for `database_url`, creating the file if needed, and brings the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| anyhow::anyhow!("Invalid database url {}: {}", database_url, e))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    init_database(&pool).await?;
    Ok(pool)
}

/// A private in-memory database. Pinned to a single connection, since every
/// new SQLite memory connection would otherwise see an empty database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_database(&pool).await?;
    Ok(pool)
}

/// Deletes every user-owned row. The exercise catalog is kept.
pub async fn reset_user_data(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for table in ["workout_exercises", "workouts", "goals", "profiles"] {
        let deleted = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        debug!("Deleted {} rows from {}", deleted, table);
    }
    tx.commit().await?;
    info!("User data reset");
    Ok(())
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_10_01_120000_0000_SETUP_TABLES: &str =
    include_str!("../../../migrations/2026-10-01-120000-0000_setup_tables/up.sql");

const MIGRATIONS: &[Migration] = &[Migration {
    name: "2026-10-01-120000-0000_setup_tables",
    up_sql: MIGRATION_2026_10_01_120000_0000_SETUP_TABLES,
}];

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(result > 0)
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Applies pending migrations, each inside its own transaction, then seeds the catalog.
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        let mut tx = pool.begin().await?;
        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to execute migration statement in {}: {} - Error: {}",
                        migration.name,
                        statement,
                        e
                    )
                })?;
        }
        sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Migration {} applied successfully", migration.name);
    }

    seed::seed_exercise_catalog(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sql_statements_skips_comments() {
        let sql = "-- header\nCREATE TABLE a (x INTEGER);\n\n-- more\nCREATE TABLE b (y TEXT);\n";
        let statements = parse_sql_statements(sql);
        assert_eq!(
            statements,
            vec!["CREATE TABLE a (x INTEGER)", "CREATE TABLE b (y TEXT)"]
        );
    }

    #[tokio::test]
    async fn test_init_database_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        init_database(&pool).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);

        let exercises: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(exercises, seed::SEED_EXERCISES.len() as i64);
    }
}
