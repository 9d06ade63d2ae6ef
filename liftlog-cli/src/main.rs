use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

use liftlog::config::{Config, IdentityConfig};
use liftlog::identity::LocalIdentityProvider;
use liftlog::logging::{init_logger, parse_level};
use liftlog::store::SqliteStore;
use liftlog::views::Shell;

mod commands;
mod tui;

/// Where the interactive UI logs when no log file is configured.
const DEFAULT_TUI_LOG_FILE: &str = "liftlog.log";

pub type AppShell = Shell<SqliteStore, LocalIdentityProvider>;

#[derive(Parser, Debug)]
#[command(version, about = "Liftlog - Fitness Tracker CLI", long_about = None)]
struct Args {
    /// SQLite database URL (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Sign in with this email (overrides LIFTLOG_EMAIL)
    #[arg(long, global = true)]
    email: Option<String>,
    /// Display name used when the profile is first created
    #[arg(long, global = true)]
    name: Option<String>,
    /// off, error, warn, info, debug or trace
    #[arg(long, global = true, value_parser = parse_level_arg)]
    log_level: Option<LevelFilter>,
    #[command(subcommand)]
    command: Commands,
}

fn parse_level_arg(level: &str) -> Result<LevelFilter, String> {
    parse_level(level).ok_or_else(|| format!("unknown log level '{}'", level))
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(email) = &self.email {
            config.identity = Some(IdentityConfig {
                email: email.clone(),
                full_name: self.name.clone(),
            });
        } else if let (Some(name), Some(identity)) = (&self.name, config.identity.as_mut()) {
            identity.full_name = Some(name.clone());
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full-screen tracker with dashboard, workouts, goals and profile
    Interactive,
    /// Print dashboard stats and the most recent workouts
    Dashboard,
    /// List workouts, newest first
    Workouts {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Delete one workout and its exercises
    DeleteWorkout {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List goals with their progress
    Goals,
    /// Browse the exercise catalog
    Exercises {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the profile, optionally renaming it
    Profile {
        #[arg(long)]
        set_name: Option<String>,
    },
    /// Delete every profile, workout and goal (the catalog is kept)
    ResetDb {
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env();
    args.apply(&mut config);

    let interactive = matches!(args.command, Commands::Interactive);
    let log_file = match (&config.log_file, interactive) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(DEFAULT_TUI_LOG_FILE)),
        (None, false) => None,
    };
    init_logger(config.log_level, log_file.as_deref())?;

    let store = Arc::new(SqliteStore::open(&config.database_url).await?);

    match args.command {
        Commands::Interactive => {
            let provider = Arc::new(LocalIdentityProvider::from_config(config.identity.as_ref()));
            let shell = Shell::new(store, provider);
            let terminal = ratatui::init();
            let result = tui::run(terminal, shell).await;
            ratatui::restore();
            result
        }
        Commands::ResetDb { yes } => commands::reset_db(&store, yes).await,
        command => {
            let shell = commands::signed_in_shell(store, config.identity.as_ref()).await?;
            match command {
                Commands::Dashboard => commands::dashboard(&shell).await,
                Commands::Workouts { verbose } => commands::list_workouts(&shell, verbose).await,
                Commands::DeleteWorkout { id, yes } => {
                    commands::delete_workout(&shell, id, yes).await
                }
                Commands::Goals => commands::list_goals(&shell).await,
                Commands::Exercises { search } => {
                    commands::list_exercises(&shell, search.as_deref()).await
                }
                Commands::Profile { set_name } => commands::profile(&shell, set_name).await,
                Commands::Interactive | Commands::ResetDb { .. } => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_environment() {
        let mut config = Config::from_lookup(|key| match key {
            "LIFTLOG_EMAIL" => Some("env@example.com".into()),
            "LIFTLOG_NAME" => Some("Env".into()),
            _ => None,
        });
        let args = Args::parse_from([
            "liftlog",
            "--database-url",
            "sqlite::memory:",
            "--log-level",
            "debug",
            "goals",
            "--name",
            "Flag",
        ]);
        args.apply(&mut config);

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.log_level, LevelFilter::Debug);
        let identity = config.identity.unwrap();
        assert_eq!(identity.email, "env@example.com");
        assert_eq!(identity.full_name.as_deref(), Some("Flag"));
    }

    #[test]
    fn test_email_flag_replaces_identity() {
        let mut config = Config::default();
        let args = Args::parse_from(["liftlog", "--email", "ana@example.com", "dashboard"]);
        args.apply(&mut config);
        assert_eq!(
            config.identity,
            Some(IdentityConfig {
                email: "ana@example.com".into(),
                full_name: None,
            })
        );
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let parsed = Args::try_parse_from(["liftlog", "--log-level", "loud", "goals"]);
        assert!(parsed.is_err());
    }
}
