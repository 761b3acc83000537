//! Command-line entry point for the word-of-the-day service.
//!
//! # Responsibility
//! - Expose the query surface and the force-selection path as subcommands.
//! - Run the daily scheduler in the foreground via `serve`.
//!
//! Every subcommand prints JSON to stdout. When a pool has nothing to draw,
//! the command prints `{"detail": ...}` and exits with code 2.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use wordday_core::config::parse_schedule_at;
use wordday_core::db::open_db;
use wordday_core::{
    daily_job, init_logging, today_utc, AppConfig, DailyScheduler, DailyWordService, LogTarget, Pool,
    ServiceError, ServiceResult, SqlitePoolRepository,
};

const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(
    name = "wordday",
    about = "Word of the day for English and Hebrew word pools",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Word pool: english (default) or hebrew
    #[arg(short, long, global = true, default_value = "english")]
    pool: Pool,

    /// SQLite database path (overrides WORDDB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (stderr when unset)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a newline-delimited word list into the pool
    Import {
        /// Word list file, one word per line
        file: PathBuf,
    },

    /// Check whether a word exists in the pool
    Exists {
        /// Word to look up
        word: String,
    },

    /// Print a random word, consumed or not
    Random,

    /// Print today's word, or null when not chosen yet
    Today,

    /// Ensure today's word is chosen and print it
    ChooseToday,

    /// Replace the word assigned to a date with a fresh one
    Reassign {
        /// Date to reassign (YYYY-MM-DD, defaults to today in UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print word counts and recent assignments
    Stats {
        /// Number of recent assignments to list
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Seed pools from the configured word lists and run the daily scheduler
    Serve {
        /// Fire the daily job immediately on start
        #[arg(long)]
        run_now: bool,

        /// UTC time the job fires each day (HH:MM)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Serialize)]
struct NotFound {
    detail: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;
    let target = match &config.log_dir {
        Some(dir) => LogTarget::Dir(dir.clone()),
        None => LogTarget::Stderr,
    };
    init_logging(&config.log_level, target).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let service = DailyWordService::new(SqlitePoolRepository::new(&conn, cli.pool));

    match cli.command {
        Commands::Import { file } => respond(service.import_file(file)),
        Commands::Exists { word } => respond(service.word_exists(&word)),
        Commands::Random => respond(service.random_word()),
        Commands::Today => respond(
            service
                .today_assignment()
                .map(|assignment| assignment.map(|assignment| assignment.word)),
        ),
        Commands::ChooseToday => respond(service.choose_today().map(|assignment| assignment.word)),
        Commands::Reassign { date } => {
            respond(service.reassign(date.unwrap_or_else(today_utc)))
        }
        Commands::Stats { limit } => {
            respond(service.stats(limit.unwrap_or(config.history_limit)))
        }
        Commands::Serve { run_now, at } => {
            let at = match at {
                Some(value) => parse_schedule_at(&value)?,
                None => config.schedule_at,
            };
            seed_pools(&conn, &config)?;
            drop(service);
            drop(conn);

            let handle = DailyScheduler::start(at, daily_job(config.db_path.clone()))
                .context("failed to start scheduler")?;
            info!("event=serve module=cli status=ok db={} at={at}", config.db_path.display());
            if run_now {
                handle.run_now();
            }
            handle.wait();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}

fn seed_pools(conn: &Connection, config: &AppConfig) -> Result<()> {
    for pool in Pool::ALL {
        let seed = match pool {
            Pool::English => &config.english_seed,
            Pool::Hebrew => &config.hebrew_seed,
        };
        if !seed.exists() {
            warn!(
                "event=seed_import module=cli status=skipped pool={pool} path={}",
                seed.display()
            );
            continue;
        }
        DailyWordService::new(SqlitePoolRepository::new(conn, pool)).import_file(seed)?;
    }
    Ok(())
}

fn respond<T: Serialize>(result: ServiceResult<T>) -> Result<ExitCode> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ ServiceError::EmptyPool(_)) => {
            let body = NotFound {
                detail: err.to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
        Err(err) => Err(err.into()),
    }
}
