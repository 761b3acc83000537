//! Core domain logic for the word-of-the-day service.
//! This crate is the single source of truth for pool and ledger invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::pool::{Pool, UnknownPoolError};
pub use model::word::{
    AssignOutcome, Assignment, HistoryEntry, ImportSummary, PoolCounts, PoolStats, Word, WordId,
};
pub use repo::ledger_repo::AssignmentRepository;
pub use repo::word_repo::{RepoError, RepoResult, SqlitePoolRepository, WordRepository};
pub use scheduler::{daily_job, next_fire_after, run_daily_job, DailyScheduler, SchedulerHandle};
pub use service::daily_word_service::{today_utc, DailyWordService, ServiceError, ServiceResult};
