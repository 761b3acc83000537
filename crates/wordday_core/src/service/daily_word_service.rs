//! Word-of-the-day use-case service.
//!
//! # Responsibility
//! - Expose the query surface (random word, existence, today, stats).
//! - Expose the selection engine and the idempotent ensure-assignment job.
//! - Normalize and import newline-delimited word lists.
//!
//! # Invariants
//! - The scheduler and the force entry point share `ensure_assignment`.
//! - Lookups normalize caller text with the same rule used on import.
//! - Service layer remains storage-agnostic.

use crate::model::pool::Pool;
use crate::model::word::{Assignment, ImportSummary, PoolStats, Word};
use crate::repo::ledger_repo::AssignmentRepository;
use crate::repo::word_repo::{RepoError, WordRepository};
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for word-of-the-day use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Nothing left to draw from the pool.
    EmptyPool(Pool),
    /// Word list file could not be read.
    Import { path: PathBuf, source: std::io::Error },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPool(pool) => write!(f, "no unused {pool} words available"),
            Self::Import { path, source } => {
                write!(f, "failed to read word list `{}`: {source}", path.display())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Import { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::EmptyPool(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::EmptyPool(pool) => Self::EmptyPool(pool),
            other => Self::Repo(other),
        }
    }
}

/// Current calendar date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Use-case service for one pool.
pub struct DailyWordService<R> {
    repo: R,
}

impl<R: WordRepository + AssignmentRepository> DailyWordService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn pool(&self) -> Pool {
        self.repo.pool()
    }

    /// Imports raw lines, normalizing each and skipping blanks and duplicates.
    ///
    /// Safe to repeat: re-importing the same lines inserts nothing.
    pub fn import_lines<I, S>(&self, lines: I) -> ServiceResult<ImportSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pool = self.pool();
        let words = lines
            .into_iter()
            .filter_map(|line| pool.normalize(line.as_ref()))
            .collect::<Vec<_>>();

        let inserted = self.repo.insert_words(&words)?;
        let summary = ImportSummary {
            processed: words.len(),
            inserted,
            skipped: words.len() - inserted,
        };
        info!(
            "event=words_import module=service status=ok pool={} processed={} inserted={} skipped={}",
            pool, summary.processed, summary.inserted, summary.skipped
        );
        Ok(summary)
    }

    /// Imports a UTF-8 word list file, one word per line.
    pub fn import_file(&self, path: impl AsRef<Path>) -> ServiceResult<ImportSummary> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ServiceError::Import {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_lines(content.lines())
    }

    /// Draws and consumes one available word, stamping it with `today`.
    pub fn select_and_consume(&self, today: NaiveDate) -> ServiceResult<Word> {
        let word = self.repo.select_and_consume(today)?;
        debug!(
            "event=word_consume module=service status=ok pool={} word_id={}",
            self.pool(),
            word.id
        );
        Ok(word)
    }

    /// Guarantees `date` has an assignment, creating one only when absent.
    ///
    /// Repeated calls for the same date return the same assignment and
    /// consume nothing.
    ///
    /// # Errors
    /// - `EmptyPool` when the date is unassigned and no word is available.
    /// - `Repo` on storage failure; no word is consumed in that case.
    pub fn ensure_assignment(&self, date: NaiveDate) -> ServiceResult<Assignment> {
        let pool = self.pool();
        match self.repo.assign_if_absent(date) {
            Ok(outcome) => {
                let status = if outcome.is_created() { "created" } else { "existing" };
                info!(
                    "event=daily_assign module=service status={status} pool={pool} date={date} word_id={}",
                    outcome.assignment().word.id
                );
                Ok(outcome.into_assignment())
            }
            Err(RepoError::EmptyPool(pool)) => {
                warn!("event=daily_assign module=service status=empty_pool pool={pool} date={date}");
                Err(ServiceError::EmptyPool(pool))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Force entry point: ensures today's (UTC) assignment exists.
    pub fn choose_today(&self) -> ServiceResult<Assignment> {
        self.ensure_assignment(today_utc())
    }

    /// Replaces the assignment for `date` with a freshly consumed word.
    ///
    /// The previously assigned word stays consumed.
    pub fn reassign(&self, date: NaiveDate) -> ServiceResult<Assignment> {
        let assignment = self.repo.reassign(date)?;
        info!(
            "event=daily_reassign module=service status=ok pool={} date={date} word_id={}",
            self.pool(),
            assignment.word.id
        );
        Ok(assignment)
    }

    /// Draws any word of the pool, consumed or not.
    pub fn random_word(&self) -> ServiceResult<Word> {
        self.repo
            .random_word()?
            .ok_or(ServiceError::EmptyPool(self.pool()))
    }

    pub fn assignment_for(&self, date: NaiveDate) -> ServiceResult<Option<Assignment>> {
        Ok(self.repo.get_assignment(date)?)
    }

    /// Today's assignment, or `None` when the daily job has not run yet.
    pub fn today_assignment(&self) -> ServiceResult<Option<Assignment>> {
        self.assignment_for(today_utc())
    }

    /// Checks whether `text` exists after pool normalization.
    pub fn word_exists(&self, text: &str) -> ServiceResult<bool> {
        match self.pool().normalize(text) {
            Some(normalized) => Ok(self.repo.contains_word(&normalized)?),
            None => Ok(false),
        }
    }

    /// Counts plus the `history_limit` most recent assignments.
    pub fn stats(&self, history_limit: u32) -> ServiceResult<PoolStats> {
        let counts = self.repo.counts()?;
        let history = self.repo.recent_assignments(history_limit)?;
        Ok(PoolStats::new(counts, history))
    }
}
