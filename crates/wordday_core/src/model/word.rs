//! Word, assignment and stats records.
//!
//! # Invariants
//! - `used_at` is `Some` exactly when `used` is `true`.
//! - An `Assignment` always points at a consumed word.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable row identifier assigned at import time.
pub type WordId = i64;

/// One candidate word of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: WordId,
    /// Normalized text. Serialized as `word` to match the external record shape.
    #[serde(rename = "word")]
    pub text: String,
    /// Whether the selection engine has consumed this word.
    pub used: bool,
    /// UTC calendar date of consumption, serialized as `YYYY-MM-DD`.
    pub used_at: Option<NaiveDate>,
}

impl Word {
    /// Checks the consumption flag and date agree.
    pub fn is_consistent(&self) -> bool {
        self.used == self.used_at.is_some()
    }
}

/// The word of the day for one date in one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub word: Word,
}

/// Result of an ensure-assignment attempt at the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The date already had an assignment; nothing was consumed.
    Existing(Assignment),
    /// A word was consumed and recorded for the date.
    Created(Assignment),
}

impl AssignOutcome {
    pub fn assignment(&self) -> &Assignment {
        match self {
            Self::Existing(assignment) | Self::Created(assignment) => assignment,
        }
    }

    pub fn into_assignment(self) -> Assignment {
        match self {
            Self::Existing(assignment) | Self::Created(assignment) => assignment,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// One ledger row as shown in stats history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub word: String,
}

/// Raw word counts for a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCounts {
    pub total: u64,
    pub used: u64,
}

impl PoolCounts {
    pub fn unused(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }
}

/// Aggregate stats for a pool plus its most recent assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub total: u64,
    pub used: u64,
    pub unused: u64,
    /// Most recent assignments, newest date first. Serialized under the
    /// historical `/stats` key even when the configured limit is not 10.
    #[serde(rename = "last_10_days")]
    pub history: Vec<HistoryEntry>,
}

impl PoolStats {
    pub fn new(counts: PoolCounts, history: Vec<HistoryEntry>) -> Self {
        Self {
            total: counts.total,
            used: counts.used,
            unused: counts.unused(),
            history,
        }
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Non-blank lines seen.
    pub processed: usize,
    /// Words newly inserted.
    pub inserted: usize,
    /// Lines skipped because the normalized word already existed.
    pub skipped: usize,
}
