//! Pool identity and per-pool rules.
//!
//! # Responsibility
//! - Name the two independent word pools.
//! - Map each pool to its word and ledger tables.
//! - Normalize word text the way each pool stores it.
//!
//! # Invariants
//! - Table names are static identifiers, never caller input.
//! - Normalization is applied identically on import and on lookup.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the independent word collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pool {
    /// Lowercased English words.
    English,
    /// Hebrew words, stored as imported.
    Hebrew,
}

impl Pool {
    /// Every pool, in scheduler firing order.
    pub const ALL: [Pool; 2] = [Pool::English, Pool::Hebrew];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Hebrew => "hebrew",
        }
    }

    /// Table holding the pool's candidate words.
    pub fn words_table(self) -> &'static str {
        match self {
            Self::English => "words",
            Self::Hebrew => "words_hebrew",
        }
    }

    /// Table holding the pool's date-to-word ledger.
    pub fn ledger_table(self) -> &'static str {
        match self {
            Self::English => "daily_words",
            Self::Hebrew => "daily_words_hebrew",
        }
    }

    /// Normalizes raw word text for storage and lookup.
    ///
    /// Surrounding whitespace is trimmed. English text is lowercased; Hebrew
    /// text is otherwise left untouched, inner whitespace included. Returns
    /// `None` for blank input.
    pub fn normalize(self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = match self {
            Self::English => trimmed.to_lowercase(),
            Self::Hebrew => trimmed.to_string(),
        };
        Some(normalized)
    }
}

impl Display for Pool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a pool name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPoolError(pub String);

impl Display for UnknownPoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown pool `{}`; expected english|hebrew", self.0)
    }
}

impl Error for UnknownPoolError {}

impl FromStr for Pool {
    type Err = UnknownPoolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "hebrew" | "he" => Ok(Self::Hebrew),
            other => Err(UnknownPoolError(other.to_string())),
        }
    }
}
