//! Word pool repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Import, look up and randomly draw words of one pool.
//! - Own the select-and-consume transaction.
//!
//! # Invariants
//! - A word's `used` flag only ever moves from 0 to 1.
//! - Read paths reject rows whose `used`/`used_at` columns disagree.

use crate::db::DbError;
use crate::model::pool::Pool;
use crate::model::word::{PoolCounts, Word, WordId};
use chrono::NaiveDate;
use rand::Rng;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pool and ledger operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No word could be drawn from the pool.
    EmptyPool(Pool),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::EmptyPool(pool) => write!(f, "no {pool} words available"),
            Self::InvalidData(message) => write!(f, "invalid persisted word data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::EmptyPool(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for one word pool.
pub trait WordRepository {
    /// The pool this repository reads and writes.
    fn pool(&self) -> Pool;
    /// Inserts already-normalized words, skipping existing ones.
    ///
    /// Returns how many rows were newly inserted.
    fn insert_words(&self, words: &[String]) -> RepoResult<usize>;
    /// Atomically draws one available word and marks it consumed on `today`.
    fn select_and_consume(&self, today: NaiveDate) -> RepoResult<Word>;
    /// Draws any word regardless of consumption state.
    fn random_word(&self) -> RepoResult<Option<Word>>;
    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>>;
    /// Exact lookup on already-normalized text.
    fn contains_word(&self, normalized: &str) -> RepoResult<bool>;
    fn counts(&self) -> RepoResult<PoolCounts>;
}

/// SQLite-backed repository bound to one pool's tables.
pub struct SqlitePoolRepository<'conn> {
    pub(crate) conn: &'conn Connection,
    pub(crate) pool: Pool,
}

impl<'conn> SqlitePoolRepository<'conn> {
    pub fn new(conn: &'conn Connection, pool: Pool) -> Self {
        Self { conn, pool }
    }
}

impl WordRepository for SqlitePoolRepository<'_> {
    fn pool(&self) -> Pool {
        self.pool
    }

    fn insert_words(&self, words: &[String]) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {} (word) VALUES (?1);",
                self.pool.words_table()
            ))?;
            for word in words {
                inserted += stmt.execute([word.as_str()])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn select_and_consume(&self, today: NaiveDate) -> RepoResult<Word> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(word) = consume_random_available(&tx, self.pool, today)? else {
            return Err(RepoError::EmptyPool(self.pool));
        };
        tx.commit()?;
        Ok(word)
    }

    fn random_word(&self) -> RepoResult<Option<Word>> {
        let table = self.pool.words_table();
        let total: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))?;
        if total == 0 {
            return Ok(None);
        }

        let offset = rand::thread_rng().gen_range(0..total);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, word, used, used_at FROM {table} ORDER BY id LIMIT 1 OFFSET ?1;"
        ))?;
        let mut rows = stmt.query([offset])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_word_row(row)?));
        }

        Ok(None)
    }

    fn get_word(&self, id: WordId) -> RepoResult<Option<Word>> {
        load_word(self.conn, self.pool, id)
    }

    fn contains_word(&self, normalized: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE word = ?1);",
                self.pool.words_table()
            ),
            [normalized],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn counts(&self) -> RepoResult<PoolCounts> {
        let (total, used): (i64, i64) = self.conn.query_row(
            &format!(
                "SELECT COUNT(*), COALESCE(SUM(used), 0) FROM {};",
                self.pool.words_table()
            ),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(PoolCounts {
            total: count_to_u64(total, "total")?,
            used: count_to_u64(used, "used")?,
        })
    }
}

/// Draws a uniformly random available word and marks it consumed.
///
/// Callers must hold an immediate transaction on `conn`; this function does
/// not begin or commit one. Returns `None` when the pool has no available
/// words.
pub(crate) fn consume_random_available(
    conn: &Connection,
    pool: Pool,
    today: NaiveDate,
) -> RepoResult<Option<Word>> {
    let table = pool.words_table();
    let available: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE used = 0;"),
        [],
        |row| row.get(0),
    )?;
    if available == 0 {
        return Ok(None);
    }

    let offset = rand::thread_rng().gen_range(0..available);
    let id: WordId = conn.query_row(
        &format!("SELECT id FROM {table} WHERE used = 0 ORDER BY id LIMIT 1 OFFSET ?1;"),
        [offset],
        |row| row.get(0),
    )?;

    let changed = conn.execute(
        &format!("UPDATE {table} SET used = 1, used_at = ?1 WHERE id = ?2 AND used = 0;"),
        params![today, id],
    )?;
    if changed != 1 {
        return Err(RepoError::InvalidData(format!(
            "word {id} in {table} was consumed concurrently"
        )));
    }

    load_word(conn, pool, id)?
        .map(Some)
        .ok_or_else(|| RepoError::InvalidData(format!("word {id} vanished from {table}")))
}

pub(crate) fn load_word(conn: &Connection, pool: Pool, id: WordId) -> RepoResult<Option<Word>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, word, used, used_at FROM {} WHERE id = ?1;",
        pool.words_table()
    ))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_word_row(row)?));
    }

    Ok(None)
}

/// Parses a row exposing `id`, `word`, `used` and `used_at` columns.
pub(crate) fn parse_word_row(row: &Row<'_>) -> RepoResult<Word> {
    let id: WordId = row.get("id")?;
    let used = match row.get::<_, i64>("used")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid used value `{other}` for word {id}"
            )));
        }
    };

    let word = Word {
        id,
        text: row.get("word")?,
        used,
        used_at: row.get("used_at")?,
    };
    if !word.is_consistent() {
        return Err(RepoError::InvalidData(format!(
            "word {id} has used={} but used_at={:?}",
            word.used, word.used_at
        )));
    }
    Ok(word)
}

fn count_to_u64(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative {column} count `{value}`")))
}
