//! Daily assignment ledger contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read the date-to-word ledger of one pool.
//! - Run ensure-assignment and force-reassign as single transactions that
//!   cover both the ledger row and the word consumption.
//!
//! # Invariants
//! - `date` is the ledger primary key; a pool never has two rows per date.
//! - A consumed word without a ledger row cannot be produced here: a failed
//!   ledger write rolls back the consumption with it.

use crate::model::pool::Pool;
use crate::model::word::{AssignOutcome, Assignment, HistoryEntry};
use crate::repo::word_repo::{
    consume_random_available, parse_word_row, RepoError, RepoResult, SqlitePoolRepository,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for a pool's daily assignment ledger.
pub trait AssignmentRepository {
    fn get_assignment(&self, date: NaiveDate) -> RepoResult<Option<Assignment>>;
    /// Returns the existing assignment for `date`, or consumes a word and
    /// records it, all under one immediate transaction.
    fn assign_if_absent(&self, date: NaiveDate) -> RepoResult<AssignOutcome>;
    /// Consumes a fresh word and replaces whatever `date` pointed at.
    fn reassign(&self, date: NaiveDate) -> RepoResult<Assignment>;
    /// Most recent ledger rows, newest date first.
    fn recent_assignments(&self, limit: u32) -> RepoResult<Vec<HistoryEntry>>;
}

impl AssignmentRepository for SqlitePoolRepository<'_> {
    fn get_assignment(&self, date: NaiveDate) -> RepoResult<Option<Assignment>> {
        find_assignment(self.conn, self.pool, date)
    }

    fn assign_if_absent(&self, date: NaiveDate) -> RepoResult<AssignOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(existing) = find_assignment(&tx, self.pool, date)? {
            tx.commit()?;
            return Ok(AssignOutcome::Existing(existing));
        }

        let Some(word) = consume_random_available(&tx, self.pool, date)? else {
            return Err(RepoError::EmptyPool(self.pool));
        };
        tx.execute(
            &format!(
                "INSERT INTO {} (date, word_id) VALUES (?1, ?2);",
                self.pool.ledger_table()
            ),
            params![date, word.id],
        )?;
        tx.commit()?;

        Ok(AssignOutcome::Created(Assignment { date, word }))
    }

    fn reassign(&self, date: NaiveDate) -> RepoResult<Assignment> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(word) = consume_random_available(&tx, self.pool, date)? else {
            return Err(RepoError::EmptyPool(self.pool));
        };
        tx.execute(
            &format!(
                "INSERT INTO {} (date, word_id) VALUES (?1, ?2)
                 ON CONFLICT(date) DO UPDATE SET word_id = excluded.word_id;",
                self.pool.ledger_table()
            ),
            params![date, word.id],
        )?;
        tx.commit()?;

        Ok(Assignment { date, word })
    }

    fn recent_assignments(&self, limit: u32) -> RepoResult<Vec<HistoryEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT d.date AS date, w.word AS word
             FROM {ledger} d
             JOIN {words} w ON w.id = d.word_id
             ORDER BY d.date DESC
             LIMIT ?1;",
            ledger = self.pool.ledger_table(),
            words = self.pool.words_table(),
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut history = Vec::new();

        while let Some(row) = rows.next()? {
            history.push(HistoryEntry {
                date: row.get("date")?,
                word: row.get("word")?,
            });
        }

        Ok(history)
    }
}

fn find_assignment(conn: &Connection, pool: Pool, date: NaiveDate) -> RepoResult<Option<Assignment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT w.id AS id, w.word AS word, w.used AS used, w.used_at AS used_at
         FROM {ledger} d
         JOIN {words} w ON w.id = d.word_id
         WHERE d.date = ?1;",
        ledger = pool.ledger_table(),
        words = pool.words_table(),
    ))?;
    let mut rows = stmt.query([date])?;
    if let Some(row) = rows.next()? {
        let word = parse_word_row(row)?;
        if !word.used {
            return Err(RepoError::InvalidData(format!(
                "{} assignment for {date} points at unconsumed word {}",
                pool, word.id
            )));
        }
        return Ok(Some(Assignment { date, word }));
    }

    Ok(None)
}
