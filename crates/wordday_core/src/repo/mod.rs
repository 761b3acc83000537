//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for pools and ledgers.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every mutation of a word's consumption state runs under an immediate
//!   transaction, so the write lock is held before the candidate is read.
//! - Repository APIs return semantic errors (`EmptyPool`) in addition to DB
//!   transport errors.

pub mod ledger_repo;
pub mod word_repo;
