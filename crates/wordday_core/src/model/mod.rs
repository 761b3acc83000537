//! Domain model for word pools and the daily assignment ledger.
//!
//! # Responsibility
//! - Define the records shared by repositories, services and the CLI.
//! - Describe each pool's storage tables and text normalization rule.
//!
//! # Invariants
//! - Every word is identified by a stable integer `WordId`.
//! - Words are never deleted; consumption is one-way.

pub mod pool;
pub mod word;
