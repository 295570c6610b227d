//! # Storage Module
//!
//! Concrete stores behind the [`LedgerStore`](crate::ledger::LedgerStore)
//! and [`OracleStore`](crate::oracle::OracleStore) seams.
//!
//! ## Architecture
//!
//! ```text
//! memory.rs — BTreeMap ledger and a single-slot oracle, for tests and
//!             in-process hosts
//! db.rs     — sled persistence: one tree for vaults, one for the oracle
//! ```
//!
//! ## Design Decisions
//!
//! 1. **Bincode on disk.** Compact and deterministic. JSON is for the CLI
//!    and config files; bincode is for storage.
//!
//! 2. **Batch commits.** The ledger writes an operation's whole write set in
//!    one call. The sled store maps it to a single atomic `Batch`.

pub mod db;
pub mod memory;

pub use db::{CollatDb, SledLedger, SledOracle};
pub use memory::{MemoryLedger, MemoryOracle};
