//! # CollatChain Contracts
//!
//! The vault protocol: the operations users call against the ledger, oracle
//! and risk engine from `collat-protocol`.
//!
//! - **Vault Manager** — init, deposit, borrow, repay, withdraw, liquidate
//!   and the privileged price override, each an all-or-nothing transition.
//! - **Operations** — a serde form of those calls, for hosts that replay
//!   them from JSON.
//!
//! ## Design Principles
//!
//! 1. "Not enough collateral" is an answer, not an error. Eligibility
//!    checks come back as `Ok(false)`.
//! 2. Errors mean integrity failures, and an error never leaves a partial
//!    write behind.
//! 3. All amount arithmetic is checked. Risk comparisons never divide.

pub mod operation;
pub mod vault_manager;

pub use operation::{Operation, Outcome};
pub use vault_manager::{VaultHealth, VaultManager};
