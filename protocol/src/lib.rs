// Copyright (c) 2026 CollatChain Contributors. MIT License.
// See LICENSE for details.

//! # CollatChain Protocol — Core Library
//!
//! A collateralized lending ledger. Users lock a collateral asset in a
//! per-user vault, borrow a debt asset against it, and anyone may liquidate
//! a vault whose loan-to-value drifts past the liquidation threshold.
//!
//! ## Architecture
//!
//! - **types** — Addresses and the integer amount/price types.
//! - **ledger** — Vault records and the store seam that persists them.
//! - **oracle** — The single price slot risk decisions read.
//! - **risk** — Pure eligibility predicates and liquidation payouts.
//! - **storage** — In-memory and sled-backed stores.
//! - **config** — Thresholds, storage layout and [`ProtocolConfig`].
//! - **error** — [`VaultError`], for integrity failures only.
//!
//! The operations users actually call (deposit, borrow, repay, ...) live in
//! the `collat-contracts` crate, which wires these pieces together.
//!
//! ## Arithmetic
//!
//! Amounts are `i128`, prices `u128`. Every comparison is done by
//! cross-multiplication in 512-bit integers; nothing divides to decide.

pub mod config;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod risk;
pub mod storage;
pub mod types;

pub use config::ProtocolConfig;
pub use error::{VaultError, VaultResult};
pub use ledger::{LedgerStore, Vault, VaultLedger, VaultLookup};
pub use oracle::{OracleStore, PriceOracle, PriceRecord};
pub use risk::{LiquidationPolicy, Ratio, RiskEngine, RiskParams, Seizure};
pub use types::{Address, Amount, Price};
