//! Error types for the CollatChain core.
//!
//! Only integrity failures live here. "Not enough collateral to borrow" and
//! friends are routine outcomes and come back as `false` from the vault
//! manager, never as a [`VaultError`].
//!
//! Any operation that returns an error has left the ledger untouched.

use thiserror::Error;

use crate::types::{Address, Amount};

/// Errors that abort a ledger operation.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The oracle has never been given a price.
    #[error("price oracle is uninitialized")]
    Uninitialized,

    /// A 128-bit amount would overflow (or a wide intermediate could not be
    /// narrowed back).
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// A debit exceeded the field it was applied to.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Current value of the field being debited.
        available: Amount,
        /// Amount the caller tried to remove.
        requested: Amount,
    },

    /// The operation needs an existing vault and there is none.
    #[error("no vault for {0}")]
    NotFound(Address),

    /// Amount arguments must be strictly positive.
    #[error("invalid amount {0}: must be greater than zero")]
    InvalidAmount(Amount),

    /// A privileged path was called by someone other than the admin.
    #[error("{0} is not authorized for this operation")]
    Unauthorized(Address),

    /// A borrower cannot liquidate their own vault.
    #[error("{0} cannot liquidate its own vault")]
    SelfLiquidation(Address),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An address string was empty.
    #[error("invalid address: must be non-empty")]
    InvalidAddress,

    /// The storage substrate failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sled::Error> for VaultError {
    fn from(e: sled::Error) -> Self {
        VaultError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for VaultError {
    fn from(e: bincode::Error) -> Self {
        VaultError::Storage(format!("serialization: {e}"))
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
