//! # Vault Record
//!
//! A [`Vault`] is one user's position: how much collateral is locked and how
//! much debt is outstanding. Both fields are non-negative at all times; the
//! checked mutators below are the only way the ledger changes them, and each
//! one fails rather than wrapping or clamping.
//!
//! Mutators take `&mut self` but leave the vault untouched when they return
//! an error, so a caller can stage changes on a copy and throw it away.

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::types::Amount;

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// Per-user collateral and debt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Locked collateral, in the collateral asset's smallest unit.
    pub collateral: Amount,
    /// Outstanding debt, in the debt asset's smallest unit.
    pub debt: Amount,
}

impl Vault {
    /// The freshly initialized vault.
    pub const EMPTY: Vault = Vault {
        collateral: 0,
        debt: 0,
    };

    /// Builds a vault from raw balances, rejecting negatives.
    pub fn new(collateral: Amount, debt: Amount) -> VaultResult<Self> {
        if collateral < 0 {
            return Err(VaultError::InvalidAmount(collateral));
        }
        if debt < 0 {
            return Err(VaultError::InvalidAmount(debt));
        }
        Ok(Self { collateral, debt })
    }

    /// `true` when both balances are zero.
    pub fn is_empty(&self) -> bool {
        self.collateral == 0 && self.debt == 0
    }

    /// Adds collateral.
    ///
    /// # Errors
    ///
    /// [`VaultError::InvalidAmount`] for a negative amount,
    /// [`VaultError::ArithmeticOverflow`] past `i128::MAX`.
    pub fn credit_collateral(&mut self, amount: Amount) -> VaultResult<Amount> {
        self.collateral = checked_credit(self.collateral, amount)?;
        Ok(self.collateral)
    }

    /// Removes collateral.
    ///
    /// # Errors
    ///
    /// [`VaultError::InsufficientBalance`] if `amount > collateral`.
    pub fn debit_collateral(&mut self, amount: Amount) -> VaultResult<Amount> {
        self.collateral = checked_debit(self.collateral, amount)?;
        Ok(self.collateral)
    }

    /// Adds debt.
    pub fn credit_debt(&mut self, amount: Amount) -> VaultResult<Amount> {
        self.debt = checked_credit(self.debt, amount)?;
        Ok(self.debt)
    }

    /// Removes debt. Over-repayment is the caller's problem to cap; here it
    /// is an error like any other underflow.
    pub fn debit_debt(&mut self, amount: Amount) -> VaultResult<Amount> {
        self.debt = checked_debit(self.debt, amount)?;
        Ok(self.debt)
    }
}

fn checked_credit(current: Amount, amount: Amount) -> VaultResult<Amount> {
    if amount < 0 {
        return Err(VaultError::InvalidAmount(amount));
    }
    current
        .checked_add(amount)
        .ok_or(VaultError::ArithmeticOverflow)
}

fn checked_debit(current: Amount, amount: Amount) -> VaultResult<Amount> {
    if amount < 0 {
        return Err(VaultError::InvalidAmount(amount));
    }
    if amount > current {
        return Err(VaultError::InsufficientBalance {
            available: current,
            requested: amount,
        });
    }
    Ok(current - amount)
}

// ---------------------------------------------------------------------------
// VaultLookup
// ---------------------------------------------------------------------------

/// Result of reading a vault. Absence is a normal answer, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "vault", rename_all = "snake_case")]
pub enum VaultLookup {
    /// The address has a vault.
    Found(Vault),
    /// The address has never initialized one.
    Absent,
}

impl VaultLookup {
    /// Returns `true` for [`VaultLookup::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, VaultLookup::Found(_))
    }

    /// Converts into the `Option` shape most callers want.
    pub fn into_option(self) -> Option<Vault> {
        match self {
            VaultLookup::Found(v) => Some(v),
            VaultLookup::Absent => None,
        }
    }
}

impl From<Option<Vault>> for VaultLookup {
    fn from(v: Option<Vault>) -> Self {
        match v {
            Some(vault) => VaultLookup::Found(vault),
            None => VaultLookup::Absent,
        }
    }
}
