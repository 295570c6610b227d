//! # Core Value Types
//!
//! Addresses, amounts, and prices. Everything the ledger stores or the risk
//! engine compares is built out of these three.
//!
//! Amounts are `i128` in the smallest denomination of their asset. They are
//! signed so that a negative value handed in from the outside is detectable
//! (and rejected) instead of silently wrapping into a huge unsigned number.
//! Prices are `u128`: a negative exchange rate is not a thing, so it is not
//! representable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{VaultError, VaultResult};

/// Collateral or debt quantity, in the asset's smallest unit.
pub type Amount = i128;

/// Units of debt asset per unit of collateral asset, fixed scale.
pub type Price = u128;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Opaque account identifier. The ledger keys vaults by it and never looks
/// inside; only equality and ordering matter.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parses an address, rejecting empty or whitespace-only input.
    pub fn parse(s: &str) -> VaultResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VaultError::InvalidAddress);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes used as the storage key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl TryFrom<String> for Address {
    type Error = VaultError;

    fn try_from(s: String) -> VaultResult<Self> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Unchecked conversion for literals and keys the ledger already stored.
/// Untrusted input goes through [`Address::parse`].
impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejects zero and negative amounts at the operation boundary.
pub fn ensure_positive(amount: Amount) -> VaultResult<()> {
    if amount <= 0 {
        return Err(VaultError::InvalidAmount(amount));
    }
    Ok(())
}
