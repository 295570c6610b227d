//! # Price Oracle
//!
//! Holds the one exchange rate the risk engine values collateral with:
//! units of debt asset per unit of collateral asset.
//!
//! The slot keeps only the latest value. Overwriting it takes effect for
//! every later risk decision and does nothing to existing vaults; a price
//! drop never liquidates anyone by itself; somebody has to call `liquidate`.
//!
//! Where the number comes from (a trusted feed, an admin, a test) is outside
//! this module. The vault manager decides who may call
//! [`PriceOracle::set_price`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{VaultError, VaultResult};
use crate::types::Price;

// ---------------------------------------------------------------------------
// PriceRecord
// ---------------------------------------------------------------------------

/// The stored oracle slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Current exchange rate.
    pub price: Price,
    /// When the rate was last written.
    pub updated_at: DateTime<Utc>,
}

impl PriceRecord {
    /// Stamps a price with the current wall-clock time.
    pub fn now(price: Price) -> Self {
        Self {
            price,
            updated_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// OracleStore
// ---------------------------------------------------------------------------

/// Storage seam for the oracle slot.
pub trait OracleStore {
    /// Reads the slot; `None` if it was never written.
    fn load_price(&self) -> VaultResult<Option<PriceRecord>>;

    /// Overwrites the slot.
    fn store_price(&mut self, record: PriceRecord) -> VaultResult<()>;
}

// ---------------------------------------------------------------------------
// PriceOracle
// ---------------------------------------------------------------------------

/// Typed get/set over an [`OracleStore`].
#[derive(Debug)]
pub struct PriceOracle<S> {
    store: S,
}

impl<S: OracleStore> PriceOracle<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current price.
    ///
    /// # Errors
    ///
    /// [`VaultError::Uninitialized`] if no price was ever set.
    pub fn get_price(&self) -> VaultResult<Price> {
        self.record().map(|r| r.price)
    }

    /// Current price with its timestamp.
    pub fn record(&self) -> VaultResult<PriceRecord> {
        self.store.load_price()?.ok_or(VaultError::Uninitialized)
    }

    /// `true` once a price has been written.
    pub fn is_initialized(&self) -> VaultResult<bool> {
        Ok(self.store.load_price()?.is_some())
    }

    /// Unconditionally overwrites the price.
    pub fn set_price(&mut self, price: Price) -> VaultResult<()> {
        self.store.store_price(PriceRecord::now(price))?;
        info!(price, "oracle price updated");
        Ok(())
    }
}
