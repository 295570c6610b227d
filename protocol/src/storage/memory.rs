//! In-memory stores.
//!
//! Used by tests and by hosts that keep the ledger in process. A `BTreeMap`
//! keeps iteration deterministic. `commit` validates nothing and cannot fail
//! halfway, so applying the write set entry by entry is already atomic.

use std::collections::BTreeMap;

use crate::error::VaultResult;
use crate::ledger::{LedgerStore, Vault};
use crate::oracle::{OracleStore, PriceRecord};
use crate::types::Address;

/// Vaults held in a map.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    vaults: BTreeMap<Address, Vault>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over all vaults in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Vault)> {
        self.vaults.iter()
    }
}

impl LedgerStore for MemoryLedger {
    fn load(&self, address: &Address) -> VaultResult<Option<Vault>> {
        Ok(self.vaults.get(address).copied())
    }

    fn commit(&mut self, writes: &[(Address, Vault)]) -> VaultResult<()> {
        for (address, vault) in writes {
            self.vaults.insert(address.clone(), *vault);
        }
        Ok(())
    }

    fn len(&self) -> VaultResult<usize> {
        Ok(self.vaults.len())
    }
}

/// A single price slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryOracle {
    slot: Option<PriceRecord>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OracleStore for MemoryOracle {
    fn load_price(&self) -> VaultResult<Option<PriceRecord>> {
        Ok(self.slot)
    }

    fn store_price(&mut self, record: PriceRecord) -> VaultResult<()> {
        self.slot = Some(record);
        Ok(())
    }
}
