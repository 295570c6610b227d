//! # CollatDb — Persistent Storage Engine
//!
//! The on-disk substrate for the vault ledger and the price oracle, built on
//! sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree     | Key                 | Value                 |
//! |----------|---------------------|-----------------------|
//! | `vaults` | `address` (UTF-8)   | `bincode(Vault)`      |
//! | `oracle` | `price` (fixed key) | `bincode(PriceRecord)`|
//!
//! ## Atomicity
//!
//! A ledger commit becomes one sled `Batch` on the `vaults` tree. sled
//! applies a batch atomically, so a liquidation's two vault writes land
//! together or not at all.

use sled::{Batch, Db, Tree};
use std::path::Path;

use crate::config::{ORACLE_PRICE_KEY, ORACLE_TREE, VAULTS_TREE};
use crate::error::VaultResult;
use crate::ledger::{LedgerStore, Vault};
use crate::oracle::{OracleStore, PriceRecord};
use crate::types::Address;

// ---------------------------------------------------------------------------
// CollatDb
// ---------------------------------------------------------------------------

/// Handle to an open database. Cheap to clone; all clones share the same
/// underlying sled instance.
#[derive(Debug, Clone)]
pub struct CollatDb {
    db: Db,
    vaults: Tree,
    oracle: Tree,
}

impl CollatDb {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> VaultResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a throwaway database, removed when the last handle drops.
    pub fn open_temporary() -> VaultResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> VaultResult<Self> {
        let vaults = db.open_tree(VAULTS_TREE)?;
        let oracle = db.open_tree(ORACLE_TREE)?;
        Ok(Self { db, vaults, oracle })
    }

    /// Ledger store backed by the `vaults` tree.
    pub fn ledger(&self) -> SledLedger {
        SledLedger {
            tree: self.vaults.clone(),
        }
    }

    /// Oracle store backed by the `oracle` tree.
    pub fn oracle(&self) -> SledOracle {
        SledOracle {
            tree: self.oracle.clone(),
        }
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> VaultResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SledLedger
// ---------------------------------------------------------------------------

/// [`LedgerStore`] over a sled tree.
#[derive(Debug, Clone)]
pub struct SledLedger {
    tree: Tree,
}

impl SledLedger {
    /// All stored vaults, in key order.
    pub fn scan(&self) -> VaultResult<Vec<(Address, Vault)>> {
        let mut out = Vec::new();
        for entry in self.tree.iter() {
            let (key, value) = entry?;
            let address = Address::from(&*String::from_utf8_lossy(&key));
            out.push((address, bincode::deserialize(&value)?));
        }
        Ok(out)
    }
}

impl LedgerStore for SledLedger {
    fn load(&self, address: &Address) -> VaultResult<Option<Vault>> {
        match self.tree.get(address.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn commit(&mut self, writes: &[(Address, Vault)]) -> VaultResult<()> {
        // Serialize everything first; a bad entry must not leave a half batch.
        let mut batch = Batch::default();
        for (address, vault) in writes {
            batch.insert(address.as_bytes(), bincode::serialize(vault)?);
        }
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }

    fn len(&self) -> VaultResult<usize> {
        Ok(self.tree.len())
    }
}

// ---------------------------------------------------------------------------
// SledOracle
// ---------------------------------------------------------------------------

/// [`OracleStore`] over a sled tree.
#[derive(Debug, Clone)]
pub struct SledOracle {
    tree: Tree,
}

impl OracleStore for SledOracle {
    fn load_price(&self) -> VaultResult<Option<PriceRecord>> {
        match self.tree.get(ORACLE_PRICE_KEY)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn store_price(&mut self, record: PriceRecord) -> VaultResult<()> {
        self.tree
            .insert(ORACLE_PRICE_KEY, bincode::serialize(&record)?)?;
        self.tree.flush()?;
        Ok(())
    }
}
