//! # Vault Ledger
//!
//! The ledger is the single authoritative mapping from [`Address`] to
//! [`Vault`]. Every read and write of vault state goes through it; nothing
//! else holds a copy that could drift.
//!
//! ```text
//! vault.rs  — the Vault record, its checked mutators, VaultLookup
//! mod.rs    — LedgerStore (the substrate seam) and VaultLedger on top of it
//! ```
//!
//! ## Atomicity
//!
//! [`LedgerStore::commit`] takes a whole write set. Backends must apply it
//! all-or-nothing, which is what lets a liquidation update two vaults without
//! ever exposing a half-applied state.

pub mod vault;

pub use vault::{Vault, VaultLookup};

use tracing::debug;

use crate::error::VaultResult;
use crate::types::{Address, Amount};

// ---------------------------------------------------------------------------
// LedgerStore
// ---------------------------------------------------------------------------

/// Key-value substrate the ledger is written against.
pub trait LedgerStore {
    /// Reads the vault stored for `address`, if any.
    fn load(&self, address: &Address) -> VaultResult<Option<Vault>>;

    /// Writes every entry of `writes` atomically.
    fn commit(&mut self, writes: &[(Address, Vault)]) -> VaultResult<()>;

    /// Number of vaults stored.
    fn len(&self) -> VaultResult<usize>;

    /// `true` when no vault has been created yet.
    fn is_empty(&self) -> VaultResult<bool> {
        Ok(self.len()? == 0)
    }
}

// ---------------------------------------------------------------------------
// VaultLedger
// ---------------------------------------------------------------------------

/// Typed vault operations over a [`LedgerStore`].
///
/// The `credit_*` / `debit_*` methods are single-vault read-modify-write
/// helpers. Operations touching more than one vault stage their changes on
/// copies and hand them to [`commit`](Self::commit) in one go.
#[derive(Debug)]
pub struct VaultLedger<S> {
    store: S,
}

impl<S: LedgerStore> VaultLedger<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwraps back into the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Reads a vault.
    pub fn get(&self, address: &Address) -> VaultResult<VaultLookup> {
        Ok(self.store.load(address)?.into())
    }

    /// Creates an empty vault if none exists. Returns `true` when it created
    /// one, `false` when the vault was already there (a no-op, not an error).
    pub fn init(&mut self, address: &Address) -> VaultResult<bool> {
        if self.store.load(address)?.is_some() {
            return Ok(false);
        }
        self.store.commit(&[(address.clone(), Vault::EMPTY)])?;
        debug!(user = %address, "vault initialized");
        Ok(true)
    }

    /// Reads a vault, treating absence as an empty vault.
    pub fn get_or_empty(&self, address: &Address) -> VaultResult<Vault> {
        Ok(self.store.load(address)?.unwrap_or(Vault::EMPTY))
    }

    /// Adds collateral, creating the vault if it does not exist.
    pub fn credit_collateral(&mut self, address: &Address, amount: Amount) -> VaultResult<Vault> {
        self.update(address, |v| v.credit_collateral(amount).map(|_| ()))
    }

    /// Removes collateral.
    pub fn debit_collateral(&mut self, address: &Address, amount: Amount) -> VaultResult<Vault> {
        self.update(address, |v| v.debit_collateral(amount).map(|_| ()))
    }

    /// Adds debt.
    pub fn credit_debt(&mut self, address: &Address, amount: Amount) -> VaultResult<Vault> {
        self.update(address, |v| v.credit_debt(amount).map(|_| ()))
    }

    /// Removes debt.
    pub fn debit_debt(&mut self, address: &Address, amount: Amount) -> VaultResult<Vault> {
        self.update(address, |v| v.debit_debt(amount).map(|_| ()))
    }

    /// Commits a staged write set atomically.
    pub fn commit(&mut self, writes: &[(Address, Vault)]) -> VaultResult<()> {
        self.store.commit(writes)
    }

    /// Number of vaults in the ledger.
    pub fn len(&self) -> VaultResult<usize> {
        self.store.len()
    }

    /// `true` when the ledger holds no vaults.
    pub fn is_empty(&self) -> VaultResult<bool> {
        self.store.is_empty()
    }

    fn update<F>(&mut self, address: &Address, f: F) -> VaultResult<Vault>
    where
        F: FnOnce(&mut Vault) -> VaultResult<()>,
    {
        let mut vault = self.get_or_empty(address)?;
        f(&mut vault)?;
        self.store.commit(&[(address.clone(), vault)])?;
        Ok(vault)
    }
}
