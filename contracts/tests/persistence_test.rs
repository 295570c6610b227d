//! Integration tests for the vault manager over the sled store.
//!
//! Same protocol, real disk: state written by one manager must be visible
//! to the next one opened on the same directory, and a liquidation's two
//! vault writes must land together.

use collat_contracts::VaultManager;
use collat_protocol::storage::CollatDb;
use collat_protocol::{Address, LedgerStore, ProtocolConfig, Vault, VaultLookup};

fn config(price: u128) -> ProtocolConfig {
    ProtocolConfig {
        bootstrap_price: Some(price),
        ..ProtocolConfig::default()
    }
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let alice = Address::from("GALICE");

    {
        let db = CollatDb::open(dir.path()).unwrap();
        let mut m = VaultManager::new(db.ledger(), db.oracle(), config(2)).unwrap();
        m.deposit_collateral(&alice, 1_000).unwrap();
        assert!(m.borrow(&alice, 1_400).unwrap());
        db.flush().unwrap();
    }

    let db = CollatDb::open(dir.path()).unwrap();
    // A different bootstrap price must not clobber the stored one.
    let m = VaultManager::new(db.ledger(), db.oracle(), config(99)).unwrap();
    assert_eq!(m.get_price().unwrap(), 2);
    assert_eq!(
        m.get_vault(&alice).unwrap(),
        VaultLookup::Found(Vault { collateral: 1_000, debt: 1_400 })
    );
}

#[test]
fn liquidation_writes_both_vaults() {
    let db = CollatDb::open_temporary().unwrap();
    let (alice, bob) = (Address::from("GALICE"), Address::from("GBOB"));
    let mut m = VaultManager::new(db.ledger(), db.oracle(), config(1)).unwrap();

    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 70).unwrap());
    m.set_price(&bob, 0).unwrap();
    assert!(m.liquidate(&bob, &alice).unwrap());

    // Read back through a fresh handle, bypassing the manager.
    let ledger = db.ledger();
    assert_eq!(ledger.load(&alice).unwrap(), Some(Vault::EMPTY));
    assert_eq!(
        ledger.load(&bob).unwrap(),
        Some(Vault { collateral: 100, debt: 0 })
    );
    assert_eq!(ledger.len().unwrap(), 2);
}

#[test]
fn rejected_operations_write_nothing() {
    let db = CollatDb::open_temporary().unwrap();
    let alice = Address::from("GALICE");
    let mut m = VaultManager::new(db.ledger(), db.oracle(), config(1)).unwrap();

    assert!(m.borrow(&alice, 10).is_err());
    assert!(m.deposit_collateral(&alice, -1).is_err());
    assert!(db.ledger().is_empty().unwrap());

    m.deposit_collateral(&alice, 10).unwrap();
    assert!(!m.borrow(&alice, 8).unwrap());
    assert_eq!(
        db.ledger().load(&alice).unwrap(),
        Some(Vault { collateral: 10, debt: 0 })
    );
}

#[test]
fn failed_liquidation_leaves_disk_state_intact() {
    let dir = tempfile::tempdir().unwrap();
    let alice = Address::from("GALICE");
    let bob = Address::from("GBOB");

    {
        let db = CollatDb::open(dir.path()).unwrap();
        let mut m = VaultManager::new(db.ledger(), db.oracle(), config(10)).unwrap();
        m.deposit_collateral(&bob, i128::MAX).unwrap();
        m.deposit_collateral(&alice, 100).unwrap();
        assert!(m.borrow(&alice, 700).unwrap());
        m.set_price(&bob, 9).unwrap();
        assert!(m.liquidate(&bob, &alice).is_err());
        db.flush().unwrap();
    }

    let db = CollatDb::open(dir.path()).unwrap();
    let ledger = db.ledger();
    assert_eq!(
        ledger.load(&alice).unwrap(),
        Some(Vault { collateral: 100, debt: 700 })
    );
    assert_eq!(
        ledger.load(&bob).unwrap(),
        Some(Vault { collateral: i128::MAX, debt: 0 })
    );
}
