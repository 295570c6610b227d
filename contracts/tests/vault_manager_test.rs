//! Integration tests for the vault manager.
//!
//! These run the protocol end to end over in-memory stores: conservation of
//! balances, idempotent init, the borrow/withdraw boundaries, liquidation
//! gating and the no-double-liquidation rule.

use collat_contracts::VaultManager;
use collat_protocol::risk::collateralization_ratio;
use collat_protocol::storage::{CollatDb, MemoryLedger, MemoryOracle};
use collat_protocol::{
    Address, LedgerStore, OracleStore, Price, ProtocolConfig, Ratio, RiskParams, Vault,
    VaultError, VaultLookup,
};

type Manager = VaultManager<MemoryLedger, MemoryOracle>;

/// Helper: a manager with default 70% / 75% thresholds at the given price.
fn manager_at(price: Price) -> Manager {
    let config = ProtocolConfig {
        bootstrap_price: Some(price),
        ..ProtocolConfig::default()
    };
    VaultManager::new(MemoryLedger::new(), MemoryOracle::new(), config).unwrap()
}

fn addr(s: &str) -> Address {
    Address::from(s)
}

fn vault(m: &Manager, user: &str) -> Vault {
    match m.get_vault(&addr(user)).unwrap() {
        VaultLookup::Found(v) => v,
        VaultLookup::Absent => panic!("vault {user} should exist"),
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn full_lifecycle_happy_path() {
    let mut m = manager_at(2);
    let alice = addr("GALICE");

    m.deposit_collateral(&alice, 500).unwrap();
    assert!(m.borrow(&alice, 400).unwrap());
    assert!(m.repay(&alice, 400).unwrap());
    assert!(m.withdraw_collateral(&alice, 500).unwrap());

    // Zero balances, but the vault is still there.
    assert_eq!(m.get_vault(&alice).unwrap(), VaultLookup::Found(Vault::EMPTY));
}

#[test]
fn init_is_idempotent() {
    let mut m = manager_at(1);
    let alice = addr("GALICE");

    m.init_vault(&alice).unwrap();
    let once = m.get_vault(&alice).unwrap();
    m.init_vault(&alice).unwrap();
    assert_eq!(m.get_vault(&alice).unwrap(), once);

    // Re-init must not wipe a funded vault either.
    m.deposit_collateral(&alice, 10).unwrap();
    m.init_vault(&alice).unwrap();
    assert_eq!(vault(&m, "GALICE").collateral, 10);
    assert_eq!(m.ledger().len().unwrap(), 1);
}

#[test]
fn get_vault_on_unknown_user_is_absent() {
    let m = manager_at(1);
    assert_eq!(m.get_vault(&addr("GNOBODY")).unwrap(), VaultLookup::Absent);
}

// ---------------------------------------------------------------------------
// Borrow / Repay
// ---------------------------------------------------------------------------

#[test]
fn borrow_rejects_unsafe() {
    let mut m = manager_at(1);
    m.deposit_collateral(&addr("GALICE"), 100).unwrap();

    assert!(!m.borrow(&addr("GALICE"), 71).unwrap());
    assert_eq!(vault(&m, "GALICE").debt, 0);

    assert!(m.borrow(&addr("GALICE"), 70).unwrap());
    assert_eq!(vault(&m, "GALICE").debt, 70);
}

#[test]
fn repay_caps_at_debt() {
    let mut m = manager_at(1);
    let alice = addr("GALICE");
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 50).unwrap());

    assert!(m.repay(&alice, 100).unwrap());
    assert_eq!(vault(&m, "GALICE").debt, 0);

    assert!(!m.repay(&alice, 1).unwrap());
    assert_eq!(vault(&m, "GALICE"), Vault { collateral: 100, debt: 0 });
}

#[test]
fn partial_repay_reduces_debt() {
    let mut m = manager_at(1);
    let alice = addr("GALICE");
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 60).unwrap());
    assert!(m.repay(&alice, 25).unwrap());
    assert_eq!(vault(&m, "GALICE").debt, 35);
}

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

#[test]
fn withdraw_respects_ratio() {
    let mut m = manager_at(1);
    let alice = addr("GALICE");
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 50).unwrap());

    // 70 collateral against 50 debt is 50 / 70 ≈ 71% LTV, over the limit.
    assert!(!m.withdraw_collateral(&alice, 30).unwrap());
    assert_eq!(vault(&m, "GALICE").collateral, 100);

    assert!(m.withdraw_collateral(&alice, 10).unwrap());
    assert_eq!(vault(&m, "GALICE").collateral, 90);
}

#[test]
fn withdraw_boundary_is_inclusive() {
    // 70 collateral at price 1 carries exactly 49 debt at 70%.
    let mut m = manager_at(1);
    let alice = addr("GALICE");
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 49).unwrap());

    assert!(!m.withdraw_collateral(&alice, 31).unwrap());
    assert!(m.withdraw_collateral(&alice, 30).unwrap());
    assert_eq!(vault(&m, "GALICE"), Vault { collateral: 70, debt: 49 });
}

#[test]
fn withdraw_more_than_collateral_is_rejected() {
    let mut m = manager_at(1);
    let alice = addr("GALICE");
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(!m.withdraw_collateral(&alice, 101).unwrap());
    assert_eq!(vault(&m, "GALICE").collateral, 100);
}

// ---------------------------------------------------------------------------
// Conservation
// ---------------------------------------------------------------------------

#[test]
fn balances_never_go_negative() {
    let mut m = manager_at(3);
    let alice = addr("GALICE");
    let amounts = [7, 250, 1, 99, 13, 400, 2, 61, 1_000, 5];

    for (i, &amount) in amounts.iter().enumerate() {
        match i % 4 {
            0 => {
                m.deposit_collateral(&alice, amount).unwrap();
            }
            1 => {
                m.borrow(&alice, amount).unwrap();
            }
            2 => {
                m.repay(&alice, amount).unwrap();
            }
            _ => {
                m.withdraw_collateral(&alice, amount).unwrap();
            }
        }
        let v = vault(&m, "GALICE");
        assert!(v.collateral >= 0 && v.debt >= 0, "step {i}: {v:?}");
        let ratio = collateralization_ratio(&v, 3).unwrap();
        // Never past 70% LTV: collateral value over debt stays at or above 10/7.
        let limit = collateralization_ratio(&Vault { collateral: 10, debt: 7 }, 1).unwrap();
        assert!(ratio >= limit || v.debt == 0, "step {i}: {v:?}");
    }
}

// ---------------------------------------------------------------------------
// Liquidation
// ---------------------------------------------------------------------------

#[test]
fn liquidation_gate() {
    let mut m = manager_at(100);
    let (alice, bob) = (addr("GALICE"), addr("GBOB"));
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 7_000).unwrap());

    // Safe at borrow time, so not liquidatable.
    assert!(!m.liquidate(&bob, &alice).unwrap());

    // 7_000 debt vs 9_500 collateral value is ~73.7% LTV: frozen, not seizable.
    m.set_price(&bob, 95).unwrap();
    assert!(!m.borrow(&alice, 1).unwrap());
    assert!(!m.withdraw_collateral(&alice, 1).unwrap());
    assert!(!m.liquidate(&bob, &alice).unwrap());
    assert_eq!(vault(&m, "GALICE"), Vault { collateral: 100, debt: 7_000 });

    // 7_000 vs 9_000 is ~77.8%, past the liquidation threshold.
    m.set_price(&bob, 90).unwrap();
    assert!(m.liquidate(&bob, &alice).unwrap());
    assert_eq!(vault(&m, "GALICE"), Vault::EMPTY);
    assert_eq!(vault(&m, "GBOB"), Vault { collateral: 100, debt: 0 });
}

#[test]
fn no_double_liquidation() {
    let mut m = manager_at(1);
    let (alice, bob) = (addr("GALICE"), addr("GBOB"));
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 70).unwrap());
    m.set_price(&bob, 0).unwrap();

    assert!(m.liquidate(&bob, &alice).unwrap());
    assert!(!m.liquidate(&bob, &alice).unwrap());
    assert!(!m.liquidate(&addr("GCAROL"), &alice).unwrap());
    assert_eq!(vault(&m, "GBOB").collateral, 100);
}

#[test]
fn liquidator_keeps_existing_position() {
    let mut m = manager_at(1);
    let (alice, bob) = (addr("GALICE"), addr("GBOB"));
    m.deposit_collateral(&bob, 40).unwrap();
    assert!(m.borrow(&bob, 10).unwrap());
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 70).unwrap());

    m.set_price(&bob, 0).unwrap();
    assert!(m.liquidate(&bob, &alice).unwrap());
    assert_eq!(vault(&m, "GBOB"), Vault { collateral: 140, debt: 10 });
}

#[test]
fn liquidate_absent_borrower_is_not_found() {
    let mut m = manager_at(1);
    let err = m.liquidate(&addr("GBOB"), &addr("GGHOST")).unwrap_err();
    assert!(matches!(err, VaultError::NotFound(a) if a.as_str() == "GGHOST"));
    assert!(m.ledger().is_empty().unwrap());
}

/// The liquidator's vault cannot absorb the seized collateral. The commit
/// must not happen, so neither vault changes.
fn liquidation_overflow_leaves_both_vaults_untouched<L, O>(ledger: L, oracle: O)
where
    L: LedgerStore,
    O: OracleStore,
{
    let config = ProtocolConfig {
        bootstrap_price: Some(10),
        ..ProtocolConfig::default()
    };
    let mut m = VaultManager::new(ledger, oracle, config).unwrap();
    let (alice, bob) = (addr("GALICE"), addr("GBOB"));

    m.deposit_collateral(&bob, i128::MAX).unwrap();
    m.deposit_collateral(&alice, 100).unwrap();
    assert!(m.borrow(&alice, 700).unwrap());
    m.set_price(&bob, 9).unwrap();

    let alice_before = m.get_vault(&alice).unwrap();
    let bob_before = m.get_vault(&bob).unwrap();
    assert!(m.vault_health(&alice).unwrap().unwrap().liquidatable);

    let err = m.liquidate(&bob, &alice).unwrap_err();
    assert!(matches!(err, VaultError::ArithmeticOverflow));
    assert_eq!(m.get_vault(&alice).unwrap(), alice_before);
    assert_eq!(m.get_vault(&bob).unwrap(), bob_before);
    assert_eq!(
        alice_before,
        VaultLookup::Found(Vault { collateral: 100, debt: 700 })
    );
}

#[test]
fn liquidation_overflow_is_atomic_in_memory() {
    liquidation_overflow_leaves_both_vaults_untouched(MemoryLedger::new(), MemoryOracle::new());
}

#[test]
fn liquidation_overflow_is_atomic_on_sled() {
    let db = CollatDb::open_temporary().unwrap();
    liquidation_overflow_leaves_both_vaults_untouched(db.ledger(), db.oracle());
}

// ---------------------------------------------------------------------------
// Absent vaults
// ---------------------------------------------------------------------------

#[test]
fn repay_and_withdraw_never_open_a_vault() {
    let mut m = manager_at(1);
    let ghost = addr("GGHOST");
    assert!(!m.repay(&ghost, 10).unwrap());
    assert!(!m.withdraw_collateral(&ghost, 10).unwrap());
    assert_eq!(m.get_vault(&ghost).unwrap(), VaultLookup::Absent);
    assert!(m.ledger().is_empty().unwrap());
}

// ---------------------------------------------------------------------------
// Injected thresholds
// ---------------------------------------------------------------------------

#[test]
fn custom_thresholds_move_the_boundary() {
    let config = ProtocolConfig {
        risk: RiskParams::new(Ratio::new(1, 2).unwrap(), Ratio::new(2, 3).unwrap()).unwrap(),
        bootstrap_price: Some(1),
        ..ProtocolConfig::default()
    };
    let mut m = VaultManager::new(MemoryLedger::new(), MemoryOracle::new(), config).unwrap();
    let alice = addr("GALICE");
    m.deposit_collateral(&alice, 90).unwrap();
    assert!(!m.borrow(&alice, 46).unwrap());
    assert!(m.borrow(&alice, 45).unwrap());

    // At exactly 1/2 nothing more can leave, but 2/3 is still far off.
    assert!(!m.withdraw_collateral(&alice, 1).unwrap());
    let h = m.vault_health(&alice).unwrap().unwrap();
    assert_eq!(h.max_withdrawable, 0);
    assert!(!h.liquidatable);
}
