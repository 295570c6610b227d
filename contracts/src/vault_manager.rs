//! # Vault Manager Contract
//!
//! The operation set users call: open a vault, lock collateral, borrow
//! against it, repay, withdraw, and liquidate somebody else's vault once it
//! slips past the liquidation threshold.
//!
//! Every operation follows the same shape:
//!
//! 1. **Validate arguments** — non-positive amounts are rejected before any
//!    store is touched.
//! 2. **Read** — the vault(s) from the ledger, the price from the oracle
//!    (only when the decision needs one).
//! 3. **Decide** — ask the risk engine. A "no" is an ordinary `Ok(false)`.
//! 4. **Commit** — stage the new vault(s) on copies and write them with a
//!    single atomic ledger commit.
//!
//! Any `Err` leaves the ledger exactly as it was. There is no state in
//! which collateral moved but debt did not.
//!
//! ## Lifecycle
//!
//! ```text
//! Absent ──init / deposit──▶ Active ──borrow / repay / withdraw──▶ Active
//!                              │
//!                              └──liquidate──▶ Active (zeroed, never deleted)
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use collat_protocol::risk::{liquidation_outcome, RiskEngine};
use collat_protocol::types::ensure_positive;
use collat_protocol::{
    Address, Amount, LedgerStore, OracleStore, Price, PriceOracle, ProtocolConfig, Vault,
    VaultError, VaultLedger, VaultLookup, VaultResult,
};

// ---------------------------------------------------------------------------
// VaultHealth
// ---------------------------------------------------------------------------

/// Read-only snapshot of a vault at the current price, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultHealth {
    /// Owner of the vault.
    pub user: Address,
    /// Current balances.
    pub vault: Vault,
    /// Price the snapshot was computed at.
    pub price: Price,
    /// Collateral value over debt in basis points. `None` when there is no
    /// debt (infinitely collateralized).
    pub collateral_ratio_bps: Option<u128>,
    /// Extra debt a `borrow` would currently accept.
    pub max_borrowable: Amount,
    /// Collateral a `withdraw_collateral` would currently release.
    pub max_withdrawable: Amount,
    /// Whether `liquidate` would succeed right now.
    pub liquidatable: bool,
}

// ---------------------------------------------------------------------------
// VaultManager
// ---------------------------------------------------------------------------

/// The vault protocol over a ledger store `L` and an oracle store `O`.
///
/// Mutating operations take `&mut self`: one writer at a time, enforced at
/// compile time. Hosts that want parallelism across addresses shard
/// managers by address.
#[derive(Debug)]
pub struct VaultManager<L, O> {
    ledger: VaultLedger<L>,
    oracle: PriceOracle<O>,
    engine: RiskEngine,
    config: ProtocolConfig,
}

impl<L: LedgerStore, O: OracleStore> VaultManager<L, O> {
    /// Builds a manager, validating `config`.
    ///
    /// If the oracle has never been written and `config.bootstrap_price` is
    /// set, that price is written now.
    pub fn new(ledger: L, oracle: O, config: ProtocolConfig) -> VaultResult<Self> {
        config.validate()?;
        let engine = RiskEngine::new(config.risk)?;
        let mut oracle = PriceOracle::new(oracle);

        if let Some(price) = config.bootstrap_price {
            if !oracle.is_initialized()? {
                oracle.set_price(price)?;
                info!(price, "oracle bootstrapped");
            }
        }

        Ok(Self {
            ledger: VaultLedger::new(ledger),
            oracle,
            engine,
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// The underlying ledger, read-only.
    pub fn ledger(&self) -> &VaultLedger<L> {
        &self.ledger
    }

    // -- vault lifecycle ----------------------------------------------------

    /// Creates an empty vault for `user`. Calling it again is a no-op.
    pub fn init_vault(&mut self, user: &Address) -> VaultResult<()> {
        if self.ledger.init(user)? {
            info!(user = %user, "vault opened");
        }
        Ok(())
    }

    /// Locks `amount` more collateral, opening the vault if needed.
    ///
    /// Never consults the oracle: adding collateral is always safe.
    pub fn deposit_collateral(&mut self, user: &Address, amount: Amount) -> VaultResult<Vault> {
        ensure_positive(amount)?;
        let vault = self.ledger.credit_collateral(user, amount)?;
        info!(user = %user, amount, collateral = vault.collateral, "collateral deposited");
        Ok(vault)
    }

    /// Reads a vault.
    pub fn get_vault(&self, user: &Address) -> VaultResult<VaultLookup> {
        self.ledger.get(user)
    }

    // -- debt ---------------------------------------------------------------

    /// Borrows `amount` against the vault's collateral.
    ///
    /// Returns `Ok(false)` and changes nothing when the resulting position
    /// would exceed the max LTV.
    pub fn borrow(&mut self, user: &Address, amount: Amount) -> VaultResult<bool> {
        ensure_positive(amount)?;
        let vault = self.require_vault(user)?;
        let price = self.oracle.get_price()?;

        if !self.engine.can_borrow(&vault, price, amount)? {
            debug!(user = %user, amount, price, "borrow rejected: max LTV exceeded");
            return Ok(false);
        }

        let vault = self.ledger.credit_debt(user, amount)?;
        info!(user = %user, amount, debt = vault.debt, "borrowed");
        Ok(true)
    }

    /// Repays up to `amount` of debt. Over-payment is capped at the
    /// outstanding debt, never an error.
    ///
    /// Returns `Ok(false)` when there was no debt to repay, including when
    /// the vault does not exist. An absent vault is not created.
    pub fn repay(&mut self, user: &Address, amount: Amount) -> VaultResult<bool> {
        ensure_positive(amount)?;
        let debt = match self.ledger.get(user)? {
            VaultLookup::Found(vault) => vault.debt,
            VaultLookup::Absent => 0,
        };

        if debt == 0 {
            debug!(user = %user, amount, "repay rejected: no outstanding debt");
            return Ok(false);
        }

        let applied = amount.min(debt);
        let vault = self.ledger.debit_debt(user, applied)?;
        info!(user = %user, applied, debt = vault.debt, "repaid");
        Ok(true)
    }

    // -- collateral ---------------------------------------------------------

    /// Withdraws `amount` of collateral.
    ///
    /// Returns `Ok(false)` when `amount` exceeds the locked collateral or the
    /// remaining position would exceed the max LTV. An absent vault holds no
    /// collateral, so withdrawing from it is refused the same way.
    pub fn withdraw_collateral(&mut self, user: &Address, amount: Amount) -> VaultResult<bool> {
        ensure_positive(amount)?;
        let vault = match self.ledger.get(user)? {
            VaultLookup::Found(vault) => vault,
            VaultLookup::Absent => {
                debug!(user = %user, amount, "withdraw rejected: no vault");
                return Ok(false);
            }
        };
        let price = self.oracle.get_price()?;

        if !self.engine.can_withdraw(&vault, price, amount)? {
            debug!(
                user = %user,
                amount,
                collateral = vault.collateral,
                price,
                "withdraw rejected"
            );
            return Ok(false);
        }

        let vault = self.ledger.debit_collateral(user, amount)?;
        info!(user = %user, amount, collateral = vault.collateral, "collateral withdrawn");
        Ok(true)
    }

    // -- liquidation --------------------------------------------------------

    /// Liquidates `borrower` on behalf of `liquidator`.
    ///
    /// Seized collateral is credited to the liquidator's vault (opened if
    /// needed). Both vaults are written in one commit. Returns `Ok(false)`
    /// when the borrower is not past the liquidation threshold, which
    /// includes a vault that has already been cleared.
    pub fn liquidate(&mut self, liquidator: &Address, borrower: &Address) -> VaultResult<bool> {
        if liquidator == borrower {
            return Err(VaultError::SelfLiquidation(borrower.clone()));
        }
        let vault = self.require_vault(borrower)?;
        let price = self.oracle.get_price()?;

        if !self.engine.is_liquidatable(&vault, price)? {
            debug!(borrower = %borrower, price, "liquidation rejected: vault is healthy");
            return Ok(false);
        }

        let seizure = liquidation_outcome(&vault, price, &self.config.liquidation)?;
        let borrower_after = seizure.apply_to_borrower(&vault)?;
        let mut liquidator_after = self.ledger.get_or_empty(liquidator)?;
        liquidator_after.credit_collateral(seizure.collateral_seized)?;

        self.ledger.commit(&[
            (borrower.clone(), borrower_after),
            (liquidator.clone(), liquidator_after),
        ])?;
        info!(
            liquidator = %liquidator,
            borrower = %borrower,
            price,
            collateral_seized = seizure.collateral_seized,
            debt_cleared = seizure.debt_cleared,
            "vault liquidated"
        );
        Ok(true)
    }

    // -- oracle -------------------------------------------------------------

    /// Privileged price override.
    ///
    /// With an admin configured, anyone else gets [`VaultError::Unauthorized`].
    /// Without one, the path is open.
    pub fn set_price(&mut self, caller: &Address, price: Price) -> VaultResult<()> {
        if let Some(admin) = &self.config.admin {
            if admin != caller {
                warn!(caller = %caller, "set_price refused: caller is not admin");
                return Err(VaultError::Unauthorized(caller.clone()));
            }
        }
        self.oracle.set_price(price)
    }

    /// Current oracle price.
    pub fn get_price(&self) -> VaultResult<Price> {
        self.oracle.get_price()
    }

    // -- queries ------------------------------------------------------------

    /// Health snapshot of `user`'s vault, or `None` if it does not exist.
    pub fn vault_health(&self, user: &Address) -> VaultResult<Option<VaultHealth>> {
        let vault = match self.ledger.get(user)? {
            VaultLookup::Found(v) => v,
            VaultLookup::Absent => return Ok(None),
        };
        let price = self.oracle.get_price()?;
        Ok(Some(VaultHealth {
            user: user.clone(),
            vault,
            price,
            collateral_ratio_bps: self.engine.collateralization_ratio(&vault, price)?.as_bps(),
            max_borrowable: self.engine.max_borrowable(&vault, price)?,
            max_withdrawable: self.engine.max_withdrawable(&vault, price)?,
            liquidatable: self.engine.is_liquidatable(&vault, price)?,
        }))
    }

    /// How much a fresh vault holding `collateral` could borrow right now.
    pub fn preview_borrow(&self, collateral: Amount) -> VaultResult<Amount> {
        ensure_positive(collateral)?;
        let price = self.oracle.get_price()?;
        self.engine
            .max_borrowable(&Vault { collateral, debt: 0 }, price)
    }

    fn require_vault(&self, user: &Address) -> VaultResult<Vault> {
        self.ledger
            .get(user)?
            .into_option()
            .ok_or_else(|| VaultError::NotFound(user.clone()))
    }
}
