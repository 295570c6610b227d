//! Liquidation payout policy.
//!
//! The engine decides *whether* a vault can be liquidated; the policy decides
//! *how much* changes hands when it is. Computing the outcome is pure. The
//! vault manager applies it to the borrower and liquidator vaults in one
//! commit.

use serde::{Deserialize, Serialize};

use super::ratio::{div_ceil, mul, narrow, wide, wide_price, wide_u64, Ratio};
use crate::error::{VaultError, VaultResult};
use crate::ledger::Vault;
use crate::types::{Amount, Price};

/// How a liquidatable vault is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiquidationPolicy {
    /// All collateral goes to the liquidator; the borrower's debt is wiped.
    #[default]
    FullSeizure,
    /// The liquidator clears `close_factor` of the debt and is paid in
    /// collateral worth the cleared debt plus `bonus`.
    Partial { close_factor: Ratio, bonus: Ratio },
}

impl LiquidationPolicy {
    pub fn validate(&self) -> VaultResult<()> {
        match self {
            LiquidationPolicy::FullSeizure => Ok(()),
            LiquidationPolicy::Partial { close_factor, bonus } => {
                close_factor.validate()?;
                bonus.validate()?;
                if close_factor.num == 0 {
                    return Err(VaultError::InvalidConfig(
                        "close factor must be greater than zero".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// What a liquidation moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seizure {
    /// Collateral taken from the borrower and credited to the liquidator.
    pub collateral_seized: Amount,
    /// Debt removed from the borrower.
    pub debt_cleared: Amount,
}

impl Seizure {
    /// Borrower vault after the seizure.
    pub fn apply_to_borrower(&self, vault: &Vault) -> VaultResult<Vault> {
        let mut next = *vault;
        next.debit_collateral(self.collateral_seized)?;
        next.debit_debt(self.debt_cleared)?;
        Ok(next)
    }
}

/// Computes the seizure for a vault already known to be liquidatable.
pub fn liquidation_outcome(vault: &Vault, price: Price, policy: &LiquidationPolicy) -> VaultResult<Seizure> {
    match policy {
        LiquidationPolicy::FullSeizure => Ok(Seizure {
            collateral_seized: vault.collateral,
            debt_cleared: vault.debt,
        }),
        LiquidationPolicy::Partial { close_factor, bonus } => {
            let debt = wide(vault.debt)?;
            let cleared = div_ceil(mul(debt, wide_u64(close_factor.num))?, wide_u64(close_factor.den))?;
            let one = wide(1)?;
            let cleared = cleared.max(one).min(debt);

            let collateral = wide(vault.collateral)?;
            let seized = if price == 0 {
                collateral
            } else {
                // cleared * (1 + bonus) / price, rounded down.
                let payout = mul(cleared, wide_u64(bonus.den) + wide_u64(bonus.num))?;
                (payout / mul(wide_u64(bonus.den), wide_price(price))?).min(collateral)
            };

            let collateral_seized = narrow(seized)?;
            let mut debt_cleared = narrow(cleared)?;
            if collateral_seized == vault.collateral {
                // Nothing left to back the remainder.
                debt_cleared = vault.debt;
            }
            Ok(Seizure {
                collateral_seized,
                debt_cleared,
            })
        }
    }
}
