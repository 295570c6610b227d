//! Eligibility predicates.
//!
//! One predicate underlies everything: a vault is *safe* at an LTV `n/d` iff
//!
//! ```text
//! debt * d <= collateral * price * n
//! ```
//!
//! The boundary is inclusive, so borrowing exactly up to the limit succeeds.
//! Debt-free vaults are always safe. Borrow and withdraw check the predicate
//! against `max_ltv` on the hypothetical post-operation vault; liquidation
//! checks the current vault against the looser `liquidation_ltv`, which
//! leaves a band where a vault can no longer borrow but cannot yet be seized.

use alloy_primitives::U512;
use serde::{Deserialize, Serialize};

use super::ratio::{div_ceil, mul, narrow, wide, wide_price, wide_u64, CollateralRatio, Ratio};
use crate::config::{DEFAULT_LIQUIDATION_LTV, DEFAULT_MAX_LTV};
use crate::error::{VaultError, VaultResult};
use crate::ledger::Vault;
use crate::types::{Amount, Price};

// ---------------------------------------------------------------------------
// Pure predicates
// ---------------------------------------------------------------------------

/// `collateral * price` relative to `debt`.
pub fn collateralization_ratio(vault: &Vault, price: Price) -> VaultResult<CollateralRatio> {
    CollateralRatio::of(vault.collateral, vault.debt, price)
}

/// The safety predicate on raw balances.
pub fn is_safe(collateral: Amount, debt: Amount, price: Price, ltv: Ratio) -> VaultResult<bool> {
    let debt = wide(debt)?;
    let collateral = wide(collateral)?;
    if debt == U512::ZERO {
        return Ok(true);
    }
    let lhs = mul(debt, wide_u64(ltv.den))?;
    let rhs = mul(mul(collateral, wide_price(price))?, wide_u64(ltv.num))?;
    Ok(lhs <= rhs)
}

/// Whether the vault stays safe with `extra_debt` added.
pub fn can_borrow(vault: &Vault, price: Price, extra_debt: Amount, max_ltv: Ratio) -> VaultResult<bool> {
    let extra = wide(extra_debt)?;
    let debt = wide(vault.debt)? + extra;
    if debt == U512::ZERO {
        return Ok(true);
    }
    let lhs = mul(debt, wide_u64(max_ltv.den))?;
    let rhs = mul(
        mul(wide(vault.collateral)?, wide_price(price))?,
        wide_u64(max_ltv.num),
    )?;
    Ok(lhs <= rhs)
}

/// Whether the vault stays safe with `removed` collateral taken out.
/// Removing more than the vault holds is never allowed.
pub fn can_withdraw(vault: &Vault, price: Price, removed: Amount, max_ltv: Ratio) -> VaultResult<bool> {
    if removed < 0 {
        return Err(VaultError::InvalidAmount(removed));
    }
    if removed > vault.collateral {
        return Ok(false);
    }
    is_safe(vault.collateral - removed, vault.debt, price, max_ltv)
}

/// Whether a third party may liquidate the vault right now.
pub fn is_liquidatable(vault: &Vault, price: Price, liquidation_ltv: Ratio) -> VaultResult<bool> {
    if vault.debt == 0 {
        return Ok(false);
    }
    Ok(!is_safe(vault.collateral, vault.debt, price, liquidation_ltv)?)
}

/// Largest `extra_debt` for which [`can_borrow`] holds.
pub fn max_borrowable(vault: &Vault, price: Price, max_ltv: Ratio) -> VaultResult<Amount> {
    let limit = mul(
        mul(wide(vault.collateral)?, wide_price(price))?,
        wide_u64(max_ltv.num),
    )? / wide_u64(max_ltv.den);
    let debt = wide(vault.debt)?;
    if limit <= debt {
        return Ok(0);
    }
    let headroom = narrow((limit - debt).min(U512::from(i128::MAX.unsigned_abs())))?;
    // Never suggest more than the debt field can hold.
    Ok(headroom.min(i128::MAX - vault.debt))
}

/// Largest collateral removal for which [`can_withdraw`] holds.
pub fn max_withdrawable(vault: &Vault, price: Price, max_ltv: Ratio) -> VaultResult<Amount> {
    if vault.debt == 0 {
        return Ok(vault.collateral);
    }
    let per_unit = mul(wide_price(price), wide_u64(max_ltv.num))?;
    if per_unit == U512::ZERO {
        return Ok(0);
    }
    let required = div_ceil(mul(wide(vault.debt)?, wide_u64(max_ltv.den))?, per_unit)?;
    let collateral = wide(vault.collateral)?;
    if required >= collateral {
        return Ok(0);
    }
    narrow(collateral - required)
}

// ---------------------------------------------------------------------------
// RiskParams
// ---------------------------------------------------------------------------

/// The two thresholds the engine is configured with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParams {
    /// Highest LTV at which borrowing and withdrawing are still permitted.
    pub max_ltv: Ratio,
    /// LTV above which a vault becomes liquidatable. Never below `max_ltv`.
    pub liquidation_ltv: Ratio,
}

impl RiskParams {
    /// Builds validated parameters.
    pub fn new(max_ltv: Ratio, liquidation_ltv: Ratio) -> VaultResult<Self> {
        let params = Self {
            max_ltv,
            liquidation_ltv,
        };
        params.validate()?;
        Ok(params)
    }

    /// Both ratios valid, liquidation threshold at or above the borrow one.
    pub fn validate(&self) -> VaultResult<()> {
        self.max_ltv.validate()?;
        self.liquidation_ltv.validate()?;
        if !self.max_ltv.le(&self.liquidation_ltv) {
            return Err(VaultError::InvalidConfig(format!(
                "liquidation LTV {} is below max LTV {}",
                self.liquidation_ltv, self.max_ltv
            )));
        }
        Ok(())
    }
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            max_ltv: DEFAULT_MAX_LTV,
            liquidation_ltv: DEFAULT_LIQUIDATION_LTV,
        }
    }
}

// ---------------------------------------------------------------------------
// RiskEngine
// ---------------------------------------------------------------------------

/// The predicates above, bound to one set of [`RiskParams`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RiskEngine {
    params: RiskParams,
}

impl RiskEngine {
    /// Validates and binds parameters.
    pub fn new(params: RiskParams) -> VaultResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &RiskParams {
        &self.params
    }

    pub fn collateralization_ratio(&self, vault: &Vault, price: Price) -> VaultResult<CollateralRatio> {
        collateralization_ratio(vault, price)
    }

    pub fn can_borrow(&self, vault: &Vault, price: Price, extra_debt: Amount) -> VaultResult<bool> {
        can_borrow(vault, price, extra_debt, self.params.max_ltv)
    }

    pub fn can_withdraw(&self, vault: &Vault, price: Price, removed: Amount) -> VaultResult<bool> {
        can_withdraw(vault, price, removed, self.params.max_ltv)
    }

    pub fn is_liquidatable(&self, vault: &Vault, price: Price) -> VaultResult<bool> {
        is_liquidatable(vault, price, self.params.liquidation_ltv)
    }

    pub fn max_borrowable(&self, vault: &Vault, price: Price) -> VaultResult<Amount> {
        max_borrowable(vault, price, self.params.max_ltv)
    }

    pub fn max_withdrawable(&self, vault: &Vault, price: Price) -> VaultResult<Amount> {
        max_withdrawable(vault, price, self.params.max_ltv)
    }
}
