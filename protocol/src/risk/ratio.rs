//! LTV fractions and the collateralization ratio.
//!
//! Nothing here divides to decide anything. Ratios are compared by
//! cross-multiplication in 512-bit integers: a 127-bit amount times a
//! 128-bit price times a 64-bit numerator still has plenty of headroom.

use alloy_primitives::U512;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{VaultError, VaultResult};
use crate::types::{Amount, Price};

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u64 = 10_000;

// ---------------------------------------------------------------------------
// Wide arithmetic helpers
// ---------------------------------------------------------------------------

/// Widens a non-negative amount.
pub(crate) fn wide(amount: Amount) -> VaultResult<U512> {
    if amount < 0 {
        return Err(VaultError::InvalidAmount(amount));
    }
    Ok(U512::from(amount.unsigned_abs()))
}

pub(crate) fn wide_price(price: Price) -> U512 {
    U512::from(price)
}

pub(crate) fn wide_u64(v: u64) -> U512 {
    U512::from(v)
}

pub(crate) fn mul(a: U512, b: U512) -> VaultResult<U512> {
    a.checked_mul(b).ok_or(VaultError::ArithmeticOverflow)
}

/// Narrows back to an amount.
pub(crate) fn narrow(v: U512) -> VaultResult<Amount> {
    i128::try_from(v).map_err(|_| VaultError::ArithmeticOverflow)
}

/// `ceil(a / b)` for `b > 0`.
pub(crate) fn div_ceil(a: U512, b: U512) -> VaultResult<U512> {
    if b == U512::ZERO {
        return Err(VaultError::ArithmeticOverflow);
    }
    let q = a / b;
    if q * b == a {
        Ok(q)
    } else {
        Ok(q + U512::from(1u8))
    }
}

// ---------------------------------------------------------------------------
// Ratio
// ---------------------------------------------------------------------------

/// A fraction in `[0, 1]`, used for LTV thresholds, close factors and
/// liquidation bonuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ratio {
    pub num: u64,
    pub den: u64,
}

impl Ratio {
    /// Builds and validates a ratio.
    pub fn new(num: u64, den: u64) -> VaultResult<Self> {
        let r = Self { num, den };
        r.validate()?;
        Ok(r)
    }

    /// Shorthand for `num / 100`.
    pub const fn percent(num: u64) -> Self {
        Self { num, den: 100 }
    }

    /// Checks `den > 0` and `num <= den`.
    pub fn validate(&self) -> VaultResult<()> {
        if self.den == 0 {
            return Err(VaultError::InvalidConfig(format!(
                "ratio {}/{} has a zero denominator",
                self.num, self.den
            )));
        }
        if self.num > self.den {
            return Err(VaultError::InvalidConfig(format!(
                "ratio {}/{} exceeds one",
                self.num, self.den
            )));
        }
        Ok(())
    }

    /// `self <= other`, by cross-multiplication.
    pub fn le(&self, other: &Ratio) -> bool {
        (self.num as u128) * (other.den as u128) <= (other.num as u128) * (self.den as u128)
    }

    /// The ratio in basis points, rounded down.
    pub fn as_bps(&self) -> u64 {
        if self.den == 0 {
            return 0;
        }
        let bps = (self.num as u128 * BPS_DENOMINATOR as u128) / self.den as u128;
        u64::try_from(bps).unwrap_or(u64::MAX)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

// ---------------------------------------------------------------------------
// CollateralRatio
// ---------------------------------------------------------------------------

/// Collateral value (`collateral * price`) relative to debt.
///
/// A vault with no debt is `Infinite` and sorts above every finite ratio.
/// Equality and ordering compare the fractions, so `200/100` equals
/// `400/200`.
#[derive(Clone, Copy, Debug)]
pub enum CollateralRatio {
    Infinite,
    Finite { collateral_value: U512, debt: U512 },
}

impl CollateralRatio {
    /// Computes the ratio for raw balances.
    pub fn of(collateral: Amount, debt: Amount, price: Price) -> VaultResult<Self> {
        let debt = wide(debt)?;
        let collateral = wide(collateral)?;
        if debt == U512::ZERO {
            return Ok(CollateralRatio::Infinite);
        }
        Ok(CollateralRatio::Finite {
            collateral_value: mul(collateral, wide_price(price))?,
            debt,
        })
    }

    /// `true` for the no-debt case.
    pub fn is_infinite(&self) -> bool {
        matches!(self, CollateralRatio::Infinite)
    }

    /// Ratio in basis points (15_000 = 150%), saturating at `u128::MAX`.
    /// `None` when infinite.
    pub fn as_bps(&self) -> Option<u128> {
        match self {
            CollateralRatio::Infinite => None,
            CollateralRatio::Finite {
                collateral_value,
                debt,
            } => {
                let scaled = collateral_value.saturating_mul(wide_u64(BPS_DENOMINATOR));
                Some(u128::try_from(scaled / *debt).unwrap_or(u128::MAX))
            }
        }
    }
}

impl PartialEq for CollateralRatio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CollateralRatio {}

impl PartialOrd for CollateralRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollateralRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CollateralRatio::Infinite, CollateralRatio::Infinite) => Ordering::Equal,
            (CollateralRatio::Infinite, _) => Ordering::Greater,
            (_, CollateralRatio::Infinite) => Ordering::Less,
            (
                CollateralRatio::Finite {
                    collateral_value: a_cv,
                    debt: a_debt,
                },
                CollateralRatio::Finite {
                    collateral_value: b_cv,
                    debt: b_debt,
                },
            ) => {
                // a_cv / a_debt  vs  b_cv / b_debt, both debts non-zero.
                let lhs = a_cv.saturating_mul(*b_debt);
                let rhs = b_cv.saturating_mul(*a_debt);
                lhs.cmp(&rhs)
            }
        }
    }
}

impl fmt::Display for CollateralRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_bps() {
            None => write!(f, "inf"),
            Some(bps) => write!(f, "{}.{:02}%", bps / 100, bps % 100),
        }
    }
}
