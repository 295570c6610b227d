//! # Risk Engine
//!
//! Pure, deterministic eligibility decisions. Given a vault, a price and a
//! threshold, answer: may this vault borrow more, withdraw, or be
//! liquidated? Nothing in here reads or writes state.
//!
//! ```text
//! ratio.rs        — Ratio (LTV fractions), CollateralRatio, wide arithmetic
//! engine.rs       — safety predicate, can_borrow / can_withdraw /
//!                   is_liquidatable, RiskParams, RiskEngine
//! liquidation.rs  — LiquidationPolicy and the seizure it produces
//! ```
//!
//! ## Thresholds
//!
//! Thresholds are injected as [`RiskParams`], never written inline, so tests
//! can pin exact boundary ratios. The liquidation LTV is validated to sit at
//! or above the borrowing LTV.

pub mod engine;
pub mod liquidation;
pub mod ratio;

pub use engine::{
    can_borrow, can_withdraw, collateralization_ratio, is_liquidatable, is_safe, max_borrowable,
    max_withdrawable, RiskEngine, RiskParams,
};
pub use liquidation::{liquidation_outcome, LiquidationPolicy, Seizure};
pub use ratio::{CollateralRatio, Ratio};
