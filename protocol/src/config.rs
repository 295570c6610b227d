//! # Protocol Configuration & Constants
//!
//! Every tunable number in CollatChain lives here, next to the one struct a
//! host hands to the vault manager. If a threshold shows up as a literal
//! anywhere else, it is a bug waiting for a boundary test to find it.
//!
//! ## Loading
//!
//! [`ProtocolConfig`] is plain serde. The node reads it as JSON from the data
//! directory; anything missing falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::risk::{LiquidationPolicy, Ratio, RiskParams};
use crate::types::{Address, Price};

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Crate version, baked in at compile time.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bumped whenever the on-disk encoding of vaults or the oracle slot changes.
pub const STORAGE_FORMAT_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// Risk Thresholds
// ---------------------------------------------------------------------------

/// Borrowing and withdrawing stay allowed up to 70% loan-to-value.
pub const DEFAULT_MAX_LTV: Ratio = Ratio::percent(70);

/// Vaults above 75% loan-to-value can be liquidated. The gap between the two
/// thresholds is the band where a vault is frozen but not yet seizable.
pub const DEFAULT_LIQUIDATION_LTV: Ratio = Ratio::percent(75);

// ---------------------------------------------------------------------------
// Storage Layout
// ---------------------------------------------------------------------------

/// sled tree holding one entry per vault, keyed by address.
pub const VAULTS_TREE: &str = "vaults";

/// sled tree holding the oracle slot.
pub const ORACLE_TREE: &str = "oracle";

/// Key of the single price entry inside [`ORACLE_TREE`].
pub const ORACLE_PRICE_KEY: &[u8] = b"price";

/// File name the node looks for inside its data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

// ---------------------------------------------------------------------------
// ProtocolConfig
// ---------------------------------------------------------------------------

/// Everything a vault manager needs to know besides its stores.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Borrow and liquidation thresholds.
    pub risk: RiskParams,
    /// What a liquidation moves.
    pub liquidation: LiquidationPolicy,
    /// Only this address may update the price. `None` leaves `set_price` open.
    pub admin: Option<Address>,
    /// Written to the oracle at startup if it has never been set.
    pub bootstrap_price: Option<Price>,
}

impl ProtocolConfig {
    /// Checks thresholds and the liquidation policy.
    pub fn validate(&self) -> VaultResult<()> {
        self.risk.validate()?;
        self.liquidation.validate()?;
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> VaultResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VaultError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON, the format written by `collat-node init`.
    pub fn to_json(&self) -> VaultResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::InvalidConfig(format!("cannot encode config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_ordered() {
        assert!(DEFAULT_MAX_LTV.le(&DEFAULT_LIQUIDATION_LTV));
        assert_eq!(DEFAULT_MAX_LTV.as_bps(), 7_000);
        assert_eq!(DEFAULT_LIQUIDATION_LTV.as_bps(), 7_500);
    }

    #[test]
    fn default_config_validates() {
        let config = ProtocolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.liquidation, LiquidationPolicy::FullSeizure);
        assert!(config.admin.is_none());
        assert!(config.bootstrap_price.is_none());
    }

    #[test]
    fn empty_json_falls_back_to_defaults() {
        let config = ProtocolConfig::from_json("{}").unwrap();
        assert_eq!(config, ProtocolConfig::default());
    }

    #[test]
    fn json_roundtrip_keeps_every_field() {
        let config = ProtocolConfig {
            risk: RiskParams::new(Ratio::percent(50), Ratio::percent(80)).unwrap(),
            liquidation: LiquidationPolicy::Partial {
                close_factor: Ratio::percent(50),
                bonus: Ratio::percent(5),
            },
            admin: Some(Address::from("GADMIN")),
            bootstrap_price: Some(3),
        };
        let json = config.to_json().unwrap();
        assert_eq!(ProtocolConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let json = r#"{"risk":{"max_ltv":{"num":80,"den":100},"liquidation_ltv":{"num":75,"den":100}}}"#;
        assert!(matches!(
            ProtocolConfig::from_json(json),
            Err(VaultError::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            ProtocolConfig::from_json("not json"),
            Err(VaultError::InvalidConfig(_))
        ));
    }

    #[test]
    fn storage_names_are_distinct() {
        assert_ne!(VAULTS_TREE, ORACLE_TREE);
        assert!(!ORACLE_PRICE_KEY.is_empty());
    }
}
