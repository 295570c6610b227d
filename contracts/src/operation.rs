//! # Operations
//!
//! A serializable form of every [`VaultManager`] call, so hosts can take
//! operations from the command line or a JSON scenario file and feed them
//! through one dispatch point.
//!
//! ```json
//! [
//!   {"op": "set_price", "caller": "GADMIN", "price": 1},
//!   {"op": "deposit", "user": "GALICE", "amount": 100},
//!   {"op": "borrow", "user": "GALICE", "amount": 70},
//!   {"op": "get_vault", "user": "GALICE"}
//! ]
//! ```
//!
//! Decoding reads every field into one flat record first and only then picks
//! the variant. Amounts and prices are 128-bit, and serde's buffered decoding
//! of internally tagged enums cannot carry 128-bit integers.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use collat_protocol::{Address, Amount, LedgerStore, OracleStore, Price, VaultLookup, VaultResult};

use crate::vault_manager::{VaultHealth, VaultManager};

/// One protocol call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    InitVault { user: Address },
    Deposit { user: Address, amount: Amount },
    Borrow { user: Address, amount: Amount },
    Repay { user: Address, amount: Amount },
    Withdraw { user: Address, amount: Amount },
    Liquidate { liquidator: Address, borrower: Address },
    SetPrice { caller: Address, price: Price },
    GetVault { user: Address },
    Health { user: Address },
}

impl Operation {
    /// The `op` tag, as it appears in JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InitVault { .. } => "init_vault",
            Operation::Deposit { .. } => "deposit",
            Operation::Borrow { .. } => "borrow",
            Operation::Repay { .. } => "repay",
            Operation::Withdraw { .. } => "withdraw",
            Operation::Liquidate { .. } => "liquidate",
            Operation::SetPrice { .. } => "set_price",
            Operation::GetVault { .. } => "get_vault",
            Operation::Health { .. } => "health",
        }
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawOperation::deserialize(deserializer)?.into_operation()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OpKind {
    InitVault,
    Deposit,
    Borrow,
    Repay,
    Withdraw,
    Liquidate,
    SetPrice,
    GetVault,
    Health,
}

/// Wire form of an [`Operation`]: the `op` tag next to every field any
/// variant uses.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOperation {
    op: OpKind,
    user: Option<Address>,
    amount: Option<Amount>,
    liquidator: Option<Address>,
    borrower: Option<Address>,
    caller: Option<Address>,
    price: Option<Price>,
}

fn required<T, E: de::Error>(value: Option<T>, field: &'static str) -> Result<T, E> {
    value.ok_or_else(|| E::missing_field(field))
}

impl RawOperation {
    fn into_operation<E: de::Error>(self) -> Result<Operation, E> {
        let user = self.user;
        let amount = self.amount;
        Ok(match self.op {
            OpKind::InitVault => Operation::InitVault {
                user: required(user, "user")?,
            },
            OpKind::Deposit => Operation::Deposit {
                user: required(user, "user")?,
                amount: required(amount, "amount")?,
            },
            OpKind::Borrow => Operation::Borrow {
                user: required(user, "user")?,
                amount: required(amount, "amount")?,
            },
            OpKind::Repay => Operation::Repay {
                user: required(user, "user")?,
                amount: required(amount, "amount")?,
            },
            OpKind::Withdraw => Operation::Withdraw {
                user: required(user, "user")?,
                amount: required(amount, "amount")?,
            },
            OpKind::Liquidate => Operation::Liquidate {
                liquidator: required(self.liquidator, "liquidator")?,
                borrower: required(self.borrower, "borrower")?,
            },
            OpKind::SetPrice => Operation::SetPrice {
                caller: required(self.caller, "caller")?,
                price: required(self.price, "price")?,
            },
            OpKind::GetVault => Operation::GetVault {
                user: required(user, "user")?,
            },
            OpKind::Health => Operation::Health {
                user: required(user, "user")?,
            },
        })
    }
}

/// What an [`Operation`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Mutations report whether they took effect. Operations that cannot
    /// say "no" (init, deposit, set_price) always report `true`.
    Applied { op: &'static str, ok: bool },
    /// A vault read.
    Snapshot { user: Address, vault: VaultLookup },
    /// A health read. `None` when the vault does not exist.
    Health { user: Address, health: Option<VaultHealth> },
}

impl<L: LedgerStore, O: OracleStore> VaultManager<L, O> {
    /// Runs one operation.
    pub fn execute(&mut self, operation: &Operation) -> VaultResult<Outcome> {
        let op = operation.name();
        let ok = match operation {
            Operation::InitVault { user } => {
                self.init_vault(user)?;
                true
            }
            Operation::Deposit { user, amount } => {
                self.deposit_collateral(user, *amount)?;
                true
            }
            Operation::Borrow { user, amount } => self.borrow(user, *amount)?,
            Operation::Repay { user, amount } => self.repay(user, *amount)?,
            Operation::Withdraw { user, amount } => self.withdraw_collateral(user, *amount)?,
            Operation::Liquidate {
                liquidator,
                borrower,
            } => self.liquidate(liquidator, borrower)?,
            Operation::SetPrice { caller, price } => {
                self.set_price(caller, *price)?;
                true
            }
            Operation::GetVault { user } => {
                return Ok(Outcome::Snapshot {
                    user: user.clone(),
                    vault: self.get_vault(user)?,
                })
            }
            Operation::Health { user } => {
                return Ok(Outcome::Health {
                    user: user.clone(),
                    health: self.vault_health(user)?,
                })
            }
        };
        Ok(Outcome::Applied { op, ok })
    }
}
