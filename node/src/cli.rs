//! # CLI Interface
//!
//! Defines the command-line argument structure for `collat-node` using
//! `clap` derive. Four subcommands: `init`, `exec`, `replay` and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use collat_contracts::Operation;
use collat_protocol::{Address, Amount, Price, VaultResult};

use crate::logging::LogFormat;

/// CollatChain vault host.
///
/// Keeps a persistent vault ledger and price oracle in a data directory and
/// runs protocol operations against it, one at a time.
#[derive(Parser, Debug)]
#[command(
    name = "collat-node",
    about = "CollatChain collateralized lending ledger",
    version,
    propagate_version = true
)]
pub struct CollatNodeCli {
    /// Directory holding `config.json` and the sled database.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "COLLAT_DATA_DIR",
        default_value = "./collat-data"
    )]
    pub data_dir: PathBuf,

    /// Log output format. Logs always go to stderr.
    #[arg(long, global = true, env = "COLLAT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, write `config.json` and bootstrap the
    /// oracle price.
    Init(InitArgs),
    /// Run a single protocol operation and print its result as JSON.
    Exec {
        #[command(subcommand)]
        op: ExecOp,
    },
    /// Run every operation in a JSON scenario file, in order, stopping at
    /// the first integrity error.
    Replay(ReplayArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Initial oracle price, written only if the oracle is empty.
    #[arg(long, env = "COLLAT_BOOTSTRAP_PRICE")]
    pub price: Option<Price>,

    /// Address allowed to update the price. Omit for an open oracle.
    #[arg(long, env = "COLLAT_ADMIN")]
    pub admin: Option<String>,

    /// Max borrow LTV, in percent.
    #[arg(long, default_value_t = 70)]
    pub max_ltv: u64,

    /// Liquidation LTV, in percent.
    #[arg(long, default_value_t = 75)]
    pub liquidation_ltv: u64,

    /// Overwrite an existing `config.json`.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to a JSON array of operations.
    pub scenario: PathBuf,
}

/// One protocol operation, as typed on the command line.
#[derive(Subcommand, Debug)]
pub enum ExecOp {
    /// Open an empty vault (no-op if it exists).
    InitVault { user: String },
    /// Lock collateral, opening the vault if needed.
    Deposit { user: String, amount: Amount },
    /// Borrow against locked collateral.
    Borrow { user: String, amount: Amount },
    /// Repay debt; over-payment is capped.
    Repay { user: String, amount: Amount },
    /// Withdraw collateral.
    Withdraw { user: String, amount: Amount },
    /// Liquidate an under-collateralized vault.
    Liquidate { liquidator: String, borrower: String },
    /// Override the oracle price.
    SetPrice { caller: String, price: Price },
    /// Print a vault.
    GetVault { user: String },
    /// Print a vault's health at the current price.
    Health { user: String },
}

impl ExecOp {
    /// Validates addresses and converts into a protocol [`Operation`].
    pub fn into_operation(self) -> VaultResult<Operation> {
        Ok(match self {
            ExecOp::InitVault { user } => Operation::InitVault {
                user: Address::parse(&user)?,
            },
            ExecOp::Deposit { user, amount } => Operation::Deposit {
                user: Address::parse(&user)?,
                amount,
            },
            ExecOp::Borrow { user, amount } => Operation::Borrow {
                user: Address::parse(&user)?,
                amount,
            },
            ExecOp::Repay { user, amount } => Operation::Repay {
                user: Address::parse(&user)?,
                amount,
            },
            ExecOp::Withdraw { user, amount } => Operation::Withdraw {
                user: Address::parse(&user)?,
                amount,
            },
            ExecOp::Liquidate {
                liquidator,
                borrower,
            } => Operation::Liquidate {
                liquidator: Address::parse(&liquidator)?,
                borrower: Address::parse(&borrower)?,
            },
            ExecOp::SetPrice { caller, price } => Operation::SetPrice {
                caller: Address::parse(&caller)?,
                price,
            },
            ExecOp::GetVault { user } => Operation::GetVault {
                user: Address::parse(&user)?,
            },
            ExecOp::Health { user } => Operation::Health {
                user: Address::parse(&user)?,
            },
        })
    }
}
