// Copyright (c) 2026 CollatChain Contributors. MIT License.
// See LICENSE for details.

//! # CollatChain Node
//!
//! Entry point for the `collat-node` binary. Parses CLI arguments,
//! initializes logging, opens the persistent ledger and runs protocol
//! operations against it.
//!
//! The binary supports four subcommands:
//!
//! - `init`    — create the data directory, write config, bootstrap price
//! - `exec`    — run one operation, print the result as JSON
//! - `replay`  — run a JSON scenario file, one result line per operation
//! - `version` — print build version information

mod cli;
mod logging;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::Path;

use collat_protocol::{Address, ProtocolConfig, Ratio, RiskParams};

use cli::{Commands, CollatNodeCli};

fn main() -> Result<()> {
    let cli = CollatNodeCli::parse();
    logging::init_logging(logging::DEFAULT_DIRECTIVES, cli.log_format);

    match cli.command {
        Commands::Init(args) => init_node(&cli.data_dir, args),
        Commands::Exec { op } => exec_operation(&cli.data_dir, op),
        Commands::Replay(args) => replay_scenario(&cli.data_dir, args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Creates the data directory, writes `config.json` and opens the database
/// once so the bootstrap price lands in the oracle.
fn init_node(data_dir: &Path, args: cli::InitArgs) -> Result<()> {
    tracing::info!(data_dir = %data_dir.display(), "initializing node");

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let admin = args
        .admin
        .as_deref()
        .map(Address::parse)
        .transpose()
        .context("invalid --admin")?;
    let risk = RiskParams::new(
        Ratio::new(args.max_ltv, 100)?,
        Ratio::new(args.liquidation_ltv, 100)?,
    )
    .context("invalid LTV thresholds")?;
    let config = ProtocolConfig {
        risk,
        admin,
        bootstrap_price: args.price,
        ..ProtocolConfig::default()
    };

    let config_path = runner::write_config(data_dir, &config, args.force)?;
    let (db, manager) = runner::open_manager(data_dir)?;
    db.flush().context("failed to flush database")?;

    let price = manager
        .get_price()
        .map(|p| p.to_string())
        .unwrap_or_else(|_| "unset".to_string());

    println!("Node initialized successfully.");
    println!("  Data directory : {}", data_dir.display());
    println!("  Config         : {}", config_path.display());
    println!("  Max LTV        : {}", config.risk.max_ltv);
    println!("  Liquidation LTV: {}", config.risk.liquidation_ltv);
    println!("  Oracle price   : {}", price);

    Ok(())
}

/// Runs a single operation from the command line.
fn exec_operation(data_dir: &Path, op: cli::ExecOp) -> Result<()> {
    let operation = op.into_operation().context("invalid operation arguments")?;
    let (db, mut manager) = runner::open_manager(data_dir)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let ok = runner::run_one(&mut manager, &operation, &mut out)?;
    out.flush()?;
    db.flush().context("failed to flush database")?;

    if !ok {
        anyhow::bail!("{} failed", operation.name());
    }
    Ok(())
}

/// Replays a scenario file.
fn replay_scenario(data_dir: &Path, args: cli::ReplayArgs) -> Result<()> {
    let ops = runner::load_scenario(&args.scenario)?;
    let (db, mut manager) = runner::open_manager(data_dir)?;
    tracing::info!(scenario = %args.scenario.display(), operations = ops.len(), "replaying");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = runner::replay(&mut manager, &ops, &mut out)?;
    out.flush()?;
    db.flush().context("failed to flush database")?;

    tracing::info!(
        executed = summary.executed,
        total = summary.total,
        failed = summary.failed,
        "replay finished"
    );
    if summary.failed {
        anyhow::bail!(
            "replay stopped at operation {} of {}",
            summary.executed,
            summary.total
        );
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("collat-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol    {}", collat_protocol::config::PROTOCOL_VERSION);
    println!(
        "storage     v{}",
        collat_protocol::config::STORAGE_FORMAT_VERSION
    );
}
