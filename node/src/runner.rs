//! # Operation Runner
//!
//! Opens the data directory, builds a [`VaultManager`] over the sled stores
//! and pushes operations through it, writing one JSON line per result.
//!
//! ## Data Directory
//!
//! ```text
//! <data_dir>/
//!   config.json   — ProtocolConfig, written by `init`
//!   db/           — sled database (vaults + oracle trees)
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use collat_contracts::{Operation, VaultManager};
use collat_protocol::config::CONFIG_FILE_NAME;
use collat_protocol::storage::{CollatDb, SledLedger, SledOracle};
use collat_protocol::ProtocolConfig;

/// Manager type the node runs.
pub type NodeManager = VaultManager<SledLedger, SledOracle>;

/// JSON line printed when an operation fails.
#[derive(Debug, Serialize)]
struct ErrorLine<'a> {
    op: &'a str,
    error: String,
}

/// Where the config file lives inside a data directory.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Where the sled database lives inside a data directory.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("db")
}

/// Reads `config.json`, falling back to defaults when the file is missing.
pub fn load_config(data_dir: &Path) -> Result<ProtocolConfig> {
    let path = config_path(data_dir);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ProtocolConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    ProtocolConfig::from_json(&raw)
        .with_context(|| format!("invalid config at {}", path.display()))
}

/// Writes `config.json`. Refuses to overwrite unless `force` is set.
pub fn write_config(data_dir: &Path, config: &ProtocolConfig, force: bool) -> Result<PathBuf> {
    let path = config_path(data_dir);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let json = config.to_json()?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    Ok(path)
}

/// Opens the database and builds a manager from the directory's config.
pub fn open_manager(data_dir: &Path) -> Result<(CollatDb, NodeManager)> {
    let config = load_config(data_dir)?;
    let path = db_path(data_dir);
    std::fs::create_dir_all(&path)
        .with_context(|| format!("failed to create database directory: {}", path.display()))?;
    let db = CollatDb::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    let manager = VaultManager::new(db.ledger(), db.oracle(), config)
        .context("failed to start vault manager")?;
    Ok((db, manager))
}

/// Runs one operation and writes its result line. Returns `false` if the
/// operation failed with an integrity error.
pub fn run_one<W: Write>(manager: &mut NodeManager, op: &Operation, out: &mut W) -> Result<bool> {
    let (line, ok) = match manager.execute(op) {
        Ok(outcome) => (serde_json::to_string(&outcome)?, true),
        Err(e) => {
            tracing::warn!(op = op.name(), error = %e, "operation failed");
            let line = ErrorLine {
                op: op.name(),
                error: e.to_string(),
            };
            (serde_json::to_string(&line)?, false)
        }
    };
    writeln!(out, "{line}")?;
    Ok(ok)
}

/// Summary of a scenario replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Operations executed, including the failing one.
    pub executed: usize,
    /// Total operations in the scenario.
    pub total: usize,
    /// Whether the replay stopped on an error.
    pub failed: bool,
}

/// Parses a scenario file.
pub fn load_scenario(path: &Path) -> Result<Vec<Operation>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("malformed scenario {}", path.display()))
}

/// Runs operations in order, stopping at the first integrity error.
pub fn replay<W: Write>(
    manager: &mut NodeManager,
    ops: &[Operation],
    out: &mut W,
) -> Result<ReplaySummary> {
    let mut executed = 0;
    for op in ops {
        executed += 1;
        if !run_one(manager, op, out)? {
            return Ok(ReplaySummary {
                executed,
                total: ops.len(),
                failed: true,
            });
        }
    }
    Ok(ReplaySummary {
        executed,
        total: ops.len(),
        failed: false,
    })
}
