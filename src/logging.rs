//! File logging.
//!
//! The terminal belongs to the UI, so log output goes to a file.
//! `KAFKALENS_LOG` selects the filter, falling back to `RUST_LOG`, then
//! `info`.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Log file used when neither the CLI nor the config names one.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("kafkalens.log")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("KAFKALENS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber writing to `path`.
pub fn init(path: &Path) -> Result<()> {
    let file = open_log(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {}", e))
}
