//! Tracing setup.
//!
//! The terminal belongs to the UI, so log lines go to a file instead of
//! stderr.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Returns the file being written to.
pub fn init(config: &LoggingConfig) -> Result<PathBuf> {
    let path = config
        .file_path()
        .ok_or_else(|| anyhow!("Could not determine log directory"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(filter)
        .try_init()?;

    Ok(path)
}
