//! Command implementations.

pub mod check;
pub mod config;
pub mod status;

use std::path::PathBuf;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,

    /// Store file given on the command line
    pub store_path: Option<PathBuf>,

    /// Loaded configuration
    pub config: Config,
}

impl Context {
    /// Recheck store path from the command line, config, or default.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        self.config.store_path_or_default(self.store_path.clone())
    }

    /// Open the persistent recheck store.
    pub fn open_store(&self) -> anyhow::Result<dnt::JsonFileRecheckStore> {
        let path = self.store_path()?;
        dnt::JsonFileRecheckStore::open(&path)
            .map_err(|e| anyhow::anyhow!("Could not open store {}: {}", path.display(), e))
    }
}
