//! CLI subcommands
//!
//! Every command receives an [`AppContext`] carrying the global flags and
//! the resolved configuration path.

pub mod billing;
pub mod config;
pub mod transfer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sharesync_azure::AzureShareStore;
use sharesync_core::config::{Config, ValidationError};
use sharesync_core::usecases::FileTransferService;
use tracing::debug;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global state shared by all commands
#[derive(Debug, Clone)]
pub struct AppContext {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config_path: PathBuf,
}

impl AppContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Loads the configuration file (defaults when absent) plus
    /// environment overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = if self.config_path.exists() {
            Config::load(&self.config_path)?
        } else {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            Config::default()
        };
        config
            .apply_env()
            .context("Invalid storage account in environment")?;
        Ok(config)
    }

    /// Builds the transfer service for the configured share
    pub fn transfer_service(&self) -> Result<FileTransferService> {
        let config = self.load_config()?;
        ensure_valid(config.storage.validate())?;

        let store = AzureShareStore::from_config(&config.storage)
            .context("Failed to create share client")?;
        Ok(FileTransferService::with_retry(
            Arc::new(store),
            config.storage.retry_policy(),
        ))
    }
}

/// Fails with every validation error joined into one message
pub fn ensure_valid(errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    anyhow::bail!("Invalid configuration: {}", messages.join("; "))
}
