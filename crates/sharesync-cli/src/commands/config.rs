//! Config command - View and manage sharesync configuration
//!
//! Provides the `sharesync config` CLI command which:
//! 1. Shows the effective configuration (file plus environment), secrets masked
//! 2. Prints the configuration file path
//! 3. Sets individual values via dot-notation keys
//! 4. Validates the configuration and reports errors

use anyhow::{Context, Result};
use clap::Subcommand;
use sharesync_core::config::Config;
use tracing::info;

use super::AppContext;

/// Placeholder printed instead of keys and tokens
const MASK: &str = "********";

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "storage.share_name")
        key: String,
        /// New value
        value: String,
    },
    /// Validate the configuration
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Path => self.execute_path(ctx),
            ConfigCommand::Set { key, value } => self.execute_set(ctx, key, value),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &AppContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = masked(ctx.load_config()?);

        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }
        Ok(())
    }

    fn execute_path(&self, ctx: &AppContext) -> Result<()> {
        let path = ctx.config_path.display().to_string();
        if ctx.is_json() {
            ctx.formatter().print_json(&serde_json::json!({
                "config_path": path,
                "exists": ctx.config_path.exists(),
            }));
        } else {
            println!("{path}");
        }
        Ok(())
    }

    fn execute_set(&self, ctx: &AppContext, key: &str, value: &str) -> Result<()> {
        let formatter = ctx.formatter();

        // Start from the file alone so environment values are not persisted
        let mut config = if ctx.config_path.exists() {
            Config::load(&ctx.config_path)?
        } else {
            Config::default()
        };

        info!(key = %key, value = %value, "Setting configuration value");
        apply_config_value(&mut config, key, value)?;

        // An unset storage target is expected while the file is being filled in
        let errors: Vec<String> = config
            .validate()
            .into_iter()
            .filter(|e| e.field.starts_with(key) || !e.message.starts_with("not configured"))
            .map(|e| e.to_string())
            .collect();
        if !errors.is_empty() {
            anyhow::bail!("Invalid value for '{}': {}", key, errors.join("; "));
        }

        if let Some(parent) = ctx.config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
        }
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        std::fs::write(&ctx.config_path, yaml).context("Failed to write configuration file")?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "key": key,
                "value": value,
                "config_path": ctx.config_path.display().to_string(),
            }));
        } else {
            formatter.success(&format!("Set {} = {}", key, value));
            formatter.info(&format!("Saved to {}", ctx.config_path.display()));
        }
        Ok(())
    }

    fn execute_validate(&self, ctx: &AppContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;

        info!(config_path = %ctx.config_path.display(), "Validating configuration");
        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": ctx.config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", ctx.config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("configuration is invalid")
        }
    }
}

/// Replaces keys and tokens with [`MASK`]
fn masked(mut config: Config) -> Config {
    let mask = |secret: &mut Option<String>| {
        if secret.is_some() {
            *secret = Some(MASK.to_string());
        }
    };
    mask(&mut config.storage.account_key);
    mask(&mut config.storage.access_token);
    mask(&mut config.billing.access_token);
    config
}

/// Apply a dot-notation key/value pair to a Config struct
///
/// Secrets (account key, tokens) are not settable here; they come from the
/// environment.
fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        // --- storage ---
        "storage.account_url" => config.storage.account_url = value.to_string(),
        "storage.share_name" => config.storage.share_name = value.to_string(),
        "storage.api_version" => config.storage.api_version = value.to_string(),
        "storage.max_retries" => {
            config.storage.max_retries = value
                .parse::<u32>()
                .context("Expected a non-negative integer for storage.max_retries")?;
        }
        "storage.retry_delay_secs" => {
            config.storage.retry_delay_secs = value
                .parse::<u64>()
                .context("Expected a non-negative integer for storage.retry_delay_secs")?;
        }

        // --- billing ---
        "billing.endpoint" => config.billing.endpoint = value.to_string(),
        "billing.api_version" => config.billing.api_version = value.to_string(),
        "billing.timeout_secs" => {
            config.billing.timeout_secs = value
                .parse::<u64>()
                .context("Expected a positive integer for billing.timeout_secs")?;
        }
        "billing.max_retries" => {
            config.billing.max_retries = value
                .parse::<u32>()
                .context("Expected a non-negative integer for billing.max_retries")?;
        }
        "billing.retry_delay_secs" => {
            config.billing.retry_delay_secs = value
                .parse::<u64>()
                .context("Expected a non-negative integer for billing.retry_delay_secs")?;
        }

        // --- logging ---
        "logging.level" => config.logging.level = value.to_string(),

        _ => anyhow::bail!("Unknown configuration key: '{}'", key),
    }

    Ok(())
}
