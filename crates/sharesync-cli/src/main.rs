//! sharesync CLI - Command-line interface for sharesync
//!
//! Provides commands for:
//! - Uploading files to an Azure Files share without overwriting
//! - Downloading files without clobbering local copies
//! - Creating nested folders on the share
//! - Listing Azure billing accounts
//! - Viewing and editing configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sharesync_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    billing::BillingCommand,
    config::ConfigCommand,
    transfer::{DownloadCommand, MkdirCommand, UploadCommand},
    AppContext,
};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "sharesync", version, about = "Azure Files upload/download tool")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a local file to the share
    Upload(UploadCommand),
    /// Download a file from the share
    Download(DownloadCommand),
    /// Create a folder and its parents on the share
    Mkdir(MkdirCommand),
    /// Billing account commands
    #[command(subcommand)]
    Billing(BillingCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let ctx = AppContext {
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
        quiet: cli.quiet,
        config_path: cli.config.clone().unwrap_or_else(Config::default_path),
    };

    // Setup tracing
    let filter = match (cli.verbose, cli.quiet) {
        (0, true) => "warn".to_string(),
        (0, false) => ctx
            .load_config()
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string()),
        (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Upload(cmd) => cmd.execute(&ctx).await,
        Commands::Download(cmd) => cmd.execute(&ctx).await,
        Commands::Mkdir(cmd) => cmd.execute(&ctx).await,
        Commands::Billing(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
    };

    if let Err(err) = result {
        get_formatter(ctx.format, ctx.quiet).error(&error_message(&err));
        std::process::exit(1);
    }
}

/// Joins the error chain, skipping causes already quoted by their parent
fn error_message(err: &anyhow::Error) -> String {
    let mut message = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if message.contains(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}
