//! Billing command - Inspect Azure billing (enrollment) accounts

use anyhow::{Context, Result};
use clap::Subcommand;
use sharesync_billing::BillingClient;
use tracing::info;

use super::{ensure_valid, AppContext};

/// Billing subcommands
#[derive(Debug, Subcommand)]
pub enum BillingCommand {
    /// List the billing accounts visible to the management token
    Accounts,
}

impl BillingCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self {
            BillingCommand::Accounts => self.execute_accounts(ctx).await,
        }
    }

    async fn execute_accounts(&self, ctx: &AppContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config()?;
        ensure_valid(config.billing.validate())?;

        let client = BillingClient::from_config(&config.billing)?;
        info!(endpoint = %config.billing.endpoint, "Listing billing accounts");
        let accounts = client
            .list_billing_accounts()
            .await
            .context("Failed to list billing accounts")?;

        if ctx.is_json() {
            let json = serde_json::to_value(&accounts)
                .context("Failed to serialize billing accounts")?;
            formatter.print_json(&json);
            return Ok(());
        }

        if accounts.is_empty() {
            formatter.info("No billing accounts found");
            return Ok(());
        }

        formatter.success(&format!(
            "{} billing account{}",
            accounts.len(),
            if accounts.len() == 1 { "" } else { "s" }
        ));
        for account in &accounts {
            formatter.info("");
            formatter.field("Name", account.label());
            formatter.field("Account", &account.name);
            if let Some(agreement) = &account.properties.agreement_type {
                formatter.field("Agreement", agreement);
            }
            if let Some(status) = &account.properties.account_status {
                formatter.field("Status", status);
            }
        }
        Ok(())
    }
}
