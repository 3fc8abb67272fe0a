//! Azure management API client for billing accounts
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sharesync_billing::BillingClient;
//!
//! # async fn example() -> Result<(), sharesync_billing::BillingError> {
//! let client = BillingClient::new("management-token");
//! for account in client.list_billing_accounts().await? {
//!     println!("{} ({})", account.label(), account.name);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode};
use sharesync_core::config::BillingConfig;
use sharesync_core::retry::RetryPolicy;
use tracing::{debug, error, info, warn};

use crate::models::{BillingAccount, BillingAccountList};
use crate::BillingError;

/// Base URL of the Azure management API
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// `api-version` for the billing accounts endpoint
pub const DEFAULT_API_VERSION: &str = "2019-10-01-preview";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Five retries, ten seconds apart, for timed-out requests
pub const DEFAULT_RETRY: RetryPolicy = RetryPolicy::fixed(5, Duration::from_secs(10));

/// HTTP client for the billing accounts endpoint
pub struct BillingClient {
    client: Client,
    base_url: String,
    access_token: String,
    api_version: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl BillingClient {
    /// Creates a client for the public management endpoint
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DEFAULT_ENDPOINT)
    }

    /// Creates a client with a custom base URL (useful for testing)
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: DEFAULT_RETRY,
        }
    }

    /// Creates a client from the `billing` configuration section
    ///
    /// # Errors
    /// [`BillingError::Unauthorized`] when no management token is configured
    pub fn from_config(config: &BillingConfig) -> Result<Self, BillingError> {
        let token = config.access_token.clone().ok_or_else(|| {
            BillingError::Unauthorized(
                "no management token configured (billing.access_token or AZURE_MANAGEMENT_TOKEN)"
                    .to_string(),
            )
        })?;

        Ok(Self::with_base_url(token, config.endpoint.clone())
            .with_api_version(config.api_version.clone())
            .with_timeout(config.timeout())
            .with_retry(config.retry_policy()))
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Replaces the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the retry policy for timed-out requests
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Lists every billing account visible to the token
    ///
    /// Timeouts are retried per the configured policy; every other failure
    /// is returned immediately.
    pub async fn list_billing_accounts(&self) -> Result<Vec<BillingAccount>, BillingError> {
        let accounts = self
            .retry
            .run(
                "list_billing_accounts",
                || self.fetch_billing_accounts(),
                BillingError::is_timeout,
            )
            .await?;

        info!(count = accounts.len(), "Fetched billing accounts");
        Ok(accounts)
    }

    async fn fetch_billing_accounts(&self) -> Result<Vec<BillingAccount>, BillingError> {
        let url = format!(
            "{}/providers/Microsoft.Billing/billingAccounts/",
            self.base_url
        );
        debug!(url = %url, "Requesting billing accounts");

        let response = self
            .client
            .get(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let err = BillingError::from(e);
                if err.is_timeout() {
                    warn!(
                        timeout_secs = self.timeout.as_secs_f64(),
                        error = %err,
                        "Billing request timed out"
                    );
                } else {
                    error!(error = %err, "Billing request failed");
                }
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Billing request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    BillingError::Unauthorized(body)
                }
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    BillingError::Timeout(format!("server returned {status}"))
                }
                _ => BillingError::Status {
                    status: status.as_u16(),
                    message: body,
                },
            });
        }

        let list: BillingAccountList = response.json().await.map_err(|e| {
            error!(error = %e, "Billing response could not be parsed");
            BillingError::InvalidResponse(e.to_string())
        })?;
        Ok(list.value)
    }
}
