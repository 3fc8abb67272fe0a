//! sharesync Billing - Azure billing account client
//!
//! Lists the billing (enrollment) accounts visible to the caller through the
//! Azure management API. Requests time out after 60 seconds and timed-out
//! requests are retried on a fixed schedule.
//!
//! ## Modules
//!
//! - [`client`] - Management API HTTP client
//! - [`models`] - Response types

pub mod client;
pub mod models;

pub use client::BillingClient;
pub use models::{BillingAccount, BillingAccountProperties};

use thiserror::Error;

/// Errors that can occur when calling the billing API
#[derive(Debug, Error)]
pub enum BillingError {
    /// The request did not complete within the client timeout
    #[error("Billing request timed out: {0}")]
    Timeout(String),

    /// The token is missing, invalid, or lacks billing permissions
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success response
    #[error("Billing API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The management endpoint could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// The response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BillingError {
    /// Returns true for the only failure the client retries
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}
