//! Billing API response types

use serde::{Deserialize, Serialize};

/// Envelope of `GET /providers/Microsoft.Billing/billingAccounts`
#[derive(Debug, Deserialize)]
pub(crate) struct BillingAccountList {
    #[serde(default)]
    pub value: Vec<BillingAccount>,
}

/// A billing account the caller can access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAccount {
    /// Fully qualified resource ID
    pub id: String,
    /// Account name (the enrollment number for EA accounts)
    pub name: String,
    #[serde(default)]
    pub properties: BillingAccountProperties,
}

/// Descriptive properties of a billing account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAccountProperties {
    pub display_name: Option<String>,
    /// e.g. `EnterpriseAgreement`, `MicrosoftCustomerAgreement`
    pub agreement_type: Option<String>,
    pub account_status: Option<String>,
}

impl BillingAccount {
    /// Display name, falling back to the account name
    pub fn label(&self) -> &str {
        self.properties
            .display_name
            .as_deref()
            .unwrap_or(&self.name)
    }
}
