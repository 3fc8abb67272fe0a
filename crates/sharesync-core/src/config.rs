//! Configuration module for sharesync.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, environment overrides, validation, defaults, and a
//! builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for sharesync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub billing: BillingConfig,
    pub logging: LoggingConfig,
}

/// Azure Files share settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// File service endpoint, e.g. `https://myaccount.file.core.windows.net`.
    pub account_url: String,
    /// Name of the share all paths are relative to.
    pub share_name: String,
    /// Base64 shared-key secret. Takes precedence over `access_token`.
    pub account_key: Option<String>,
    /// OAuth bearer token used when no shared key is configured.
    pub access_token: Option<String>,
    /// Value of the `x-ms-version` header.
    pub api_version: String,
    /// Retries for timed-out or dropped share requests (0 disables).
    pub max_retries: u32,
    /// Seconds between share request retries.
    pub retry_delay_secs: u64,
}

/// Billing (enrollment) API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Management endpoint base URL.
    pub endpoint: String,
    /// `api-version` query parameter.
    pub api_version: String,
    /// Bearer token for the management API.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a timed-out request.
    pub max_retries: u32,
    /// Seconds between retries.
    pub retry_delay_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/sharesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sharesync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

/// Storage account: connection string, endpoint URL, or bare account name.
pub const ENV_STORAGE_ACCOUNT: &str = "AZURE_STORAGE_ACCOUNT";
/// Share name.
pub const ENV_FILESHARE_NAME: &str = "AZURE_FILESHARE_NAME";
/// Shared-key secret.
pub const ENV_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
/// Bearer token for the file service.
pub const ENV_STORAGE_TOKEN: &str = "AZURE_STORAGE_TOKEN";
/// Bearer token for the billing API.
pub const ENV_MANAGEMENT_TOKEN: &str = "AZURE_MANAGEMENT_TOKEN";

/// Default endpoint suffix for public Azure.
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

impl Config {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; unset or empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(account) = get(ENV_STORAGE_ACCOUNT) {
            if account.contains("AccountName=") || account.contains("FileEndpoint=") {
                self.storage.apply_connection_string(&account)?;
            } else if account.contains("://") {
                self.storage.account_url = account;
            } else {
                self.storage.account_url =
                    format!("https://{account}.file.{DEFAULT_ENDPOINT_SUFFIX}");
            }
        }
        if let Some(share) = get(ENV_FILESHARE_NAME) {
            self.storage.share_name = share;
        }
        if let Some(key) = get(ENV_STORAGE_ACCOUNT_KEY) {
            self.storage.account_key = Some(key);
        }
        if let Some(token) = get(ENV_STORAGE_TOKEN) {
            self.storage.access_token = Some(token);
        }
        if let Some(token) = get(ENV_MANAGEMENT_TOKEN) {
            self.billing.access_token = Some(token);
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Fill endpoint and key from an Azure storage connection string
    ///
    /// Understands `DefaultEndpointsProtocol`, `AccountName`, `AccountKey`,
    /// `EndpointSuffix` and an explicit `FileEndpoint`.
    pub fn apply_connection_string(&mut self, connection_string: &str) -> anyhow::Result<()> {
        let mut protocol = "https".to_string();
        let mut account_name = None;
        let mut suffix = DEFAULT_ENDPOINT_SUFFIX.to_string();
        let mut file_endpoint = None;

        for pair in connection_string.split(';').map(str::trim) {
            if pair.is_empty() {
                continue;
            }
            let Some((key, value)) = pair.split_once('=') else {
                bail!("malformed connection string segment: {pair}");
            };
            match key {
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => self.account_key = Some(value.to_string()),
                "EndpointSuffix" => suffix = value.to_string(),
                "FileEndpoint" => file_endpoint = Some(value.trim_end_matches('/').to_string()),
                _ => {}
            }
        }

        self.account_url = match (file_endpoint, account_name) {
            (Some(endpoint), _) => endpoint,
            (None, Some(name)) => format!("{protocol}://{name}.file.{suffix}"),
            (None, None) => bail!("connection string has neither AccountName nor FileEndpoint"),
        };
        Ok(())
    }

    /// Retry policy for share requests
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_retries, Duration::from_secs(self.retry_delay_secs))
    }
}

impl BillingConfig {
    /// Retry policy for billing requests
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_retries, Duration::from_secs(self.retry_delay_secs))
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            account_url: String::new(),
            share_name: String::new(),
            account_key: None,
            access_token: None,
            api_version: "2023-11-03".to_string(),
            max_retries: 0,
            retry_delay_secs: 10,
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://management.azure.com".to_string(),
            api_version: "2019-10-01-preview".to_string(),
            access_token: None,
            timeout_secs: 60,
            max_retries: 5,
            retry_delay_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"storage.share_name"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = self.storage.validate();
        errors.extend(self.billing.validate());

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

impl StorageConfig {
    /// Validate the `storage` section only.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.account_url.is_empty() {
            errors.push(ValidationError {
                field: "storage.account_url".into(),
                message: format!("not configured (set it or {ENV_STORAGE_ACCOUNT})"),
            });
        } else if !is_http_url(&self.account_url) {
            errors.push(ValidationError {
                field: "storage.account_url".into(),
                message: format!("must be an http(s) URL: {}", self.account_url),
            });
        }
        if self.share_name.is_empty() {
            errors.push(ValidationError {
                field: "storage.share_name".into(),
                message: format!("not configured (set it or {ENV_FILESHARE_NAME})"),
            });
        }
        if self.api_version.is_empty() {
            errors.push(ValidationError {
                field: "storage.api_version".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}

impl BillingConfig {
    /// Validate the `billing` section only.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !is_http_url(&self.endpoint) {
            errors.push(ValidationError {
                field: "billing.endpoint".into(),
                message: format!("must be an http(s) URL: {}", self.endpoint),
            });
        }
        if self.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "billing.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use sharesync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .storage_account_url("https://myaccount.file.core.windows.net")
///     .storage_share_name("reports")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- storage ---

    pub fn storage_account_url(mut self, url: impl Into<String>) -> Self {
        self.config.storage.account_url = url.into();
        self
    }

    pub fn storage_share_name(mut self, share: impl Into<String>) -> Self {
        self.config.storage.share_name = share.into();
        self
    }

    pub fn storage_account_key(mut self, key: impl Into<String>) -> Self {
        self.config.storage.account_key = Some(key.into());
        self
    }

    pub fn storage_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.storage.access_token = Some(token.into());
        self
    }

    pub fn storage_max_retries(mut self, n: u32) -> Self {
        self.config.storage.max_retries = n;
        self
    }

    // --- billing ---

    pub fn billing_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.billing.endpoint = endpoint.into();
        self
    }

    pub fn billing_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.billing.access_token = Some(token.into());
        self
    }

    pub fn billing_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.billing.timeout_secs = seconds;
        self
    }

    pub fn billing_max_retries(mut self, n: u32) -> Self {
        self.config.billing.max_retries = n;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // -- Defaults --

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.storage.account_url.is_empty());
        assert!(cfg.storage.account_key.is_none());
        assert_eq!(cfg.storage.api_version, "2023-11-03");
        assert_eq!(cfg.storage.max_retries, 0);
        assert_eq!(cfg.billing.endpoint, "https://management.azure.com");
        assert_eq!(cfg.billing.api_version, "2019-10-01-preview");
        assert_eq!(cfg.billing.timeout_secs, 60);
        assert_eq!(cfg.billing.max_retries, 5);
        assert_eq!(cfg.billing.retry_delay_secs, 10);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_only_lacks_storage_target() {
        let fields: Vec<String> = Config::default()
            .validate()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["storage.account_url", "storage.share_name"]);
    }

    #[test]
    fn billing_retry_policy_matches_defaults() {
        let policy = Config::default().billing.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(0), Duration::from_secs(10));
    }

    // -- Loading --

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
storage:
  account_url: https://acct.file.core.windows.net
  share_name: reports
  account_key: c2VjcmV0
  max_retries: 2
billing:
  timeout_secs: 30
logging:
  level: debug
"#;
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(yaml.as_bytes()).unwrap();
        tmp.flush().unwrap();

        let cfg = Config::load(tmp.path()).expect("load config");
        assert_eq!(cfg.storage.account_url, "https://acct.file.core.windows.net");
        assert_eq!(cfg.storage.share_name, "reports");
        assert_eq!(cfg.storage.account_key.as_deref(), Some("c2VjcmV0"));
        assert_eq!(cfg.storage.max_retries, 2);
        assert_eq!(cfg.storage.api_version, "2023-11-03");
        assert_eq!(cfg.billing.timeout_secs, 30);
        assert_eq!(cfg.billing.max_retries, 5);
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn load_returns_error_on_invalid_yaml() {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        tmp.write_all(b"not: [valid: yaml: {{{").unwrap();
        tmp.flush().unwrap();

        assert!(Config::load(tmp.path()).is_err());
    }

    // -- Environment --

    #[test]
    fn env_bare_account_name_builds_endpoint() {
        let mut cfg = Config::default();
        cfg.apply_env_from(env(&[
            (ENV_STORAGE_ACCOUNT, "acct"),
            (ENV_FILESHARE_NAME, "reports"),
        ]))
        .unwrap();
        assert_eq!(cfg.storage.account_url, "https://acct.file.core.windows.net");
        assert_eq!(cfg.storage.share_name, "reports");
        assert!(cfg.storage.validate().is_empty());
    }

    #[test]
    fn env_account_url_is_used_verbatim() {
        let mut cfg = Config::default();
        cfg.apply_env_from(env(&[(ENV_STORAGE_ACCOUNT, "http://127.0.0.1:10000/acct")]))
            .unwrap();
        assert_eq!(cfg.storage.account_url, "http://127.0.0.1:10000/acct");
    }

    #[test]
    fn env_connection_string_sets_endpoint_and_key() {
        let mut cfg = Config::default();
        cfg.apply_env_from(env(&[(
            ENV_STORAGE_ACCOUNT,
            "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=a2V5PT0=;EndpointSuffix=core.chinacloudapi.cn",
        )]))
        .unwrap();
        assert_eq!(
            cfg.storage.account_url,
            "https://acct.file.core.chinacloudapi.cn"
        );
        assert_eq!(cfg.storage.account_key.as_deref(), Some("a2V5PT0="));
    }

    #[test]
    fn env_tokens_and_key_override_file_values() {
        let mut cfg = ConfigBuilder::new().storage_account_key("old").build();
        cfg.apply_env_from(env(&[
            (ENV_STORAGE_ACCOUNT_KEY, "new"),
            (ENV_STORAGE_TOKEN, "storage-token"),
            (ENV_MANAGEMENT_TOKEN, "mgmt-token"),
        ]))
        .unwrap();
        assert_eq!(cfg.storage.account_key.as_deref(), Some("new"));
        assert_eq!(cfg.storage.access_token.as_deref(), Some("storage-token"));
        assert_eq!(cfg.billing.access_token.as_deref(), Some("mgmt-token"));
    }

    #[test]
    fn env_empty_values_are_ignored() {
        let mut cfg = ConfigBuilder::new().storage_share_name("kept").build();
        cfg.apply_env_from(env(&[(ENV_FILESHARE_NAME, "  ")])).unwrap();
        assert_eq!(cfg.storage.share_name, "kept");
    }

    #[test]
    fn connection_string_without_account_fails() {
        let mut storage = StorageConfig::default();
        assert!(storage.apply_connection_string("AccountKey=abc").is_err());
        assert!(storage.apply_connection_string("garbage").is_err());
    }

    #[test]
    fn connection_string_file_endpoint_wins() {
        let mut storage = StorageConfig::default();
        storage
            .apply_connection_string("AccountName=acct;FileEndpoint=http://localhost:10004/acct/")
            .unwrap();
        assert_eq!(storage.account_url, "http://localhost:10004/acct");
    }

    // -- Validation --

    #[test]
    fn validate_catches_invalid_log_level() {
        let cfg = ConfigBuilder::new().logging_level("verbose").build();
        assert!(cfg.validate().iter().any(|e| e.field == "logging.level"));
    }

    #[test]
    fn validate_catches_non_http_account_url() {
        let cfg = ConfigBuilder::new()
            .storage_account_url("acct.file.core.windows.net")
            .storage_share_name("s")
            .build();
        let errors = cfg.storage.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "storage.account_url");
    }

    #[test]
    fn validate_catches_zero_billing_timeout() {
        let cfg = ConfigBuilder::new().billing_timeout_secs(0).build();
        assert!(cfg
            .billing
            .validate()
            .iter()
            .any(|e| e.field == "billing.timeout_secs"));
    }

    #[test]
    fn builder_build_validated_succeeds_for_valid_config() {
        let result = ConfigBuilder::new()
            .storage_account_url("https://acct.file.core.windows.net")
            .storage_share_name("reports")
            .build_validated();
        assert!(result.is_ok());
    }

    #[test]
    fn builder_build_validated_fails_for_invalid_config() {
        let result = ConfigBuilder::new().logging_level("nope").build_validated();
        assert!(result.is_err());
    }

    #[test]
    fn default_path_ends_with_config_yaml() {
        let path = Config::default_path();
        assert!(path.ends_with("sharesync/config.yaml"));
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "storage.share_name".into(),
            message: "must not be empty".into(),
        };
        assert_eq!(err.to_string(), "storage.share_name: must not be empty");
    }
}
