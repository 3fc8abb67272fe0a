//! Request authorization for the Azure Files REST API
//!
//! Three credential kinds are supported:
//!
//! - [`StorageCredential::SharedKey`] signs each request with the account
//!   key using the `SharedKeyLite` scheme (HMAC-SHA256).
//! - [`StorageCredential::BearerToken`] sends an OAuth token. The file
//!   service additionally requires `x-ms-file-request-intent: backup`.
//! - [`StorageCredential::Anonymous`] sends nothing (SAS URLs, emulators).
//!
//! ## References
//!
//! - [Authorize with Shared Key](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Request;
use sha2::Sha256;
use sharesync_core::config::StorageConfig;
use thiserror::Error;
use url::{Host, Url};

/// Header required alongside OAuth tokens on file operations
pub const REQUEST_INTENT_HEADER: &str = "x-ms-file-request-intent";

/// Errors raised while building or applying a credential
#[derive(Debug, Error)]
pub enum AuthError {
    /// The account key is not valid base64
    #[error("Invalid account key: {0}")]
    InvalidKey(String),

    /// The account name could not be derived from the endpoint URL
    #[error("Cannot determine storage account name from {0}")]
    UnknownAccount(String),

    /// A header value contained characters HTTP does not allow
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// How requests to the file service are authorized
#[derive(Clone)]
pub enum StorageCredential {
    /// Storage account name and decoded account key
    SharedKey { account: String, key: Vec<u8> },
    /// OAuth access token for the storage resource
    BearerToken(String),
    /// No authorization header
    Anonymous,
}

// Keys and tokens stay out of logs
impl fmt::Debug for StorageCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedKey { account, .. } => f
                .debug_struct("SharedKey")
                .field("account", account)
                .finish_non_exhaustive(),
            Self::BearerToken(_) => f.write_str("BearerToken(..)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

impl StorageCredential {
    /// Builds a shared-key credential from the base64 key shown in the portal
    pub fn shared_key(
        account: impl Into<String>,
        base64_key: &str,
    ) -> Result<Self, AuthError> {
        let key = STANDARD
            .decode(base64_key.trim())
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        Ok(Self::SharedKey {
            account: account.into(),
            key,
        })
    }

    /// Picks the credential configured for `storage`
    ///
    /// Shared key wins over a token; with neither, requests are anonymous.
    pub fn from_config(storage: &StorageConfig) -> Result<Self, AuthError> {
        if let Some(key) = &storage.account_key {
            let url = Url::parse(&storage.account_url)
                .map_err(|_| AuthError::UnknownAccount(storage.account_url.clone()))?;
            let account = account_name(&url)
                .ok_or_else(|| AuthError::UnknownAccount(storage.account_url.clone()))?;
            return Self::shared_key(account, key);
        }
        if let Some(token) = &storage.access_token {
            return Ok(Self::BearerToken(token.clone()));
        }
        Ok(Self::Anonymous)
    }

    /// Adds the authorization headers to a fully built request
    ///
    /// Must run after every `x-ms-*` header is set, since shared-key
    /// signatures cover them.
    pub fn authorize(&self, request: &mut Request) -> Result<(), AuthError> {
        match self {
            Self::SharedKey { account, key } => {
                let signature = sign(key, &string_to_sign(request, account))?;
                let value = header_value(&format!("SharedKeyLite {account}:{signature}"))?;
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Self::BearerToken(token) => {
                let value = header_value(&format!("Bearer {token}"))?;
                request.headers_mut().insert(AUTHORIZATION, value);
                request.headers_mut().insert(
                    HeaderName::from_static(REQUEST_INTENT_HEADER),
                    HeaderValue::from_static("backup"),
                );
            }
            Self::Anonymous => {}
        }
        Ok(())
    }
}

/// Storage account name for an endpoint URL
///
/// `https://acct.file.core.windows.net` yields `acct`. IP and `localhost`
/// endpoints use path-style addressing, so the first path segment is the
/// account (`http://127.0.0.1:10000/acct`).
pub fn account_name(url: &Url) -> Option<String> {
    let path_style = match url.host()? {
        Host::Domain(domain) => domain == "localhost",
        Host::Ipv4(_) | Host::Ipv6(_) => true,
    };

    let name = if path_style {
        url.path_segments()?.find(|s| !s.is_empty())?
    } else {
        url.host_str()?.split('.').next()?
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// `SharedKeyLite` string-to-sign for the file service
///
/// ```text
/// VERB\nContent-MD5\nContent-Type\nDate\nCanonicalizedHeaders CanonicalizedResource
/// ```
///
/// `Date` stays empty because every request carries `x-ms-date`.
fn string_to_sign(request: &Request, account: &str) -> String {
    let headers = request.headers();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    };

    let mut canonical_headers: Vec<(String, String)> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().trim().to_string(),
            )
        })
        .collect();
    canonical_headers.sort();

    let mut out = format!(
        "{}\n{}\n{}\n\n",
        request.method().as_str(),
        header("content-md5"),
        headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default(),
    );
    for (name, value) in &canonical_headers {
        out.push_str(name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }

    out.push('/');
    out.push_str(account);
    out.push_str(request.url().path());
    if let Some((_, comp)) = request.url().query_pairs().find(|(k, _)| k == "comp") {
        out.push_str("?comp=");
        out.push_str(&comp);
    }
    out
}

fn sign(key: &[u8], string_to_sign: &str) -> Result<String, AuthError> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn header_value(value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|_| AuthError::InvalidHeader("authorization".into()))
}
