//! Azure Files share client
//!
//! Owns the HTTP client, the share endpoint and the credential. Path-scoped
//! operations live on [`DirectoryClient`] and [`FileClient`], obtained from
//! the factory methods here.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sharesync_azure::auth::StorageCredential;
//! use sharesync_azure::client::ShareClient;
//! use sharesync_core::domain::SharePath;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ShareClient::new(
//!     "https://myaccount.file.core.windows.net",
//!     "reports",
//!     StorageCredential::BearerToken("token".into()),
//! )?;
//! client
//!     .directory_client(&SharePath::normalize("2024")?)
//!     .create()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use chrono::Utc;
use reqwest::header::{HeaderValue, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use sharesync_core::config::StorageConfig;
use sharesync_core::domain::{RemoteError, SharePath};
use tracing::debug;
use url::Url;

use crate::auth::StorageCredential;
use crate::directory::DirectoryClient;
use crate::file::FileClient;

/// REST API version sent as `x-ms-version`
pub const DEFAULT_API_VERSION: &str = "2023-11-03";

/// Longest error body excerpt carried into error messages
const MAX_ERROR_BODY: usize = 512;

/// HTTP client bound to one file share
#[derive(Debug, Clone)]
pub struct ShareClient {
    /// The underlying HTTP client
    http: Client,
    /// `{account_url}/{share}`
    share_url: Url,
    share_name: String,
    credential: StorageCredential,
    api_version: String,
}

impl ShareClient {
    /// Creates a client for `share_name` under `account_url`
    ///
    /// # Errors
    /// Fails if `account_url` is not an absolute http(s) URL
    pub fn new(
        account_url: &str,
        share_name: &str,
        credential: StorageCredential,
    ) -> anyhow::Result<Self> {
        let mut share_url = Url::parse(account_url)
            .with_context(|| format!("Invalid storage account URL: {account_url}"))?;
        share_url
            .path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Storage account URL cannot be a base: {account_url}"))?
            .pop_if_empty()
            .push(share_name);

        Ok(Self {
            http: Client::new(),
            share_url,
            share_name: share_name.to_string(),
            credential,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Creates a client from the `storage` configuration section
    pub fn from_config(storage: &StorageConfig) -> anyhow::Result<Self> {
        let credential = StorageCredential::from_config(storage)?;
        Ok(Self::new(&storage.account_url, &storage.share_name, credential)?
            .with_api_version(storage.api_version.clone()))
    }

    /// Overrides the `x-ms-version` header value
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Name of the share this client addresses
    pub fn share_name(&self) -> &str {
        &self.share_name
    }

    /// Client for the directory at `path`
    pub fn directory_client(&self, path: &SharePath) -> DirectoryClient<'_> {
        DirectoryClient::new(self, path.clone())
    }

    /// Client for the file at `path`
    pub fn file_client(&self, path: &SharePath) -> FileClient<'_> {
        FileClient::new(self, path.clone())
    }

    /// Resource URL for `path`, one percent-encoded segment per component
    pub fn url_for(&self, path: &SharePath) -> Url {
        let mut url = self.share_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path.segments());
        }
        url
    }

    /// Request builder with the version and date headers every call carries
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        self.http
            .request(method, url)
            .header("x-ms-version", &self.api_version)
            .header("x-ms-date", date)
    }

    /// Authorizes and sends `builder`, mapping failures onto [`RemoteError`]
    ///
    /// `path` names the resource in error messages.
    pub(crate) async fn send(
        &self,
        builder: RequestBuilder,
        path: &SharePath,
    ) -> Result<Response, RemoteError> {
        let mut request = builder
            .build()
            .map_err(|e| RemoteError::Connection(format!("invalid request: {e}")))?;

        // Azure rejects body-less PUTs without an explicit length
        if request.body().is_none() && *request.method() == Method::PUT {
            request
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        }

        self.credential
            .authorize(&mut request)
            .map_err(|e| RemoteError::Unauthorized(e.to_string()))?;

        debug!(method = %request.method(), url = %request.url(), "Sending share request");

        let response = self.http.execute(request).await.map_err(transport_error)?;
        check_status(response, path).await
    }
}

/// Maps a transport-level failure onto [`RemoteError`]
pub(crate) fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout(err.to_string())
    } else {
        RemoteError::Connection(err.to_string())
    }
}

/// Passes successful responses through; converts the rest into errors
async fn check_status(response: Response, path: &SharePath) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = response
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();

    Err(classify(status, code.as_deref(), path.as_str(), &body))
}

/// Error for a non-success status, keyed on status and `x-ms-error-code`
pub(crate) fn classify(
    status: StatusCode,
    code: Option<&str>,
    path: &str,
    body: &str,
) -> RemoteError {
    let message = error_message(status, code, body);
    match status {
        StatusCode::CONFLICT
            if matches!(code, None | Some("ResourceAlreadyExists")) =>
        {
            RemoteError::AlreadyExists {
                path: path.to_string(),
                status: status.as_u16(),
            }
        }
        StatusCode::PRECONDITION_FAILED => RemoteError::AlreadyExists {
            path: path.to_string(),
            status: status.as_u16(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized(message),
        StatusCode::NOT_FOUND => RemoteError::NotFound(path.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => RemoteError::Timeout(message),
        StatusCode::SERVICE_UNAVAILABLE => RemoteError::Connection(message),
        _ => RemoteError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// `"<code>: <Message>"` from the XML error body, or the raw body
fn error_message(status: StatusCode, code: Option<&str>, body: &str) -> String {
    let detail = xml_element(body, "Message").unwrap_or(body).trim();
    let detail: String = detail.chars().take(MAX_ERROR_BODY).collect();

    match (code, detail.is_empty()) {
        (Some(code), false) => format!("{code}: {detail}"),
        (Some(code), true) => code.to_string(),
        (None, false) => detail,
        (None, true) => status.to_string(),
    }
}

fn xml_element<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}
