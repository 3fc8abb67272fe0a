//! Domain error types
//!
//! Three layers of errors:
//! - [`DomainError`] for validation of paths and names
//! - [`RemoteError`] for failures reported by the remote share store
//! - [`TransferError`] for the outcome of a whole upload/download operation

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Errors reported by the remote share store
///
/// Adapters classify transport and HTTP failures into these variants so the
/// core can tell the tolerated "already exists" signal apart from fatal ones.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The directory or file is already present (HTTP 409, or 412 for a
    /// conditional create)
    #[error("Resource already exists: {path} (status {status})")]
    AlreadyExists { path: String, status: u16 },

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials were rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any other non-success response
    #[error("Remote error (status {status}): {message}")]
    Status { status: u16, message: String },
}

impl RemoteError {
    /// Returns true for the "already exists" signal
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns true for failures worth retrying (timeouts and connection drops)
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

/// Errors returned by the transfer use cases
#[derive(Debug, Error)]
pub enum TransferError {
    /// The local source file of an upload does not exist
    #[error("local source file not exist: {}", .0.display())]
    LocalFileNotFound(PathBuf),

    /// Reading or writing a local file failed
    #[error("local I/O error on {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path argument could not be normalized
    #[error(transparent)]
    InvalidPath(#[from] DomainError),

    /// A remote call failed; `operation` names the step that failed
    #[error("{operation} failed for {path}: {source}")]
    Remote {
        operation: &'static str,
        path: String,
        #[source]
        source: RemoteError,
    },

    /// Every alternate name tried during collision resolution was taken
    #[error("no free destination name for {path} after {attempts} attempts")]
    CollisionUnresolved { path: String, attempts: u32 },
}

impl TransferError {
    /// Wraps a remote failure with the operation context
    pub fn remote(operation: &'static str, path: impl Into<String>, source: RemoteError) -> Self {
        Self::Remote {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Wraps a local I/O failure with the path it happened on
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }
}
