//! Share store port (driven/secondary port)
//!
//! This module defines the interface the transfer use cases need from a
//! remote hierarchical file store. The primary implementation targets Azure
//! Files over its REST API.
//!
//! ## Design Notes
//!
//! - Errors are typed ([`RemoteError`]) rather than `anyhow`, because the
//!   core must recognise the "already exists" signal.
//! - `create_file` must fail with [`RemoteError::AlreadyExists`] when the
//!   destination is occupied. A blind create that silently replaces the
//!   existing file breaks collision resolution.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{RemoteError, SharePath};

/// Stream of downloaded content chunks
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, RemoteError>>;

/// Remote file share operations
#[async_trait]
pub trait IShareStore: Send + Sync {
    /// Creates a single directory whose parent already exists
    ///
    /// Fails with [`RemoteError::AlreadyExists`] (status 409) when present.
    async fn create_directory(&self, path: &SharePath) -> Result<(), RemoteError>;

    /// Creates an empty file of `size` bytes, failing if the path is taken
    async fn create_file(&self, path: &SharePath, size: u64) -> Result<(), RemoteError>;

    /// Writes `data` into a file previously created with `create_file`
    async fn write_file(&self, path: &SharePath, data: &[u8]) -> Result<(), RemoteError>;

    /// Opens the content of a file as a stream of chunks
    async fn download_file(&self, path: &SharePath) -> Result<ByteStream, RemoteError>;

    /// Removes a file
    ///
    /// Used to discard an entry whose content write failed.
    async fn delete_file(&self, path: &SharePath) -> Result<(), RemoteError>;
}
