//! AzureShareStore - IShareStore implementation for Azure Files
//!
//! Wraps a [`ShareClient`] and delegates each port method to the matching
//! path-scoped client.

use async_trait::async_trait;
use sharesync_core::config::StorageConfig;
use sharesync_core::domain::{RemoteError, SharePath};
use sharesync_core::ports::{ByteStream, IShareStore};

use crate::client::ShareClient;

/// Azure Files adapter for the [`IShareStore`] port
#[derive(Debug, Clone)]
pub struct AzureShareStore {
    client: ShareClient,
}

impl AzureShareStore {
    pub fn new(client: ShareClient) -> Self {
        Self { client }
    }

    /// Builds the store from the `storage` configuration section
    pub fn from_config(storage: &StorageConfig) -> anyhow::Result<Self> {
        Ok(Self::new(ShareClient::from_config(storage)?))
    }

    /// The wrapped share client
    pub fn client(&self) -> &ShareClient {
        &self.client
    }
}

#[async_trait]
impl IShareStore for AzureShareStore {
    async fn create_directory(&self, path: &SharePath) -> Result<(), RemoteError> {
        self.client.directory_client(path).create().await
    }

    async fn create_file(&self, path: &SharePath, size: u64) -> Result<(), RemoteError> {
        self.client.file_client(path).create(size).await
    }

    async fn write_file(&self, path: &SharePath, data: &[u8]) -> Result<(), RemoteError> {
        self.client.file_client(path).write(data).await
    }

    async fn download_file(&self, path: &SharePath) -> Result<ByteStream, RemoteError> {
        self.client.file_client(path).download().await
    }

    async fn delete_file(&self, path: &SharePath) -> Result<(), RemoteError> {
        self.client.file_client(path).delete().await
    }
}
