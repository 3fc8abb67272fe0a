//! File operations for Azure Files
//!
//! Uploading is two-phase on this service:
//! - [`FileClient::create`] - allocates an empty file of the final size
//! - [`FileClient::write`] - fills it with `PUT ?comp=range` calls of at
//!   most [`MAX_RANGE_SIZE`] bytes each
//!
//! [`FileClient::download`] streams the content back and
//! [`FileClient::delete`] removes the file.
//!
//! ## References
//!
//! - [Create File](https://learn.microsoft.com/en-us/rest/api/storageservices/create-file)
//! - [Put Range](https://learn.microsoft.com/en-us/rest/api/storageservices/put-range)
//! - [Delete File](https://learn.microsoft.com/en-us/rest/api/storageservices/delete-file2)

use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_TYPE, IF_NONE_MATCH};
use reqwest::Method;
use sharesync_core::domain::{RemoteError, SharePath};
use sharesync_core::ports::ByteStream;
use tracing::debug;

use crate::client::{transport_error, ShareClient};

/// Largest range a single Put Range call accepts: 4 MiB
pub const MAX_RANGE_SIZE: usize = 4 * 1024 * 1024;

/// Operations on one file of a share
#[derive(Debug)]
pub struct FileClient<'a> {
    share: &'a ShareClient,
    path: SharePath,
}

impl<'a> FileClient<'a> {
    pub(crate) fn new(share: &'a ShareClient, path: SharePath) -> Self {
        Self { share, path }
    }

    /// The file this client addresses
    pub fn path(&self) -> &SharePath {
        &self.path
    }

    /// Returns true if the file exists (`HEAD`)
    pub async fn exists(&self) -> Result<bool, RemoteError> {
        let request = self.share.request(Method::HEAD, self.share.url_for(&self.path));
        match self.share.send(request, &self.path).await {
            Ok(_) => Ok(true),
            Err(RemoteError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Creates an empty file of `size` bytes without replacing an existing one
    ///
    /// The service's Create File would silently replace an existing file,
    /// so the path is probed first and the create itself carries
    /// `If-None-Match: *`.
    ///
    /// # Errors
    /// [`RemoteError::AlreadyExists`] if the path is occupied
    pub async fn create(&self, size: u64) -> Result<(), RemoteError> {
        if self.exists().await? {
            return Err(RemoteError::AlreadyExists {
                path: self.path.to_string(),
                status: 409,
            });
        }

        let request = self
            .share
            .request(Method::PUT, self.share.url_for(&self.path))
            .header("x-ms-type", "file")
            .header("x-ms-content-length", size.to_string())
            .header(IF_NONE_MATCH, "*");
        self.share.send(request, &self.path).await?;

        debug!(path = %self.path, size, "File created");
        Ok(())
    }

    /// Writes `data` from offset 0, one Put Range call per chunk
    ///
    /// The file must exist and be at least `data.len()` bytes long.
    pub async fn write(&self, data: &[u8]) -> Result<(), RemoteError> {
        let total = data.len();
        let mut offset = 0usize;

        while offset < total {
            let end = std::cmp::min(offset + MAX_RANGE_SIZE, total);
            let chunk = &data[offset..end];

            let mut url = self.share.url_for(&self.path);
            url.query_pairs_mut().append_pair("comp", "range");

            debug!(
                path = %self.path,
                range_start = offset,
                range_end = end - 1,
                total,
                "Writing range"
            );

            let request = self
                .share
                .request(Method::PUT, url)
                .header("x-ms-write", "update")
                .header("x-ms-range", format!("bytes={}-{}", offset, end - 1))
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(chunk.to_vec());
            self.share.send(request, &self.path).await?;

            offset = end;
        }

        debug!(path = %self.path, bytes = total, "File content written");
        Ok(())
    }

    /// Deletes the file (`DELETE`)
    pub async fn delete(&self) -> Result<(), RemoteError> {
        let request = self.share.request(Method::DELETE, self.share.url_for(&self.path));
        self.share.send(request, &self.path).await?;

        debug!(path = %self.path, "File deleted");
        Ok(())
    }

    /// Opens the file content as a chunk stream (`GET`)
    pub async fn download(&self) -> Result<ByteStream, RemoteError> {
        let request = self.share.request(Method::GET, self.share.url_for(&self.path));
        let response = self.share.send(request, &self.path).await?;

        debug!(
            path = %self.path,
            content_length = response.content_length(),
            "Download started"
        );

        Ok(response
            .bytes_stream()
            .map_ok(|bytes| bytes.to_vec())
            .map_err(transport_error)
            .boxed())
    }
}

