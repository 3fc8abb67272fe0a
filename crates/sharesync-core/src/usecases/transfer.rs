//! File transfer use case
//!
//! Orchestrates single-file uploads and downloads between the local
//! filesystem and the share:
//!
//! - **Upload** ensures the destination directories, checks the local
//!   source, then creates the destination with fail-if-exists semantics. An
//!   occupied destination is never overwritten; the bytes go to an alternate
//!   name from [`CollisionNamer`] instead.
//! - **Download** allocates a local path that does not clobber an existing
//!   file, then streams the remote content into it. A partially written file
//!   is removed when the transfer fails.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::domain::{
    CollisionNamer, DomainError, LocalPathGuard, RemoteError, SharePath, TransferError,
    TransferOutcome,
};
use crate::ports::IShareStore;
use crate::retry::RetryPolicy;
use crate::usecases::directories::DirectoryManager;

/// Alternate names tried before an upload gives up
const MAX_RENAME_ATTEMPTS: u32 = 8;

/// Upload/download service bound to one share
///
/// Construct once per share and pass by reference (or `Arc`) to callers.
pub struct FileTransferService {
    store: Arc<dyn IShareStore>,
    directories: DirectoryManager,
    local: LocalPathGuard,
    retry: RetryPolicy,
}

impl FileTransferService {
    /// Creates a service whose remote calls are not retried
    pub fn new(store: Arc<dyn IShareStore>) -> Self {
        Self::with_retry(store, RetryPolicy::none())
    }

    /// Creates a service retrying transient remote failures per `retry`
    pub fn with_retry(store: Arc<dyn IShareStore>, retry: RetryPolicy) -> Self {
        Self {
            directories: DirectoryManager::with_retry(store.clone(), retry),
            store,
            local: LocalPathGuard::new(),
            retry,
        }
    }

    /// Creates `folder_path` and all of its ancestors on the share
    ///
    /// # Returns
    /// The ensured path in directory form, e.g. `./reports/2024/q1/`
    pub async fn create_subdir(&self, folder_path: &str) -> Result<SharePath, TransferError> {
        let path = SharePath::normalize(folder_path)?;
        self.directories.ensure_path(&path).await
    }

    /// Uploads `local_source_file` to `cloud_dest_file`
    ///
    /// # Returns
    /// [`TransferOutcome::Uploaded`] with `cloud_dest_file` when the
    /// destination was free, or [`TransferOutcome::Renamed`] with the
    /// alternate path that now holds the bytes.
    ///
    /// # Errors
    /// - [`TransferError::LocalFileNotFound`] if the source does not exist
    ///   (only directory creation has touched the share at that point)
    /// - [`TransferError::Remote`] for any store failure besides a collision
    /// - [`TransferError::CollisionUnresolved`] if every alternate is taken
    pub async fn upload_file(
        &self,
        cloud_dest_file: &str,
        local_source_file: impl AsRef<Path>,
    ) -> Result<TransferOutcome, TransferError> {
        let destination = SharePath::normalize(cloud_dest_file)?;
        let (parent, name) = destination.split();
        if name.is_none() {
            return Err(DomainError::InvalidPath(format!(
                "upload destination has no file name: {cloud_dest_file}"
            ))
            .into());
        }

        self.directories.ensure_path(&parent).await?;

        let source = self.local.allocate(local_source_file.as_ref(), false).await?;
        let data = tokio::fs::read(&source)
            .await
            .map_err(|e| TransferError::local_io(&source, e))?;

        debug!(
            source = %source.display(),
            destination = %destination,
            bytes = data.len(),
            "Uploading file"
        );

        match self.create_and_write(&destination, &data).await {
            Ok(()) => {
                info!(destination = %destination, bytes = data.len(), "Upload completed");
                return Ok(TransferOutcome::Uploaded {
                    path: cloud_dest_file.to_string(),
                });
            }
            Err(err) if err.is_already_exists() => {
                warn!(destination = %destination, "{err}");
            }
            Err(err) => return Err(Self::upload_failed(&destination, err)),
        }

        for _ in 0..MAX_RENAME_ATTEMPTS {
            let alternate = CollisionNamer::generate(cloud_dest_file);
            let alternate_path = SharePath::normalize(&alternate)?;

            match self.create_and_write(&alternate_path, &data).await {
                Ok(()) => {
                    info!(
                        requested = %destination,
                        destination = %alternate_path,
                        bytes = data.len(),
                        "Upload completed under alternate name"
                    );
                    return Ok(TransferOutcome::Renamed {
                        requested: cloud_dest_file.to_string(),
                        path: alternate,
                    });
                }
                Err(err) if err.is_already_exists() => {
                    warn!(destination = %alternate_path, "{err}");
                }
                Err(err) => return Err(Self::upload_failed(&alternate_path, err)),
            }
        }

        error!(destination = %destination, "No free alternate name for upload");
        Err(TransferError::CollisionUnresolved {
            path: cloud_dest_file.to_string(),
            attempts: MAX_RENAME_ATTEMPTS,
        })
    }

    /// Downloads `cloud_source_file` to `local_dest_file`
    ///
    /// If `local_dest_file` already exists, a numbered sibling is used
    /// instead, so earlier downloads are never overwritten.
    ///
    /// # Returns
    /// The local path actually written
    pub async fn download_file(
        &self,
        cloud_source_file: &str,
        local_dest_file: impl AsRef<Path>,
    ) -> Result<PathBuf, TransferError> {
        let source = SharePath::normalize(cloud_source_file)?;
        let destination = self.local.allocate(local_dest_file.as_ref(), true).await?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TransferError::local_io(parent, e))?;
        }

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
            .await
            .map_err(|e| TransferError::local_io(&destination, e))?;

        match self.stream_into(&source, file, &destination).await {
            Ok(bytes) => {
                info!(
                    source = %source,
                    destination = %destination.display(),
                    bytes,
                    "Download completed"
                );
                Ok(destination)
            }
            Err(err) => {
                error!(source = %source, error = %err, "Download failed");
                if let Err(cleanup) = tokio::fs::remove_file(&destination).await {
                    warn!(
                        path = %destination.display(),
                        error = %cleanup,
                        "Failed to remove partial download"
                    );
                }
                Err(err)
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Conflict-checked create followed by the content write
    ///
    /// A file this call created is deleted again when its write fails, so a
    /// failed upload does not leave a zero-filled entry at `path`.
    async fn create_and_write(&self, path: &SharePath, data: &[u8]) -> Result<(), RemoteError> {
        let interrupted = AtomicBool::new(false);
        let created = self
            .retry
            .run(
                "create_file",
                || self.store.create_file(path, data.len() as u64),
                |err: &RemoteError| {
                    let transient = err.is_transient();
                    if transient {
                        interrupted.store(true, Ordering::Relaxed);
                    }
                    transient
                },
            )
            .await;

        match created {
            Ok(()) => {}
            Err(err) if err.is_already_exists() && interrupted.load(Ordering::Relaxed) => {
                // The earlier attempt may have created it; never overwrite either way
                warn!(
                    path = %path,
                    "File appeared after an interrupted create, treating it as occupied"
                );
                return Err(err);
            }
            Err(err) => return Err(err),
        }

        let written = self
            .retry
            .run(
                "write_file",
                || self.store.write_file(path, data),
                RemoteError::is_transient,
            )
            .await;

        if let Err(err) = written {
            self.discard(path).await;
            return Err(err);
        }
        Ok(())
    }

    /// Best-effort removal of a file this service created
    async fn discard(&self, path: &SharePath) {
        let deleted = self
            .retry
            .run(
                "delete_file",
                || self.store.delete_file(path),
                RemoteError::is_transient,
            )
            .await;

        match deleted {
            Ok(()) => debug!(path = %path, "Removed incomplete upload"),
            Err(err) => warn!(
                path = %path,
                error = %err,
                "Failed to remove incomplete upload"
            ),
        }
    }

    async fn stream_into(
        &self,
        source: &SharePath,
        mut file: tokio::fs::File,
        destination: &Path,
    ) -> Result<u64, TransferError> {
        let mut stream = self
            .retry
            .run(
                "download_file",
                || self.store.download_file(source),
                RemoteError::is_transient,
            )
            .await
            .map_err(|e| TransferError::remote("download_file", source.as_str(), e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| TransferError::remote("download_file", source.as_str(), e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| TransferError::local_io(destination, e))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| TransferError::local_io(destination, e))?;
        Ok(written)
    }

    fn upload_failed(path: &SharePath, err: RemoteError) -> TransferError {
        error!(destination = %path, error = %err, "Upload failed");
        TransferError::remote("upload_file", path.as_str(), err)
    }
}
