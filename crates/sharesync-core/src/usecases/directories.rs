//! Remote directory creation use case
//!
//! Materializes every ancestor of a share path, outermost first. A directory
//! that already exists (for example created by a concurrent or earlier run)
//! is logged and skipped, so repeated calls are safe.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::{RemoteError, SharePath, TransferError};
use crate::ports::IShareStore;
use crate::retry::RetryPolicy;

/// Ensures nested directory paths exist on the share
pub struct DirectoryManager {
    store: Arc<dyn IShareStore>,
    retry: RetryPolicy,
}

impl DirectoryManager {
    /// Creates a manager that never retries failed creates
    pub fn new(store: Arc<dyn IShareStore>) -> Self {
        Self::with_retry(store, RetryPolicy::none())
    }

    /// Creates a manager retrying transient failures per `retry`
    pub fn with_retry(store: Arc<dyn IShareStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Creates every directory along `path`
    ///
    /// # Returns
    /// The path in directory form (`./a/b/`), or `./` for the share root
    ///
    /// # Errors
    /// Any store failure other than "already exists"
    pub async fn ensure_path(&self, path: &SharePath) -> Result<SharePath, TransferError> {
        for directory in path.directory_chain() {
            let result = self
                .retry
                .run(
                    "create_directory",
                    || self.store.create_directory(&directory),
                    RemoteError::is_transient,
                )
                .await;

            match result {
                Ok(()) => debug!(path = %directory, "Created directory"),
                Err(err @ RemoteError::AlreadyExists { .. }) => {
                    warn!(path = %directory, "{err}");
                }
                Err(err) => {
                    error!(path = %directory, error = %err, "Failed to create directory");
                    return Err(TransferError::remote(
                        "create_directory",
                        directory.as_str(),
                        err,
                    ));
                }
            }
        }

        Ok(path.as_directory())
    }
}
