//! Local path resolution and deduplication
//!
//! Downloads never overwrite an existing local file: when the requested
//! destination is taken, the guard allocates `stem (N).ext` for the first
//! free `N`. Uploads use the same guard only to check the source exists.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use super::errors::TransferError;

/// Upper bound on numbered candidates before giving up
const MAX_DUPLICATE_INDEX: u32 = 10_000;

/// Resolves and allocates local filesystem paths
#[derive(Debug, Clone, Default)]
pub struct LocalPathGuard;

impl LocalPathGuard {
    /// Create a new `LocalPathGuard`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Makes `path` absolute against the current working directory
    ///
    /// # Errors
    /// Returns an error if the current directory cannot be determined
    pub fn absolute(&self, path: &Path) -> Result<PathBuf, TransferError> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        let cwd = std::env::current_dir().map_err(|e| TransferError::local_io(path, e))?;
        Ok(cwd.join(path))
    }

    /// Resolves `path` and applies the existence policy
    ///
    /// - `avoid_duplicate = true`: returns `path` if free, otherwise the first
    ///   free `stem (N).ext` next to it.
    /// - `avoid_duplicate = false`: returns `path` if it exists, otherwise
    ///   fails with [`TransferError::LocalFileNotFound`].
    pub async fn allocate(
        &self,
        path: &Path,
        avoid_duplicate: bool,
    ) -> Result<PathBuf, TransferError> {
        let path = self.absolute(path)?;
        let exists = Self::exists(&path).await?;

        if !avoid_duplicate {
            if exists {
                return Ok(path);
            }
            error!(path = %path.display(), "local source file not exist");
            return Err(TransferError::LocalFileNotFound(path));
        }

        if !exists {
            return Ok(path);
        }

        for index in 1..=MAX_DUPLICATE_INDEX {
            let candidate = Self::numbered(&path, index);
            if !Self::exists(&candidate).await? {
                debug!(
                    requested = %path.display(),
                    allocated = %candidate.display(),
                    "Local destination taken, using numbered name"
                );
                return Ok(candidate);
            }
        }

        Err(TransferError::local_io(
            &path,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free local file name available",
            ),
        ))
    }

    async fn exists(path: &Path) -> Result<bool, TransferError> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| TransferError::local_io(path, e))
    }

    /// `dir/report.csv` -> `dir/report (N).csv`
    fn numbered(path: &Path, index: u32) -> PathBuf {
        let mut name: OsString = path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        name.push(format!(" ({index})"));
        if let Some(ext) = path.extension() {
            name.push(".");
            name.push(ext);
        }

        path.with_file_name(name)
    }
}
