//! Transfer commands - upload, download, and mkdir against the share
//!
//! - `sharesync upload <LOCAL> <REMOTE>` never overwrites: an occupied
//!   destination gets an alternate name, which is reported.
//! - `sharesync download <REMOTE> <LOCAL>` never overwrites a local file.
//! - `sharesync mkdir <FOLDER>` creates a folder and all of its parents.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sharesync_core::domain::TransferOutcome;
use tracing::info;

use super::AppContext;

/// Upload a local file to the share
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Local file to upload
    pub local: PathBuf,
    /// Destination path inside the share (e.g. reports/2024/invoice.csv)
    pub remote: String,
}

impl UploadCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let formatter = ctx.formatter();
        let service = ctx.transfer_service()?;

        info!(local = %self.local.display(), remote = %self.remote, "Uploading");
        let outcome = service.upload_file(&self.remote, &self.local).await?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "local": self.local.display().to_string(),
                "outcome": outcome,
            }));
            return Ok(());
        }

        match &outcome {
            TransferOutcome::Uploaded { path } => {
                formatter.success("Upload complete");
                formatter.field("Remote path", path);
            }
            TransferOutcome::Renamed { requested, path } => {
                formatter.warn(&format!(
                    "{requested} already exists; uploaded under a new name"
                ));
                formatter.success("Upload complete");
                formatter.field("Remote path", path);
            }
        }
        Ok(())
    }
}

/// Download a file from the share
#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Source path inside the share
    pub remote: String,
    /// Local destination; a numbered name is used if it already exists
    pub local: PathBuf,
}

impl DownloadCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let formatter = ctx.formatter();
        let service = ctx.transfer_service()?;

        info!(remote = %self.remote, local = %self.local.display(), "Downloading");
        let written = service.download_file(&self.remote, &self.local).await?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "remote": self.remote,
                "local": written.display().to_string(),
            }));
        } else {
            formatter.success("Download complete");
            formatter.field("Local path", &written.display().to_string());
        }
        Ok(())
    }
}

/// Create a folder (and its parents) on the share
#[derive(Debug, Args)]
pub struct MkdirCommand {
    /// Folder path inside the share (e.g. reports/2024/q1)
    pub folder: String,
}

impl MkdirCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let formatter = ctx.formatter();
        let service = ctx.transfer_service()?;

        let ensured = service.create_subdir(&self.folder).await?;

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "path": ensured,
            }));
        } else {
            formatter.success("Folder ready");
            formatter.field("Remote path", ensured.as_str());
        }
        Ok(())
    }
}
