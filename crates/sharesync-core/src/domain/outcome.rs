//! Upload outcome

use serde::Serialize;

/// Result of an upload: where the bytes actually landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// The requested destination was free and now holds the upload
    Uploaded { path: String },
    /// The requested destination was occupied; the upload went to `path`
    Renamed { requested: String, path: String },
}

impl TransferOutcome {
    /// The remote path holding the uploaded bytes
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Uploaded { path } | Self::Renamed { path, .. } => path,
        }
    }

    /// Returns true if collision resolution picked a different name
    #[must_use]
    pub fn was_renamed(&self) -> bool {
        matches!(self, Self::Renamed { .. })
    }
}

impl From<TransferOutcome> for String {
    fn from(outcome: TransferOutcome) -> Self {
        match outcome {
            TransferOutcome::Uploaded { path } | TransferOutcome::Renamed { path, .. } => path,
        }
    }
}
