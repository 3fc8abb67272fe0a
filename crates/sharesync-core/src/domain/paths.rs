//! Share path normalization
//!
//! A [`SharePath`] addresses a directory or file inside one storage share.
//! Paths are always rendered root-relative with a leading `./`, which is the
//! form directory-chain expansion works on.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Prefix every normalized share path starts with
const ROOT: &str = "./";

/// A root-relative path inside a storage share, e.g. `./reports/2024/q1/`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SharePath(String);

impl SharePath {
    /// Normalize a folder or file path
    ///
    /// Paths already starting with `./` are kept as-is; anything else gets
    /// `./` prepended. No other transformation is performed.
    ///
    /// # Errors
    /// Returns error if the path is empty or only whitespace
    pub fn normalize(path: &str) -> Result<Self, DomainError> {
        if path.trim().is_empty() {
            return Err(DomainError::InvalidPath(
                "share path must not be empty".to_string(),
            ));
        }

        if path.starts_with(ROOT) {
            Ok(Self(path.to_string()))
        } else {
            Ok(Self(format!("{ROOT}{path}")))
        }
    }

    /// The share root, `./`
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT.to_string())
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty path segments, without the leading `.`
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
    }

    /// Returns true if the path names the share root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments().next().is_none()
    }

    /// Every ancestor directory of this path, outermost first, each with a
    /// trailing `/`
    ///
    /// `./a/b/c` yields `./a/`, `./a/b/`, `./a/b/c/`. The root itself is
    /// never part of the chain.
    #[must_use]
    pub fn directory_chain(&self) -> Vec<SharePath> {
        let mut prefix = ROOT.to_string();
        self.segments()
            .map(|segment| {
                prefix.push_str(segment);
                prefix.push('/');
                Self(prefix.clone())
            })
            .collect()
    }

    /// The same location in directory form, terminated by `/`
    #[must_use]
    pub fn as_directory(&self) -> Self {
        self.directory_chain().pop().unwrap_or_else(Self::root)
    }

    /// Segments joined without the `./` prefix or a trailing separator
    ///
    /// This is the form request URLs are built from; the root yields `""`.
    #[must_use]
    pub fn relative(&self) -> String {
        self.segments().collect::<Vec<_>>().join("/")
    }

    /// Last segment, unless the path is in directory form
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.0.ends_with('/') {
            return None;
        }
        self.segments().last()
    }

    /// Splits into the parent directory and the file name
    ///
    /// A path without a parent directory splits into the share root.
    #[must_use]
    pub fn split(&self) -> (SharePath, Option<&str>) {
        let name = self.file_name();
        let mut segments: Vec<&str> = self.segments().collect();
        if name.is_some() {
            segments.pop();
        }

        let parent = if segments.is_empty() {
            Self::root()
        } else {
            Self(format!("{ROOT}{}", segments.join("/")))
        };

        (parent, name)
    }
}

impl Display for SharePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SharePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for SharePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::normalize(&s)
    }
}

impl From<SharePath> for String {
    fn from(path: SharePath) -> Self {
        path.0
    }
}
