//! Directory operations
//!
//! - [`DirectoryClient::create`] - `PUT ?restype=directory`

use reqwest::Method;
use sharesync_core::domain::{RemoteError, SharePath};
use tracing::debug;

use crate::client::ShareClient;

/// Operations on one directory of a share
#[derive(Debug)]
pub struct DirectoryClient<'a> {
    share: &'a ShareClient,
    path: SharePath,
}

impl<'a> DirectoryClient<'a> {
    pub(crate) fn new(share: &'a ShareClient, path: SharePath) -> Self {
        Self { share, path }
    }

    /// The directory this client addresses
    pub fn path(&self) -> &SharePath {
        &self.path
    }

    /// Creates the directory; its parent must already exist
    ///
    /// # Errors
    /// - [`RemoteError::AlreadyExists`] (409) if the directory is present
    /// - [`RemoteError::NotFound`] if the parent is missing
    pub async fn create(&self) -> Result<(), RemoteError> {
        let mut url = self.share.url_for(&self.path);
        url.query_pairs_mut().append_pair("restype", "directory");

        let request = self.share.request(Method::PUT, url);
        self.share.send(request, &self.path).await?;

        debug!(path = %self.path, share = self.share.share_name(), "Directory created");
        Ok(())
    }
}
