//! sharesync Azure - Azure Files REST client
//!
//! Provides async access to one Azure Files share:
//! - Shared-key (`SharedKeyLite`) and bearer-token authorization
//! - Directory creation
//! - Conflict-checked file creation and ranged uploads
//! - Streamed downloads
//!
//! ## Modules
//!
//! - [`auth`] - Credentials and request signing
//! - [`client`] - Share-bound HTTP client and error mapping
//! - [`directory`] - Directory operations
//! - [`file`] - File operations
//! - [`provider`] - [`IShareStore`](sharesync_core::ports::IShareStore) adapter

pub mod auth;
pub mod client;
pub mod directory;
pub mod file;
pub mod provider;

pub use auth::StorageCredential;
pub use client::ShareClient;
pub use provider::AzureShareStore;
