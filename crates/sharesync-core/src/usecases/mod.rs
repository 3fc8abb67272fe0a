//! Use cases (interactors) for sharesync
//!
//! Thin coordinators that apply domain rules and delegate I/O to the
//! [`IShareStore`](crate::ports::IShareStore) port.
//!
//! - [`DirectoryManager`] - Idempotent nested directory creation
//! - [`FileTransferService`] - Collision-safe upload and deduplicating download

pub mod directories;
pub mod transfer;

pub use directories::DirectoryManager;
pub use transfer::FileTransferService;
