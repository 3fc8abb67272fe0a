//! Port definitions (hexagonal architecture interfaces)
//!
//! - [`IShareStore`] - Remote hierarchical file share (Azure Files)

pub mod share_store;

pub use share_store::{ByteStream, IShareStore};
