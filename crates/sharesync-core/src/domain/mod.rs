//! Domain types and business rules
//!
//! This module contains the core domain types for sharesync:
//! - Share path normalization and directory-chain expansion
//! - Collision naming for occupied upload destinations
//! - Local path resolution and deduplication
//! - Upload outcomes
//! - Domain-specific error types

pub mod errors;
pub mod local_path;
pub mod namer;
pub mod outcome;
pub mod paths;

// Re-export commonly used types
pub use errors::{DomainError, RemoteError, TransferError};
pub use local_path::LocalPathGuard;
pub use namer::CollisionNamer;
pub use outcome::TransferOutcome;
pub use paths::SharePath;
