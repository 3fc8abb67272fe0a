//! sharesync Core - Domain logic for file-share synchronization
//!
//! This crate contains the hexagonal core with:
//! - **Domain types** - `SharePath`, `TransferOutcome`, `CollisionNamer`, `LocalPathGuard`
//! - **Use cases** - `DirectoryManager`, `FileTransferService`
//! - **Port definitions** - `IShareStore`, implemented by the Azure Files adapter
//! - **Retry policy** - bounded retries for transient remote failures
//!
//! # Architecture
//!
//! The domain module is pure logic with no I/O besides local path checks.
//! Ports define the trait the storage adapter crate implements.
//! Use cases orchestrate domain types through the port.

pub mod config;
pub mod domain;
pub mod ports;
pub mod retry;
pub mod usecases;
