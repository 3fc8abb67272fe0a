//! Integration tests for sharesync-azure
//!
//! Uses wiremock to simulate the Azure Files REST API and verifies the
//! requests the share client sends, the error mapping, and end-to-end
//! transfers through the core use cases.

mod common;

mod test_directories;
mod test_transfers;
