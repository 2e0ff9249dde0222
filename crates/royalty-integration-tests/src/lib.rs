//! Integration test crate for the royalty ledger.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end ledger flows across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p royalty-integration-tests
//! ```
