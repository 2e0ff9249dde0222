//! # royalty-types
//!
//! Shared domain types for the royalty distribution ledger.
//!
//! ## Modules
//!
//! - [`address`] — 32-byte participant identities
//! - [`records`] — Member and cost records, ledger snapshots
//! - [`events`] — Journal entries emitted on every committed transition

pub mod address;
pub mod events;
pub mod records;

pub use address::Address;
pub use events::LedgerEvent;
pub use records::{CostEntry, LedgerSnapshot, Member};

/// Indivisible units of value received and paid out by the ledger.
pub type Amount = u128;

/// Whole-number share of incoming funds, `0..=MAX_PERCENTAGE`.
pub type Percentage = u8;

/// Upper bound for a single share and for the sum of all shares.
pub const MAX_PERCENTAGE: Percentage = 100;
