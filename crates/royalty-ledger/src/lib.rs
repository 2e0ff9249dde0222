//! # royalty-ledger
//!
//! Single-ledger royalty distribution.
//!
//! Members own whole-number percentage shares of every payment the ledger
//! receives. Payments accumulate into a monotonic distribution total, and
//! members pull their proportional share of the growth since their last
//! claim. The admin registers fixed costs that are reimbursed from the same
//! pool of funds.
//!
//! The ledger has two phases. While locked, the admin edits membership and
//! costs and nobody can claim royalties. Unlocking is one-way: afterwards
//! administrative edits are rejected and members may claim.
//!
//! ## Modules
//!
//! - [`gate`] — Admin identity and lock phase
//! - [`membership`] — Member percentages and their running total
//! - [`costs`] — Named cost entries and the finalization latch
//! - [`distribution`] — Distribution accumulator and available balance
//! - [`transfer`] — Outbound funds transfer collaborator
//! - [`ledger`] — The [`RoyaltyLedger`] tying the sub-ledgers together

pub mod costs;
pub mod distribution;
pub mod gate;
pub mod ledger;
pub mod membership;
pub mod transfer;

pub use ledger::RoyaltyLedger;
pub use transfer::{FundsTransfer, InMemoryTransfer, TransferError};

use royalty_types::{Address, Amount};

/// Error types for ledger operations.
///
/// Every variant is produced before any state is written, except
/// [`LedgerError::TransferFailed`], which is produced after the staged
/// payout has been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Caller lacks the required identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Operation is not allowed in the current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Argument is out of bounds.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Referenced entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Member is already registered.
    #[error("member already exists: {0}")]
    AlreadyExists(Address),

    /// Nothing new to pay out.
    #[error("already taken")]
    AlreadyClaimed,

    /// Available balance cannot cover the payout.
    #[error("not enough balance: have {available}, need {required}")]
    InsufficientFunds {
        /// Funds currently held.
        available: Amount,
        /// Amount the payout needs.
        required: Amount,
    },

    /// The recipient side of a payout failed.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    /// Arithmetic overflow.
    #[error("arithmetic overflow in ledger calculation")]
    Overflow,
}

/// Convenience result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
