//! Ledger journal events.
//!
//! One event is appended for every committed state transition. Rejected
//! operations and rolled-back payouts leave no event behind.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, Percentage};

/// A committed ledger transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A cost was inserted or overwritten.
    CostAdded { name: String, amount: Amount },
    /// A cost was removed.
    CostDeleted { name: String },
    /// A member was registered.
    MemberAdded {
        member: Address,
        percentage: Percentage,
        /// Accumulator value the member's entitlement starts from.
        claimed_through: Amount,
    },
    /// A member's percentage changed.
    MemberEdited {
        member: Address,
        old_percentage: Percentage,
        new_percentage: Percentage,
    },
    /// The administrative phase ended.
    ContractUnlocked,
    /// A payment was received.
    FundsReceived {
        sender: Address,
        amount: Amount,
        /// Accumulator value after the payment.
        total_distributions: Amount,
    },
    /// The cost entries were latched as final.
    FinalCostsSubmitted,
    /// The cost sum was paid to the admin.
    CostsClaimed { recipient: Address, amount: Amount },
    /// A member was paid its outstanding royalties.
    RoyaltiesClaimed {
        member: Address,
        amount: Amount,
        /// Accumulator value the member is now paid up to.
        claimed_through: Amount,
    },
}

impl LedgerEvent {
    /// Snake-case event name, matching the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CostAdded { .. } => "cost_added",
            Self::CostDeleted { .. } => "cost_deleted",
            Self::MemberAdded { .. } => "member_added",
            Self::MemberEdited { .. } => "member_edited",
            Self::ContractUnlocked => "contract_unlocked",
            Self::FundsReceived { .. } => "funds_received",
            Self::FinalCostsSubmitted => "final_costs_submitted",
            Self::CostsClaimed { .. } => "costs_claimed",
            Self::RoyaltiesClaimed { .. } => "royalties_claimed",
        }
    }
}
