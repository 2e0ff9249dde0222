//! Ledger records and read-only snapshots.

use serde::{Deserialize, Serialize};

use crate::{Address, Amount, Percentage, MAX_PERCENTAGE};

/// A beneficiary entitled to a share of all funds received after joining.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The member's identity.
    pub address: Address,
    /// Share of incoming funds, `0..=100`.
    pub percentage: Percentage,
    /// Distribution accumulator value when the member was added.
    pub joined_at: Amount,
    /// Distribution accumulator value this member has been paid up to.
    pub claimed_through: Amount,
    /// Cumulative amount paid to this member.
    pub paid: Amount,
}

impl Member {
    /// Create a member whose entitlement starts at `joined_at`.
    pub fn new(address: Address, percentage: Percentage, joined_at: Amount) -> Self {
        Self {
            address,
            percentage,
            joined_at,
            claimed_through: joined_at,
            paid: 0,
        }
    }

    /// Cumulative entitlement once the accumulator reaches `total_distributions`.
    ///
    /// ```text
    /// entitled = floor((total_distributions - joined_at) * percentage / 100)
    /// ```
    ///
    /// Returns `None` on overflow.
    pub fn entitled(&self, total_distributions: Amount) -> Option<Amount> {
        total_distributions
            .saturating_sub(self.joined_at)
            .checked_mul(Amount::from(self.percentage))
            .map(|scaled| scaled / Amount::from(MAX_PERCENTAGE))
    }
}

/// A named fixed cost reimbursed to the admin from the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEntry {
    /// Unique cost name.
    pub name: String,
    /// Amount reimbursed for this cost.
    pub amount: Amount,
}

/// Point-in-time view of the full ledger state.
///
/// Members and costs are listed in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// The ledger's fixed admin.
    pub admin: Address,
    /// Whether the administrative phase is still open.
    pub locked: bool,
    /// Sum of all member percentages.
    pub total_percentage: u16,
    /// Every unit ever received.
    pub total_distributions: Amount,
    /// Funds currently held and not yet paid out.
    pub balance: Amount,
    /// Whether the cost entries were latched as final.
    pub final_costs_submitted: bool,
    /// Whether the cost sum was paid to the admin.
    pub costs_claimed: bool,
    /// Registered members.
    pub members: Vec<Member>,
    /// Registered costs.
    pub costs: Vec<CostEntry>,
}

impl LedgerSnapshot {
    /// Look up a member by address.
    pub fn member(&self, address: &Address) -> Option<&Member> {
        self.members.iter().find(|m| &m.address == address)
    }
}
