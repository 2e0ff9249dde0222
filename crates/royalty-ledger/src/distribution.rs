//! Distribution accumulator and available balance.
//!
//! `total_distributions` counts every unit ever received and never
//! decreases. `balance` is what the ledger currently holds; it grows with
//! each payment and shrinks with each payout, and both cost claims and
//! royalty claims draw from it.
//!
//! ## Formula
//!
//! ```text
//! entitled = (total_distributions - joined_at) * percentage / 100
//! owed     = entitled - paid
//! ```
//!
//! Division floors once, on the cumulative entitlement. After total
//! distributions `D` a member that has claimed is paid exactly
//! `floor((D - joined_at) * percentage / 100)`; the sub-unit remainder of
//! one claim counts toward the next.
//!
//! Percentages only change while the ledger is locked and claims only
//! happen once it is unlocked, so `paid` is zero whenever a percentage
//! changes.

use royalty_types::{Amount, Member};

use crate::{LedgerError, Result};

/// Running totals of received and held funds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionPool {
    total_distributions: Amount,
    balance: Amount,
}

impl DistributionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unit ever received.
    pub fn total_distributions(&self) -> Amount {
        self.total_distributions
    }

    /// Funds currently held.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Record an inbound payment. Returns the new accumulator value.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Overflow`] if either total would overflow
    pub fn receive(&mut self, amount: Amount) -> Result<Amount> {
        let total = self
            .total_distributions
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.total_distributions = total;
        self.balance = balance;
        Ok(total)
    }

    /// What `member` is owed: its cumulative entitlement minus what it was
    /// already paid.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Overflow`] on arithmetic overflow
    pub fn owed(&self, member: &Member) -> Result<Amount> {
        let entitled = member
            .entitled(self.total_distributions)
            .ok_or(LedgerError::Overflow)?;
        Ok(entitled.saturating_sub(member.paid))
    }

    /// # Errors
    ///
    /// - [`LedgerError::InsufficientFunds`] if `amount` exceeds the balance
    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                available: self.balance,
                required: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Return a previously debited amount.
    pub(crate) fn credit(&mut self, amount: Amount) {
        self.balance = self.balance.saturating_add(amount);
    }
}
