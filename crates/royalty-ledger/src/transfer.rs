//! Outbound funds transfer.
//!
//! The ledger does not move value itself. Payouts are handed to a
//! [`FundsTransfer`] collaborator passed into each claim call. A failed
//! transfer aborts the claim and the ledger restores its prior state.

use std::collections::{BTreeMap, BTreeSet};

use royalty_types::{Address, Amount};

/// Error reported by a [`FundsTransfer`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The recipient refused the funds.
    #[error("recipient {0} rejected the transfer")]
    Rejected(Address),

    /// The recipient's balance would overflow.
    #[error("recipient {0} balance overflow")]
    Overflow(Address),
}

/// Moves funds from the ledger to a recipient.
pub trait FundsTransfer {
    /// Deliver `amount` to `to`.
    ///
    /// On error nothing must have been delivered.
    fn transfer(&mut self, to: &Address, amount: Amount) -> Result<(), TransferError>;
}

/// In-memory payment rail that credits recipient wallets.
///
/// Addresses added with [`InMemoryTransfer::reject`] refuse every transfer.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTransfer {
    wallets: BTreeMap<Address, Amount>,
    rejecting: BTreeSet<Address>,
    transfers: usize,
}

impl InMemoryTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future transfer to `address` fail.
    pub fn reject(&mut self, address: Address) {
        self.rejecting.insert(address);
    }

    /// Accept transfers to `address` again.
    pub fn accept(&mut self, address: &Address) {
        self.rejecting.remove(address);
    }

    /// Total credited to `address` so far.
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.wallets.get(address).copied().unwrap_or(0)
    }

    /// Total credited across all recipients.
    pub fn total_paid(&self) -> Amount {
        self.wallets
            .values()
            .fold(0, |acc: Amount, v| acc.saturating_add(*v))
    }

    /// Number of successful transfers.
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }
}

impl FundsTransfer for InMemoryTransfer {
    fn transfer(&mut self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        if self.rejecting.contains(to) {
            return Err(TransferError::Rejected(*to));
        }
        let current = self.balance_of(to);
        let updated = current
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*to))?;
        self.wallets.insert(*to, updated);
        self.transfers += 1;
        tracing::trace!(recipient = %to, amount, "in-memory transfer credited");
        Ok(())
    }
}
