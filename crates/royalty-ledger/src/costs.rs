//! Named cost entries and the finalization latch.
//!
//! Costs are liabilities the admin registered while the ledger was locked.
//! Once submitted as final they can no longer change, and their sum may be
//! claimed by the admin exactly once.

use royalty_types::{Amount, CostEntry};

use crate::{LedgerError, Result};

/// Cost entries in insertion order.
#[derive(Clone, Debug, Default)]
pub struct CostLedger {
    entries: Vec<CostEntry>,
    final_submitted: bool,
    claimed: bool,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_final(&self) -> bool {
        self.final_submitted
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Amount registered under `name`. Absent entries read as zero.
    pub fn amount(&self, name: &str) -> Amount {
        self.entries
            .iter()
            .find(|c| c.name == name)
            .map_or(0, |c| c.amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CostEntry> {
        self.entries.iter()
    }

    /// # Errors
    ///
    /// - [`LedgerError::Overflow`] if the sum does not fit in [`Amount`]
    pub fn total(&self) -> Result<Amount> {
        self.entries.iter().try_fold(0, |acc: Amount, c| {
            acc.checked_add(c.amount).ok_or(LedgerError::Overflow)
        })
    }

    fn require_open(&self) -> Result<()> {
        if self.final_submitted {
            return Err(LedgerError::InvalidState(
                "costs already submitted".to_string(),
            ));
        }
        Ok(())
    }

    /// Insert or overwrite `name`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidState`] if costs were already submitted
    pub fn set(&mut self, name: &str, amount: Amount) -> Result<()> {
        self.require_open()?;
        match self.entries.iter_mut().find(|c| c.name == name) {
            Some(entry) => entry.amount = amount,
            None => self.entries.push(CostEntry {
                name: name.to_string(),
                amount,
            }),
        }
        Ok(())
    }

    /// Remove `name`. Returns whether an entry was present.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidState`] if costs were already submitted
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        self.require_open()?;
        let before = self.entries.len();
        self.entries.retain(|c| c.name != name);
        Ok(self.entries.len() != before)
    }

    /// Latch the entries as final. Returns `false` if already latched.
    pub fn submit_final(&mut self) -> bool {
        let changed = !self.final_submitted;
        self.final_submitted = true;
        changed
    }

    /// The amount a cost claim would pay out now.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidState`] if costs have not been submitted
    /// - [`LedgerError::AlreadyClaimed`] if the costs were already paid out
    pub fn claimable(&self) -> Result<Amount> {
        if !self.final_submitted {
            return Err(LedgerError::InvalidState(
                "costs not submitted".to_string(),
            ));
        }
        if self.claimed {
            return Err(LedgerError::AlreadyClaimed);
        }
        self.total()
    }

    pub(crate) fn set_claimed(&mut self, claimed: bool) {
        self.claimed = claimed;
    }
}
