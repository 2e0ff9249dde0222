//! Admin identity and lock phase.
//!
//! The ledger starts locked. While locked the admin may edit membership and
//! costs; once unlocked, edits are rejected and claims are allowed. There is
//! no way back to the locked phase.

use royalty_types::Address;

use crate::{LedgerError, Result};

/// The admin identity and the lock flag shared by every operation.
#[derive(Clone, Debug)]
pub struct LockGate {
    admin: Address,
    locked: bool,
}

impl LockGate {
    /// Create a locked gate owned by `admin`.
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            locked: true,
        }
    }

    /// The fixed admin identity.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Whether the administrative phase is still open.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    pub fn require_admin(&self, caller: &Address) -> Result<()> {
        if caller != &self.admin {
            return Err(LedgerError::Unauthorized("not admin".to_string()));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// - [`LedgerError::InvalidState`] if the gate has been unlocked
    pub fn require_locked(&self) -> Result<()> {
        if !self.locked {
            return Err(LedgerError::InvalidState(
                "contract is not locked".to_string(),
            ));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// - [`LedgerError::InvalidState`] if the gate is still locked
    pub fn require_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(LedgerError::InvalidState("contract is locked".to_string()));
        }
        Ok(())
    }

    /// Admin check followed by lock check, the precondition of every edit.
    pub fn require_admin_locked(&self, caller: &Address) -> Result<()> {
        self.require_admin(caller)?;
        self.require_locked()
    }

    /// End the administrative phase.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if already unlocked
    pub fn unlock(&mut self, caller: &Address) -> Result<()> {
        self.require_admin_locked(caller)?;
        self.locked = false;
        Ok(())
    }
}
