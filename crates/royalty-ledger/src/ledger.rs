//! The royalty ledger.
//!
//! [`RoyaltyLedger`] owns the lock gate, the membership table, the cost
//! ledger and the distribution pool. Each public operation takes the caller
//! identity explicitly, runs every check before its first write, and appends
//! one [`LedgerEvent`] when it commits.
//!
//! ## Access
//!
//! | Operation | Caller | Phase |
//! |---|---|---|
//! | [`add_cost`](RoyaltyLedger::add_cost), [`delete_cost`](RoyaltyLedger::delete_cost) | admin | locked, costs open |
//! | [`set_admin_percentage`](RoyaltyLedger::set_admin_percentage) | admin | locked |
//! | [`add_member`](RoyaltyLedger::add_member), [`edit_member`](RoyaltyLedger::edit_member) | admin | locked |
//! | [`unlock`](RoyaltyLedger::unlock) | admin | locked |
//! | [`receive_funds`](RoyaltyLedger::receive_funds) | anyone | any |
//! | [`submit_final_costs`](RoyaltyLedger::submit_final_costs) | admin | any |
//! | [`claim_costs`](RoyaltyLedger::claim_costs) | admin | any, costs final |
//! | [`claim_royalties`](RoyaltyLedger::claim_royalties) | member | unlocked |
//!
//! ## Payouts
//!
//! A claim stages its state change (advance `claimed_through` and `paid`,
//! or latch the cost claim, and debit the balance) before calling the
//! [`FundsTransfer`] collaborator. If the transfer fails the staged change
//! is reverted and no event is recorded.

use royalty_types::{Address, Amount, CostEntry, LedgerEvent, LedgerSnapshot, Member, Percentage};

use crate::costs::CostLedger;
use crate::distribution::DistributionPool;
use crate::gate::LockGate;
use crate::membership::{MembershipTable, Upsert};
use crate::transfer::FundsTransfer;
use crate::{LedgerError, Result};

/// Royalty distribution ledger.
#[derive(Clone, Debug)]
pub struct RoyaltyLedger {
    gate: LockGate,
    members: MembershipTable,
    costs: CostLedger,
    pool: DistributionPool,
    events: Vec<LedgerEvent>,
}

impl RoyaltyLedger {
    /// Create a locked ledger administered by `admin`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] if `admin` is the null address
    pub fn new(admin: Address) -> Result<Self> {
        if admin.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "admin cant be zero address".to_string(),
            ));
        }
        tracing::debug!(admin = %admin, "royalty ledger created");
        Ok(Self {
            gate: LockGate::new(admin),
            members: MembershipTable::new(),
            costs: CostLedger::new(),
            pool: DistributionPool::new(),
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Costs
    // ------------------------------------------------------------------

    /// Insert or overwrite the cost `name`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if unlocked or costs were submitted
    pub fn add_cost(&mut self, caller: &Address, name: &str, amount: Amount) -> Result<()> {
        self.gate.require_admin_locked(caller)?;
        self.costs.set(name, amount)?;

        tracing::info!(name, amount, "cost added");
        self.events.push(LedgerEvent::CostAdded {
            name: name.to_string(),
            amount,
        });
        Ok(())
    }

    /// Remove the cost `name`. Removing an absent cost is a no-op.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if unlocked or costs were submitted
    pub fn delete_cost(&mut self, caller: &Address, name: &str) -> Result<()> {
        self.gate.require_admin_locked(caller)?;
        if !self.costs.delete(name)? {
            tracing::debug!(name, "delete of absent cost ignored");
            return Ok(());
        }

        tracing::info!(name, "cost deleted");
        self.events.push(LedgerEvent::CostDeleted {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Latch the cost entries as final. Allowed in either lock phase.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    pub fn submit_final_costs(&mut self, caller: &Address) -> Result<()> {
        self.gate.require_admin(caller)?;
        if !self.costs.submit_final() {
            tracing::debug!("final costs already submitted");
            return Ok(());
        }

        tracing::info!(entries = self.costs.iter().count(), "final costs submitted");
        self.events.push(LedgerEvent::FinalCostsSubmitted);
        Ok(())
    }

    /// Pay the sum of all costs to the admin. Returns the amount paid.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if costs have not been submitted
    /// - [`LedgerError::AlreadyClaimed`] if costs were already paid out
    /// - [`LedgerError::InsufficientFunds`] if the balance cannot cover the sum
    /// - [`LedgerError::TransferFailed`] if the payout was rejected
    pub fn claim_costs(
        &mut self,
        caller: &Address,
        transfer: &mut dyn FundsTransfer,
    ) -> Result<Amount> {
        self.gate.require_admin(caller)?;
        let amount = self.costs.claimable()?;
        if let Err(e) = self.pool.debit(amount) {
            tracing::warn!(amount, balance = self.pool.balance(), "cost claim exceeds balance");
            return Err(e);
        }
        self.costs.set_claimed(true);

        let admin = self.gate.admin();
        if let Err(e) = transfer.transfer(&admin, amount) {
            self.costs.set_claimed(false);
            self.pool.credit(amount);
            tracing::warn!(amount, error = %e, "cost payout rolled back");
            return Err(e.into());
        }

        tracing::info!(recipient = %admin, amount, "costs claimed");
        self.events.push(LedgerEvent::CostsClaimed {
            recipient: admin,
            amount,
        });
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Set the admin's own share, registering the admin as a member if needed.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if unlocked
    /// - [`LedgerError::InvalidArgument`] if the percentage bound is violated
    pub fn set_admin_percentage(&mut self, caller: &Address, percentage: Percentage) -> Result<()> {
        self.gate.require_admin_locked(caller)?;
        let admin = self.gate.admin();
        let joined_at = self.pool.total_distributions();

        match self.members.upsert(admin, percentage, joined_at)? {
            Upsert::Added => self.record_added(admin, percentage, joined_at),
            Upsert::Edited { old } => self.record_edited(admin, old, percentage),
        }
        Ok(())
    }

    /// Register `address` with `percentage`.
    ///
    /// The new member is entitled only to funds received from now on.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if unlocked
    /// - [`LedgerError::InvalidArgument`] for the null address or a violated bound
    /// - [`LedgerError::AlreadyExists`] if `address` is already a member
    pub fn add_member(
        &mut self,
        caller: &Address,
        address: Address,
        percentage: Percentage,
    ) -> Result<()> {
        self.gate.require_admin_locked(caller)?;
        let joined_at = self.pool.total_distributions();
        self.members.add(address, percentage, joined_at)?;
        self.record_added(address, percentage, joined_at);
        Ok(())
    }

    /// Change the percentage of an existing member.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if unlocked
    /// - [`LedgerError::NotFound`] if `address` is not a member
    /// - [`LedgerError::InvalidArgument`] if the percentage bound is violated
    pub fn edit_member(
        &mut self,
        caller: &Address,
        address: &Address,
        percentage: Percentage,
    ) -> Result<()> {
        self.gate.require_admin_locked(caller)?;
        let old = self.members.edit(address, percentage)?;
        self.record_edited(*address, old, percentage);
        Ok(())
    }

    fn record_added(&mut self, member: Address, percentage: Percentage, joined_at: Amount) {
        tracing::info!(
            member = %member,
            percentage,
            joined_at,
            total_percentage = self.members.total_percentage(),
            "member added"
        );
        self.events.push(LedgerEvent::MemberAdded {
            member,
            percentage,
            claimed_through: joined_at,
        });
    }

    fn record_edited(&mut self, member: Address, old: Percentage, new: Percentage) {
        tracing::info!(
            member = %member,
            old_percentage = old,
            new_percentage = new,
            total_percentage = self.members.total_percentage(),
            "member edited"
        );
        self.events.push(LedgerEvent::MemberEdited {
            member,
            old_percentage: old,
            new_percentage: new,
        });
    }

    // ------------------------------------------------------------------
    // Lock
    // ------------------------------------------------------------------

    /// End the administrative phase and open claims.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the admin
    /// - [`LedgerError::InvalidState`] if already unlocked
    pub fn unlock(&mut self, caller: &Address) -> Result<()> {
        self.gate.unlock(caller)?;
        tracing::info!(
            members = self.members.len(),
            total_percentage = self.members.total_percentage(),
            "contract unlocked"
        );
        self.events.push(LedgerEvent::ContractUnlocked);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Distribution
    // ------------------------------------------------------------------

    /// Accept a payment from `sender`. Returns the new distribution total.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Overflow`] if the accumulator would overflow
    pub fn receive_funds(&mut self, sender: &Address, amount: Amount) -> Result<Amount> {
        let total = self.pool.receive(amount)?;
        tracing::info!(sender = %sender, amount, total_distributions = total, "funds received");
        self.events.push(LedgerEvent::FundsReceived {
            sender: *sender,
            amount,
            total_distributions: total,
        });
        Ok(total)
    }

    /// Pay `caller` the part of its cumulative entitlement not yet paid.
    /// Returns the amount paid.
    ///
    /// Rounding is applied to the cumulative entitlement, so remainders of
    /// earlier claims are carried into later ones.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidState`] if still locked
    /// - [`LedgerError::Unauthorized`] if `caller` is not a member
    /// - [`LedgerError::AlreadyClaimed`] if nothing is owed
    /// - [`LedgerError::InsufficientFunds`] if the balance cannot cover the share
    /// - [`LedgerError::TransferFailed`] if the payout was rejected
    pub fn claim_royalties(
        &mut self,
        caller: &Address,
        transfer: &mut dyn FundsTransfer,
    ) -> Result<Amount> {
        self.gate.require_unlocked()?;
        let member = self
            .members
            .get(caller)
            .ok_or_else(|| LedgerError::Unauthorized("not a member".to_string()))?;
        let owed = self.pool.owed(member)?;
        if owed == 0 {
            return Err(LedgerError::AlreadyClaimed);
        }
        let (previous_through, previous_paid) = (member.claimed_through, member.paid);
        let through = self.pool.total_distributions();
        let paid = previous_paid.checked_add(owed).ok_or(LedgerError::Overflow)?;

        if let Err(e) = self.pool.debit(owed) {
            tracing::warn!(member = %caller, owed, balance = self.pool.balance(), "royalty claim exceeds balance");
            return Err(e);
        }
        self.set_claim_progress(caller, through, paid);

        if let Err(e) = transfer.transfer(caller, owed) {
            self.set_claim_progress(caller, previous_through, previous_paid);
            self.pool.credit(owed);
            tracing::warn!(member = %caller, owed, error = %e, "royalty payout rolled back");
            return Err(e.into());
        }

        tracing::info!(member = %caller, amount = owed, paid, claimed_through = through, "royalties claimed");
        self.events.push(LedgerEvent::RoyaltiesClaimed {
            member: *caller,
            amount: owed,
            claimed_through: through,
        });
        Ok(owed)
    }

    fn set_claim_progress(&mut self, address: &Address, claimed_through: Amount, paid: Amount) {
        if let Some(member) = self.members.get_mut(address) {
            member.claimed_through = claimed_through;
            member.paid = paid;
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// The fixed admin identity.
    pub fn admin(&self) -> Address {
        self.gate.admin()
    }

    /// Whether the administrative phase is still open.
    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }

    /// Amount of the cost `name`, zero if absent.
    pub fn cost(&self, name: &str) -> Amount {
        self.costs.amount(name)
    }

    /// Cost entries in insertion order.
    pub fn costs(&self) -> impl Iterator<Item = &CostEntry> {
        self.costs.iter()
    }

    /// Sum of all cost entries.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Overflow`] if the sum does not fit in [`Amount`]
    pub fn total_costs(&self) -> Result<Amount> {
        self.costs.total()
    }

    /// Whether the cost entries were latched as final.
    pub fn final_costs_submitted(&self) -> bool {
        self.costs.is_final()
    }

    /// Whether the cost sum was already paid out.
    pub fn costs_claimed(&self) -> bool {
        self.costs.is_claimed()
    }

    /// Look up a member by address.
    pub fn member(&self, address: &Address) -> Option<&Member> {
        self.members.get(address)
    }

    /// Members in insertion order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    /// Sum of all member percentages.
    pub fn total_percentage(&self) -> u16 {
        self.members.total_percentage()
    }

    /// Every unit ever received.
    pub fn total_distributions(&self) -> Amount {
        self.pool.total_distributions()
    }

    /// Funds currently held.
    pub fn balance(&self) -> Amount {
        self.pool.balance()
    }

    /// What a royalty claim by `address` would pay right now, ignoring the
    /// lock phase and the available balance.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if `address` is not a member
    /// - [`LedgerError::Overflow`] on arithmetic overflow
    pub fn claimable(&self, address: &Address) -> Result<Amount> {
        let member = self
            .members
            .get(address)
            .ok_or_else(|| LedgerError::NotFound("member doesnt exist".to_string()))?;
        self.pool.owed(member)
    }

    /// Journal of committed transitions, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Point-in-time copy of the full state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            admin: self.gate.admin(),
            locked: self.gate.is_locked(),
            total_percentage: self.members.total_percentage(),
            total_distributions: self.pool.total_distributions(),
            balance: self.pool.balance(),
            final_costs_submitted: self.costs.is_final(),
            costs_claimed: self.costs.is_claimed(),
            members: self.members.iter().cloned().collect(),
            costs: self.costs.iter().cloned().collect(),
        }
    }

    /// Re-derive the bookkeeping invariants from the raw entries.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidState`] describing the first violated invariant
    pub fn check_invariants(&self) -> Result<()> {
        let total = self.members.total_percentage();
        let recomputed = self.members.recomputed_total();
        if recomputed != total || total > 100 {
            return Err(LedgerError::InvalidState(format!(
                "total percentage {total} disagrees with members sum {recomputed}"
            )));
        }
        let distributions = self.pool.total_distributions();
        if let Some(m) = self.members.iter().find(|m| m.claimed_through > distributions) {
            return Err(LedgerError::InvalidState(format!(
                "member {} claimed through {} beyond total {distributions}",
                m.address, m.claimed_through
            )));
        }
        for m in self.members.iter() {
            let entitled = m.entitled(distributions).ok_or(LedgerError::Overflow)?;
            if m.paid > entitled {
                return Err(LedgerError::InvalidState(format!(
                    "member {} paid {} beyond entitlement {entitled}",
                    m.address, m.paid
                )));
            }
        }
        if self.pool.balance() > distributions {
            return Err(LedgerError::InvalidState(format!(
                "balance {} exceeds total distributions {distributions}",
                self.pool.balance()
            )));
        }
        Ok(())
    }
}
