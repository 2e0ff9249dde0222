//! Member percentages and their running total.
//!
//! The table keeps members in insertion order and maintains
//! `total_percentage` in lockstep with the entries. Every operation
//! validates completely before writing, so a rejected call leaves the table
//! untouched.
//!
//! ## Bound
//!
//! ```text
//! total_percentage - old_percentage + new_percentage <= 100
//! ```

use std::collections::BTreeMap;

use royalty_types::{Address, Amount, Member, Percentage, MAX_PERCENTAGE};

use crate::{LedgerError, Result};

/// Outcome of [`MembershipTable::upsert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    /// A new member entry was created.
    Added,
    /// An existing entry changed from `old` percent.
    Edited { old: Percentage },
}

/// Members keyed by address, iterated in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MembershipTable {
    entries: Vec<Member>,
    index: BTreeMap<Address, usize>,
    total_percentage: u16,
}

impl MembershipTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all member percentages, kept in step with the entries.
    pub fn total_percentage(&self) -> u16 {
        self.total_percentage
    }

    /// Number of registered members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no member has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` if `address` is a registered member.
    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    /// Look up a member by address.
    pub fn get(&self, address: &Address) -> Option<&Member> {
        self.index.get(address).map(|&i| &self.entries[i])
    }

    pub(crate) fn get_mut(&mut self, address: &Address) -> Option<&mut Member> {
        match self.index.get(address) {
            Some(&i) => self.entries.get_mut(i),
            None => None,
        }
    }

    /// Members in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.entries.iter()
    }

    /// Total after replacing a share of `old` percent with `new` percent.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] if `new` exceeds 100 on its own
    /// - [`LedgerError::InvalidArgument`] if the resulting total exceeds 100
    pub fn check_bound(&self, old: Percentage, new: Percentage) -> Result<u16> {
        if new > MAX_PERCENTAGE {
            return Err(LedgerError::InvalidArgument(
                "percentage cant be greater than 100".to_string(),
            ));
        }
        let total = self.total_percentage - u16::from(old) + u16::from(new);
        if total > u16::from(MAX_PERCENTAGE) {
            return Err(LedgerError::InvalidArgument(format!(
                "percentage cant be greater than 100 in total, would be {total}"
            )));
        }
        Ok(total)
    }

    /// Register a new member whose entitlement starts at `joined_at`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] if `address` is the null address
    /// - [`LedgerError::InvalidArgument`] if the percentage bound is violated
    /// - [`LedgerError::AlreadyExists`] if `address` is already a member
    pub fn add(
        &mut self,
        address: Address,
        percentage: Percentage,
        joined_at: Amount,
    ) -> Result<()> {
        if address.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "member cant be zero address".to_string(),
            ));
        }
        if percentage > MAX_PERCENTAGE {
            return Err(LedgerError::InvalidArgument(
                "percentage cant be greater than 100".to_string(),
            ));
        }
        if self.contains(&address) {
            return Err(LedgerError::AlreadyExists(address));
        }
        let total = self.check_bound(0, percentage)?;

        self.index.insert(address, self.entries.len());
        self.entries.push(Member::new(address, percentage, joined_at));
        self.total_percentage = total;
        Ok(())
    }

    /// Change an existing member's percentage. Returns the previous value.
    ///
    /// The member's `joined_at` and `claimed_through` are left as is.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] if `address` is not a member
    /// - [`LedgerError::InvalidArgument`] if the percentage bound is violated
    pub fn edit(&mut self, address: &Address, percentage: Percentage) -> Result<Percentage> {
        let old = self
            .get(address)
            .map(|m| m.percentage)
            .ok_or_else(|| LedgerError::NotFound("member doesnt exist".to_string()))?;
        let total = self.check_bound(old, percentage)?;

        if let Some(member) = self.get_mut(address) {
            member.percentage = percentage;
        }
        self.total_percentage = total;
        Ok(old)
    }

    /// Edit `address` if present, otherwise add it.
    pub fn upsert(
        &mut self,
        address: Address,
        percentage: Percentage,
        joined_at: Amount,
    ) -> Result<Upsert> {
        if self.contains(&address) {
            let old = self.edit(&address, percentage)?;
            Ok(Upsert::Edited { old })
        } else {
            self.add(address, percentage, joined_at)?;
            Ok(Upsert::Added)
        }
    }

    /// Recompute the total from the entries.
    pub fn recomputed_total(&self) -> u16 {
        self.entries.iter().map(|m| u16::from(m.percentage)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    #[test]
    fn test_add_member() {
        let mut table = MembershipTable::new();
        table.add(alice(), 10, 0).expect("add");
        let member = table.get(&alice()).expect("alice");
        assert_eq!(member.percentage, 10);
        assert_eq!(member.claimed_through, 0);
        assert_eq!(table.total_percentage(), 10);
    }

    #[test]
    fn test_add_records_join_point() {
        let mut table = MembershipTable::new();
        table.add(alice(), 10, 500).expect("add");
        let member = table.get(&alice()).expect("alice");
        assert_eq!(member.joined_at, 500);
        assert_eq!(member.claimed_through, 500);
    }

    #[test]
    fn test_add_zero_address_rejected() {
        let mut table = MembershipTable::new();
        let result = table.add(Address::ZERO, 10, 0);
        assert!(matches!(result, Err(LedgerError::InvalidArgument(_))));
        assert!(table.is_empty());
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut table = MembershipTable::new();
        table.add(alice(), 10, 0).expect("add");
        let result = table.add(alice(), 20, 0);
        assert!(matches!(result, Err(LedgerError::AlreadyExists(a)) if a == alice()));
        assert_eq!(table.total_percentage(), 10);
    }

    #[test]
    fn test_add_over_100_rejected() {
        let mut table = MembershipTable::new();
        let result = table.add(alice(), 101, 0);
        assert!(matches!(result, Err(LedgerError::InvalidArgument(_))));
        assert_eq!(table.total_percentage(), 0);
    }

    #[test]
    fn test_add_total_over_100_rejected() {
        let mut table = MembershipTable::new();
        table.add(alice(), 60, 0).expect("add alice");
        let result = table.add(bob(), 41, 0);
        assert!(matches!(result, Err(LedgerError::InvalidArgument(_))));
        assert!(!table.contains(&bob()));
        table.add(bob(), 40, 0).expect("exactly 100");
        assert_eq!(table.total_percentage(), 100);
    }

    #[test]
    fn test_edit_member() {
        let mut table = MembershipTable::new();
        table.add(alice(), 10, 7).expect("add");
        let old = table.edit(&alice(), 21).expect("edit");
        assert_eq!(old, 10);
        let member = table.get(&alice()).expect("alice");
        assert_eq!(member.percentage, 21);
        assert_eq!(member.claimed_through, 7);
        assert_eq!(table.total_percentage(), 21);
    }

    #[test]
    fn test_edit_missing_member() {
        let mut table = MembershipTable::new();
        let result = table.edit(&alice(), 21);
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn test_edit_over_100_rejected() {
        let mut table = MembershipTable::new();
        table.add(alice(), 10, 0).expect("add");
        let result = table.edit(&alice(), 211);
        assert!(matches!(result, Err(LedgerError::InvalidArgument(_))));
        assert_eq!(table.get(&alice()).expect("alice").percentage, 10);
    }

    #[test]
    fn test_edit_counts_own_share() {
        let mut table = MembershipTable::new();
        table.add(alice(), 50, 0).expect("add alice");
        table.add(bob(), 50, 0).expect("add bob");
        // Raising alice to 51 must fail; setting her to 50 again must not.
        assert!(table.edit(&alice(), 51).is_err());
        table.edit(&alice(), 50).expect("same value");
        table.edit(&alice(), 0).expect("lower");
        assert_eq!(table.total_percentage(), 50);
    }

    #[test]
    fn test_upsert() {
        let mut table = MembershipTable::new();
        assert_eq!(table.upsert(alice(), 10, 0).expect("add"), Upsert::Added);
        assert_eq!(
            table.upsert(alice(), 15, 0).expect("edit"),
            Upsert::Edited { old: 10 }
        );
        assert_eq!(table.total_percentage(), 15);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_iteration_in_insertion_order() {
        let mut table = MembershipTable::new();
        let labels = ["zed", "amy", "mo"];
        for label in labels {
            table.add(Address::from_label(label), 1, 0).expect("add");
        }
        let order: Vec<Address> = table.iter().map(|m| m.address).collect();
        let expected: Vec<Address> = labels.iter().map(|l| Address::from_label(l)).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_recomputed_total_matches() {
        let mut table = MembershipTable::new();
        table.add(alice(), 30, 0).expect("add");
        table.add(bob(), 20, 0).expect("add");
        table.edit(&bob(), 45).expect("edit");
        assert_eq!(table.recomputed_total(), table.total_percentage());
    }
}
