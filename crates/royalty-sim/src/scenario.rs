//! Scenario replay.
//!
//! Builds a ledger and an [`InMemoryTransfer`] from a [`SimConfig`], applies
//! every step in order and collects the final state.

use std::collections::BTreeMap;

use anyhow::bail;
use royalty_ledger::{InMemoryTransfer, RoyaltyLedger};
use royalty_types::{Amount, LedgerEvent, LedgerSnapshot};
use serde::Serialize;

use crate::config::{resolve_address, Action, SimConfig};

/// Result of a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Position in the scenario, starting at zero.
    pub index: usize,
    /// Operation name as written in the scenario.
    pub op: &'static str,
    /// Amount returned by the operation, if any.
    pub amount: Option<Amount>,
    /// Error message for a failed step.
    pub error: Option<String>,
}

/// Final state of a replayed scenario.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Ledger state after the last step.
    pub snapshot: LedgerSnapshot,
    /// Journal of committed transitions.
    pub events: Vec<LedgerEvent>,
    /// Funds delivered per participant label.
    pub payouts: BTreeMap<String, Amount>,
    /// Per-step results.
    pub steps: Vec<StepReport>,
}

/// Replay `config` against a fresh ledger.
///
/// # Errors
///
/// Fails on the first step whose outcome contradicts its `expect_error`
/// flag, or if the ledger invariants are broken after any step.
pub fn run(config: &SimConfig) -> anyhow::Result<Outcome> {
    let mut ledger = RoyaltyLedger::new(resolve_address(&config.ledger.admin))?;
    let mut rail = InMemoryTransfer::new();
    for label in &config.transfer.reject {
        rail.reject(resolve_address(label));
    }

    let mut labels = vec![config.ledger.admin.clone()];
    let mut reports = Vec::with_capacity(config.steps.len());

    for (index, step) in config.steps.iter().enumerate() {
        let op = step.action.op();
        let result = apply(&mut ledger, &mut rail, &step.action, &mut labels);

        let report = match (result, step.expect_error) {
            (Ok(amount), false) => {
                tracing::debug!(index, op, ?amount, "step applied");
                StepReport {
                    index,
                    op,
                    amount,
                    error: None,
                }
            }
            (Err(e), true) => {
                tracing::info!(index, op, error = %e, "step failed as expected");
                StepReport {
                    index,
                    op,
                    amount: None,
                    error: Some(e.to_string()),
                }
            }
            (Ok(_), true) => bail!("step {index} ({op}) succeeded but was expected to fail"),
            (Err(e), false) => bail!("step {index} ({op}) failed: {e}"),
        };
        reports.push(report);

        if let Err(e) = ledger.check_invariants() {
            bail!("invariant broken after step {index} ({op}): {e}");
        }
    }

    labels.sort();
    labels.dedup();
    let payouts = labels
        .into_iter()
        .filter_map(|label| {
            let paid = rail.balance_of(&resolve_address(&label));
            (paid > 0).then_some((label, paid))
        })
        .collect();

    Ok(Outcome {
        snapshot: ledger.snapshot(),
        events: ledger.events().to_vec(),
        payouts,
        steps: reports,
    })
}

fn apply(
    ledger: &mut RoyaltyLedger,
    rail: &mut InMemoryTransfer,
    action: &Action,
    labels: &mut Vec<String>,
) -> royalty_ledger::Result<Option<Amount>> {
    match action {
        Action::AddCost {
            caller,
            name,
            amount,
        } => ledger
            .add_cost(&resolve_address(caller), name, Amount::from(*amount))
            .map(|()| None),
        Action::DeleteCost { caller, name } => ledger
            .delete_cost(&resolve_address(caller), name)
            .map(|()| None),
        Action::SetAdminPercentage { caller, percentage } => ledger
            .set_admin_percentage(&resolve_address(caller), *percentage)
            .map(|()| None),
        Action::AddMember {
            caller,
            member,
            percentage,
        } => {
            labels.push(member.clone());
            ledger
                .add_member(&resolve_address(caller), resolve_address(member), *percentage)
                .map(|()| None)
        }
        Action::EditMember {
            caller,
            member,
            percentage,
        } => ledger
            .edit_member(&resolve_address(caller), &resolve_address(member), *percentage)
            .map(|()| None),
        Action::Unlock { caller } => ledger.unlock(&resolve_address(caller)).map(|()| None),
        Action::Receive { sender, amount } => ledger
            .receive_funds(&resolve_address(sender), Amount::from(*amount))
            .map(Some),
        Action::SubmitFinalCosts { caller } => ledger
            .submit_final_costs(&resolve_address(caller))
            .map(|()| None),
        Action::ClaimCosts { caller } => {
            labels.push(caller.clone());
            ledger.claim_costs(&resolve_address(caller), rail).map(Some)
        }
        Action::ClaimRoyalties { caller } => {
            labels.push(caller.clone());
            ledger
                .claim_royalties(&resolve_address(caller), rail)
                .map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = include_str!("../scenarios/basic.toml");

    #[test]
    fn test_bundled_scenario_runs() {
        let config = SimConfig::parse(BASIC).expect("parse bundled scenario");
        let outcome = run(&config).expect("run");

        assert!(!outcome.snapshot.locked);
        assert_eq!(outcome.snapshot.total_distributions, 200);
        assert_eq!(outcome.payouts.get("admin"), Some(&25));
        assert_eq!(outcome.payouts.get("alice"), Some(&20));
        assert_eq!(outcome.payouts.get("bob"), Some(&40));
        assert_eq!(outcome.snapshot.balance, 200 - 25 - 20 - 40);
        assert!(outcome.steps.iter().any(|s| s.error.is_some()));
    }

    #[test]
    fn test_unexpected_failure_aborts() {
        let config = SimConfig::parse(
            r#"
            [[steps]]
            op = "claim_royalties"
            caller = "alice"
            "#,
        )
        .expect("parse");
        let err = run(&config).expect_err("claim while locked must abort");
        assert!(err.to_string().contains("claim_royalties"));
    }

    #[test]
    fn test_zero_admin_rejected() {
        let config = SimConfig::parse(
            r#"
            [ledger]
            admin = "zero"
            "#,
        )
        .expect("parse");
        let err = run(&config).expect_err("null admin must abort");
        assert!(err.to_string().contains("admin cant be zero address"));
    }

    #[test]
    fn test_unexpected_success_aborts() {
        let config = SimConfig::parse(
            r#"
            [[steps]]
            op = "add_cost"
            name = "m"
            amount = 1
            expect_error = true
            "#,
        )
        .expect("parse");
        assert!(run(&config).is_err());
    }

    #[test]
    fn test_rejecting_recipient_is_rolled_back() {
        let config = SimConfig::parse(
            r#"
            [transfer]
            reject = ["mallory"]

            [[steps]]
            op = "add_member"
            member = "mallory"
            percentage = 50

            [[steps]]
            op = "receive"
            sender = "payer"
            amount = 10

            [[steps]]
            op = "unlock"

            [[steps]]
            op = "claim_royalties"
            caller = "mallory"
            expect_error = true
            "#,
        )
        .expect("parse");
        let outcome = run(&config).expect("run");
        let mallory = outcome
            .snapshot
            .member(&resolve_address("mallory"))
            .expect("mallory");
        assert_eq!(mallory.claimed_through, 0);
        assert_eq!(outcome.snapshot.balance, 10);
        assert!(outcome.payouts.is_empty());
    }
}
