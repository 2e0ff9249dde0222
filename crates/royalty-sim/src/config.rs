//! Scenario file format.

use std::path::Path;

use anyhow::Context;
use royalty_types::Address;
use serde::{Deserialize, Serialize};

/// A complete scenario: ledger setup, logging, transfer behaviour and steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// In-memory transfer settings.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Operations replayed in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Admin label or hex address.
    #[serde(default = "default_admin")]
    pub admin: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Transfer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Recipients whose transfers fail.
    #[serde(default)]
    pub reject: Vec<String>,
}

/// One replayed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    /// The step must fail; the run continues after it.
    #[serde(default)]
    pub expect_error: bool,
}

/// Ledger operation selected by the `op` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    AddCost {
        #[serde(default = "default_admin")]
        caller: String,
        name: String,
        amount: u64,
    },
    DeleteCost {
        #[serde(default = "default_admin")]
        caller: String,
        name: String,
    },
    SetAdminPercentage {
        #[serde(default = "default_admin")]
        caller: String,
        percentage: u8,
    },
    AddMember {
        #[serde(default = "default_admin")]
        caller: String,
        member: String,
        percentage: u8,
    },
    EditMember {
        #[serde(default = "default_admin")]
        caller: String,
        member: String,
        percentage: u8,
    },
    Unlock {
        #[serde(default = "default_admin")]
        caller: String,
    },
    Receive {
        sender: String,
        amount: u64,
    },
    SubmitFinalCosts {
        #[serde(default = "default_admin")]
        caller: String,
    },
    ClaimCosts {
        #[serde(default = "default_admin")]
        caller: String,
    },
    ClaimRoyalties {
        caller: String,
    },
}

impl Action {
    /// The `op` name of this action.
    pub fn op(&self) -> &'static str {
        match self {
            Self::AddCost { .. } => "add_cost",
            Self::DeleteCost { .. } => "delete_cost",
            Self::SetAdminPercentage { .. } => "set_admin_percentage",
            Self::AddMember { .. } => "add_member",
            Self::EditMember { .. } => "edit_member",
            Self::Unlock { .. } => "unlock",
            Self::Receive { .. } => "receive",
            Self::SubmitFinalCosts { .. } => "submit_final_costs",
            Self::ClaimCosts { .. } => "claim_costs",
            Self::ClaimRoyalties { .. } => "claim_royalties",
        }
    }
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SimConfig {
    /// Parse a scenario from TOML text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load a scenario file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing scenario {}", path.display()))
    }
}

/// Resolve a scenario identity.
///
/// `"zero"` is the null address, 64 hex chars are taken literally, anything
/// else is hashed with [`Address::from_label`].
pub fn resolve_address(label: &str) -> Address {
    if label == "zero" {
        return Address::ZERO;
    }
    label
        .parse::<Address>()
        .unwrap_or_else(|_| Address::from_label(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.ledger.admin, "admin");
        assert_eq!(config.logging.level, "info");
        assert!(config.transfer.reject.is_empty());
        assert!(config.steps.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = SimConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: SimConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed.ledger.admin, config.ledger.admin);
    }

    #[test]
    fn test_parse_steps() {
        let config = SimConfig::parse(
            r#"
            [ledger]
            admin = "label"

            [[steps]]
            op = "add_member"
            member = "alice"
            percentage = 10

            [[steps]]
            op = "claim_royalties"
            caller = "alice"
            expect_error = true
            "#,
        )
        .expect("parse");

        assert_eq!(config.ledger.admin, "label");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.steps.len(), 2);
        assert_eq!(config.steps[0].action.op(), "add_member");
        assert!(!config.steps[0].expect_error);
        assert!(matches!(
            &config.steps[0].action,
            Action::AddMember { caller, percentage: 10, .. } if caller == "admin"
        ));
        assert!(config.steps[1].expect_error);
    }

    #[test]
    fn test_parse_unknown_op() {
        let result = SimConfig::parse(
            r#"
            [[steps]]
            op = "remove_member"
            member = "alice"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_address() {
        assert!(resolve_address("zero").is_zero());
        let alice = Address::from_label("alice");
        assert_eq!(resolve_address("alice"), alice);
        assert_eq!(resolve_address(&alice.to_string()), alice);
        // Short hex-looking labels are labels, not addresses
        assert_eq!(resolve_address("abcd"), Address::from_label("abcd"));
    }
}
