//! royalty-sim: replay a royalty ledger scenario.
//!
//! Usage:
//!   royalty-sim <scenario.toml>
//!   ROYALTY_SCENARIO=<scenario.toml> royalty-sim
//!
//! Logs go to stderr. The final snapshot, event journal, payouts and step
//! reports are printed to stdout as JSON.

mod config;
mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use crate::config::SimConfig;

fn scenario_path() -> anyhow::Result<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ROYALTY_SCENARIO").ok())
        .map(PathBuf::from)
        .context("usage: royalty-sim <scenario.toml> (or set ROYALTY_SCENARIO)")
}

fn main() -> anyhow::Result<()> {
    let path = scenario_path()?;
    let config = SimConfig::load(&path)?;

    let level = &config.logging.level;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("royalty_ledger={level}").parse()?)
                .add_directive(format!("royalty_sim={level}").parse()?),
        )
        .init();

    info!(scenario = %path.display(), steps = config.steps.len(), "replaying scenario");

    let outcome = scenario::run(&config)?;

    info!(
        events = outcome.events.len(),
        balance = outcome.snapshot.balance,
        "scenario complete"
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
