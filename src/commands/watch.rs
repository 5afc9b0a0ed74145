use crate::libs::agent;
use anyhow::Result;

/// Runs the agent in the foreground until interrupted.
pub async fn cmd() -> Result<()> {
    agent::run_with_signal_handling().await
}
