//! Wipe command implementation.

use anyhow::Result;
use tracing::info;

use crate::chain::ChainManager;
use crate::cmd_abstraction::CommandExecutor;

/// Run the wipe command
pub async fn run<E: CommandExecutor>(manager: &ChainManager<E>) -> Result<()> {
    let drained = manager.wipe().await?;
    info!("Drained {} rule(s)", drained.len());

    println!("[OK] chain {} removed", manager.config().chain);
    Ok(())
}
