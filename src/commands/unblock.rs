//! Unblock command implementation.

use anyhow::Result;
use std::net::Ipv4Addr;

use crate::chain::ChainManager;
use crate::cmd_abstraction::CommandExecutor;

/// Run the unblock command for each address of a validated batch
pub async fn run<E: CommandExecutor>(manager: &ChainManager<E>, addresses: &[Ipv4Addr]) -> Result<()> {
    for addr in addresses {
        manager.unblock(*addr).await?;
        println!("[OK] unblocked {}", addr);
    }
    Ok(())
}
