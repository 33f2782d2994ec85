//! Block command implementation.

use anyhow::Result;
use std::net::Ipv4Addr;

use crate::chain::{BlockOutcome, ChainManager};
use crate::cmd_abstraction::CommandExecutor;

/// Run the block command for each address of a validated batch
pub async fn run<E: CommandExecutor>(manager: &ChainManager<E>, addresses: &[Ipv4Addr]) -> Result<()> {
    for addr in addresses {
        match manager.block(*addr).await? {
            BlockOutcome::Inserted => println!("[OK] blocked {}", addr),
            BlockOutcome::AlreadyBlocked => println!("[SKIP] {} is already blocked", addr),
        }
    }
    Ok(())
}
