//! List command implementation.

use anyhow::Result;
use serde::Serialize;
use std::net::Ipv4Addr;

use crate::chain::ChainManager;
use crate::cmd_abstraction::CommandExecutor;

/// JSON form of the list output
#[derive(Debug, Serialize)]
pub struct BlockedList<'a> {
    pub chain: &'a str,
    pub addresses: &'a [Ipv4Addr],
}

/// Run the list command
pub async fn run<E: CommandExecutor>(manager: &ChainManager<E>, json: bool) -> Result<()> {
    let addresses = manager.addresses()?;
    print!("{}", render(&manager.config().chain, &addresses, json)?);
    Ok(())
}

fn render(chain: &str, addresses: &[Ipv4Addr], json: bool) -> Result<String> {
    if json {
        let doc = BlockedList { chain, addresses };
        return Ok(format!("{}\n", serde_json::to_string_pretty(&doc)?));
    }

    let mut out = format!("Blocked addresses in chain {}:\n", chain);
    for addr in addresses {
        out.push_str(&format!("{}\n", addr));
    }
    Ok(out)
}
