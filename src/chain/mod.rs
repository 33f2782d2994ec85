//! Lifecycle and rule management for the dedicated drop chain.

pub mod parser;

use anyhow::Result;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

use crate::cmd_abstraction::{args_to_strings, CommandExecutor, CommandOutput};
use crate::config::Config;
use crate::error::DropchainError;

pub use parser::{parse_listing, ChainSnapshot};

/// Where the manager stands after probing the filter tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainState {
    /// No listing requested yet
    Unprobed,
    /// Listing captured and parsed; it begins with the rule-table header
    Ready(ChainSnapshot),
    /// Probe failed or produced no recognizable listing
    Fatal,
}

/// Result of a block request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// A drop rule was inserted at the head of the chain
    Inserted,
    /// The snapshot already lists the address; nothing was run
    AlreadyBlocked,
}

fn list_args(chain: &str) -> Vec<String> {
    args_to_strings(&["-L", chain, "-n"])
}

fn create_chain_args(chain: &str) -> Vec<String> {
    args_to_strings(&["-N", chain])
}

fn insert_rule_args(chain: &str, addr: &Ipv4Addr) -> Vec<String> {
    let addr = addr.to_string();
    args_to_strings(&["-I", chain, "-s", &addr, "-j", "DROP"])
}

fn delete_rule_args(chain: &str, addr: &Ipv4Addr) -> Vec<String> {
    let addr = addr.to_string();
    args_to_strings(&["-D", chain, "-s", &addr, "-j", "DROP"])
}

fn delete_chain_args(chain: &str) -> Vec<String> {
    args_to_strings(&["-X", chain])
}

/// Effective user id, reported alongside permission failures.
fn effective_uid() -> u32 {
    // SAFETY: geteuid() has no preconditions, never fails and touches no state.
    unsafe { libc::geteuid() }
}

/// Owns the one chain this process manages.
///
/// The listing captured by [`ChainManager::probe`] is kept for the lifetime
/// of the manager and is not refreshed after block or unblock, so it reflects
/// the chain as it was at startup.
pub struct ChainManager<E: CommandExecutor> {
    config: Config,
    executor: E,
    state: ChainState,
}

impl<E: CommandExecutor> ChainManager<E> {
    /// Create an unprobed manager. Most callers want [`ChainManager::init`].
    pub fn new(config: Config, executor: E) -> Self {
        Self {
            config,
            executor,
            state: ChainState::Unprobed,
        }
    }

    /// Create a manager and probe the chain, creating it if absent.
    pub async fn init(config: Config, executor: E) -> Result<Self> {
        let mut manager = Self::new(config, executor);
        manager.probe().await?;
        Ok(manager)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ChainState::Ready(_))
    }

    /// List the chain, creating it first if the tool says it is missing.
    ///
    /// Permission and creation failures are returned as errors. A listing
    /// without a recognizable header is not an error here; it leaves the
    /// manager in [`ChainState::Fatal`] so every later operation refuses.
    pub async fn probe(&mut self) -> Result<()> {
        match self.fetch_listing().await {
            Ok(snapshot) if snapshot.header_recognized => {
                self.state = ChainState::Ready(snapshot);
                Ok(())
            }
            Ok(_) => {
                warn!("No rule table found for chain {}", self.config.chain);
                self.state = ChainState::Fatal;
                Ok(())
            }
            Err(e) => {
                self.state = ChainState::Fatal;
                Err(e)
            }
        }
    }

    async fn fetch_listing(&self) -> Result<ChainSnapshot> {
        let chain = &self.config.chain;
        let output = self.run(list_args(chain)).await?;
        let snapshot = parse_listing(&output.combined());

        // A real table is taken as is; chain names and rule comments may
        // contain the error markers below.
        if output.success && snapshot.header_recognized {
            return Ok(snapshot);
        }

        if parser::is_permission_denied(&snapshot.listing) {
            return Err(DropchainError::Permission(format!(
                "{} refused to list chain {} (euid {}); run as root or grant CAP_NET_ADMIN",
                self.config.bin.display(),
                chain,
                effective_uid()
            ))
            .into());
        }

        if !parser::is_missing_chain(&snapshot.listing) {
            return Ok(snapshot);
        }

        info!("Creating chain {}", chain);
        let output = self.run(create_chain_args(chain)).await?;
        if !output.is_clean() {
            return Err(DropchainError::ChainCreation {
                chain: chain.clone(),
                output: output.failure_text(),
            }
            .into());
        }

        Ok(parse_listing(&self.run(list_args(chain)).await?.combined()))
    }

    /// Listing captured at probe time.
    pub fn snapshot(&self) -> Result<&ChainSnapshot> {
        match &self.state {
            ChainState::Ready(snapshot) => Ok(snapshot),
            _ => Err(DropchainError::ChainNotFound(self.config.chain.clone()).into()),
        }
    }

    /// Addresses dropped by the chain, top of chain first.
    pub fn addresses(&self) -> Result<Vec<Ipv4Addr>> {
        Ok(self.snapshot()?.addresses.clone())
    }

    /// Insert a drop rule for `addr` unless the snapshot already lists it.
    pub async fn block(&self, addr: Ipv4Addr) -> Result<BlockOutcome> {
        if self.addresses()?.contains(&addr) {
            debug!("{} already present in chain {}", addr, self.config.chain);
            return Ok(BlockOutcome::AlreadyBlocked);
        }

        info!("Blocking {} in chain {}", addr, self.config.chain);
        let output = self.run(insert_rule_args(&self.config.chain, &addr)).await?;
        ensure_clean(&output, &addr)?;
        Ok(BlockOutcome::Inserted)
    }

    /// Delete the drop rule for `addr`. There is no presence check: a rule
    /// the tool cannot find is reported like any other failure.
    pub async fn unblock(&self, addr: Ipv4Addr) -> Result<()> {
        self.snapshot()?;

        info!("Unblocking {} in chain {}", addr, self.config.chain);
        let output = self.run(delete_rule_args(&self.config.chain, &addr)).await?;
        ensure_clean(&output, &addr)
    }

    /// Remove every rule listed in the snapshot, in order, then delete the
    /// chain. Returns the addresses that were drained.
    pub async fn wipe(&self) -> Result<Vec<Ipv4Addr>> {
        let addresses = self.addresses()?;
        for addr in &addresses {
            self.unblock(*addr).await?;
        }

        let chain = &self.config.chain;
        info!("Deleting chain {}", chain);
        let output = self.run(delete_chain_args(chain)).await?;
        if !output.is_clean() {
            return Err(DropchainError::ChainDeletion {
                chain: chain.clone(),
                output: output.failure_text(),
            }
            .into());
        }

        Ok(addresses)
    }

    async fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        let bin = self.config.bin_str();
        debug!("exec: {} {}", bin, args.join(" "));
        let output = self.executor.execute(&bin, &args).await?;
        debug!("output ({:?}): {}", output.code, output.combined().trim_end());
        Ok(output)
    }
}

fn ensure_clean(output: &CommandOutput, addr: &Ipv4Addr) -> Result<()> {
    if output.is_clean() {
        Ok(())
    } else {
        Err(DropchainError::RuleOperation {
            address: addr.to_string(),
            output: output.failure_text(),
        }
        .into())
    }
}
