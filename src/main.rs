//! dropchain - iptables blocklist chain manager
//!
//! Maintains one iptables chain of source-address drop rules.

use anyhow::Result;
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

use dropchain::chain::ChainManager;
use dropchain::cli::Cli;
use dropchain::cmd_abstraction::RealCommandExecutor;
use dropchain::commands;
use dropchain::config::Verbosity;
use dropchain::error::DropchainError;
use dropchain::validation::parse_address_batch;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_normalized();

    // Setup logging based on verbosity; logs go to stderr so listings stay clean
    let verbosity = Verbosity::try_from(cli.verbose).unwrap_or_default();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(verbosity.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[ABORT] Unable to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config()?;

    // Validate batches before touching the firewall
    let to_block = cli.block.as_deref().map(parse_address_batch).transpose()?;
    let to_unblock = cli.unblock.as_deref().map(parse_address_batch).transpose()?;

    let executor = RealCommandExecutor::new(config.timeout);
    let manager = ChainManager::init(config, executor).await?;

    if let Some(addresses) = &to_block {
        commands::block::run(&manager, addresses).await?;
    }
    if let Some(addresses) = &to_unblock {
        commands::unblock::run(&manager, addresses).await?;
    }
    if cli.list {
        commands::list::run(&manager, cli.json).await?;
    }
    if cli.wipe {
        commands::wipe::run(&manager).await?;
    }

    Ok(())
}

/// Print the single diagnostic line for a fatal error.
fn report(err: &anyhow::Error) {
    let prefix = match err.downcast_ref::<DropchainError>() {
        Some(e) if e.is_abort() => "[ABORT]",
        _ => "[ERROR]",
    };
    eprintln!("{} {:#}", prefix, err);
}
