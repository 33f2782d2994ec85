//! # dropchain - iptables blocklist chain manager
//!
//! Keeps a dedicated iptables chain of `-s <addr> -j DROP` rules: creates the
//! chain on first use, blocks and unblocks IPv4 addresses idempotently, lists
//! what is blocked and can tear the whole chain down.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        dropchain                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Actions: -block, -unblock, -list, -wipe              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ChainManager                                               │
//! │    ├── probe: list → create if missing → snapshot           │
//! │    └── block / unblock / wipe against the snapshot          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parser                                                     │
//! │    └── listing text → header flag + ordered IPv4 addresses  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CommandExecutor (tokio::process, bounded wait)             │
//! │    └── /sbin/iptables                                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use dropchain::chain::ChainManager;
//! use dropchain::cmd_abstraction::RealCommandExecutor;
//! use dropchain::config::Config;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let executor = RealCommandExecutor::new(config.timeout);
//!     let manager = ChainManager::init(config, executor).await?;
//!
//!     manager.block("203.0.113.5".parse()?).await?;
//!     for addr in manager.addresses()? {
//!         println!("{}", addr);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`chain`] - Chain lifecycle, rule management and listing parser
//! - [`cli`] - Command-line interface definitions
//! - [`cmd_abstraction`] - Mockable process execution
//! - [`commands`] - CLI command implementations
//! - [`config`] - Runtime configuration and validation
//! - [`error`] - Error taxonomy
//! - [`validation`] - Address batch validation

pub mod chain;
pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod error;
pub mod validation;

pub use cli::Cli;
pub use config::Config;
pub use error::DropchainError;
