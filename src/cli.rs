//! CLI argument parsing with clap.

use anyhow::Result;
use clap::{ArgGroup, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, Verbosity, DEFAULT_BIN, DEFAULT_CHAIN};

/// Long options that are also accepted with a single leading dash.
const LONG_FLAGS: &[&str] = &[
    "block", "unblock", "list", "wipe", "verbose", "bin", "chain", "timeout", "json", "help",
    "version",
];

#[derive(Parser, Debug)]
#[command(name = "dropchain")]
#[command(author, version, about = "Manage a dedicated iptables chain of source-address drop rules")]
#[command(arg_required_else_help = true)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .multiple(true)
        .args(["block", "unblock", "list", "wipe"])
))]
pub struct Cli {
    /// Block one or more comma-separated IPv4 addresses
    #[arg(long, value_name = "ADDR[,ADDR...]")]
    pub block: Option<String>,

    /// Unblock one or more comma-separated IPv4 addresses
    #[arg(long, value_name = "ADDR[,ADDR...]")]
    pub unblock: Option<String>,

    /// Print blocked addresses
    #[arg(long)]
    pub list: bool,

    /// Print the list as JSON
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Remove every rule and delete the chain
    #[arg(long)]
    pub wipe: bool,

    /// Verbosity: 0 silent, 1 actions, 2 raw commands and output
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbose: u8,

    /// Path to the iptables binary
    #[arg(long, env = "DROPCHAIN_BIN", default_value = DEFAULT_BIN)]
    pub bin: PathBuf,

    /// Name of the managed chain
    #[arg(long, env = "DROPCHAIN_CHAIN", default_value = DEFAULT_CHAIN)]
    pub chain: String,

    /// Seconds to wait for each iptables call before killing it
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long flags.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Build the validated runtime configuration.
    pub fn to_config(&self) -> Result<Config> {
        let config = Config {
            bin: self.bin.clone(),
            chain: self.chain.clone(),
            verbosity: Verbosity::try_from(self.verbose)?,
            timeout: Duration::from_secs(self.timeout),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Rewrite `-block` style flags to `--block` so clap recognizes them.
///
/// The first element (program name), values, and anything after a bare
/// `--` are passed through untouched. `-name=value` keeps its value.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;

    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || passthrough {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    arg
                }
                Some(text) if is_single_dash_long(text) => OsString::from(format!("-{}", text)),
                _ => arg,
            }
        })
        .collect()
}

fn is_single_dash_long(text: &str) -> bool {
    match text.strip_prefix('-') {
        Some(rest) if !rest.starts_with('-') => {
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            LONG_FLAGS.contains(&name)
        }
        _ => false,
    }
}
