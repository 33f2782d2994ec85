//! Runtime configuration for dropchain.
//!
//! There is no configuration file: the struct is filled once from the
//! command line (and its environment fallbacks) and never changes after.

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

use crate::cmd_abstraction::DEFAULT_TIMEOUT;
use crate::error::DropchainError;

/// Default location of the filter tool binary.
pub const DEFAULT_BIN: &str = "/sbin/iptables";

/// Default name of the managed chain.
pub const DEFAULT_CHAIN: &str = "DROPCHAIN";

/// iptables rejects chain names longer than this.
const MAX_CHAIN_NAME_LEN: usize = 28;

/// Output verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Results and errors only
    #[default]
    Silent,
    /// Log each action taken against the chain
    Actions,
    /// Also trace every raw command line and its raw output
    Trace,
}

impl Verbosity {
    /// Maximum tracing level shown at this verbosity.
    pub fn log_level(self) -> Level {
        match self {
            Self::Silent => Level::WARN,
            Self::Actions => Level::INFO,
            Self::Trace => Level::DEBUG,
        }
    }
}

impl TryFrom<u8> for Verbosity {
    type Error = DropchainError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Silent),
            1 => Ok(Self::Actions),
            2 => Ok(Self::Trace),
            other => Err(DropchainError::Config(format!(
                "Invalid verbosity {}. Valid values: 0, 1, 2",
                other
            ))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the iptables binary
    pub bin: PathBuf,

    /// Name of the chain holding the drop rules
    pub chain: String,

    /// Logging verbosity
    pub verbosity: Verbosity,

    /// Bounded wait for each invocation of the filter tool
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bin: PathBuf::from(DEFAULT_BIN),
            chain: DEFAULT_CHAIN.to_string(),
            verbosity: Verbosity::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.bin.as_os_str().is_empty() {
            return Err(DropchainError::Config("Binary path must not be empty".into()).into());
        }

        if !is_valid_chain_name(&self.chain) {
            return Err(DropchainError::Config(format!(
                "Invalid chain name '{}'. Use 1-{} characters, no whitespace, not starting with '-'",
                self.chain, MAX_CHAIN_NAME_LEN
            ))
            .into());
        }

        if self.timeout.is_zero() {
            return Err(DropchainError::Config("Timeout must be at least one second".into()).into());
        }

        Ok(())
    }

    /// The binary path as passed to the executor.
    pub fn bin_str(&self) -> String {
        self.bin.to_string_lossy().to_string()
    }
}

fn is_valid_chain_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_CHAIN_NAME_LEN
        && !name.starts_with('-')
        && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bin, PathBuf::from("/sbin/iptables"));
        assert_eq!(config.chain, "DROPCHAIN");
        assert_eq!(config.verbosity, Verbosity::Silent);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_verbosity_from_level() {
        assert_eq!(Verbosity::try_from(0u8).unwrap(), Verbosity::Silent);
        assert_eq!(Verbosity::try_from(1u8).unwrap(), Verbosity::Actions);
        assert_eq!(Verbosity::try_from(2u8).unwrap(), Verbosity::Trace);
        assert!(Verbosity::try_from(3u8).is_err());
        assert!(Verbosity::Trace > Verbosity::Actions);
    }

    #[test]
    fn test_verbosity_log_level() {
        assert_eq!(Verbosity::Silent.log_level(), Level::WARN);
        assert_eq!(Verbosity::Actions.log_level(), Level::INFO);
        assert_eq!(Verbosity::Trace.log_level(), Level::DEBUG);
    }

    #[test]
    fn test_chain_name_validation() {
        assert!(is_valid_chain_name("BLOCKED"));
        assert!(is_valid_chain_name("my-chain_2"));
        assert!(is_valid_chain_name(&"A".repeat(28)));

        assert!(!is_valid_chain_name(""));
        assert!(!is_valid_chain_name(&"A".repeat(29)));
        assert!(!is_valid_chain_name("-j"));
        assert!(!is_valid_chain_name("two words"));
        assert!(!is_valid_chain_name("tab\there"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            chain: "bad chain".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DropchainError>(),
            Some(DropchainError::Config(_))
        ));

        let config = Config {
            bin: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bin_str() {
        let config = Config {
            bin: PathBuf::from("/usr/sbin/iptables-legacy"),
            ..Default::default()
        };
        assert_eq!(config.bin_str(), "/usr/sbin/iptables-legacy");
    }
}
