//! Error types for dropchain.
//!
//! Every failure is terminal for the invocation. The variants only decide
//! how `main` labels the one-line diagnostic it prints before exiting.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DropchainError {
    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Unable to create chain {chain}: {output}")]
    ChainCreation { chain: String, output: String },

    #[error("Chain {0} not found")]
    ChainNotFound(String),

    #[error("Unable to run {program}: {reason}")]
    Execution { program: String, reason: String },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rule operation failed for {address}: {output}")]
    RuleOperation { address: String, output: String },

    #[error("Unable to delete chain {chain}: {output}")]
    ChainDeletion { chain: String, output: String },

    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),
}

impl DropchainError {
    /// Abort-class errors stop the program before any rule work could be
    /// attempted; the rest come from a specific rule or chain operation.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            Self::Permission(_)
                | Self::ChainCreation { .. }
                | Self::ChainNotFound(_)
                | Self::Execution { .. }
                | Self::Timeout { .. }
                | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_classification() {
        assert!(DropchainError::Permission("x".into()).is_abort());
        assert!(DropchainError::ChainNotFound("DROPCHAIN".into()).is_abort());
        assert!(DropchainError::Timeout {
            program: "/sbin/iptables".into(),
            timeout: Duration::from_secs(30)
        }
        .is_abort());
        assert!(!DropchainError::RuleOperation {
            address: "10.0.0.1".into(),
            output: "Bad rule".into()
        }
        .is_abort());
        assert!(!DropchainError::InvalidAddress("nope".into()).is_abort());
    }

    #[test]
    fn test_display_messages() {
        let err = DropchainError::ChainDeletion {
            chain: "DROPCHAIN".into(),
            output: "Directory not empty".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to delete chain DROPCHAIN: Directory not empty"
        );
        assert_eq!(
            DropchainError::ChainNotFound("BLOCKED".into()).to_string(),
            "Chain BLOCKED not found"
        );
    }
}
