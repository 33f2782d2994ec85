//! Command execution abstraction for testability.
//!
//! `ChainManager` talks to the filter tool only through [`CommandExecutor`],
//! so unit tests can script the tool's replies with a mock instead of
//! touching the host firewall.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

use crate::error::DropchainError;

/// Default bounded wait for a single invocation of the filter tool.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Output from command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// The exit code, if available
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Stdout followed by stderr, the way a terminal would show them.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}{}", self.stdout, self.stderr),
        }
    }

    /// A mutating iptables call is clean when it exits zero and says nothing.
    pub fn is_clean(&self) -> bool {
        self.success && self.combined().trim().is_empty()
    }

    /// Text to report when a call was not clean.
    pub fn failure_text(&self) -> String {
        let text = self.combined().trim().to_string();
        if text.is_empty() {
            match self.code {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            }
        } else {
            text
        }
    }
}

/// Trait for command execution, allowing dependency injection for testing.
///
/// Calls are awaited one at a time by the caller; implementations never
/// need to handle overlapping invocations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with the given arguments and capture its output.
    ///
    /// # Arguments
    /// * `cmd` - The command to execute (e.g., "/sbin/iptables")
    /// * `args` - The arguments to pass to the command
    async fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Runs real processes, killing any that outlive the configured timeout.
#[derive(Debug, Clone)]
pub struct RealCommandExecutor {
    timeout: Duration,
}

impl RealCommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl CommandExecutor for RealCommandExecutor {
    async fn execute(&self, cmd: &str, args: &[String]) -> Result<CommandOutput> {
        let child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DropchainError::Execution {
                program: cmd.to_string(),
                reason: e.to_string(),
            })?;

        // Dropping the pending future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.with_context(|| format!("Failed to collect output of {}", cmd))?,
            Err(_) => {
                return Err(DropchainError::Timeout {
                    program: cmd.to_string(),
                    timeout: self.timeout,
                }
                .into())
            }
        };

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Helper function to convert a slice of &str to Vec<String>.
///
/// This is needed because mockall has issues with lifetimes in `&[&str]`,
/// so we use `&[String]` in the trait signature instead.
pub fn args_to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_to_strings() {
        let args = args_to_strings(&["-L", "DROPCHAIN", "-n"]);
        assert_eq!(args, vec!["-L", "DROPCHAIN", "-n"]);
    }

    #[test]
    fn test_command_output_default() {
        let output = CommandOutput::default();
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
        assert!(!output.success);
        assert!(output.code.is_none());
    }

    #[test]
    fn test_combined_joins_streams() {
        let output = CommandOutput {
            stdout: "Chain X (0 references)\n".into(),
            stderr: "warning\n".into(),
            success: true,
            code: Some(0),
        };
        assert_eq!(output.combined(), "Chain X (0 references)\nwarning\n");
    }

    #[test]
    fn test_is_clean() {
        let ok = CommandOutput {
            success: true,
            code: Some(0),
            ..Default::default()
        };
        assert!(ok.is_clean());

        let whitespace_only = CommandOutput {
            stdout: "\n".into(),
            success: true,
            code: Some(0),
            ..Default::default()
        };
        assert!(whitespace_only.is_clean());

        let chatty = CommandOutput {
            stderr: "iptables: Chain already exists.\n".into(),
            success: true,
            code: Some(0),
            ..Default::default()
        };
        assert!(!chatty.is_clean());

        let silent_failure = CommandOutput {
            success: false,
            code: Some(1),
            ..Default::default()
        };
        assert!(!silent_failure.is_clean());
    }

    #[test]
    fn test_failure_text() {
        let silent = CommandOutput {
            success: false,
            code: Some(4),
            ..Default::default()
        };
        assert_eq!(silent.failure_text(), "exited with status 4");

        let noisy = CommandOutput {
            stderr: "  Bad rule (does a matching rule exist in that chain?).\n".into(),
            success: false,
            code: Some(1),
            ..Default::default()
        };
        assert_eq!(
            noisy.failure_text(),
            "Bad rule (does a matching rule exist in that chain?)."
        );
    }

    #[tokio::test]
    async fn test_real_command_executor_execute_echo() {
        let executor = RealCommandExecutor::default();
        let args = args_to_strings(&["-n", "hello"]);
        let output = executor.execute("echo", &args).await.unwrap();
        assert!(output.success);
        assert_eq!(output.stdout, "hello");
    }

    #[tokio::test]
    async fn test_real_command_executor_execute_failure() {
        let executor = RealCommandExecutor::default();
        let args = args_to_strings(&["--invalid-flag"]);
        // ls runs, it just fails
        let output = executor.execute("ls", &args).await.unwrap();
        assert!(!output.success);
        assert!(!output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_real_command_executor_missing_binary() {
        let executor = RealCommandExecutor::default();
        let err = executor
            .execute("/nonexistent/dropchain-test-binary", &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DropchainError>(),
            Some(DropchainError::Execution { .. })
        ));
    }

    #[tokio::test]
    async fn test_real_command_executor_timeout() {
        let executor = RealCommandExecutor::new(Duration::from_millis(100));
        let args = args_to_strings(&["5"]);
        let err = executor.execute("sleep", &args).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DropchainError>(),
            Some(DropchainError::Timeout { .. })
        ));
        assert!(err.to_string().contains("100ms"), "{}", err);
    }

    #[tokio::test]
    async fn test_mock_command_executor() {
        let mut mock = MockCommandExecutor::new();

        mock.expect_execute()
            .withf(|cmd, args| cmd == "/sbin/iptables" && args == ["-N".to_string(), "X".to_string()])
            .times(1)
            .returning(|_, _| {
                Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                })
            });

        let args = args_to_strings(&["-N", "X"]);
        let output = mock.execute("/sbin/iptables", &args).await.unwrap();
        assert!(output.is_clean());
    }
}
