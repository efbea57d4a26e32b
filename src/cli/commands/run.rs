//! Run command implementation
//!
//! Prepares the environment with [`load_environment`] and then runs the
//! given program, which inherits the resolved variables. The `.env` file is
//! loaded by `main` before the configuration.

use crate::bootstrap::load_environment;
use crate::config::load_config_or_default;
use anyhow::Context;
use clap::Args;
use std::process::ExitStatus;
use tokio::process::Command;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Program to run, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some((program, args)) = self.command.split_first() else {
            eprintln!("❌ No program given");
            return Ok(1);
        };

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration file");
                eprintln!("   Error: {e}");
                return Ok(1);
            }
        };

        let summary = load_environment(&config, None)
            .await
            .context("Failed to resolve vault references")?;

        for vault in summary.unreachable_vaults() {
            tracing::warn!(vault = %vault, "References to this vault were left unresolved");
        }

        tracing::info!(program = %program, "Starting program");

        let mut child = Command::new(program)
            .args(args)
            .spawn()
            .with_context(|| format!("Failed to start {program}"))?;

        // The terminal delivers Ctrl+C to the child too; keep waiting for it to exit
        let status = loop {
            tokio::select! {
                status = child.wait() => break status?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), waiting for program to exit...");
                }
            }
        };

        tracing::debug!(program = %program, status = %status, "Program exited");
        Ok(exit_code(status))
    }
}

/// Exit code to report for a finished child, using the shell convention of
/// 128 + signal number for signal termination
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_exit_code_from_status() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // SIGKILL
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_propagates_exit_code() {
        let args = RunArgs {
            command: vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()],
        };

        let code = args
            .execute("/nonexistent/vaultref.toml")
            .await
            .unwrap();
        assert_eq!(code, 7);
    }

    #[tokio::test]
    async fn test_run_missing_program_is_error() {
        let args = RunArgs {
            command: vec!["vaultref-test-no-such-program".to_string()],
        };

        assert!(args
            .execute("/nonexistent/vaultref.toml")
            .await
            .is_err());
    }
}
