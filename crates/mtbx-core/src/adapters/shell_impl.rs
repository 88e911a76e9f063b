//! Standard shell adapter implementation.
//!
//! This module provides a concrete implementation of the `ShellAdapter` trait
//! using `std::process::Command`, with executable lookup through `which`.

use crate::adapters::shell::{CommandOutput, ShellAdapter, command_line};
use crate::error::{MtbxError, Result};
use std::process::{Command, Stdio};

/// Standard shell adapter using `std::process::Command`.
///
/// This adapter executes real commands. For testing, use
/// [`MockShellAdapter`](crate::adapters::shell_mock::MockShellAdapter).
#[derive(Debug, Default)]
pub struct StdShellAdapter;

impl StdShellAdapter {
    /// Creates a new standard shell adapter.
    pub fn new() -> Self {
        Self
    }

    fn execute_command(
        &self,
        program: &str,
        args: &[&str],
        interactive: bool,
    ) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args);

        tracing::debug!(command = %command_line(program, args), interactive, "running command");

        if interactive {
            let status = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| spawn_error(program, args, e))?;

            return Ok(CommandOutput {
                exit_code: status.code().unwrap_or(-1),
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        let output = command
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(program, args, e))?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn spawn_error(program: &str, args: &[&str], e: std::io::Error) -> MtbxError {
    MtbxError::ShellCommandFailed(format!(
        "failed to execute `{}`: {}",
        command_line(program, args),
        e
    ))
}

impl ShellAdapter for StdShellAdapter {
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.execute_command(program, args, false)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.execute_command(program, args, true)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_simple_command() {
        let adapter = StdShellAdapter::new();
        let output = adapter.run("echo", &["hello"]).unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_arguments_are_not_shell_expanded() {
        let adapter = StdShellAdapter::new();
        let output = adapter.run("echo", &["$HOME; exit 3"]).unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "$HOME; exit 3");
    }

    #[test]
    fn test_run_failing_command() {
        let adapter = StdShellAdapter::new();
        let output = adapter.run("sh", &["-c", "echo boom >&2; exit 2"]).unwrap();

        assert!(!output.success());
        assert_eq!(output.exit_code, 2);
        assert_eq!(output.diagnostic(), "boom");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let adapter = StdShellAdapter::new();
        let result = adapter.run("mtbx-definitely-not-a-program", &[]);

        assert!(matches!(result, Err(MtbxError::ShellCommandFailed(_))));
    }

    #[test]
    fn test_is_available() {
        let adapter = StdShellAdapter::new();

        assert!(adapter.is_available("sh"));
        assert!(!adapter.is_available("mtbx-definitely-not-a-program"));
    }
}
