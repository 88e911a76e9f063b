//! Shell adapter trait and operations.
//!
//! This module defines the `ShellAdapter` trait, the boundary through which
//! the package workflows reach external executables. Commands are given as a
//! program plus an argument list and are never routed through a shell.

use crate::error::Result;

/// External command output.
///
/// Contains the result of a command execution. Commands run in interactive
/// mode inherit the terminal, so their `stdout` and `stderr` are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code from the command (0 typically indicates success).
    pub exit_code: i32,

    /// Standard output from the command.
    pub stdout: String,

    /// Standard error output from the command.
    pub stderr: String,
}

impl CommandOutput {
    /// Checks if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best available diagnostic text for a failed command.
    ///
    /// Prefers stderr, then stdout, then the bare exit code.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exited with status {}", self.exit_code)
    }
}

/// Renders a program and its arguments as one display line.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shell adapter trait.
///
/// Implementations can execute real commands or provide mocked behavior for
/// testing.
pub trait ShellAdapter: Send + Sync {
    /// Checks whether `program` resolves to an executable on the search path.
    fn is_available(&self, program: &str) -> bool;

    /// Executes a command, capturing its output, and waits for completion.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::ShellCommandFailed` if the command cannot be
    /// spawned (not if it returns a non-zero exit code - check
    /// `CommandOutput::success()` for that).
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Executes a command with the terminal's stdin, stdout and stderr.
    ///
    /// Intended for long-running commands whose progress the operator should
    /// see as it happens. Only the exit code is reported back.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::ShellCommandFailed` if the command cannot be spawned.
    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}
