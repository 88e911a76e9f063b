//! Mock shell adapter for testing.
//!
//! This module provides a mock implementation of the `ShellAdapter` trait
//! for use in tests. The mock allows predefined command outputs and
//! tracks executed commands.

use crate::adapters::shell::{CommandOutput, ShellAdapter, command_line};
use crate::error::{MtbxError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Type alias for command history entry (command line, interactive)
type CommandHistoryEntry = (String, bool);

/// Mock shell adapter for testing.
///
/// Outputs are keyed by the full command line (program and arguments joined
/// by single spaces). Clones share state, so a test can keep one handle while
/// the code under test owns another.
///
/// # Examples
///
/// ```
/// use mtbx_core::adapters::shell_mock::MockShellAdapter;
/// use mtbx_core::adapters::shell::{ShellAdapter, CommandOutput};
///
/// let shell = MockShellAdapter::new();
/// shell.set_output(
///     "brew --version",
///     CommandOutput {
///         exit_code: 0,
///         stdout: "Homebrew 4.4.0".to_string(),
///         stderr: String::new(),
///     },
/// );
///
/// let output = shell.run("brew", &["--version"]).unwrap();
/// assert_eq!(output.exit_code, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockShellAdapter {
    /// Pre-programmed command outputs (command line -> output)
    outputs: Arc<Mutex<HashMap<String, CommandOutput>>>,
    /// History of executed commands
    history: Arc<Mutex<Vec<CommandHistoryEntry>>>,
    /// Default output for unknown commands
    default_output: Arc<Mutex<Option<CommandOutput>>>,
    /// Programs reported as resolvable on PATH
    available: Arc<Mutex<HashSet<String>>>,
}

impl MockShellAdapter {
    /// Creates a new mock with no outputs and no available programs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock with success as default response.
    pub fn with_success() -> Self {
        let adapter = Self::new();
        adapter.set_default_output(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        });
        adapter
    }

    /// Marks `program` as resolvable by `is_available`.
    pub fn mark_available(&self, program: &str) {
        self.available.lock().unwrap().insert(program.to_string());
    }

    /// Sets the output for a specific command line.
    pub fn set_output(&self, cmd: &str, output: CommandOutput) {
        self.outputs.lock().unwrap().insert(cmd.to_string(), output);
    }

    /// Sets a successful output with the given stdout.
    pub fn set_stdout(&self, cmd: &str, stdout: &str) {
        self.set_output(
            cmd,
            CommandOutput {
                exit_code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
    }

    /// Sets a failing output with the given exit code and stderr.
    pub fn set_failure(&self, cmd: &str, exit_code: i32, stderr: &str) {
        self.set_output(
            cmd,
            CommandOutput {
                exit_code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
    }

    /// Sets the default output for unknown commands.
    pub fn set_default_output(&self, output: CommandOutput) {
        *self.default_output.lock().unwrap() = Some(output);
    }

    /// Returns the history of executed commands.
    pub fn get_history(&self) -> Vec<CommandHistoryEntry> {
        self.history.lock().unwrap().clone()
    }

    /// Returns the number of times a command line was executed.
    pub fn command_count(&self, cmd: &str) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == cmd)
            .count()
    }

    /// Returns the number of executed commands starting with `prefix`.
    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c.starts_with(prefix))
            .count()
    }

    /// Clears command history.
    pub fn clear_history(&self) {
        self.history.lock().unwrap().clear();
    }

    fn respond(&self, program: &str, args: &[&str], interactive: bool) -> Result<CommandOutput> {
        let cmd = command_line(program, args);
        self.history.lock().unwrap().push((cmd.clone(), interactive));

        let outputs = self.outputs.lock().unwrap();
        if let Some(output) = outputs.get(&cmd) {
            Ok(output.clone())
        } else if let Some(default) = self.default_output.lock().unwrap().clone() {
            Ok(default)
        } else {
            Err(MtbxError::ShellCommandFailed(format!(
                "No output configured for command: {}",
                cmd
            )))
        }
    }
}

impl ShellAdapter for MockShellAdapter {
    fn is_available(&self, program: &str) -> bool {
        self.available.lock().unwrap().contains(program)
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.respond(program, args, false)
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.respond(program, args, true)
    }
}
