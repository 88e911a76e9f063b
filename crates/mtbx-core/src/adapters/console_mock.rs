//! Scripted console for testing.
//!
//! Feeds pre-recorded operator answers and captures everything written, so
//! menus and workflows can be driven end to end without a terminal.

use crate::adapters::console::Console;
use crate::error::Result;
use std::collections::VecDeque;

/// Console double with scripted input and captured output.
///
/// Once the scripted answers run out, `prompt` reports end of input.
///
/// # Examples
///
/// ```
/// use mtbx_core::adapters::console::Console;
/// use mtbx_core::adapters::console_mock::ScriptedConsole;
///
/// let mut console = ScriptedConsole::new(["y"]);
/// assert!(console.confirm("Proceed?").unwrap());
/// assert_eq!(console.prompt("Next").unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    lines: Vec<String>,
    prompts: Vec<String>,
    clears: usize,
}

impl ScriptedConsole {
    /// Creates a console that answers prompts with `inputs`, in order.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// All printed lines joined by newlines.
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }

    /// Printed lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Prompt messages shown, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Whether any printed line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// Number of screen clears requested.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Number of scripted answers not yet consumed.
    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn clear(&mut self) -> Result<()> {
        self.clears += 1;
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.lines.extend(text.lines().map(str::to_string));
        if text.is_empty() {
            self.lines.push(String::new());
        }
        Ok(())
    }

    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        self.prompts.push(message.to_string());
        Ok(self.inputs.pop_front().map(|s| s.trim().to_string()))
    }
}
