//! Console adapter trait.
//!
//! Every component that talks to the operator receives a `&mut dyn Console`
//! instead of writing to the terminal directly, so output can be captured and
//! input scripted in tests.

use crate::error::Result;

/// Operator-facing output sink and input source.
pub trait Console {
    /// Clears the screen before a full redraw.
    fn clear(&mut self) -> Result<()>;

    /// Writes one line of output.
    fn print(&mut self, text: &str) -> Result<()>;

    /// Shows `message` and reads one line of input.
    ///
    /// Returns the line without surrounding whitespace, or `None` once input
    /// is exhausted.
    fn prompt(&mut self, message: &str) -> Result<Option<String>>;

    /// Asks a yes/no question. Only `y` or `yes` (any case) count as yes.
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let answer = self.prompt(&format!("{message} [y/n]"))?;
        Ok(matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        ))
    }

    /// Waits for the operator before the screen is redrawn.
    fn pause(&mut self) -> Result<()> {
        self.prompt("Press Enter to continue...").map(|_| ())
    }
}
