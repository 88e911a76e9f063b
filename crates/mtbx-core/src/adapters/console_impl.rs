//! Terminal console implementation.

use crate::adapters::console::Console;
use crate::error::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::{self, BufRead, IsTerminal, Write};

/// Console bound to the process's stdin and stdout.
///
/// Screen clearing is skipped when stdout is not a terminal, so piped
/// output stays readable.
#[derive(Debug)]
pub struct TerminalConsole {
    clear_screen: bool,
}

impl TerminalConsole {
    /// Creates a terminal console.
    ///
    /// # Arguments
    ///
    /// * `clear_screen` - Whether `clear` should actually wipe the screen.
    pub fn new(clear_screen: bool) -> Self {
        Self {
            clear_screen: clear_screen && io::stdout().is_terminal(),
        }
    }
}

impl Console for TerminalConsole {
    fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()?;
        Ok(())
    }

    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{message}: ")?;
            stdout.flush()?;
        }

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            // Keep the shell prompt on its own line after EOF.
            println!();
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
