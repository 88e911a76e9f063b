//! Operator console loop.
//!
//! The dispatcher renders the discovered tools as a numbered menu, reads a
//! selection, runs the chosen tool, and returns to the menu until the
//! operator quits. Tool failures are contained here.

use crate::adapters::Console;
use crate::error::{MtbxError, Result};
use crate::registry::RegisteredTool;
use crate::state::{DispatchState, Selection};
use colored::Colorize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Counters for one console session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Tool invocations started.
    pub tools_run: usize,

    /// Invocations that ended in an error or a panic.
    pub tool_failures: usize,
}

/// Menu-driven tool dispatcher.
///
/// The tool list is fixed at construction; it is the snapshot taken by
/// discovery at startup and is never refreshed mid-session.
#[derive(Debug)]
pub struct Dispatcher {
    tools: Vec<RegisteredTool>,
    title: String,
    notice: Option<String>,
    summary: SessionSummary,
}

impl Dispatcher {
    /// Creates a dispatcher over an ordered tool list.
    pub fn new(tools: Vec<RegisteredTool>, title: impl Into<String>) -> Self {
        Self {
            tools,
            title: title.into(),
            notice: None,
            summary: SessionSummary::default(),
        }
    }

    /// Tools in menu order.
    pub fn tools(&self) -> &[RegisteredTool] {
        &self.tools
    }

    /// Runs the console loop until the operator quits.
    ///
    /// # Errors
    ///
    /// Only console I/O errors end the loop early; tool failures do not.
    pub fn run(&mut self, console: &mut dyn Console) -> Result<SessionSummary> {
        let mut state = DispatchState::Menu;
        while !state.is_terminal() {
            state = self.step(console, state)?;
        }

        console.print(&"Goodbye!".green().to_string())?;
        tracing::info!(
            tools_run = self.summary.tools_run,
            tool_failures = self.summary.tool_failures,
            "console session ended"
        );
        Ok(self.summary)
    }

    /// Performs one transition of the state machine.
    pub fn step(
        &mut self,
        console: &mut dyn Console,
        state: DispatchState,
    ) -> Result<DispatchState> {
        let next = match state {
            DispatchState::Menu => {
                self.render_menu(console)?;
                let input = console.prompt("Select Option")?;
                match Selection::parse(input.as_deref(), self.tools.len()) {
                    Selection::Tool(index) => DispatchState::Running(index),
                    Selection::Quit => DispatchState::Exiting,
                    Selection::Invalid(token) => {
                        let err = MtbxError::InvalidSelection(format!(
                            "'{}' (choose 1-{} or press Enter to quit)",
                            token,
                            self.tools.len()
                        ));
                        tracing::debug!(%err, "rejected menu input");
                        self.notice = Some(err.to_string());
                        DispatchState::Menu
                    }
                }
            }
            DispatchState::Running(index) => {
                self.invoke(console, index)?;
                DispatchState::Menu
            }
            DispatchState::Exiting => DispatchState::Exiting,
        };

        tracing::trace!(from = %state, to = %next, "dispatch transition");
        Ok(next)
    }

    fn render_menu(&mut self, console: &mut dyn Console) -> Result<()> {
        console.clear()?;
        console.print(&format!("== {} ==", self.title).bold().to_string())?;
        console.print("")?;
        console.print(&" AVAILABLE TOOLS ".white().on_blue().bold().to_string())?;

        for (idx, tool) in self.tools.iter().enumerate() {
            let d = tool.descriptor();
            console.print(&format!(
                "[{}] {} {} ({})",
                idx + 1,
                d.glyph,
                d.name.cyan().bold(),
                d.description
            ))?;
        }

        console.print("")?;
        console.print("[Q] Quit")?;

        if let Some(notice) = self.notice.take() {
            console.print(&notice.yellow().to_string())?;
        }
        Ok(())
    }

    fn invoke(&mut self, console: &mut dyn Console, index: usize) -> Result<()> {
        let Some(tool) = self.tools.get(index) else {
            self.notice = Some(MtbxError::InvalidSelection(format!("{}", index + 1)).to_string());
            return Ok(());
        };
        let name = tool.descriptor().name.clone();
        self.summary.tools_run += 1;
        tracing::info!(tool = %name, "running tool");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| tool.run(console)));

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(format!("tool panicked: {}", panic_message(payload.as_ref()))),
        };

        if let Some(message) = failure {
            self.summary.tool_failures += 1;
            tracing::error!(tool = %name, error = %message, "tool failed");
            console.print(&format!("{} {}", "Error running tool:".red().bold(), message))?;
            console.pause()?;
        } else {
            tracing::debug!(tool = %name, "tool finished");
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
