//! Dispatcher state machine.
//!
//! This module defines the states of the operator console loop and the
//! interpretation of a menu selection token.

use std::fmt;

/// State of the console loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Showing the tool menu and waiting for a selection.
    Menu,

    /// Running the tool at this index of the discovered list.
    Running(usize),

    /// Terminal state; the console loop ends.
    Exiting,
}

impl DispatchState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Menu => "menu",
            DispatchState::Running(_) => "running",
            DispatchState::Exiting => "exiting",
        }
    }

    /// Whether the loop has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Exiting)
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interpretation of one line of menu input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index of a listed tool.
    Tool(usize),

    /// Empty input, end of input, or a quit token.
    Quit,

    /// Anything else; carries the offending input.
    Invalid(String),
}

impl Selection {
    /// Parses menu input against a menu of `tool_count` entries numbered from 1.
    ///
    /// `None` means input is exhausted and is treated as quit.
    pub fn parse(input: Option<&str>, tool_count: usize) -> Self {
        let Some(raw) = input else {
            return Selection::Quit;
        };
        let token = raw.trim();

        if token.is_empty()
            || ["q", "quit", "exit"]
                .iter()
                .any(|quit| token.eq_ignore_ascii_case(quit))
        {
            return Selection::Quit;
        }

        match token.parse::<usize>() {
            Ok(n) if (1..=tool_count).contains(&n) => Selection::Tool(n - 1),
            _ => Selection::Invalid(token.to_string()),
        }
    }
}
