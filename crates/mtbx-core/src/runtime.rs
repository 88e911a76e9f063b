//! Runtime for the toolbox console.
//!
//! This module provides the `Toolbox` struct. It wires the system adapters
//! into the built-in tools and drives the dispatcher over a console.

use crate::adapters::Console;
use crate::adapters::ShellAdapter;
use crate::adapters::console_impl::TerminalConsole;
use crate::adapters::shell_impl::StdShellAdapter;
use crate::brew::BrewManager;
use crate::config::MtbxConfig;
use crate::dispatcher::{Dispatcher, SessionSummary};
use crate::error::Result;
use crate::registry::{Discovery, ToolRegistry};
use std::sync::Arc;

/// Builds the registration table of the built-in tools.
///
/// Adding a tool to the console is one more `register` call here.
pub fn builtin_registry(shell: Arc<dyn ShellAdapter>, config: &MtbxConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(BrewManager::new(shell, config.brew.clone()));
    registry
}

/// Toolbox runtime.
///
/// # Examples
///
/// ```no_run
/// use mtbx_core::{MtbxConfig, Toolbox};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let toolbox = Toolbox::new(MtbxConfig::load(None)?);
/// let summary = toolbox.run()?;
/// println!("ran {} tools", summary.tools_run);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Toolbox {
    /// Effective settings.
    pub config: MtbxConfig,

    registry: ToolRegistry,
}

impl Toolbox {
    /// Creates a runtime that reaches the real system.
    pub fn new(config: MtbxConfig) -> Self {
        Self::with_shell(config, Arc::new(StdShellAdapter::new()))
    }

    /// Creates a runtime over a given shell adapter.
    pub fn with_shell(config: MtbxConfig, shell: Arc<dyn ShellAdapter>) -> Self {
        let registry = builtin_registry(shell, &config);
        Self { config, registry }
    }

    /// Replaces the registration table.
    #[must_use]
    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Validates the registration table.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::RegistryEmpty` if no tool is valid.
    pub fn discover(&self) -> Result<Discovery> {
        self.registry.discover()
    }

    /// Runs the console session on `console` until the operator quits.
    ///
    /// Discovery happens once, before the first menu is drawn.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::RegistryEmpty` before any menu is shown if no tool
    /// is valid, or a console I/O error.
    #[tracing::instrument(skip_all)]
    pub fn run_with(&self, console: &mut dyn Console) -> Result<SessionSummary> {
        let discovery = self.discover()?;
        for diagnostic in &discovery.diagnostics {
            tracing::warn!(%diagnostic, "tool excluded");
        }
        let mut dispatcher = Dispatcher::new(discovery.tools, self.config.console.title.clone());
        dispatcher.run(console)
    }

    /// Runs the console session on the terminal.
    pub fn run(&self) -> Result<SessionSummary> {
        let mut console = TerminalConsole::new(self.config.console.clear_screen);
        self.run_with(&mut console)
    }
}
