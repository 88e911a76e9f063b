//! Mac Toolbox core - operator console and Homebrew maintenance engine.
//!
//! This crate provides the menu-driven console that hosts pluggable
//! maintenance tools, and the Homebrew tool that audits installed packages
//! and applies updates one package at a time.
//!
//! # Architecture
//!
//! - [`registry`]: tool contract, registration table and discovery
//! - [`state`]: console state machine and menu input parsing
//! - [`dispatcher`]: the console loop
//! - [`brew`]: inventory, classification, planning, beta swaps, execution, browsing
//! - [`adapters`]: shell and console boundaries with test doubles
//! - [`config`]: settings file
//! - [`error`]: error types and result type alias
//!
//! # Example
//!
//! ```rust
//! use mtbx_core::adapters::console_mock::ScriptedConsole;
//! use mtbx_core::adapters::shell_mock::MockShellAdapter;
//! use mtbx_core::{MtbxConfig, Toolbox};
//! use std::sync::Arc;
//!
//! let toolbox = Toolbox::with_shell(MtbxConfig::default(), Arc::new(MockShellAdapter::new()));
//! let mut console = ScriptedConsole::new([""]);
//!
//! let summary = toolbox.run_with(&mut console).unwrap();
//! assert_eq!(summary.tools_run, 0);
//! ```

pub mod adapters;
pub mod brew;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod runtime;
pub mod state;

pub use config::{BrewConfig, ConsoleConfig, MtbxConfig};
pub use dispatcher::{Dispatcher, SessionSummary};
pub use error::{MtbxError, Result};
pub use registry::{Discovery, FnTool, RegisteredTool, Tool, ToolDescriptor, ToolRegistry};
pub use runtime::{Toolbox, builtin_registry};
pub use state::{DispatchState, Selection};
