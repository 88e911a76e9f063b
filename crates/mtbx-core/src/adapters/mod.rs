//! Adapters for the system boundaries of the console.
//!
//! `shell` reaches external executables, `console` reaches the operator.
//! Each trait has a real implementation and a test double.

pub mod console;
pub mod console_impl;
pub mod console_mock;
pub mod shell;
pub mod shell_impl;
pub mod shell_mock;

pub use console::Console;
pub use shell::{CommandOutput, ShellAdapter};
