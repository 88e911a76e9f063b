//! Error types for toolbox operations.
//!
//! Only [`MtbxError::RegistryEmpty`] is fatal. Every other variant is caught
//! at the boundary of the component that produced it and turned into an
//! operator-visible diagnostic.

use std::path::PathBuf;
use thiserror::Error;

/// Error variants for the console, the registry and the package workflows.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MtbxError {
    // Registry errors
    /// No registered tool survived validation.
    #[error("no valid tools registered")]
    RegistryEmpty,

    // Dispatcher errors
    /// Menu input that is neither a listed number nor a quit token.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    // Package manager errors
    /// The package manager executable could not be resolved on PATH.
    #[error("package manager not available: {0}")]
    ManagerUnavailable(String),

    /// The package manager returned a failure or output that could not be parsed.
    #[error("package query failed: {0}")]
    QueryError(String),

    /// A single package update failed.
    #[error("update failed for {package}: {diagnostic}")]
    UpdateFailure {
        /// Package whose update failed.
        package: String,
        /// Captured diagnostic text.
        diagnostic: String,
    },

    // Tool/adapter errors
    /// A command could not be spawned at all.
    #[error("shell command failed: {0}")]
    ShellCommandFailed(String),

    /// A tool returned an error from its entry point.
    #[error("tool execution error: {0}")]
    ToolExecutionError(String),

    // Config errors
    /// Error parsing the settings file.
    #[error("config parse error: {0}")]
    ConfigParseError(String),

    /// Settings file requested explicitly but not present.
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    // IO and system errors
    /// Standard IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context from anyhow.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for toolbox operations.
pub type Result<T> = std::result::Result<T, MtbxError>;
