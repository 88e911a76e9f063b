//! Configuration types for the toolbox console.
//!
//! Settings are read-only: they come from built-in defaults, optionally
//! overlaid by a TOML file. Missing keys keep their default values.

use crate::error::{MtbxError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default Homebrew analytics endpoint (30 day install counts).
pub const DEFAULT_ANALYTICS_URL: &str = "https://formulae.brew.sh/api/analytics/install/30d.json";

/// Main toolbox configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MtbxConfig {
    /// Console presentation settings.
    pub console: ConsoleConfig,

    /// Package manager settings used by the Brew tool.
    pub brew: BrewConfig,
}

impl MtbxConfig {
    /// Loads configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. The default location is optional: when
    /// the file is absent, built-in defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::ConfigNotFound` if an explicit path does not exist,
    /// `MtbxError::ConfigParseError` if the file is not valid TOML for this
    /// schema, or `MtbxError::Io` if it cannot be read.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (Some(p.to_path_buf()), true),
            None => (Self::default_path(), false),
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            if required {
                return Err(MtbxError::ConfigNotFound(path));
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MtbxError::ConfigParseError(e.to_string()))
    }

    /// Default settings file location (`<config_dir>/mtbx/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mtbx").join("config.toml"))
    }
}

/// Console presentation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Title shown above the tool menu.
    pub title: String,

    /// Whether to clear the screen before each menu redraw.
    pub clear_screen: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            title: "Mac Toolbox".to_string(),
            clear_screen: true,
        }
    }
}

/// Settings for the Homebrew audit and update workflow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrewConfig {
    /// Package manager executable name or path.
    pub executable: String,

    /// Run `brew update` before taking the inventory.
    pub refresh_before_audit: bool,

    /// Pass `--greedy` when upgrading casks.
    pub greedy: bool,

    /// Run `brew cleanup -s` after a plan with at least one successful update.
    pub cleanup_after_update: bool,

    /// Run `brew doctor` after any upgrade or swap was attempted.
    pub doctor_after_update: bool,

    /// Print the plan instead of running it.
    pub dry_run: bool,

    /// Release channel names that mark a pre-release track.
    pub beta_channels: Vec<String>,

    /// Number of top packages shown on the Brew dashboard (0 disables it).
    pub top_packages: usize,

    /// Analytics endpoint used for the top packages dashboard.
    pub analytics_url: String,
}

impl Default for BrewConfig {
    fn default() -> Self {
        Self {
            executable: "brew".to_string(),
            refresh_before_audit: true,
            greedy: true,
            cleanup_after_update: true,
            doctor_after_update: true,
            dry_run: false,
            beta_channels: [
                "beta", "alpha", "nightly", "insider", "preview", "dev", "next", "canary", "edge",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            top_packages: 10,
            analytics_url: DEFAULT_ANALYTICS_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MtbxConfig::default();
        assert_eq!(config.brew.executable, "brew");
        assert!(config.brew.refresh_before_audit);
        assert!(!config.brew.dry_run);
        assert!(config.brew.doctor_after_update);
        assert_eq!(config.brew.beta_channels.len(), 9);
        assert!(config.console.clear_screen);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = MtbxConfig::from_toml_str(
            r#"
[brew]
dry_run = true
"#,
        )
        .unwrap();

        assert!(config.brew.dry_run);
        assert_eq!(config.brew.executable, "brew");
        assert_eq!(config.console.title, "Mac Toolbox");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result = MtbxConfig::from_toml_str("invalid { toml");
        assert!(matches!(result, Err(MtbxError::ConfigParseError(_))));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let result = MtbxConfig::from_toml_str("[brew]\ntop_packages = \"many\"\n");
        assert!(matches!(result, Err(MtbxError::ConfigParseError(_))));
    }
}
