//! Installed package inventory.
//!
//! Reads the installed formulae and casks from `brew info --json=v2
//! --installed`. Each package's release track comes from its own name and
//! version; the beta-channel search described on [`BetaMatcher`] only finds
//! channel packages that could replace it.

use crate::adapters::ShellAdapter;
use crate::brew::classify::compare_versions;
use crate::config::BrewConfig;
use crate::error::{MtbxError, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Kind of Homebrew package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    /// Command-line formula.
    Formula,

    /// Application cask.
    Cask,
}

impl PackageKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Formula => "formula",
            PackageKind::Cask => "cask",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Release track of an installed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// Regular releases only.
    Stable,

    /// The package itself is a channel package or a pre-release version.
    PreRelease,

    /// Stable as far as its own name shows, but the channel lookup failed.
    Unknown,
}

/// One installed package as reported by the package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Formula name or cask token.
    pub name: String,

    /// Formula or cask.
    pub kind: PackageKind,

    /// Installed version string.
    pub installed: String,

    /// Latest known version string, if the manager reports one.
    pub latest: Option<String>,

    /// Release track.
    pub track: Track,

    /// Channel package that could replace this one, e.g. `firefox@beta`.
    ///
    /// Informational: it does not change the track.
    pub prerelease_channel: Option<String>,
}

/// A package left out of the inventory or the update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPackage {
    /// Package name, or a positional label when the name is unreadable.
    pub name: String,

    /// Why it was skipped.
    pub reason: String,
}

/// Result of an inventory query.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Packages that could be read.
    pub records: Vec<PackageRecord>,

    /// Packages whose metadata could not be read.
    pub skipped: Vec<SkippedPackage>,
}

#[derive(Debug, Deserialize)]
struct InstalledListing {
    #[serde(default)]
    formulae: Vec<Value>,
    #[serde(default)]
    casks: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FormulaInfo {
    name: String,
    #[serde(default)]
    installed: Vec<InstalledKeg>,
    #[serde(default)]
    versions: FormulaVersions,
}

#[derive(Debug, Deserialize)]
struct InstalledKeg {
    version: String,
}

#[derive(Debug, Default, Deserialize)]
struct FormulaVersions {
    stable: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaskInfo {
    token: String,
    installed: Option<String>,
    version: Option<String>,
}

/// Detects pre-release channels from package names and versions.
///
/// A package is itself a channel package when its name ends in `@` and a
/// configured channel name (`firefox@beta`, `visual-studio-code@insiders`).
/// The dash form is not enough for that, since `microsoft-edge` is stable.
/// A version carries a channel tag when a separator is followed by a channel
/// name or `rc` (`2.0.0-beta`, `1.4-rc1`).
///
/// Channel packages for an installed `name` are search results made of
/// `name` plus exactly one `@<channel>` or `-<channel>` suffix.
#[derive(Debug, Clone)]
pub struct BetaMatcher {
    channels: Vec<String>,
    suffix: Option<Regex>,
    in_name: Option<Regex>,
    in_version: Option<Regex>,
}

impl BetaMatcher {
    /// Builds a matcher for the given channel names.
    pub fn new(channels: &[String]) -> Result<Self> {
        let channels: Vec<String> = channels
            .iter()
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        if channels.is_empty() {
            return Ok(Self {
                channels,
                suffix: None,
                in_name: None,
                in_version: None,
            });
        }

        let alternation = channels
            .iter()
            .map(|c| regex::escape(c))
            .collect::<Vec<_>>()
            .join("|");

        let compile = |pattern: String| {
            Regex::new(&pattern)
                .map_err(|e| MtbxError::ConfigParseError(format!("invalid beta channel: {e}")))
        };

        Ok(Self {
            suffix: Some(compile(format!("^(?:@|-)(?:{alternation})s?$"))?),
            in_name: Some(compile(format!("@(?:{alternation})s?$"))?),
            in_version: Some(compile(format!(
                r"(?i)[-.+_~](?:{alternation}|rc)\.?\d*(?:$|[-.+_])"
            ))?),
            channels,
        })
    }

    /// Search expression for `brew search`, e.g. `/(@|-)(beta|alpha)/`.
    pub fn search_pattern(&self) -> Option<String> {
        if self.channels.is_empty() {
            return None;
        }
        Some(format!("/(@|-)({})/", self.channels.join("|")))
    }

    /// Whether a package name is itself an `@<channel>` package.
    pub fn is_channel_name(&self, name: &str) -> bool {
        self.in_name.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// Whether a version string carries a pre-release tag.
    pub fn is_prerelease_version(&self, version: &str) -> bool {
        self.in_version.as_ref().is_some_and(|re| re.is_match(version))
    }

    /// Finds the channel package for `name` among `candidates`.
    pub fn find_sibling<'a>(
        &self,
        name: &str,
        candidates: impl IntoIterator<Item = &'a String>,
    ) -> Option<String> {
        let suffix = self.suffix.as_ref()?;
        candidates
            .into_iter()
            .find(|candidate| {
                candidate.len() > name.len()
                    && candidate.starts_with(name)
                    && suffix.is_match(&candidate[name.len()..])
            })
            .cloned()
    }
}

/// Queries the package manager for installed packages.
pub struct PackageInventory<'a> {
    shell: &'a dyn ShellAdapter,
    config: &'a BrewConfig,
}

impl<'a> PackageInventory<'a> {
    /// Creates an inventory reader.
    pub fn new(shell: &'a dyn ShellAdapter, config: &'a BrewConfig) -> Self {
        Self { shell, config }
    }

    /// Checks that the package manager executable resolves.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::ManagerUnavailable` if it does not.
    pub fn ensure_available(&self) -> Result<()> {
        if self.shell.is_available(&self.config.executable) {
            Ok(())
        } else {
            Err(MtbxError::ManagerUnavailable(self.config.executable.clone()))
        }
    }

    /// Lists installed packages with version metadata and release track.
    ///
    /// Packages whose metadata cannot be parsed are returned in
    /// `Inventory::skipped`; the rest of the listing is kept.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `MtbxError::ManagerUnavailable` if the executable does not resolve
    /// - `MtbxError::QueryError` if the listing command fails or is not JSON
    /// - `MtbxError::ShellCommandFailed` if the command cannot be spawned
    #[tracing::instrument(skip_all, fields(manager = %self.config.executable))]
    pub fn list_installed(&self) -> Result<Inventory> {
        self.ensure_available()?;

        let output = self
            .shell
            .run(&self.config.executable, &["info", "--json=v2", "--installed"])?;
        if !output.success() {
            return Err(MtbxError::QueryError(format!(
                "installed package listing failed: {}",
                output.diagnostic()
            )));
        }

        let listing: InstalledListing = serde_json::from_str(&output.stdout).map_err(|e| {
            MtbxError::QueryError(format!("installed package listing is not valid JSON: {e}"))
        })?;

        let matcher = BetaMatcher::new(&self.config.beta_channels)?;
        let mut inventory = Inventory::default();

        for (idx, item) in listing.casks.into_iter().enumerate() {
            match parse_cask(item) {
                Ok(partial) => inventory.records.push(partial),
                Err(skip) => inventory.skipped.push(skip.labelled("cask", idx)),
            }
        }
        for (idx, item) in listing.formulae.into_iter().enumerate() {
            match parse_formula(item) {
                Ok(partial) => inventory.records.push(partial),
                Err(skip) => inventory.skipped.push(skip.labelled("formula", idx)),
            }
        }

        for skipped in &inventory.skipped {
            tracing::warn!(package = %skipped.name, reason = %skipped.reason, "skipping package");
        }

        if !inventory.records.is_empty() {
            let channel_packages = self.channel_packages(&matcher);
            for record in &mut inventory.records {
                assign_track(record, &matcher, channel_packages.as_ref());
            }
        }

        tracing::info!(
            packages = inventory.records.len(),
            skipped = inventory.skipped.len(),
            "inventory complete"
        );
        Ok(inventory)
    }

    /// Packages published on a pre-release channel, or `None` when the
    /// lookup failed.
    fn channel_packages(&self, matcher: &BetaMatcher) -> Option<BTreeSet<String>> {
        let pattern = matcher.search_pattern()?;
        let output = match self.shell.run(&self.config.executable, &["search", &pattern]) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "beta channel search could not run");
                return None;
            }
        };

        if !output.success() {
            if output.stderr.contains("No formulae or casks found") {
                return Some(BTreeSet::new());
            }
            tracing::warn!(error = %output.diagnostic(), "beta channel search failed");
            return None;
        }

        Some(
            output
                .stdout
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.contains("==>"))
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Parse failure for one listing entry, before it gets a display label.
struct PartialSkip {
    name: Option<String>,
    reason: String,
}

impl PartialSkip {
    fn labelled(self, kind: &str, idx: usize) -> SkippedPackage {
        SkippedPackage {
            name: self.name.unwrap_or_else(|| format!("<{} #{}>", kind, idx + 1)),
            reason: self.reason,
        }
    }
}

fn name_hint(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_formula(item: Value) -> std::result::Result<PackageRecord, PartialSkip> {
    let hint = name_hint(&item, "name");
    let info: FormulaInfo = serde_json::from_value(item).map_err(|e| PartialSkip {
        name: hint.clone(),
        reason: format!("unreadable metadata: {e}"),
    })?;

    let installed = info
        .installed
        .iter()
        .map(|keg| keg.version.as_str())
        .max_by(|a, b| compare_versions(a, b))
        .map(str::to_string)
        .ok_or_else(|| PartialSkip {
            name: Some(info.name.clone()),
            reason: "no installed version reported".to_string(),
        })?;

    Ok(PackageRecord {
        name: info.name,
        kind: PackageKind::Formula,
        installed,
        latest: known_version(info.versions.stable),
        track: Track::Stable,
        prerelease_channel: None,
    })
}

fn parse_cask(item: Value) -> std::result::Result<PackageRecord, PartialSkip> {
    let hint = name_hint(&item, "token");
    let info: CaskInfo = serde_json::from_value(item).map_err(|e| PartialSkip {
        name: hint.clone(),
        reason: format!("unreadable metadata: {e}"),
    })?;

    let installed = info
        .installed
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PartialSkip {
            name: Some(info.token.clone()),
            reason: "no installed version reported".to_string(),
        })?;

    Ok(PackageRecord {
        name: info.token,
        kind: PackageKind::Cask,
        installed,
        latest: known_version(info.version),
        track: Track::Stable,
        prerelease_channel: None,
    })
}

/// Casks that always track upstream report `latest` instead of a version.
fn known_version(version: Option<String>) -> Option<String> {
    version.filter(|v| {
        let v = v.trim();
        !v.is_empty() && !v.eq_ignore_ascii_case("latest")
    })
}

fn assign_track(
    record: &mut PackageRecord,
    matcher: &BetaMatcher,
    channel_packages: Option<&BTreeSet<String>>,
) {
    if matcher.is_channel_name(&record.name) || matcher.is_prerelease_version(&record.installed) {
        record.track = Track::PreRelease;
        return;
    }

    match channel_packages {
        None => record.track = Track::Unknown,
        Some(packages) => {
            record.track = Track::Stable;
            record.prerelease_channel = matcher.find_sibling(&record.name, packages);
        }
    }
}
