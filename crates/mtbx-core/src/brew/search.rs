//! Package browsing: search, package details and the top packages dashboard.

use crate::adapters::{Console, ShellAdapter};
use crate::brew::inventory::PackageKind;
use crate::brew::report::truncate;
use crate::config::BrewConfig;
use crate::error::{MtbxError, Result};
use colored::Colorize;
use serde_json::Value;
use std::collections::HashMap;

/// Descriptions on the dashboard are cut to this many characters.
const DASHBOARD_DESC_WIDTH: usize = 50;

/// Details of one formula or cask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub kind: PackageKind,
    pub name: String,
    pub desc: Option<String>,
    pub homepage: Option<String>,
    pub version: Option<String>,
    /// Installed versions; empty when not installed.
    pub installed: Vec<String>,
}

/// One entry of the top packages dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopPackage {
    pub name: String,
    pub desc: String,
    pub installs: u64,
}

/// Read-only queries against the package catalogue.
pub struct PackageBrowser<'a> {
    shell: &'a dyn ShellAdapter,
    config: &'a BrewConfig,
}

impl<'a> PackageBrowser<'a> {
    pub fn new(shell: &'a dyn ShellAdapter, config: &'a BrewConfig) -> Self {
        Self { shell, config }
    }

    /// Package names matching `term`.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::QueryError` if the search command fails for any
    /// reason other than finding nothing.
    pub fn search(&self, term: &str) -> Result<Vec<String>> {
        let output = self.shell.run(&self.config.executable, &["search", term])?;
        if !output.success() {
            if output.stderr.contains("No formulae or casks found") {
                return Ok(Vec::new());
            }
            return Err(MtbxError::QueryError(format!(
                "search for '{}' failed: {}",
                term,
                output.diagnostic()
            )));
        }
        Ok(parse_search_output(&output.stdout))
    }

    /// Structured details for `name`.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::QueryError` if the command fails or its output is
    /// not JSON.
    pub fn info(&self, name: &str) -> Result<Vec<PackageInfo>> {
        self.info_many(&[name])
    }

    fn info_many(&self, names: &[&str]) -> Result<Vec<PackageInfo>> {
        let mut args = vec!["info", "--json=v2"];
        args.extend_from_slice(names);
        let output = self.shell.run(&self.config.executable, &args)?;
        if !output.success() {
            return Err(MtbxError::QueryError(output.diagnostic()));
        }
        let json: Value = serde_json::from_str(&output.stdout)
            .map_err(|e| MtbxError::QueryError(format!("package info is not valid JSON: {e}")))?;
        Ok(parse_info(&json))
    }

    /// Plain-text details for `name`.
    pub fn info_text(&self, name: &str) -> Result<String> {
        let output = self.shell.run(&self.config.executable, &["info", name])?;
        if !output.success() {
            return Err(MtbxError::QueryError(output.diagnostic()));
        }
        Ok(output.stdout)
    }

    /// Most installed formulae over the last 30 days, by install count.
    ///
    /// # Errors
    ///
    /// Fails if `curl` is missing, the analytics download fails, or either
    /// response cannot be parsed.
    #[tracing::instrument(skip(self))]
    pub fn top_packages(&self, limit: usize) -> Result<Vec<TopPackage>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        if !self.shell.is_available("curl") {
            return Err(MtbxError::ManagerUnavailable("curl".to_string()));
        }

        let output = self
            .shell
            .run("curl", &["-s", &self.config.analytics_url])?;
        if !output.success() {
            return Err(MtbxError::QueryError(format!(
                "analytics download failed: {}",
                output.diagnostic()
            )));
        }
        let analytics: Value = serde_json::from_str(&output.stdout)
            .map_err(|e| MtbxError::QueryError(format!("analytics are not valid JSON: {e}")))?;

        let counts: HashMap<String, u64> = analytics
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .take(limit)
                    .filter_map(|item| {
                        let name = item.get("formula")?.as_str()?;
                        Some((name.to_string(), parse_count(item.get("count")?)?))
                    })
                    .collect()
            })
            .unwrap_or_default();

        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let mut names: Vec<&str> = counts.keys().map(String::as_str).collect();
        names.sort_unstable();
        let details = self.info_many(&names)?;

        let mut top: Vec<TopPackage> = details
            .into_iter()
            .filter(|info| info.kind == PackageKind::Formula)
            .filter_map(|info| {
                let installs = *counts.get(&info.name)?;
                Some(TopPackage {
                    desc: info.desc.unwrap_or_else(|| "No description".to_string()),
                    name: info.name,
                    installs,
                })
            })
            .collect();
        top.sort_by(|a, b| b.installs.cmp(&a.installs).then_with(|| a.name.cmp(&b.name)));

        tracing::debug!(packages = top.len(), "top packages loaded");
        Ok(top)
    }

    /// Prompts for a term, lists matches and offers details for one.
    pub fn search_interactive(&self, console: &mut dyn Console) -> Result<()> {
        let Some(term) = console.prompt("Enter search term")?.filter(|t| !t.is_empty()) else {
            return Ok(());
        };

        let results = match self.search(&term) {
            Ok(results) => results,
            Err(e) => {
                console.print(&format!("{} {}", "Search failed:".red(), e))?;
                return console.pause();
            }
        };

        if results.is_empty() {
            console.print(&"No results found.".yellow().to_string())?;
            return console.pause();
        }

        console.print(&format!("Search results for '{}'", term).bold().to_string())?;
        for (idx, name) in results.iter().enumerate() {
            console.print(&format!("{:>4}  {}", idx + 1, name.cyan()))?;
        }

        let choice = console.prompt("Enter number to see info (or Enter to go back)")?;
        let picked = choice
            .as_deref()
            .and_then(|c| c.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| results.get(idx));
        match picked {
            Some(name) => self.show_info(console, name),
            None => Ok(()),
        }
    }

    /// Prompts for a package name and shows its details.
    pub fn info_interactive(&self, console: &mut dyn Console) -> Result<()> {
        match console.prompt("Enter package name to look up")? {
            Some(name) if !name.is_empty() => self.show_info(console, &name),
            _ => Ok(()),
        }
    }

    /// Shows details for `name` as panels, falling back to plain text.
    pub fn show_info(&self, console: &mut dyn Console, name: &str) -> Result<()> {
        console.print(&format!("Info: {}", name).cyan().bold().to_string())?;

        match self.info(name) {
            Ok(packages) if !packages.is_empty() => {
                for package in &packages {
                    render_panel(console, package)?;
                }
            }
            result => {
                if let Err(e) = result {
                    tracing::debug!(package = name, error = %e, "structured info unavailable");
                }
                match self.info_text(name) {
                    Ok(text) => console.print(text.trim_end())?,
                    Err(e) => {
                        console.print(&format!("{} {}", "Failed to fetch info:".red(), e))?
                    }
                }
            }
        }

        console.pause()
    }
}

/// Prints the top packages dashboard.
pub fn render_top_packages(console: &mut dyn Console, top: &[TopPackage]) -> Result<()> {
    if top.is_empty() {
        return Ok(());
    }
    console.print(&" TOP PACKAGES (30 DAYS) ".white().on_magenta().bold().to_string())?;
    for (idx, package) in top.iter().enumerate() {
        console.print(&format!(
            "{:>4}  {}  {:<width$}  {}",
            idx + 1,
            format!("{:<20}", package.name).cyan().bold(),
            truncate(&package.desc, DASHBOARD_DESC_WIDTH),
            format!("{:>12}", group_thousands(package.installs)).green(),
            width = DASHBOARD_DESC_WIDTH,
        ))?;
    }
    console.print("")
}

fn render_panel(console: &mut dyn Console, package: &PackageInfo) -> Result<()> {
    let title = match package.kind {
        PackageKind::Formula => format!("Formula: {}", package.name).green().bold(),
        PackageKind::Cask => format!("Cask: {}", package.name).magenta().bold(),
    };
    let installed = if package.installed.is_empty() {
        "No".to_string()
    } else {
        package.installed.join(", ")
    };
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    console.print(&format!("┌ {}", title))?;
    console.print(&format!("│ {} {}", "Name:".bold(), package.name))?;
    console.print(&format!("│ {} {}", "Desc:".bold(), or_dash(&package.desc)))?;
    console.print(&format!("│ {} {}", "Homepage:".bold(), or_dash(&package.homepage)))?;
    console.print(&format!("│ {} {}", "Version:".bold(), or_dash(&package.version)))?;
    console.print(&format!("│ {} {}", "Installed:".bold(), installed))?;
    console.print("└")
}

/// Splits `brew search` output into package names.
pub fn parse_search_output(stdout: &str) -> Vec<String> {
    stdout
        .split_whitespace()
        .filter(|token| !matches!(*token, "==>" | "Formulae" | "Casks"))
        .map(str::to_string)
        .collect()
}

fn parse_info(json: &Value) -> Vec<PackageInfo> {
    let text = |v: &Value, key: &str| v.get(key).and_then(Value::as_str).map(str::to_string);
    let mut packages = Vec::new();

    for f in json.get("formulae").and_then(Value::as_array).into_iter().flatten() {
        let Some(name) = text(f, "name") else { continue };
        let installed = f
            .get("installed")
            .and_then(Value::as_array)
            .map(|kegs| kegs.iter().filter_map(|k| text(k, "version")).collect())
            .unwrap_or_default();
        packages.push(PackageInfo {
            kind: PackageKind::Formula,
            name,
            desc: text(f, "desc"),
            homepage: text(f, "homepage"),
            version: f.get("versions").and_then(|v| text(v, "stable")),
            installed,
        });
    }

    for c in json.get("casks").and_then(Value::as_array).into_iter().flatten() {
        let Some(name) = text(c, "token") else { continue };
        packages.push(PackageInfo {
            kind: PackageKind::Cask,
            name,
            desc: text(c, "desc"),
            homepage: text(c, "homepage"),
            version: text(c, "version"),
            installed: text(c, "installed").into_iter().collect(),
        });
    }

    packages
}

/// Install counts arrive as numbers or as strings with thousands separators.
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::console_mock::ScriptedConsole;
    use crate::adapters::shell_mock::MockShellAdapter;

    const ANALYTICS: &str = r#"{"items": [
        {"number": 1, "formula": "openssl@3", "count": "1,200,000"},
        {"number": 2, "formula": "ca-certificates", "count": "900,500"},
        {"number": 3, "formula": "zstd", "count": 2000000},
        {"number": 4, "formula": "ignored", "count": "1"}
    ]}"#;

    const TOP_INFO: &str = r#"{"formulae": [
        {"name": "ca-certificates", "desc": "Mozilla CA bundle"},
        {"name": "openssl@3", "desc": "Cryptography toolkit"},
        {"name": "zstd"}
    ], "casks": []}"#;

    #[test]
    fn test_parse_search_output_drops_headings() {
        let out = "==> Formulae\nwget  wget2\n\n==> Casks\nwireshark\n";
        assert_eq!(parse_search_output(out), ["wget", "wget2", "wireshark"]);
    }

    #[test]
    fn test_search_with_no_matches_is_empty() {
        let shell = MockShellAdapter::new();
        shell.set_failure("brew search zzz", 1, "Error: No formulae or casks found for zzz.");
        let config = BrewConfig::default();

        let results = PackageBrowser::new(&shell, &config).search("zzz").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_top_packages_sorted_by_installs() {
        let shell = MockShellAdapter::new();
        shell.mark_available("curl");
        let config = BrewConfig::default();
        shell.set_stdout(&format!("curl -s {}", config.analytics_url), ANALYTICS);
        shell.set_stdout(
            "brew info --json=v2 ca-certificates openssl@3 zstd",
            TOP_INFO,
        );

        let top = PackageBrowser::new(&shell, &config).top_packages(3).unwrap();

        let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["zstd", "openssl@3", "ca-certificates"]);
        assert_eq!(top[1].installs, 1_200_000);
        assert_eq!(top[0].desc, "No description");
    }

    #[test]
    fn test_top_packages_needs_curl() {
        let shell = MockShellAdapter::with_success();
        let config = BrewConfig::default();

        assert!(PackageBrowser::new(&shell, &config).top_packages(10).is_err());
        assert!(shell.get_history().is_empty());
    }

    #[test]
    fn test_show_info_renders_panels() {
        let shell = MockShellAdapter::new();
        shell.set_stdout(
            "brew info --json=v2 wget",
            r#"{"formulae": [{"name": "wget", "desc": "Internet file retriever",
                "homepage": "https://www.gnu.org/software/wget/",
                "versions": {"stable": "1.25.0"}, "installed": [{"version": "1.24.5"}]}],
               "casks": []}"#,
        );
        let config = BrewConfig::default();
        let mut console = ScriptedConsole::new([""]);

        PackageBrowser::new(&shell, &config)
            .show_info(&mut console, "wget")
            .unwrap();

        assert!(console.contains("Internet file retriever"));
        assert!(console.contains("1.25.0"));
        assert!(console.contains("1.24.5"));
        assert_eq!(shell.command_count("brew info wget"), 0);
    }

    #[test]
    fn test_show_info_falls_back_to_text() {
        let shell = MockShellAdapter::new();
        shell.set_stdout("brew info --json=v2 odd", r#"{"formulae": [], "casks": []}"#);
        shell.set_stdout("brew info odd", "odd: stable 0.1\n");
        let config = BrewConfig::default();
        let mut console = ScriptedConsole::new([""]);

        PackageBrowser::new(&shell, &config)
            .show_info(&mut console, "odd")
            .unwrap();

        assert!(console.contains("odd: stable 0.1"));
    }

    #[test]
    fn test_search_interactive_picks_result() {
        let shell = MockShellAdapter::new();
        shell.set_stdout("brew search wget", "wget\nwget2\n");
        shell.set_stdout("brew info --json=v2 wget2", r#"{"formulae": [{"name": "wget2"}]}"#);
        let config = BrewConfig::default();
        let mut console = ScriptedConsole::new(["wget", "2", ""]);

        PackageBrowser::new(&shell, &config)
            .search_interactive(&mut console)
            .unwrap();

        assert!(console.contains("Formula: wget2"));
        assert_eq!(console.remaining_inputs(), 0);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
