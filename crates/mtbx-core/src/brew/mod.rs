//! Homebrew maintenance tool.
//!
//! The audit pipeline runs inventory, classification, planning and execution
//! in that order:
//!
//! ```text
//! PackageInventory -> classify -> plan + swap selection -> UpdateExecutor -> report
//! ```
//!
//! The tool also offers package search and details from its own sub-menu.

pub mod classify;
pub mod execute;
pub mod inventory;
pub mod plan;
pub mod report;
pub mod search;
pub mod swap;

use crate::adapters::{Console, ShellAdapter};
use crate::config::BrewConfig;
use crate::error::{MtbxError, Result};
use crate::registry::{Tool, ToolDescriptor};
use colored::Colorize;
use std::sync::Arc;

pub use classify::{Classification, ClassifiedPackage, classify, classify_all, compare_versions};
pub use execute::{SwapOutcome, UpdateExecutor, UpdateOutcome, UpdateReport, UpdateStatus};
pub use inventory::{Inventory, PackageInventory, PackageKind, PackageRecord, SkippedPackage, Track};
pub use plan::{PlanEntry, UpdatePlan, plan};
pub use search::{PackageBrowser, PackageInfo, TopPackage};
pub use swap::{SwapCandidate, select_swaps, swap_candidates};

const INSTALL_HINT: &str = r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#;

/// The Brew Manager console tool.
pub struct BrewManager {
    shell: Arc<dyn ShellAdapter>,
    config: BrewConfig,
}

impl BrewManager {
    /// Creates the tool over `shell` with the given settings.
    pub fn new(shell: Arc<dyn ShellAdapter>, config: BrewConfig) -> Self {
        Self { shell, config }
    }

    /// Audits installed packages and applies the updates the operator approves.
    ///
    /// Steps: refresh definitions, take the inventory, print the audit table,
    /// plan the outdated packages and ask for confirmation, offer the beta
    /// swaps, execute, and print the report. A failed refresh, cleanup or
    /// doctor run is reported but does not stop the run.
    ///
    /// # Errors
    ///
    /// Returns `MtbxError::ManagerUnavailable` or `MtbxError::QueryError` when
    /// no inventory can be taken; nothing is planned or run in that case.
    #[tracing::instrument(skip_all, fields(dry_run = self.config.dry_run))]
    pub fn audit_and_update(&self, console: &mut dyn Console) -> Result<UpdateReport> {
        let shell = self.shell.as_ref();
        let inventory = PackageInventory::new(shell, &self.config);
        inventory.ensure_available()?;

        if self.config.refresh_before_audit {
            console.print("Refreshing package definitions...")?;
            self.run_step(console, &["update"], "Definition refresh failed")?;
        }

        let Inventory { records, skipped } = inventory.list_installed()?;
        let classified = classify_all(records);
        report::render_audit(console, &classified)?;
        console.print("")?;

        let mut plan = plan(&classified);
        if plan.is_empty() {
            console.print(&"System is up to date.".dimmed().to_string())?;
        } else {
            console.print(&format!(
                "Planned updates: {}",
                plan.names().join(", ").yellow()
            ))?;
            if !plan.confirm(console)? {
                console.print(&"Updates skipped.".red().to_string())?;
            }
        }

        let swaps = swap::prompt_swaps(console, &swap_candidates(&classified))?;

        let executor = UpdateExecutor::new(shell, &self.config);
        let has_work = plan.confirmed || !swaps.is_empty();
        if self.config.dry_run && has_work {
            console.print(&"[Dry Run] Commands that would run:".yellow().to_string())?;
            for command in executor.dry_run_commands(&plan, &swaps) {
                console.print(&format!("  {}", command.cyan()))?;
            }
        } else if has_work {
            console.print(&"Executing updates...".green().to_string())?;
        }

        let report = executor.run(&plan, &swaps, skipped);
        report::render_report(console, &report)?;

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            "audit finished"
        );
        Ok(report)
    }

    fn run_step(&self, console: &mut dyn Console, args: &[&str], failure: &str) -> Result<()> {
        let diagnostic = match self.shell.run_interactive(&self.config.executable, args) {
            Ok(output) if output.success() => return Ok(()),
            Ok(output) => output.diagnostic(),
            Err(e) => e.to_string(),
        };
        tracing::warn!(step = ?args, error = %diagnostic, "{failure}");
        console.print(&format!("{} {}", format!("{failure}:").yellow(), diagnostic))
    }

    fn render_menu(&self, console: &mut dyn Console, top: &[TopPackage]) -> Result<()> {
        console.clear()?;
        console.print(&" Brew Manager ".white().on_magenta().bold().to_string())?;
        console.print("")?;
        search::render_top_packages(console, top)?;
        console.print(&format!("[1] {} (Check for updates, betas)", "Audit & Update".cyan().bold()))?;
        console.print(&format!("[2] {} (Find new apps)", "Search Packages".green().bold()))?;
        console.print(&format!("[3] {} (Details)", "Package Info".yellow().bold()))?;
        console.print("[Enter] Return to Main Menu")
    }

    fn load_dashboard(&self) -> Vec<TopPackage> {
        if self.config.top_packages == 0 {
            return Vec::new();
        }
        PackageBrowser::new(self.shell.as_ref(), &self.config)
            .top_packages(self.config.top_packages)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "top packages unavailable");
                Vec::new()
            })
    }
}

impl Tool for BrewManager {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("Brew Manager", "Updates, Betas, Cleanup, Search")
            .with_glyph("🍺")
            .with_order(1)
    }

    fn run(&self, console: &mut dyn Console) -> Result<()> {
        let shell = self.shell.as_ref();
        if let Err(e) = PackageInventory::new(shell, &self.config).ensure_available() {
            tracing::warn!(error = %e, "package manager missing");
            console.print(&"Homebrew is not installed!".red().bold().to_string())?;
            console.print("Install it with:")?;
            console.print(&INSTALL_HINT.cyan().to_string())?;
            return console.pause();
        }

        let top = self.load_dashboard();
        let browser = PackageBrowser::new(shell, &self.config);

        loop {
            self.render_menu(console, &top)?;
            let choice = console.prompt("Select Option")?;
            match choice.as_deref() {
                Some("1") => {
                    if let Err(e) = self.audit_and_update(console) {
                        if matches!(e, MtbxError::Io(_)) {
                            return Err(e);
                        }
                        console.print(&format!("{} {}", "Audit failed:".red().bold(), e))?;
                    }
                    console.pause()?;
                }
                Some("2") => browser.search_interactive(console)?,
                Some("3") => browser.info_interactive(console)?,
                None | Some("") => return Ok(()),
                Some(other) => {
                    console.print(&format!("Invalid selection: '{}'", other).yellow().to_string())?;
                    console.pause()?;
                }
            }
        }
    }
}
