//! Console rendering for the audit table and the update report.

use crate::adapters::Console;
use crate::brew::classify::{Classification, ClassifiedPackage};
use crate::brew::execute::{UpdateReport, UpdateStatus};
use crate::error::Result;
use colored::Colorize;

/// Longest version string shown in the audit table.
pub const MAX_VERSION_WIDTH: usize = 25;

/// Shortens `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Sorts packages into audit order: outdated, pre-release, current, then name.
pub fn audit_order(packages: &[ClassifiedPackage]) -> Vec<&ClassifiedPackage> {
    let mut rows: Vec<&ClassifiedPackage> = packages.iter().collect();
    rows.sort_by(|a, b| {
        a.classification
            .priority()
            .cmp(&b.classification.priority())
            .then_with(|| a.record.name.cmp(&b.record.name))
    });
    rows
}

/// Prints the audit table for all classified packages.
pub fn render_audit(console: &mut dyn Console, packages: &[ClassifiedPackage]) -> Result<()> {
    console.print(&" PACKAGE AUDIT ".white().on_blue().bold().to_string())?;

    if packages.is_empty() {
        console.print("No installed packages found.")?;
        return Ok(());
    }

    let rows = audit_order(packages);
    let name_width = rows
        .iter()
        .map(|p| p.record.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("PACKAGE".len());

    console.print(
        &format!(
            "{:<name_width$}  {:<7}  {:<vw$}  {:<vw$}  {:<11}  {}",
            "PACKAGE",
            "KIND",
            "INSTALLED",
            "LATEST",
            "STATUS",
            "BETA",
            vw = MAX_VERSION_WIDTH,
        )
        .bold()
        .to_string(),
    )?;

    for p in rows {
        let latest = p.record.latest.as_deref().unwrap_or("-");
        let status = format!("{:<11}", p.classification.as_str());
        let status = match p.classification {
            Classification::Outdated => status.red().bold(),
            Classification::PreReleaseAvailable => status.magenta(),
            Classification::Current => status.green(),
        };
        console.print(&format!(
            "{:<name_width$}  {:<7}  {:<vw$}  {:<vw$}  {}  {}",
            p.record.name,
            p.record.kind.as_str(),
            truncate(&p.record.installed, MAX_VERSION_WIDTH),
            truncate(latest, MAX_VERSION_WIDTH),
            status,
            p.record.prerelease_channel.as_deref().unwrap_or(""),
            vw = MAX_VERSION_WIDTH,
        ))?;
    }

    let count = |c: Classification| packages.iter().filter(|p| p.classification == c).count();
    console.print("")?;
    console.print(&format!(
        "{} outdated, {} pre-release, {} current",
        count(Classification::Outdated),
        count(Classification::PreReleaseAvailable),
        count(Classification::Current)
    ))?;
    Ok(())
}

/// Prints the session report of an audit-and-update run.
pub fn render_report(console: &mut dyn Console, report: &UpdateReport) -> Result<()> {
    console.print("")?;
    console.print(&" UPDATE SUMMARY ".white().on_blue().bold().to_string())?;

    for outcome in &report.outcomes {
        match &outcome.status {
            UpdateStatus::Succeeded => {
                console.print(&format!("{} {}", "✔".green(), outcome.package))?;
            }
            UpdateStatus::Failed { diagnostic } => {
                console.print(&format!(
                    "{} {}: {}",
                    "✘".red(),
                    outcome.package,
                    diagnostic.lines().next().unwrap_or_default()
                ))?;
            }
        }
    }

    for swap in &report.swaps {
        let label = format!("{} -> {}", swap.package, swap.channel);
        match &swap.status {
            UpdateStatus::Succeeded => console.print(&format!("{} {}", "✔".green(), label))?,
            UpdateStatus::Failed { diagnostic } => console.print(&format!(
                "{} {}: {}",
                "✘".red(),
                label,
                diagnostic.lines().next().unwrap_or_default()
            ))?,
        }
    }

    for name in &report.dry_run {
        console.print(&format!("{} {} (dry run)", "-".yellow(), name))?;
    }

    for skipped in &report.unknown {
        console.print(&format!(
            "{} {}: unknown ({})",
            "?".yellow(),
            skipped.name,
            skipped.reason
        ))?;
    }

    match &report.cleanup {
        Some(UpdateStatus::Succeeded) => console.print("Cleanup finished.")?,
        Some(UpdateStatus::Failed { diagnostic }) => {
            console.print(&format!("{} {}", "Cleanup failed:".yellow(), diagnostic))?
        }
        None => {}
    }

    match &report.doctor {
        Some(UpdateStatus::Succeeded) => console.print("Doctor found no problems.")?,
        Some(UpdateStatus::Failed { diagnostic }) => console.print(&format!(
            "{} {}",
            "Doctor reported problems:".yellow(),
            diagnostic.lines().next().unwrap_or_default()
        ))?,
        None => {}
    }

    let elapsed = report.finished_at - report.started_at;
    console.print(&format!(
        "Succeeded: {}  Failed: {}  Skipped: {}  ({}s, finished {})",
        report.succeeded().to_string().green(),
        report.failed().to_string().red(),
        report.skipped().to_string().yellow(),
        elapsed.num_seconds(),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ))?;
    Ok(())
}
