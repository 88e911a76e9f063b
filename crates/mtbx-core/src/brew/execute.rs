//! Update execution.
//!
//! Runs a confirmed plan one package at a time, then the selected beta
//! swaps. A failed upgrade or swap is recorded and the next one still runs.

use crate::adapters::{CommandOutput, ShellAdapter};
use crate::adapters::shell::command_line;
use crate::brew::inventory::{PackageKind, SkippedPackage};
use crate::brew::plan::{PlanEntry, UpdatePlan};
use crate::brew::swap::SwapCandidate;
use crate::config::BrewConfig;
use crate::error::{MtbxError, Result};
use chrono::{DateTime, Utc};

/// Result of one upgrade attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The command exited with status 0.
    Succeeded,

    /// The command failed or could not be spawned.
    Failed { diagnostic: String },
}

/// Outcome of updating one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Upgraded package.
    pub package: String,

    /// Upgrade result.
    pub status: UpdateStatus,
}

impl UpdateOutcome {
    /// Whether the upgrade succeeded.
    pub fn succeeded(&self) -> bool {
        self.status == UpdateStatus::Succeeded
    }

    /// The failure as an error value, if the upgrade failed.
    pub fn error(&self) -> Option<MtbxError> {
        match &self.status {
            UpdateStatus::Succeeded => None,
            UpdateStatus::Failed { diagnostic } => Some(MtbxError::UpdateFailure {
                package: self.package.clone(),
                diagnostic: diagnostic.clone(),
            }),
        }
    }
}

/// Outcome of replacing one stable package by its channel package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Stable package that was removed.
    pub package: String,

    /// Channel package that replaces it.
    pub channel: String,

    /// Failed when either the uninstall or the install failed.
    pub status: UpdateStatus,
}

impl SwapOutcome {
    /// Whether the channel package is now installed.
    pub fn succeeded(&self) -> bool {
        self.status == UpdateStatus::Succeeded
    }
}

/// Session report of one audit-and-update run.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Upgrade outcomes in plan order.
    pub outcomes: Vec<UpdateOutcome>,

    /// Packages left out during inventory, reported as "unknown".
    pub unknown: Vec<SkippedPackage>,

    /// Beta swap outcomes in selection order.
    pub swaps: Vec<SwapOutcome>,

    /// Packages and swaps planned but not run because of dry run.
    pub dry_run: Vec<String>,

    /// Result of the post-update cleanup, if it ran.
    pub cleanup: Option<UpdateStatus>,

    /// Result of `brew doctor`, if it ran.
    pub doctor: Option<UpdateStatus>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl UpdateReport {
    /// Starts an empty report stamped with the current time.
    pub fn begin(unknown: Vec<SkippedPackage>) -> Self {
        let now = Utc::now();
        Self {
            outcomes: Vec::new(),
            unknown,
            swaps: Vec::new(),
            dry_run: Vec::new(),
            cleanup: None,
            doctor: None,
            started_at: now,
            finished_at: now,
        }
    }

    /// Upgrades and swaps that succeeded.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
            + self.swaps.iter().filter(|s| s.succeeded()).count()
    }

    /// Upgrades and swaps that failed.
    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// Upgrades and swaps that were run.
    pub fn attempted(&self) -> usize {
        self.outcomes.len() + self.swaps.len()
    }

    /// Packages that were neither upgraded nor attempted.
    pub fn skipped(&self) -> usize {
        self.unknown.len() + self.dry_run.len()
    }

    fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}

/// Single-package upgrade arguments for `entry`.
pub fn upgrade_args<'a>(entry: &'a PlanEntry, greedy: bool) -> Vec<&'a str> {
    let mut args = vec!["upgrade"];
    if entry.kind == PackageKind::Cask {
        args.push("--cask");
        if greedy {
            args.push("--greedy");
        }
    }
    args.push(&entry.name);
    args
}

/// Runs update plans through the package manager.
pub struct UpdateExecutor<'a> {
    shell: &'a dyn ShellAdapter,
    config: &'a BrewConfig,
}

impl<'a> UpdateExecutor<'a> {
    /// Creates an executor running `config.executable` through `shell`.
    pub fn new(shell: &'a dyn ShellAdapter, config: &'a BrewConfig) -> Self {
        Self { shell, config }
    }

    /// Upgrades each planned package in order.
    ///
    /// An unconfirmed plan runs nothing and yields no outcomes. Every
    /// package gets exactly one outcome; a failure never stops the rest.
    #[tracing::instrument(skip_all, fields(packages = plan.len(), confirmed = plan.confirmed))]
    pub fn execute(&self, plan: &UpdatePlan) -> Vec<UpdateOutcome> {
        if !plan.confirmed {
            return Vec::new();
        }

        plan.entries
            .iter()
            .map(|entry| {
                let args = upgrade_args(entry, self.config.greedy);
                let status = status_of(self.shell.run(&self.config.executable, &args));
                let outcome = UpdateOutcome {
                    package: entry.name.clone(),
                    status,
                };
                match outcome.error() {
                    None => tracing::info!(package = %entry.name, "package updated"),
                    Some(err) => tracing::warn!(error = %err, "package update failed"),
                }
                outcome
            })
            .collect()
    }

    /// Replaces each selected package by its channel package.
    ///
    /// The stable package is uninstalled first; when that fails the channel
    /// package is not installed. Every swap gets exactly one outcome.
    #[tracing::instrument(skip_all, fields(swaps = swaps.len()))]
    pub fn swap(&self, swaps: &[SwapCandidate]) -> Vec<SwapOutcome> {
        swaps
            .iter()
            .map(|candidate| {
                let status = self.swap_one(candidate);
                match &status {
                    UpdateStatus::Succeeded => {
                        tracing::info!(package = %candidate.name, channel = %candidate.channel, "package swapped");
                    }
                    UpdateStatus::Failed { diagnostic } => {
                        tracing::warn!(package = %candidate.name, error = %diagnostic, "package swap failed");
                    }
                }
                SwapOutcome {
                    package: candidate.name.clone(),
                    channel: candidate.channel.clone(),
                    status,
                }
            })
            .collect()
    }

    /// Executes `plan`, the selected swaps and the follow-up steps into a
    /// report.
    ///
    /// Cleanup runs after at least one success; `brew doctor` runs after
    /// anything was attempted. With dry run enabled nothing runs and every
    /// planned package and swap is recorded as skipped.
    pub fn run(
        &self,
        plan: &UpdatePlan,
        swaps: &[SwapCandidate],
        unknown: Vec<SkippedPackage>,
    ) -> UpdateReport {
        let mut report = UpdateReport::begin(unknown);

        if self.config.dry_run {
            if plan.confirmed {
                report.dry_run = plan.names().into_iter().map(str::to_string).collect();
            }
            report.dry_run.extend(swaps.iter().map(SwapCandidate::label));
        } else {
            report.outcomes = self.execute(plan);
            report.swaps = self.swap(swaps);
            if self.config.cleanup_after_update && report.succeeded() > 0 {
                report.cleanup = Some(self.post_step(&["cleanup", "-s"]));
            }
            if self.config.doctor_after_update && report.attempted() > 0 {
                report.doctor = Some(self.post_step(&["doctor"]));
            }
        }

        report.finish();
        report
    }

    /// Commands a dry run would execute: one line per planned package, then
    /// two per swap.
    pub fn dry_run_commands(&self, plan: &UpdatePlan, swaps: &[SwapCandidate]) -> Vec<String> {
        let exe = &self.config.executable;
        let mut commands: Vec<String> = if plan.confirmed {
            plan.entries
                .iter()
                .map(|entry| command_line(exe, &upgrade_args(entry, self.config.greedy)))
                .collect()
        } else {
            Vec::new()
        };
        for candidate in swaps {
            commands.push(command_line(exe, &candidate.uninstall_args()));
            commands.push(command_line(exe, &candidate.install_args()));
        }
        commands
    }

    fn swap_one(&self, candidate: &SwapCandidate) -> UpdateStatus {
        let exe = &self.config.executable;
        if let UpdateStatus::Failed { diagnostic } = status_of(self.shell.run(exe, &candidate.uninstall_args())) {
            return UpdateStatus::Failed {
                diagnostic: format!("uninstall failed: {diagnostic}"),
            };
        }
        match status_of(self.shell.run(exe, &candidate.install_args())) {
            UpdateStatus::Succeeded => UpdateStatus::Succeeded,
            UpdateStatus::Failed { diagnostic } => UpdateStatus::Failed {
                diagnostic: format!("{} removed but install failed: {diagnostic}", candidate.name),
            },
        }
    }

    fn post_step(&self, args: &[&str]) -> UpdateStatus {
        let status = status_of(self.shell.run_interactive(&self.config.executable, args));
        if let UpdateStatus::Failed { diagnostic } = &status {
            tracing::warn!(step = ?args, error = %diagnostic, "post-update step failed");
        }
        status
    }
}

fn status_of(result: Result<CommandOutput>) -> UpdateStatus {
    match result {
        Ok(output) if output.success() => UpdateStatus::Succeeded,
        Ok(output) => UpdateStatus::Failed {
            diagnostic: output.diagnostic(),
        },
        Err(e) => UpdateStatus::Failed {
            diagnostic: e.to_string(),
        },
    }
}
