//! Beta swap selection.
//!
//! A stable package whose channel package was found by the inventory can be
//! replaced by it. The operator picks swaps by name, `all` or `no`; the
//! executor then uninstalls the stable package and installs the channel one.

use crate::adapters::Console;
use crate::brew::classify::ClassifiedPackage;
use crate::brew::inventory::{PackageKind, Track};
use crate::error::Result;
use colored::Colorize;
use std::collections::HashSet;

/// An installed stable package and the channel package that can replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCandidate {
    /// Installed stable package.
    pub name: String,

    /// Formula or cask; the channel package is installed the same way.
    pub kind: PackageKind,

    /// Channel package, e.g. `firefox@beta`.
    pub channel: String,
}

impl SwapCandidate {
    /// Removes the stable package. `--force` clears leftover app directories.
    pub fn uninstall_args(&self) -> Vec<&str> {
        vec!["uninstall", "--force", self.name.as_str()]
    }

    /// Installs the channel package.
    pub fn install_args(&self) -> Vec<&str> {
        match self.kind {
            PackageKind::Cask => vec!["install", "--cask", self.channel.as_str()],
            PackageKind::Formula => vec!["install", self.channel.as_str()],
        }
    }

    /// `name -> channel`, as shown to the operator.
    pub fn label(&self) -> String {
        format!("{} -> {}", self.name, self.channel)
    }
}

/// Collects the swap candidates of an audit, one per name, sorted by name.
pub fn swap_candidates(packages: &[ClassifiedPackage]) -> Vec<SwapCandidate> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<SwapCandidate> = packages
        .iter()
        .filter(|p| p.record.track != Track::PreRelease)
        .filter_map(|p| {
            let channel = p.record.prerelease_channel.clone()?;
            Some(SwapCandidate {
                name: p.record.name.clone(),
                kind: p.record.kind,
                channel,
            })
        })
        .filter(|c| seen.insert(c.name.clone()))
        .collect();

    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    candidates
}

/// Picks the swaps named by the operator's answer.
///
/// `all` selects every candidate; an empty answer, `no`, `none` or `n`
/// selects nothing. Otherwise the answer is a space separated list of
/// package or channel names. Returns the selection in candidate order and
/// the tokens that matched no candidate.
pub fn select_swaps<'a>(
    candidates: &'a [SwapCandidate],
    answer: &str,
) -> (Vec<&'a SwapCandidate>, Vec<String>) {
    let answer = answer.trim();
    match answer.to_ascii_lowercase().as_str() {
        "all" => return (candidates.iter().collect(), Vec::new()),
        "" | "no" | "none" | "n" => return (Vec::new(), Vec::new()),
        _ => {}
    }

    let targets: Vec<&str> = answer.split_whitespace().collect();
    let selected = candidates
        .iter()
        .filter(|c| targets.contains(&c.name.as_str()) || targets.contains(&c.channel.as_str()))
        .collect();
    let unmatched = targets
        .into_iter()
        .filter(|t| !candidates.iter().any(|c| c.name == *t || c.channel == *t))
        .map(str::to_string)
        .collect();
    (selected, unmatched)
}

/// Lists the candidates and asks which ones to swap.
///
/// Nothing is asked when there are no candidates. End of input selects
/// nothing.
pub fn prompt_swaps(
    console: &mut dyn Console,
    candidates: &[SwapCandidate],
) -> Result<Vec<SwapCandidate>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    console.print("")?;
    console.print(
        &format!("Found {} possible beta swap(s).", candidates.len())
            .green()
            .bold()
            .to_string(),
    )?;
    for candidate in candidates {
        console.print(&format!("  {}", candidate.label()))?;
    }
    console.print(&"Type names to swap (space separated), 'all', or 'no'".dimmed().to_string())?;

    let answer = console.prompt("Selection")?.unwrap_or_default();
    let (selected, unmatched) = select_swaps(candidates, &answer);
    for token in &unmatched {
        console.print(&format!("Not a swap candidate: '{}'", token).yellow().to_string())?;
    }

    tracing::info!(
        candidates = candidates.len(),
        selected = selected.len(),
        "beta swap decision"
    );
    Ok(selected.into_iter().cloned().collect())
}
