//! Update planning.
//!
//! Selects the outdated packages of an audit into an ordered, deduplicated
//! plan. Planning runs no commands; the only interaction is the operator's
//! confirmation.

use crate::adapters::Console;
use crate::brew::classify::{ClassifiedPackage, Classification};
use crate::brew::inventory::PackageKind;
use crate::error::Result;
use std::collections::HashSet;

/// One package selected for update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// Formula name or cask token.
    pub name: String,

    /// Selects the formula or cask upgrade form.
    pub kind: PackageKind,
}

/// Ordered set of packages to update plus the operator's decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    /// Entries sorted by name, at most one per name.
    pub entries: Vec<PlanEntry>,

    /// Whether the operator approved the plan.
    pub confirmed: bool,
}

impl UpdatePlan {
    /// Package names in plan order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Number of planned packages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is planned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Asks the operator to approve the plan.
    ///
    /// An empty plan is never prompted for and stays unconfirmed.
    pub fn confirm(&mut self, console: &mut dyn Console) -> Result<bool> {
        if self.entries.is_empty() {
            self.confirmed = false;
            return Ok(false);
        }

        let question = format!("Update {} package(s)?", self.entries.len());
        self.confirmed = console.confirm(&question)?;
        tracing::info!(
            packages = self.entries.len(),
            confirmed = self.confirmed,
            "update plan decision"
        );
        Ok(self.confirmed)
    }
}

/// Builds the update plan from classified packages.
///
/// Keeps only `Outdated` packages, drops repeated names (the first
/// occurrence wins) and sorts by name. The result is unconfirmed.
pub fn plan(packages: &[ClassifiedPackage]) -> UpdatePlan {
    let mut seen = HashSet::new();
    let mut entries: Vec<PlanEntry> = packages
        .iter()
        .filter(|p| p.classification == Classification::Outdated)
        .filter(|p| seen.insert(p.record.name.clone()))
        .map(|p| PlanEntry {
            name: p.record.name.clone(),
            kind: p.record.kind,
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    UpdatePlan {
        entries,
        confirmed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::console_mock::ScriptedConsole;
    use crate::brew::inventory::{PackageRecord, Track};

    fn classified(name: &str, kind: PackageKind, classification: Classification) -> ClassifiedPackage {
        ClassifiedPackage {
            record: PackageRecord {
                name: name.to_string(),
                kind,
                installed: "1.0".to_string(),
                latest: Some("2.0".to_string()),
                track: Track::Stable,
                prerelease_channel: None,
            },
            classification,
        }
    }

    #[test]
    fn test_plan_dedupes_and_sorts() {
        let packages = vec![
            classified("zlib", PackageKind::Formula, Classification::Outdated),
            classified("abc", PackageKind::Formula, Classification::Outdated),
            classified("abc", PackageKind::Cask, Classification::Outdated),
        ];

        let plan = plan(&packages);
        assert_eq!(plan.names(), ["abc", "zlib"]);
        assert_eq!(plan.entries[0].kind, PackageKind::Formula);
        assert!(!plan.confirmed);
    }

    #[test]
    fn test_plan_selects_only_outdated() {
        let packages = vec![
            classified("git", PackageKind::Formula, Classification::Current),
            classified("firefox", PackageKind::Cask, Classification::PreReleaseAvailable),
            classified("wget", PackageKind::Formula, Classification::Outdated),
        ];

        assert_eq!(plan(&packages).names(), ["wget"]);
    }

    #[test]
    fn test_confirm_accepts_yes() {
        let packages = vec![classified("wget", PackageKind::Formula, Classification::Outdated)];
        let mut plan = plan(&packages);
        let mut console = ScriptedConsole::new(["Y"]);

        assert!(plan.confirm(&mut console).unwrap());
        assert!(plan.confirmed);
        assert_eq!(console.prompts(), ["Update 1 package(s)? [y/n]"]);
    }

    #[test]
    fn test_confirm_declines_on_other_input_and_eof() {
        let packages = vec![classified("wget", PackageKind::Formula, Classification::Outdated)];

        let mut plan_a = plan(&packages);
        assert!(!plan_a.confirm(&mut ScriptedConsole::new(["maybe"])).unwrap());

        let mut plan_b = plan(&packages);
        assert!(!plan_b.confirm(&mut ScriptedConsole::default()).unwrap());
        assert!(!plan_b.confirmed);
    }

    #[test]
    fn test_empty_plan_is_not_prompted() {
        let mut plan = plan(&[]);
        let mut console = ScriptedConsole::new(["y"]);

        assert!(!plan.confirm(&mut console).unwrap());
        assert!(console.prompts().is_empty());
    }
}
