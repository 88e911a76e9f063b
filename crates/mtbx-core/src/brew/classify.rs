//! Version classification.
//!
//! Pure functions, no I/O: a package is classified from its installed
//! version, its latest known version and its release track.

use crate::brew::inventory::{PackageRecord, Track};
use std::cmp::Ordering;
use std::fmt;

/// Classification of one installed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Installed version is the latest known, or staleness cannot be shown.
    Current,

    /// A newer version is available.
    Outdated,

    /// The package itself is on a pre-release track.
    PreReleaseAvailable,
}

impl Classification {
    /// Returns the string representation of the classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Current => "current",
            Classification::Outdated => "outdated",
            Classification::PreReleaseAvailable => "pre-release",
        }
    }

    /// Display priority for the audit table (lower first).
    pub fn priority(&self) -> u8 {
        match self {
            Classification::Outdated => 0,
            Classification::PreReleaseAvailable => 1,
            Classification::Current => 2,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A package record paired with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPackage {
    pub record: PackageRecord,
    pub classification: Classification,
}

/// Classifies every record, keeping input order.
pub fn classify_all(records: Vec<PackageRecord>) -> Vec<ClassifiedPackage> {
    records
        .into_iter()
        .map(|record| ClassifiedPackage {
            classification: classify(&record),
            record,
        })
        .collect()
}

/// Classifies one package record.
///
/// A pre-release track always wins. Without a latest version the package is
/// assumed current. Otherwise the installed version is outdated exactly when
/// it compares lower than the latest one under [`compare_versions`].
pub fn classify(record: &PackageRecord) -> Classification {
    if record.track == Track::PreRelease {
        return Classification::PreReleaseAvailable;
    }

    let Some(latest) = record.latest.as_deref() else {
        return Classification::Current;
    };

    if compare_versions(&record.installed, latest) == Ordering::Less {
        Classification::Outdated
    } else {
        Classification::Current
    }
}

/// Orders two version strings.
///
/// Both strings are split on `.`. When every component of both is an
/// unsigned integer they are compared component by component, and on an
/// equal shared prefix the version with more components is newer. If any
/// component of either side is not numeric, the full strings are compared
/// lexicographically instead.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (numeric_components(a), numeric_components(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn numeric_components(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|part| {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse::<u64>().ok()
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brew::inventory::PackageKind;

    fn record(installed: &str, latest: Option<&str>, track: Track) -> PackageRecord {
        PackageRecord {
            name: "pkg".to_string(),
            kind: PackageKind::Formula,
            installed: installed.to_string(),
            latest: latest.map(str::to_string),
            track,
            prerelease_channel: None,
        }
    }

    #[test]
    fn test_build_suffix_is_newer() {
        assert_eq!(compare_versions("1.2.0", "1.2.0_1"), Ordering::Less);
        assert_eq!(
            classify(&record("1.2.0", Some("1.2.0_1"), Track::Stable)),
            Classification::Outdated
        );
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(
            classify(&record("1.10.0", Some("1.9.0"), Track::Stable)),
            Classification::Current
        );
    }

    #[test]
    fn test_longer_version_is_newer_on_equal_prefix() {
        assert_eq!(compare_versions("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0", "2.0"), Ordering::Greater);
        assert_eq!(compare_versions("3.1.4", "3.1.4"), Ordering::Equal);
    }

    #[test]
    fn test_non_numeric_falls_back_to_string_order() {
        assert_eq!(compare_versions("1.2.0-rc1", "1.2.0"), Ordering::Greater);
        assert_eq!(compare_versions("latest", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("+1", "1"), "+1".cmp("1"));
        assert_eq!(compare_versions("1..2", "1.2"), "1..2".cmp("1.2"));
    }

    #[test]
    fn test_prerelease_track_wins() {
        assert_eq!(
            classify(&record("2.0.0-beta", Some("2.0.0"), Track::PreRelease)),
            Classification::PreReleaseAvailable
        );
        assert_eq!(
            classify(&record("1.0", Some("9.0"), Track::PreRelease)),
            Classification::PreReleaseAvailable
        );
    }

    #[test]
    fn test_channel_alternative_does_not_hide_update() {
        let mut firefox = record("128.0", Some("129.0"), Track::Stable);
        firefox.prerelease_channel = Some("firefox@beta".to_string());
        assert_eq!(classify(&firefox), Classification::Outdated);

        let unknown = record("1.0", Some("1.1"), Track::Unknown);
        assert_eq!(classify(&unknown), Classification::Outdated);
    }

    #[test]
    fn test_unknown_latest_is_current() {
        assert_eq!(
            classify(&record("0.1", None, Track::Stable)),
            Classification::Current
        );
        assert_eq!(
            classify(&record("0.1", None, Track::Unknown)),
            Classification::Current
        );
    }

    #[test]
    fn test_unknown_track_compares_versions() {
        assert_eq!(
            classify(&record("1.0", Some("1.1"), Track::Unknown)),
            Classification::Outdated
        );
    }

    #[test]
    fn test_comparison_is_antisymmetric() {
        let versions = [
            "1.2.0", "1.2.0_1", "1.10.0", "1.9.0", "2.0.0-beta", "2.0.0", "2.0", "10",
            "1.0.0.0", "abc", "", "0.0.1", "18446744073709551616",
        ];
        for a in versions {
            for b in versions {
                assert_eq!(
                    compare_versions(a, b),
                    compare_versions(b, a).reverse(),
                    "{a} vs {b}"
                );
                let forward = classify(&record(a, Some(b), Track::Stable));
                let backward = classify(&record(b, Some(a), Track::Stable));
                assert!(
                    !(forward == Classification::Outdated && backward == Classification::Outdated),
                    "{a} and {b} both outdated"
                );
            }
        }
    }

    #[test]
    fn test_priority_order() {
        assert!(Classification::Outdated.priority() < Classification::PreReleaseAvailable.priority());
        assert!(Classification::PreReleaseAvailable.priority() < Classification::Current.priority());
    }
}
