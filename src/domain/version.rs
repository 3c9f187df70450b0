//! Version domain types
//!
//! Branch-aware version derivation: a branch name like `v2.1-beta` carries
//! the base version, and a persisted per-(project, branch) build counter
//! supplies the monotonically increasing final component.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Suffixes that mark a build as a prerelease
const PRERELEASE_SUFFIXES: &[&str] = &["alpha", "beta", "rc"];

/// Persisted version state for one (project, branch) key.
///
/// Lives as a JSON file inside the target repository; there is no other
/// durable store. `build_number` holds the last number actually used, so
/// the next build is always `build_number + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionState {
    pub branch: String,
    pub base_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    pub build_number: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Version components extracted from a branch name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchVersion {
    /// Dotted numeric base, at least two components (e.g. "2.0", "2.0.0")
    pub base_version: String,
    /// Identifier suffix (e.g. "beta"), absent for stable branches
    pub suffix: Option<String>,
}

impl BranchVersion {
    /// Parse a branch name into version components.
    ///
    /// Branches matching `v<major>(.<minor>)*(-<suffix>)?` carry their own
    /// base version; everything else (main, feature branches) falls back
    /// to `0.0` with no suffix. The base keeps every matched numeric
    /// component and is padded to at least `major.minor`.
    pub fn parse(branch: &str) -> Self {
        // Compiled per call: version resolution happens once per run.
        let pattern = Regex::new(r"^v(\d+(?:\.\d+)*)(?:-([0-9A-Za-z]+))?$")
            .expect("branch version pattern is valid");

        match pattern.captures(branch) {
            Some(caps) => {
                let mut base = caps[1].to_string();
                if !base.contains('.') {
                    base.push_str(".0");
                }
                Self {
                    base_version: base,
                    suffix: caps.get(2).map(|m| m.as_str().to_string()),
                }
            }
            None => Self {
                base_version: "0.0".to_string(),
                suffix: None,
            },
        }
    }
}

/// Fully resolved version for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Dotted numeric base from the branch name (e.g. "2.0.0")
    pub base_version: String,
    /// Prerelease-ish suffix, if the branch carries one
    pub suffix: Option<String>,
    /// Build counter value used for this run (strictly increasing)
    pub build_number: u64,
    /// `base_version.build_number[-suffix]`, e.g. "2.0.0.4-beta"
    pub full_version: String,
}

impl ResolvedVersion {
    pub fn new(base_version: String, suffix: Option<String>, build_number: u64) -> Self {
        let full_version = match &suffix {
            Some(s) => format!("{}.{}-{}", base_version, build_number, s),
            None => format!("{}.{}", base_version, build_number),
        };
        Self {
            base_version,
            suffix,
            build_number,
            full_version,
        }
    }

    /// Whether the suffix marks this build as a prerelease
    pub fn is_prerelease(&self) -> bool {
        self.suffix
            .as_deref()
            .map(|s| PRERELEASE_SUFFIXES.contains(&s))
            .unwrap_or(false)
    }

    /// Numeric part of the full version, without the suffix.
    ///
    /// "2.0.0.4-beta" -> "2.0.0.4"; used for floating-tag prefixes.
    pub fn numeric_version(&self) -> String {
        format!("{}.{}", self.base_version, self.build_number)
    }
}
