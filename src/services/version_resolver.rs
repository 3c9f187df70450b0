//! Version resolver
//!
//! Turns a branch name plus the persisted per-(project, branch) state
//! into the version for this run. The build counter strictly increases:
//! the persisted file holds the last used number, the resolver hands out
//! the next one, and the new state only becomes durable when the commit
//! stage writes it back.

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::{BranchVersion, ResolvedVersion, VersionState};

/// Outcome of resolving a version for one run
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Version to release now
    pub version: ResolvedVersion,
    /// State to persist when the run reaches the commit stage
    pub next_state: VersionState,
}

/// Resolve the version for `branch` given the persisted state bytes.
///
/// `persisted` is the raw content of the committed state file, `None` on
/// first run. Unparseable state is logged and treated as absent: the
/// counter restarts but the pipeline never crashes on corrupt state.
pub fn resolve(branch: &str, persisted: Option<&[u8]>) -> Resolution {
    let parsed = BranchVersion::parse(branch);

    let last_build = match persisted {
        Some(bytes) => match serde_json::from_slice::<VersionState>(bytes) {
            Ok(state) => {
                debug!(
                    branch = %branch,
                    build_number = state.build_number,
                    "Loaded persisted version state"
                );
                state.build_number
            }
            Err(e) => {
                warn!(
                    branch = %branch,
                    error = %e,
                    "Persisted version state is unparseable, restarting counter at 0"
                );
                0
            }
        },
        None => {
            debug!(branch = %branch, "No persisted version state, first build");
            0
        }
    };

    let version = ResolvedVersion::new(
        parsed.base_version.clone(),
        parsed.suffix.clone(),
        last_build + 1,
    );

    let next_state = VersionState {
        branch: branch.to_string(),
        base_version: parsed.base_version,
        suffix: parsed.suffix,
        build_number: version.build_number,
        updated_at: Some(Utc::now()),
    };

    Resolution {
        version,
        next_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_build_on_main() {
        let resolution = resolve("main", None);
        assert_eq!(resolution.version.full_version, "0.0.1");
        assert_eq!(resolution.version.build_number, 1);
        assert!(!resolution.version.is_prerelease());
    }

    #[test]
    fn test_first_build_on_prerelease_branch() {
        let resolution = resolve("v2.0.0-beta", None);
        assert_eq!(resolution.version.full_version, "2.0.0.1-beta");
        assert!(resolution.version.is_prerelease());
        assert_eq!(resolution.next_state.build_number, 1);
        assert_eq!(resolution.next_state.base_version, "2.0.0");
    }

    #[test]
    fn test_counter_strictly_increases() {
        let mut persisted: Option<Vec<u8>> = None;
        let mut last = 0;
        for _ in 0..5 {
            let resolution = resolve("v1.2", persisted.as_deref());
            assert_eq!(resolution.version.build_number, last + 1);
            last = resolution.version.build_number;
            persisted = Some(serde_json::to_vec(&resolution.next_state).unwrap());
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_base_version_matches_branch() {
        let resolution = resolve("v3.7", None);
        assert_eq!(resolution.version.base_version, "3.7");
        assert_eq!(resolution.version.full_version, "3.7.1");
    }

    #[test]
    fn test_corrupt_state_restarts_counter() {
        let resolution = resolve("v1.2", Some(b"{not json"));
        assert_eq!(resolution.version.build_number, 1);
    }

    #[test]
    fn test_corrupt_state_never_panics_on_wrong_shape() {
        let resolution = resolve("v1.2", Some(br#"{"build_number": "forty-one"}"#));
        assert_eq!(resolution.version.build_number, 1);
    }
}
