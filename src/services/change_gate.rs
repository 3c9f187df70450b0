//! Change gate
//!
//! Compares the freshly generated SBOM against the one committed by the
//! previous run. The comparison is over SHA-256 fingerprints of the raw
//! bytes; a missing prior artifact (first run) always counts as changed.

use sha2::{Digest, Sha256};
use tracing::debug;

/// Result of the change-gate comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeGateResult {
    pub changed: bool,
}

/// Hex SHA-256 fingerprint of content bytes
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compare fresh content against the previously committed content.
pub fn evaluate(fresh: &[u8], committed: Option<&[u8]>) -> ChangeGateResult {
    let fresh_print = fingerprint(fresh);
    let changed = match committed {
        Some(prior) => {
            let prior_print = fingerprint(prior);
            debug!(fresh = %fresh_print, prior = %prior_print, "Comparing content fingerprints");
            fresh_print != prior_print
        }
        None => {
            debug!(fresh = %fresh_print, "No prior fingerprint, first run");
            true
        }
    };
    ChangeGateResult { changed }
}
