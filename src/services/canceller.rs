//! Run canceller
//!
//! Terminates the current CI run when a scheduled build produced no new
//! content. By the time this runs, every side-effecting stage has already
//! been skipped, so the cancellation is cosmetic cleanup: a single
//! bounded request with no confirmation polling, and a failure merely
//! lets the run finish its no-op normally.

use tracing::{info, warn};

use crate::domain::TriggerEvent;
use crate::infrastructure::RunControl;

/// Whether the cancellation stage should fire at all
pub fn should_cancel(event: TriggerEvent, changed: bool) -> bool {
    event.is_scheduled() && !changed
}

/// Request cancellation of the current run, best effort.
pub async fn cancel_current_run<C: RunControl>(control: &C, run_id: Option<u64>) {
    let Some(run_id) = run_id else {
        warn!("No run id available, skipping cancellation request");
        return;
    };

    match control.cancel_run(run_id).await {
        Ok(()) => {
            info!(run_id, "Requested cancellation of redundant scheduled run");
        }
        Err(e) => {
            // Non-fatal: the remaining stages are already no-ops
            warn!(run_id, error = %e, "Run cancellation request failed, continuing");
        }
    }
}
