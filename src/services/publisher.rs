//! Release publisher
//!
//! Idempotent upsert of a tagged release: look up by tag, update when
//! found, create when absent. Transient failures retry with a linearly
//! growing delay; rate limits sleep until the host's reset time (capped);
//! authorization and validation errors fail immediately without touching
//! the retry budget.

use tracing::{debug, info, warn};

use crate::domain::PublishState;
use crate::error::{ApiError, PipelineError};
use crate::infrastructure::{Release, ReleaseHost, ReleaseRequest, RetryPolicy};

/// Result of a publish operation
#[derive(Debug)]
pub struct PublishOutcome {
    pub release: Release,
    /// true when a new release was created, false when updated
    pub created: bool,
}

/// Create or update the release for `request.tag_name`.
pub async fn publish<H: ReleaseHost>(
    host: &H,
    request: &ReleaseRequest,
    policy: &RetryPolicy,
) -> Result<PublishOutcome, PipelineError> {
    let mut attempt = 0;
    let mut state = PublishState::Pending;
    loop {
        match upsert_once(host, request, &mut state).await {
            Ok(outcome) => {
                transition(&mut state, PublishState::Done);
                info!(
                    tag = %request.tag_name,
                    release_id = outcome.release.id,
                    created = outcome.created,
                    "Release published"
                );
                return Ok(outcome);
            }
            Err(e) if policy.is_retryable(&e) => {
                if attempt + 1 >= policy.max_attempts {
                    transition(&mut state, PublishState::Failed);
                    return Err(PipelineError::PublishExhausted {
                        attempts: policy.max_attempts,
                        source: e,
                    });
                }
                transition(&mut state, PublishState::RetryWait);
                let delay = policy.delay_for(attempt, &e);
                warn!(
                    tag = %request.tag_name,
                    attempt = attempt + 1,
                    delay_secs = delay.as_secs_f64(),
                    error = %e,
                    "Publish attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                transition(&mut state, PublishState::Pending);
                attempt += 1;
            }
            // Authorization/validation: fail fast, no retry budget spent
            Err(e) => {
                transition(&mut state, PublishState::Failed);
                return Err(PipelineError::Api(e));
            }
        }
    }
}

/// One lookup-then-upsert pass, advancing the state machine
async fn upsert_once<H: ReleaseHost>(
    host: &H,
    request: &ReleaseRequest,
    state: &mut PublishState,
) -> Result<PublishOutcome, ApiError> {
    match host.release_by_tag(&request.tag_name).await? {
        Some(existing) => {
            transition(state, PublishState::Found);
            debug!(
                tag = %request.tag_name,
                release_id = existing.id,
                "Release exists, updating in place"
            );
            let release = host.update_release(existing.id, request).await?;
            transition(state, PublishState::Updated);
            Ok(PublishOutcome {
                release,
                created: false,
            })
        }
        None => {
            transition(state, PublishState::NotFound);
            let release = host.create_release(request).await?;
            transition(state, PublishState::Created);
            Ok(PublishOutcome {
                release,
                created: true,
            })
        }
    }
}

fn transition(state: &mut PublishState, next: PublishState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal publish transition {:?} -> {:?}",
        state,
        next
    );
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MemoryHost;
    use std::sync::atomic::Ordering;

    fn request(tag: &str) -> ReleaseRequest {
        ReleaseRequest {
            tag_name: tag.to_string(),
            name: tag.to_string(),
            body: "notes".to_string(),
            prerelease: false,
            target_commitish: "abc1234".to_string(),
        }
    }

    #[tokio::test]
    async fn test_creates_when_absent() {
        let host = MemoryHost::new();
        let outcome = publish(&host, &request("v1.0.1"), &RetryPolicy::immediate(3))
            .await
            .unwrap();
        assert!(outcome.created);
        assert_eq!(host.release_count(), 1);
    }

    #[tokio::test]
    async fn test_second_publish_updates_not_duplicates() {
        let host = MemoryHost::new();
        let policy = RetryPolicy::immediate(3);

        let first = publish(&host, &request("v1.0.1"), &policy).await.unwrap();
        assert!(first.created);

        let mut updated = request("v1.0.1");
        updated.prerelease = true;
        let second = publish(&host, &updated, &policy).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.release.id, first.release.id);
        assert!(second.release.prerelease);

        assert_eq!(host.release_count(), 1);
        assert_eq!(host.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(host.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_after_lookup_is_retried() {
        let host = MemoryHost::new();
        let policy = RetryPolicy::immediate(3);
        publish(&host, &request("v1.0.1"), &policy).await.unwrap();

        // The lookup finds the release, the update itself fails once
        host.fail_next_updates(1);
        let outcome = publish(&host, &request("v1.0.1"), &policy).await.unwrap();

        assert!(!outcome.created);
        assert_eq!(host.release_count(), 1);
        assert_eq!(host.update_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let host = MemoryHost::new();
        host.fail_next_lookups(2);

        let outcome = publish(&host, &request("v1.0.2"), &RetryPolicy::immediate(3))
            .await
            .unwrap();
        assert!(outcome.created);
    }

    #[tokio::test]
    async fn test_retry_budget_exhaustion_is_terminal() {
        let host = MemoryHost::new();
        host.fail_next_lookups(10);

        let err = publish(&host, &request("v1.0.3"), &RetryPolicy::immediate(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::PublishExhausted { attempts: 3, .. }
        ));
        assert_eq!(host.release_count(), 0);
    }
}
