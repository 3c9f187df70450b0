//! Retry policy
//!
//! One policy object shared by the release publisher and the asset
//! uploader, parameterized only by the backoff shape. Rate-limit
//! responses override the normal backoff: we sleep until the reset
//! timestamp the host reported, bounded by a sanity ceiling.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::error::ApiError;

/// Upper bound on a single rate-limit sleep. Reset headers come from the
/// host's clock; a skewed timestamp must not park the run for hours.
const RATE_LIMIT_SLEEP_CEILING: Duration = Duration::from_secs(300);

/// Backoff shape between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * (attempt + 1)`: 2s, 4s, 6s for a 2s base
    Linear { base: Duration },
    /// Same delay every attempt
    Fixed { delay: Duration },
}

/// Bounded retry policy for remote calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Publisher policy: 3 attempts, linearly growing delay
    pub fn publisher() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Linear {
                base: Duration::from_secs(2),
            },
        }
    }

    /// Uploader policy: 3 attempts, fixed delay
    pub fn uploader() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed {
                delay: Duration::from_secs(2),
            },
        }
    }

    /// Zero-delay variant for tests
    #[cfg(test)]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
        }
    }

    /// Whether the error class is worth another attempt
    pub fn is_retryable(&self, error: &ApiError) -> bool {
        error.is_retryable()
    }

    /// Delay before the next attempt, given the zero-based index of the
    /// attempt that just failed and the error it failed with.
    pub fn delay_for(&self, attempt: u32, error: &ApiError) -> Duration {
        if let ApiError::RateLimited { reset_at } = error {
            return rate_limit_delay(*reset_at);
        }
        match self.backoff {
            Backoff::Linear { base } => base * (attempt + 1),
            Backoff::Fixed { delay } => delay,
        }
    }
}

/// Sleep duration until the host's reported reset time, capped.
fn rate_limit_delay(reset_at: Option<u64>) -> Duration {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs();

    match reset_at {
        Some(reset) if reset > now => {
            let wait = Duration::from_secs(reset - now);
            if wait > RATE_LIMIT_SLEEP_CEILING {
                warn!(
                    reset_at = reset,
                    "Rate-limit reset is further out than the sleep ceiling, capping wait"
                );
                RATE_LIMIT_SLEEP_CEILING
            } else {
                wait
            }
        }
        // Reset already passed or header missing: minimal courtesy pause
        _ => Duration::from_secs(1),
    }
}
