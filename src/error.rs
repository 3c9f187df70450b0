//! Centralized error types for capstan
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("GitHub API error: {0}")]
    Api(#[from] ApiError),

    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Release publish failed after {attempts} attempts: {source}")]
    PublishExhausted { attempts: u32, source: ApiError },
}

/// Errors returned by the GitHub API client.
///
/// The variants map to the retry decision each caller has to make:
/// `Transient` and `RateLimited` are retryable, `Conflict` is surfaced
/// to the caller untouched, and the rest fail immediately.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("transient error ({status}): {message}")]
    Transient { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limited (reset at epoch {reset_at:?})")]
    RateLimited { reset_at: Option<u64> },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("authorization failed ({status}): {message}")]
    Authorization { status: u16, message: String },
}

impl ApiError {
    /// Whether a retry with backoff can reasonably succeed.
    ///
    /// Conflicts are deliberately non-retryable: re-running an optimistic
    /// ref update without re-resolving the base would clobber an
    /// interleaved writer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Transient { .. } | ApiError::Network(_) | ApiError::RateLimited { .. }
        )
    }
}

/// Errors from the atomic commit protocol
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("branch {branch} moved since resolution (expected tip {expected}): {message}")]
    RefConflict {
        branch: String,
        expected: String,
        message: String,
    },

    #[error("object store call failed during {step}: {source}")]
    StoreFailed { step: &'static str, source: ApiError },

    #[error("nothing to commit: empty file set")]
    EmptyFileSet,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration missing: {field}")]
    MissingField { field: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("GitHub token not found. Set GITHUB_TOKEN or pass --token")]
    TokenNotFound,

    #[error("Repository must be owner/name, got: {repository}")]
    InvalidRepository { repository: String },
}
