//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that talks to external systems:
//! - GitHub REST API (git object database, releases, Actions runs)
//! - Retry/backoff policy shared by the remote-call sites

pub mod github;
pub mod retry;

// Re-export commonly used types
pub use github::{GithubClient, ObjectStore, Release, ReleaseHost, ReleaseRequest, RunControl};
pub use retry::{Backoff, RetryPolicy};
