//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Each pipeline component lives in its own module; `pipeline` runs them
//! strictly in sequence.

pub mod canceller;
pub mod change_gate;
pub mod committer;
pub mod pipeline;
pub mod publisher;
pub mod tag_generator;
pub mod uploader;
pub mod version_resolver;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use committer::CommitTransaction;
pub use pipeline::{Pipeline, PipelineOutcome, RunInputs};
pub use uploader::Asset;
