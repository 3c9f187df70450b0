//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod event;
pub mod release;
pub mod tags;
pub mod version;

// Re-export commonly used types
pub use event::TriggerEvent;
pub use release::{PipelineStage, PublishState, StageResult};
pub use tags::TagSet;
pub use version::{BranchVersion, ResolvedVersion, VersionState};
