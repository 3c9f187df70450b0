//! Release pipeline domain types
//!
//! Defines the pipeline as a sequence of explicit stages and the release
//! publisher as a state machine, so ordering invariants (cancellation
//! before side effects, sha tag before floating tags) are checkable
//! rather than implicit.

use std::time::Duration;

/// Individual stages of a release run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Derive version and build counter from branch + persisted state
    ResolveVersion,
    /// Expand version into per-registry tag set
    GenerateTags,
    /// Compare generated content against last committed content
    ChangeGate,
    /// Cancel the current run (scheduled, unchanged only)
    CancelRun,
    /// Commit generated artifacts atomically
    CommitArtifacts,
    /// Create or update the tagged release
    PublishRelease,
    /// Attach artifacts to the release
    UploadAssets,
}

impl PipelineStage {
    /// Every stage, in execution order
    pub const ALL: [PipelineStage; 7] = [
        Self::ResolveVersion,
        Self::GenerateTags,
        Self::ChangeGate,
        Self::CancelRun,
        Self::CommitArtifacts,
        Self::PublishRelease,
        Self::UploadAssets,
    ];

    /// Human-readable name for the stage
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResolveVersion => "Resolve Version",
            Self::GenerateTags => "Generate Tags",
            Self::ChangeGate => "Change Gate",
            Self::CancelRun => "Cancel Run",
            Self::CommitArtifacts => "Commit Artifacts",
            Self::PublishRelease => "Publish Release",
            Self::UploadAssets => "Upload Assets",
        }
    }

    /// Whether the stage mutates repository or release state
    pub fn has_side_effects(&self) -> bool {
        matches!(
            self,
            Self::CommitArtifacts | Self::PublishRelease | Self::UploadAssets
        )
    }
}

/// Result of one executed stage
#[derive(Debug)]
pub struct StageResult {
    pub stage: PipelineStage,
    pub success: bool,
    pub skipped: bool,
    pub duration: Duration,
    pub message: Option<String>,
}

impl StageResult {
    pub fn success(stage: PipelineStage, duration: Duration) -> Self {
        Self {
            stage,
            success: true,
            skipped: false,
            duration,
            message: None,
        }
    }

    pub fn skipped(stage: PipelineStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            success: true,
            skipped: true,
            duration: Duration::ZERO,
            message: Some(reason.into()),
        }
    }

    pub fn failure(stage: PipelineStage, duration: Duration, message: impl Into<String>) -> Self {
        Self {
            stage,
            success: false,
            skipped: false,
            duration,
            message: Some(message.into()),
        }
    }
}

/// Publisher state machine.
///
/// Pending -> {Found, NotFound} -> {Updated, Created} -> Done. A
/// transient failure moves any non-terminal attempt state into
/// RetryWait, which loops back to Pending for the next attempt; Failed
/// is terminal once the retry budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Pending,
    RetryWait,
    Found,
    NotFound,
    Updated,
    Created,
    Done,
    Failed,
}

impl PublishState {
    /// Legal transitions; anything else is a programming error.
    pub fn can_transition_to(&self, next: PublishState) -> bool {
        use PublishState::*;
        matches!(
            (self, next),
            (Pending, Found)
                | (Pending, NotFound)
                | (Pending, RetryWait)
                | (Pending, Failed)
                | (Found, Updated)
                | (Found, RetryWait)
                | (Found, Failed)
                | (NotFound, Created)
                | (NotFound, RetryWait)
                | (NotFound, Failed)
                | (RetryWait, Pending)
                | (Updated, Done)
                | (Created, Done)
        )
    }
}
