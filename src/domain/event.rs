//! Trigger event classification
//!
//! The CI host tells us why the run started; only scheduled runs are
//! eligible for change-gated cancellation.

use std::fmt;
use std::str::FromStr;

/// How the pipeline run was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A push to the repository
    Push,
    /// Manual dispatch (workflow_dispatch)
    Manual,
    /// Cron schedule
    Scheduled,
}

impl TriggerEvent {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, TriggerEvent::Scheduled)
    }
}

impl FromStr for TriggerEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(TriggerEvent::Push),
            "workflow_dispatch" | "manual" => Ok(TriggerEvent::Manual),
            "schedule" | "scheduled" => Ok(TriggerEvent::Scheduled),
            other => Err(format!("unknown trigger event: {}", other)),
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerEvent::Push => "push",
            TriggerEvent::Manual => "manual",
            TriggerEvent::Scheduled => "scheduled",
        };
        write!(f, "{}", name)
    }
}
