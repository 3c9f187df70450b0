//! # Pipeline configuration
//!
//! A run's configuration comes from two places, in priority order:
//!
//! 1. CLI arguments (see `cli.rs`)
//! 2. GitHub Actions environment (`GITHUB_REPOSITORY`, `GITHUB_SHA`,
//!    `GITHUB_REF_NAME`, `GITHUB_RUN_ID`, `GITHUB_EVENT_NAME`,
//!    `GITHUB_TOKEN`), wired through clap's `env` feature
//!
//! There is no config file: the engine is invoked by workflows, and
//! workflows already are the configuration surface.

mod pipeline;
mod registry;

pub use pipeline::PipelineConfig;
pub use registry::RegistryTarget;
