//! CLI definitions for capstan
//!
//! This module contains all CLI argument parsing structures using clap.
//! Most arguments default from the GitHub Actions environment so a
//! workflow step can invoke the engine with almost no flags.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "capstan",
    version,
    about = "Release orchestration engine for CI pipelines",
    long_about = "Derives branch-aware versions, commits release artifacts atomically,\nand publishes GitHub releases idempotently from inside a CI run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute the full release pipeline
    Run {
        /// Target repository as owner/name
        #[arg(long, env = "GITHUB_REPOSITORY", required = true)]
        repository: String,

        /// API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, required = true)]
        token: String,

        /// Project identifier for multi-project repositories
        #[arg(long)]
        project: Option<String>,

        /// Branch to release from (defaults to the triggering ref)
        #[arg(long, env = "GITHUB_REF_NAME")]
        branch: Option<String>,

        /// Commit SHA being released (defaults to the triggering commit)
        #[arg(long, env = "GITHUB_SHA")]
        commit_sha: Option<String>,

        /// Image name without registry or namespace
        #[arg(long, required = true)]
        image: String,

        /// Push tags for Docker Hub
        #[arg(long)]
        push_dockerhub: bool,

        /// Push tags for GitHub Container Registry
        #[arg(long)]
        push_ghcr: bool,

        /// Docker Hub namespace (user or organization)
        #[arg(long, env = "DOCKERHUB_NAMESPACE", default_value = "")]
        dockerhub_namespace: String,

        /// GHCR namespace; defaults to the repository owner
        #[arg(long)]
        ghcr_namespace: Option<String>,

        /// Triggering event name
        #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "manual")]
        event: String,

        /// Current Actions run id (needed for cancellation)
        #[arg(long, env = "GITHUB_RUN_ID")]
        run_id: Option<u64>,

        /// Path to the freshly generated SBOM
        #[arg(long, required = true)]
        sbom: String,

        /// Path to the vulnerability report
        #[arg(long)]
        report: Option<String>,

        /// Additional release asset paths (can be specified multiple times)
        #[arg(long = "asset")]
        assets: Vec<String>,

        /// Resolve and compare only; skip commit, release, and upload
        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve the version for a branch without side effects
    Version {
        /// Target repository as owner/name
        #[arg(long, env = "GITHUB_REPOSITORY", required = true)]
        repository: String,

        /// API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, required = true)]
        token: String,

        /// Project identifier
        #[arg(long)]
        project: Option<String>,

        /// Branch to resolve (defaults to the triggering ref)
        #[arg(long, env = "GITHUB_REF_NAME")]
        branch: Option<String>,
    },

    /// Expand a resolved version into its registry tag set
    Tags {
        /// Dotted numeric base version (e.g. 2.0.0)
        #[arg(long, required = true)]
        base_version: String,

        /// Build number
        #[arg(long, required = true)]
        build_number: u64,

        /// Version suffix (e.g. beta)
        #[arg(long)]
        suffix: Option<String>,

        /// Image name without registry or namespace
        #[arg(long, required = true)]
        image: String,

        /// Short commit SHA for the immutable tag
        #[arg(long, required = true)]
        sha: String,

        /// Include Docker Hub tags
        #[arg(long)]
        push_dockerhub: bool,

        /// Include GHCR tags
        #[arg(long)]
        push_ghcr: bool,

        /// Docker Hub namespace
        #[arg(long, env = "DOCKERHUB_NAMESPACE", default_value = "")]
        dockerhub_namespace: String,

        /// GHCR namespace
        #[arg(long, default_value = "")]
        ghcr_namespace: String,
    },
}
