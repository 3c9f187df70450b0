//! Pipeline run configuration
//!
//! Assembled once per run from CLI arguments and the Actions environment.
//! Multi-project repositories are isolated purely by namespacing: every
//! persisted path, release tag, and release title carries the project
//! identifier when one is set.

use crate::config::registry::RegistryTarget;
use crate::domain::TriggerEvent;
use crate::error::ConfigError;

/// Full configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target repository as owner/name
    pub repository: String,
    /// Optional project identifier for multi-project repositories
    pub project: Option<String>,
    /// Branch the run operates on
    pub branch: String,
    /// Full commit SHA being released
    pub commit_sha: String,
    /// Image name (without registry or namespace)
    pub image_name: String,
    /// Push to Docker Hub
    pub push_to_dockerhub: bool,
    /// Push to GitHub Container Registry
    pub push_to_ghcr: bool,
    /// Docker Hub namespace (user or organization)
    pub dockerhub_namespace: String,
    /// GHCR namespace; defaults to the repository owner
    pub ghcr_namespace: String,
    /// Why the run started
    pub event: TriggerEvent,
    /// Actions run id, required for cancellation
    pub run_id: Option<u64>,
    /// Local path of the freshly generated SBOM
    pub sbom_path: String,
    /// Local path of the vulnerability report, if one was produced
    pub report_path: Option<String>,
    /// Resolve and compare only; skip every side-effecting stage
    pub dry_run: bool,
}

impl PipelineConfig {
    /// Basic sanity checks before the run starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.branch.is_empty() {
            return Err(ConfigError::MissingField {
                field: "branch".to_string(),
            });
        }
        if self.image_name.is_empty() {
            return Err(ConfigError::MissingField {
                field: "image_name".to_string(),
            });
        }
        let sha_ok = self.commit_sha.len() >= 7
            && self.commit_sha.chars().all(|c| c.is_ascii_hexdigit());
        if !sha_ok {
            return Err(ConfigError::InvalidValue {
                field: "commit_sha".to_string(),
                value: self.commit_sha.clone(),
            });
        }
        if self.push_to_dockerhub && self.dockerhub_namespace.is_empty() {
            return Err(ConfigError::MissingField {
                field: "dockerhub_namespace".to_string(),
            });
        }
        if self.push_to_ghcr && self.ghcr_namespace.is_empty() {
            return Err(ConfigError::MissingField {
                field: "ghcr_namespace".to_string(),
            });
        }
        Ok(())
    }

    /// Short (7 character) form of the commit SHA, used for sha tags
    pub fn short_sha(&self) -> &str {
        self.commit_sha.get(..7).unwrap_or(&self.commit_sha)
    }

    /// Enabled registry targets, Docker Hub first for deterministic order
    pub fn registry_targets(&self) -> Vec<RegistryTarget> {
        let mut targets = Vec::new();
        if self.push_to_dockerhub {
            targets.push(RegistryTarget::dockerhub(&self.dockerhub_namespace));
        }
        if self.push_to_ghcr {
            targets.push(RegistryTarget::ghcr(&self.ghcr_namespace));
        }
        targets
    }

    /// Prefix applied to persisted file names, tags, and titles
    fn project_prefix(&self) -> String {
        self.project
            .as_deref()
            .map(|p| format!("{}-", p))
            .unwrap_or_default()
    }

    /// Committed path of the per-(project, branch) version state file
    pub fn version_state_path(&self) -> String {
        Self::state_path_for(self.project.as_deref(), &self.branch)
    }

    /// Same path computation for callers without a full config
    pub fn state_path_for(project: Option<&str>, branch: &str) -> String {
        let prefix = project.map(|p| format!("{}-", p)).unwrap_or_default();
        format!(
            ".release/versions/{}{}.json",
            prefix,
            branch.replace('/', "-")
        )
    }

    /// Committed path of the SBOM used for next-run comparison
    pub fn committed_sbom_path(&self) -> String {
        format!(".release/sbom/{}current.txt", self.project_prefix())
    }

    /// Committed path of the vulnerability report
    pub fn report_repo_path(&self) -> String {
        format!(".release/reports/{}vulnerabilities.txt", self.project_prefix())
    }

    /// Release tag for a resolved version
    pub fn release_tag(&self, full_version: &str) -> String {
        format!("{}v{}", self.project_prefix(), full_version)
    }

    /// Human-readable release title
    pub fn release_title(&self, full_version: &str) -> String {
        match &self.project {
            Some(project) => format!("{} v{}", project, full_version),
            None => format!("v{}", full_version),
        }
    }
}
