//! Standalone version resolution
//!
//! Reads the persisted state and prints what the next release would be,
//! without advancing anything. Useful for workflow debugging.

use anyhow::Result;

use crate::infrastructure::{GithubClient, ObjectStore};
use crate::outputs::StepOutputs;
use crate::services::version_resolver;
use crate::{git, ui};

pub async fn execute(
    repository: String,
    token: String,
    project: Option<String>,
    branch: Option<String>,
) -> Result<()> {
    let branch = match branch {
        Some(b) => b,
        None => git::discover_branch().await?,
    };

    let state_path = crate::config::PipelineConfig::state_path_for(project.as_deref(), &branch);

    let client = GithubClient::new(&repository, &token)?;
    let persisted = client.read_file(&branch, &state_path).await?;
    let resolution = version_resolver::resolve(&branch, persisted.as_deref());

    ui::print_success(&format!(
        "Next version for {}: {} (build {})",
        branch, resolution.version.full_version, resolution.version.build_number
    ));

    let mut outputs = StepOutputs::new();
    outputs.set("full_version", &resolution.version.full_version);
    outputs.set("base_version", &resolution.version.base_version);
    outputs.set("build_number", resolution.version.build_number);
    outputs.set("prerelease", resolution.version.is_prerelease());
    outputs.write()?;

    Ok(())
}
