//! Full pipeline run

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::domain::TriggerEvent;
use crate::infrastructure::GithubClient;
use crate::outputs::StepOutputs;
use crate::services::{Asset, Pipeline, RunInputs};
use crate::{git, ui};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    repository: String,
    token: String,
    project: Option<String>,
    branch: Option<String>,
    commit_sha: Option<String>,
    image: String,
    push_dockerhub: bool,
    push_ghcr: bool,
    dockerhub_namespace: String,
    ghcr_namespace: Option<String>,
    event: String,
    run_id: Option<u64>,
    sbom: String,
    report: Option<String>,
    assets: Vec<String>,
    dry_run: bool,
) -> Result<()> {
    let branch = match branch {
        Some(b) => b,
        None => git::discover_branch().await?,
    };
    let commit_sha = match commit_sha {
        Some(s) => s,
        None => git::discover_sha().await?,
    };
    let event: TriggerEvent = event
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Failed to classify triggering event")?;

    // GHCR namespace defaults to the repository owner
    let ghcr_namespace = ghcr_namespace.unwrap_or_else(|| {
        repository
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string()
    });

    let config = PipelineConfig {
        repository,
        project,
        branch,
        commit_sha,
        image_name: image,
        push_to_dockerhub: push_dockerhub,
        push_to_ghcr: push_ghcr,
        dockerhub_namespace,
        ghcr_namespace,
        event,
        run_id,
        sbom_path: sbom,
        report_path: report,
        dry_run,
    };

    let inputs = load_inputs(&config, &assets).await?;

    ui::print_header(&format!("Release: {} ({})", config.image_name, config.branch));

    let client = GithubClient::new(&config.repository, &token)?;
    let outcome = Pipeline::new().run(&client, &config, &inputs).await?;

    ui::print_stage_summary(&outcome.stages);
    if outcome.cancelled {
        ui::print_warning("Content unchanged, redundant scheduled run cancelled");
    } else if dry_run {
        ui::print_success(&format!(
            "Dry run complete: {} would be released",
            outcome.version.full_version
        ));
    } else {
        ui::print_success(&format!("Released {}", outcome.version.full_version));
        if let Some(upload) = &outcome.upload {
            if !upload.is_complete() {
                ui::print_warning(&format!(
                    "Some assets failed to attach: {}",
                    upload.failed.join(", ")
                ));
            }
        }
    }

    let mut outputs = StepOutputs::new();
    outputs.set("full_version", &outcome.version.full_version);
    outputs.set("build_number", outcome.version.build_number);
    outputs.set("sha_tag", outcome.tags.sha_tag());
    outputs.set_list("floating_tags", &outcome.tags.floating_tags);
    outputs.set("changed", outcome.changed);
    outputs.set("cancelled", outcome.cancelled);
    if let Some(url) = &outcome.release_url {
        outputs.set("release_url", url);
    }
    outputs.write()?;

    Ok(())
}

/// Read the externally generated artifacts from disk
async fn load_inputs(config: &PipelineConfig, asset_paths: &[String]) -> Result<RunInputs> {
    let sbom = tokio::fs::read(&config.sbom_path)
        .await
        .with_context(|| format!("Failed to read SBOM at {}", config.sbom_path))?;

    let report = match config.report_path.as_deref() {
        Some(path) => Some(
            tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read report at {}", path))?,
        ),
        None => None,
    };

    let mut extra_assets = Vec::new();
    for path in asset_paths {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read asset at {}", path))?;
        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path.as_str())
            .to_string();
        extra_assets.push(Asset { name, content });
    }

    Ok(RunInputs {
        sbom,
        report,
        extra_assets,
    })
}
