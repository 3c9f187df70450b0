//! Pipeline orchestration
//!
//! Runs the release stages strictly in sequence: resolve version,
//! generate tags, evaluate the change gate, then (unless the run is a
//! redundant scheduled one) commit artifacts, publish the release, and
//! upload assets. Cancellation is an explicit stage whose only
//! precondition is `scheduled && !changed`, and it runs before any
//! side-effecting stage rather than interrupting one.

use std::time::Instant;

use anyhow::Result;
use tracing::info;

use crate::config::PipelineConfig;
use crate::domain::{PipelineStage, ResolvedVersion, StageResult, TagSet};
use crate::infrastructure::{ObjectStore, ReleaseHost, ReleaseRequest, RetryPolicy, RunControl};
use crate::services::committer::CommitTransaction;
use crate::services::uploader::{Asset, UploadReport};
use crate::services::{canceller, change_gate, committer, publisher, tag_generator, version_resolver};

/// Externally produced inputs handed to the engine by the build and
/// scanner steps.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    /// Freshly generated SBOM content
    pub sbom: Vec<u8>,
    /// Vulnerability report content, when a scan ran
    pub report: Option<Vec<u8>>,
    /// Additional release assets (e.g. the image tar)
    pub extra_assets: Vec<Asset>,
}

/// Everything a run produced, for outputs and the summary
#[derive(Debug)]
pub struct PipelineOutcome {
    pub version: ResolvedVersion,
    pub tags: TagSet,
    pub changed: bool,
    /// The run was a redundant scheduled one and cancellation was requested
    pub cancelled: bool,
    pub transaction: Option<CommitTransaction>,
    pub release_url: Option<String>,
    pub upload: Option<UploadReport>,
    pub stages: Vec<StageResult>,
}

/// Sequential release pipeline over one host connection
pub struct Pipeline {
    publisher_policy: RetryPolicy,
    uploader_policy: RetryPolicy,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            publisher_policy: RetryPolicy::publisher(),
            uploader_policy: RetryPolicy::uploader(),
        }
    }

    #[cfg(test)]
    fn immediate() -> Self {
        Self {
            publisher_policy: RetryPolicy::immediate(3),
            uploader_policy: RetryPolicy::immediate(3),
        }
    }

    /// Execute the full pipeline.
    pub async fn run<T>(
        &self,
        host: &T,
        config: &PipelineConfig,
        inputs: &RunInputs,
    ) -> Result<PipelineOutcome>
    where
        T: ObjectStore + ReleaseHost + RunControl,
    {
        config.validate()?;
        let mut stages = Vec::new();

        // Stage: resolve version
        let start = Instant::now();
        let persisted = host
            .read_file(&config.branch, &config.version_state_path())
            .await?;
        let resolution = version_resolver::resolve(&config.branch, persisted.as_deref());
        info!(
            branch = %config.branch,
            version = %resolution.version.full_version,
            build = resolution.version.build_number,
            "Resolved version"
        );
        stages.push(StageResult::success(
            PipelineStage::ResolveVersion,
            start.elapsed(),
        ));

        // Stage: generate tags
        let start = Instant::now();
        let tags = tag_generator::generate(
            &resolution.version,
            &config.image_name,
            config.short_sha(),
            &config.registry_targets(),
        );
        info!(
            sha_tag = %tags.sha_tag(),
            floating = tags.floating_tags.len(),
            "Generated tag set"
        );
        stages.push(StageResult::success(
            PipelineStage::GenerateTags,
            start.elapsed(),
        ));

        // Stage: change gate
        let start = Instant::now();
        let committed_sbom = host
            .read_file(&config.branch, &config.committed_sbom_path())
            .await?;
        let gate = change_gate::evaluate(&inputs.sbom, committed_sbom.as_deref());
        info!(changed = gate.changed, "Change gate evaluated");
        stages.push(StageResult::success(
            PipelineStage::ChangeGate,
            start.elapsed(),
        ));

        // Stage: cancellation. Every side-effecting stage below is
        // skipped first; only then is the cancel request sent.
        if canceller::should_cancel(config.event, gate.changed) {
            info!("Scheduled run with unchanged content, skipping release");
            for stage in PipelineStage::ALL.into_iter().filter(|s| s.has_side_effects()) {
                stages.push(StageResult::skipped(stage, "content unchanged"));
            }

            let start = Instant::now();
            if !config.dry_run {
                canceller::cancel_current_run(host, config.run_id).await;
            }
            stages.push(StageResult::success(PipelineStage::CancelRun, start.elapsed()));

            return Ok(PipelineOutcome {
                version: resolution.version,
                tags,
                changed: false,
                cancelled: !config.dry_run,
                transaction: None,
                release_url: None,
                upload: None,
                stages,
            });
        }
        stages.push(StageResult::skipped(
            PipelineStage::CancelRun,
            "not a redundant scheduled run",
        ));

        if config.dry_run {
            info!("Dry run, stopping before side-effecting stages");
            for stage in PipelineStage::ALL.into_iter().filter(|s| s.has_side_effects()) {
                stages.push(StageResult::skipped(stage, "dry run"));
            }
            return Ok(PipelineOutcome {
                version: resolution.version,
                tags,
                changed: gate.changed,
                cancelled: false,
                transaction: None,
                release_url: None,
                upload: None,
                stages,
            });
        }

        // Stage: commit artifacts. The version counter only becomes
        // durable here; a failure before this point leaves it untouched.
        let start = Instant::now();
        let mut files = vec![(
            config.version_state_path(),
            serde_json::to_vec_pretty(&resolution.next_state)?,
        )];
        files.push((config.committed_sbom_path(), inputs.sbom.clone()));
        if let Some(report) = &inputs.report {
            files.push((config.report_repo_path(), report.clone()));
        }
        let message = format!(
            "chore(release): {} [skip ci]",
            config.release_tag(&resolution.version.full_version)
        );
        let transaction = committer::commit_files(host, &config.branch, &message, &files).await?;
        stages.push(StageResult::success(
            PipelineStage::CommitArtifacts,
            start.elapsed(),
        ));

        // Stage: publish release
        let start = Instant::now();
        let request = ReleaseRequest {
            tag_name: config.release_tag(&resolution.version.full_version),
            name: config.release_title(&resolution.version.full_version),
            body: release_body(config, &resolution.version, &tags, gate.changed),
            prerelease: resolution.version.is_prerelease(),
            target_commitish: config.commit_sha.clone(),
        };
        let outcome = publisher::publish(host, &request, &self.publisher_policy).await?;
        stages.push(StageResult::success(
            PipelineStage::PublishRelease,
            start.elapsed(),
        ));

        // Stage: upload assets
        let start = Instant::now();
        let mut assets = vec![Asset {
            name: "sbom.txt".to_string(),
            content: inputs.sbom.clone(),
        }];
        if let Some(report) = &inputs.report {
            assets.push(Asset {
                name: "vulnerabilities.txt".to_string(),
                content: report.clone(),
            });
        }
        assets.extend(inputs.extra_assets.iter().cloned());
        let upload = crate::services::uploader::upload_assets(
            host,
            &outcome.release,
            &assets,
            &self.uploader_policy,
        )
        .await;
        let stage = if upload.is_complete() {
            StageResult::success(PipelineStage::UploadAssets, start.elapsed())
        } else {
            StageResult::failure(
                PipelineStage::UploadAssets,
                start.elapsed(),
                format!("assets failed: {}", upload.failed.join(", ")),
            )
        };
        stages.push(stage);

        Ok(PipelineOutcome {
            version: resolution.version,
            tags,
            changed: gate.changed,
            cancelled: false,
            transaction: Some(transaction),
            release_url: Some(outcome.release.html_url.clone()),
            upload: Some(upload),
            stages,
        })
    }
}

/// Generated release notes
fn release_body(
    config: &PipelineConfig,
    version: &ResolvedVersion,
    tags: &TagSet,
    changed: bool,
) -> String {
    let mut body = String::new();
    body.push_str(&format!("## {}\n\n", config.release_title(&version.full_version)));
    body.push_str(&format!("- Commit: `{}`\n", config.commit_sha));
    body.push_str(&format!("- Image: `{}`\n", tags.sha_tag()));
    if !tags.floating_tags.is_empty() {
        body.push_str("- Tags:\n");
        for tag in &tags.floating_tags {
            body.push_str(&format!("  - `{}`\n", tag));
        }
    }
    body.push_str(&format!(
        "- SBOM: {}\n",
        if changed { "changed" } else { "unchanged" }
    ));
    body.push_str(&format!(
        "\n_Published {}_\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    body
}
