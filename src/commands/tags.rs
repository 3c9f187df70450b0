//! Standalone tag expansion

use anyhow::Result;

use crate::config::RegistryTarget;
use crate::domain::ResolvedVersion;
use crate::outputs::StepOutputs;
use crate::services::tag_generator;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    base_version: String,
    build_number: u64,
    suffix: Option<String>,
    image: String,
    sha: String,
    push_dockerhub: bool,
    push_ghcr: bool,
    dockerhub_namespace: String,
    ghcr_namespace: String,
) -> Result<()> {
    let version = ResolvedVersion::new(base_version, suffix, build_number);

    let mut targets = Vec::new();
    if push_dockerhub {
        if dockerhub_namespace.is_empty() {
            anyhow::bail!("--push-dockerhub requires --dockerhub-namespace");
        }
        targets.push(RegistryTarget::dockerhub(dockerhub_namespace));
    }
    if push_ghcr {
        if ghcr_namespace.is_empty() {
            anyhow::bail!("--push-ghcr requires --ghcr-namespace");
        }
        targets.push(RegistryTarget::ghcr(ghcr_namespace));
    }

    let tags = tag_generator::generate(&version, &image, &sha, &targets);

    println!("sha tag: {}", tags.sha_tag());
    for tag in &tags.floating_tags {
        println!("floating: {}", tag);
    }

    let mut outputs = StepOutputs::new();
    outputs.set("sha_tag", tags.sha_tag());
    outputs.set_list("floating_tags", &tags.floating_tags);
    outputs.write()?;

    Ok(())
}
