//! Asset uploader
//!
//! Attaches generated artifacts to a published release. Each asset is
//! uploaded independently with a fixed-delay retry; an asset that still
//! fails is reported and listed in the result, never rolled back.
//! Partial attachment is an accepted, visible degraded outcome.

use tracing::{info, warn};

use crate::infrastructure::{Release, ReleaseHost, RetryPolicy};

/// One asset to attach: display name plus content bytes
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub content: Vec<u8>,
}

/// Result of an upload pass over all assets
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<String>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upload every asset to the release, tolerating per-asset failure.
pub async fn upload_assets<H: ReleaseHost>(
    host: &H,
    release: &Release,
    assets: &[Asset],
    policy: &RetryPolicy,
) -> UploadReport {
    let mut report = UploadReport::default();

    for asset in assets {
        match upload_one(host, release, asset, policy).await {
            Ok(()) => {
                info!(asset = %asset.name, release_id = release.id, "Uploaded release asset");
                report.uploaded.push(asset.name.clone());
            }
            Err(e) => {
                warn!(
                    asset = %asset.name,
                    release_id = release.id,
                    error = %e,
                    "Asset upload failed after retries, continuing with remaining assets"
                );
                report.failed.push(asset.name.clone());
            }
        }
    }

    report
}

async fn upload_one<H: ReleaseHost>(
    host: &H,
    release: &Release,
    asset: &Asset,
    policy: &RetryPolicy,
) -> Result<(), crate::error::ApiError> {
    let mut attempt = 0;
    loop {
        match host.upload_asset(release, &asset.name, &asset.content).await {
            Ok(()) => return Ok(()),
            Err(e) if policy.is_retryable(&e) && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt, &e);
                warn!(
                    asset = %asset.name,
                    attempt = attempt + 1,
                    error = %e,
                    "Asset upload attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
