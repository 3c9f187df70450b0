//! Local git discovery
//!
//! Fallbacks for running outside a CI job: when the Actions environment
//! variables are absent, the commit SHA and branch come from the local
//! repository via the system git binary.

use anyhow::{Context, Result};
use tokio::process::Command;

/// Commit SHA for the run.
///
/// Priority:
/// 1. GITHUB_SHA env var (set by the Actions runner)
/// 2. git rev-parse HEAD (local/dry runs)
pub async fn discover_sha() -> Result<String> {
    if let Ok(sha) = std::env::var("GITHUB_SHA") {
        if !sha.is_empty() {
            return Ok(sha);
        }
    }

    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .await
        .context("Failed to execute git rev-parse - is git installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "Failed to resolve commit SHA: {}\n  \
             Ensure you're in a git repository with committed changes.",
            stderr.trim()
        );
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() {
        anyhow::bail!("Git returned empty SHA - repository may be corrupted");
    }

    Ok(sha)
}

/// Branch name for the run.
///
/// Priority: GITHUB_REF_NAME, then `git rev-parse --abbrev-ref HEAD`.
pub async fn discover_branch() -> Result<String> {
    if let Ok(branch) = std::env::var("GITHUB_REF_NAME") {
        if !branch.is_empty() {
            return Ok(branch);
        }
    }

    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()
        .await
        .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
        anyhow::bail!("Failed to resolve current branch");
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global; tests touching them hold this lock
    // and restore whatever was set before.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    async fn with_env<F, Fut, T>(var: &str, value: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _guard = ENV_LOCK.lock().unwrap();
        let prior = std::env::var(var).ok();
        std::env::set_var(var, value);
        let result = f().await;
        match prior {
            Some(v) => std::env::set_var(var, v),
            None => std::env::remove_var(var),
        }
        result
    }

    #[tokio::test]
    async fn test_sha_env_var_takes_priority() {
        let sha = with_env("GITHUB_SHA", "feedface00", discover_sha).await;
        assert_eq!(sha.unwrap(), "feedface00");
    }

    #[tokio::test]
    async fn test_branch_env_var_takes_priority() {
        let branch = with_env("GITHUB_REF_NAME", "v2.0-beta", discover_branch).await;
        assert_eq!(branch.unwrap(), "v2.0-beta");
    }
}
