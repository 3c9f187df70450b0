//! GitHub API client
//!
//! One client covers everything the pipeline needs from the host: the git
//! object database (refs, commits, blobs, trees) for atomic artifact
//! commits, the releases API for idempotent publishing, raw content reads
//! for change detection, and the Actions run-cancellation endpoint.
//!
//! The `ObjectStore`, `ReleaseHost`, and `RunControl` traits are the
//! seams the services depend on, so tests can inject in-memory doubles
//! and simulate conflicts without a network.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ConfigError};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_UPLOAD_BASE: &str = "https://uploads.github.com";
const USER_AGENT: &str = concat!("capstan/", env!("CARGO_PKG_VERSION"));

/// Tree-structured object store exposed by the source-control host.
///
/// The six methods map one-to-one onto the ordered calls of the atomic
/// commit protocol; `read_file` additionally serves version-state and
/// change-gate reads.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Resolve a branch to its current tip commit SHA
    async fn branch_tip(&self, branch: &str) -> Result<String, ApiError>;

    /// Resolve a commit to its root tree SHA
    async fn commit_tree(&self, commit_sha: &str) -> Result<String, ApiError>;

    /// Create a content-addressed blob, returning its SHA
    async fn create_blob(&self, content: &[u8]) -> Result<String, ApiError>;

    /// Create a tree overlaying `entries` (path, blob sha) on `base_tree`
    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[(String, String)],
    ) -> Result<String, ApiError>;

    /// Create a commit with a single parent
    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, ApiError>;

    /// Point the branch ref at `new_sha`, with `expected_sha` as the
    /// optimistic-concurrency precondition. A moved branch is a
    /// `Conflict`, never silently forced.
    async fn update_ref(
        &self,
        branch: &str,
        new_sha: &str,
        expected_sha: &str,
    ) -> Result<(), ApiError>;

    /// Read a committed file's raw bytes; `None` when the path does not
    /// exist on the branch.
    async fn read_file(&self, branch: &str, path: &str) -> Result<Option<Vec<u8>>, ApiError>;
}

/// Release record store on the host
#[allow(async_fn_in_trait)]
pub trait ReleaseHost {
    /// Look up a release by its tag; `None` when absent
    async fn release_by_tag(&self, tag: &str) -> Result<Option<Release>, ApiError>;

    async fn create_release(&self, request: &ReleaseRequest) -> Result<Release, ApiError>;

    async fn update_release(
        &self,
        release_id: u64,
        request: &ReleaseRequest,
    ) -> Result<Release, ApiError>;

    /// Attach a named asset to an existing release
    async fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        content: &[u8],
    ) -> Result<(), ApiError>;
}

/// CI run control surface
#[allow(async_fn_in_trait)]
pub trait RunControl {
    /// Request cancellation of a run. Fire-and-forget: the call is
    /// bounded by the client timeout and never polls for confirmation.
    async fn cancel_run(&self, run_id: u64) -> Result<(), ApiError>;
}

/// A published release record
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub prerelease: bool,
}

impl Release {
    /// Concrete upload endpoint for an asset name.
    ///
    /// `upload_url` arrives as an RFC 6570 template ending in
    /// `{?name,label}`.
    pub fn asset_upload_url(&self, name: &str) -> String {
        let base = match self.upload_url.find('{') {
            Some(idx) => &self.upload_url[..idx],
            None => self.upload_url.as_str(),
        };
        format!("{}?name={}", base, urlencoding::encode(name))
    }
}

/// Create/update payload for a release
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseRequest {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub prerelease: bool,
    pub target_commitish: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: ObjectRef,
}

#[derive(Deserialize)]
struct ObjectRef {
    sha: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    tree: ObjectRef,
}

#[derive(Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Serialize)]
struct TreeEntry<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: &'a str,
}

/// GitHub REST client for one target repository
pub struct GithubClient {
    client: Client,
    api_base: String,
    upload_base: String,
    owner: String,
    repo: String,
}

impl GithubClient {
    /// Create a client for `owner/name` with a bearer token
    pub fn new(repository: &str, token: &str) -> Result<Self, ConfigError> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'))
            .ok_or_else(|| ConfigError::InvalidRepository {
                repository: repository.to_string(),
            })?;

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ConfigError::TokenNotFound)?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| ConfigError::MissingField {
                field: "http client".to_string(),
            })?;

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Map a non-success response to an `ApiError`
    async fn classify(resource: &str, response: Response) -> ApiError {
        let status = response.status();
        let reset_at = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let message = response.text().await.unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: resource.to_string(),
            },
            StatusCode::CONFLICT => ApiError::Conflict { message },
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { reset_at },
            // Secondary rate limits surface as 403 with the quota spent
            StatusCode::FORBIDDEN if remaining == Some(0) => ApiError::RateLimited { reset_at },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Authorization {
                status: status.as_u16(),
                message,
            },
            s if s.is_server_error() => ApiError::Transient {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Validation {
                status: s.as_u16(),
                message,
            },
        }
    }

    async fn expect_success(resource: &str, response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::classify(resource, response).await)
        }
    }
}

impl ObjectStore for GithubClient {
    async fn branch_tip(&self, branch: &str) -> Result<String, ApiError> {
        let url = self.repo_url(&format!("git/ref/heads/{}", branch));
        let response = self.client.get(&url).send().await?;
        let response = Self::expect_success("branch ref", response).await?;
        let parsed: RefResponse = response.json().await?;
        Ok(parsed.object.sha)
    }

    async fn commit_tree(&self, commit_sha: &str) -> Result<String, ApiError> {
        let url = self.repo_url(&format!("git/commits/{}", commit_sha));
        let response = self.client.get(&url).send().await?;
        let response = Self::expect_success("commit", response).await?;
        let parsed: CommitResponse = response.json().await?;
        Ok(parsed.tree.sha)
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, ApiError> {
        let url = self.repo_url("git/blobs");
        let body = serde_json::json!({
            "content": BASE64.encode(content),
            "encoding": "base64",
        });
        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::expect_success("blob", response).await?;
        let parsed: ShaResponse = response.json().await?;
        Ok(parsed.sha)
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[(String, String)],
    ) -> Result<String, ApiError> {
        let url = self.repo_url("git/trees");
        let tree: Vec<TreeEntry<'_>> = entries
            .iter()
            .map(|(path, sha)| TreeEntry {
                path,
                mode: "100644",
                kind: "blob",
                sha,
            })
            .collect();
        let body = serde_json::json!({
            "base_tree": base_tree,
            "tree": tree,
        });
        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::expect_success("tree", response).await?;
        let parsed: ShaResponse = response.json().await?;
        Ok(parsed.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, ApiError> {
        let url = self.repo_url("git/commits");
        let body = serde_json::json!({
            "message": message,
            "tree": tree_sha,
            "parents": [parent_sha],
        });
        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::expect_success("commit object", response).await?;
        let parsed: ShaResponse = response.json().await?;
        Ok(parsed.sha)
    }

    async fn update_ref(
        &self,
        branch: &str,
        new_sha: &str,
        expected_sha: &str,
    ) -> Result<(), ApiError> {
        let url = self.repo_url(&format!("git/refs/heads/{}", branch));
        // force=false makes the host reject any non-fast-forward update,
        // which is exactly the compare-and-swap on expected_sha: the new
        // commit's only parent is expected_sha, so the update fast-forwards
        // iff the branch still points there.
        let body = serde_json::json!({
            "sha": new_sha,
            "force": false,
        });
        let response = self.client.patch(&url).json(&body).send().await?;
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Conflict {
                message: format!(
                    "ref update rejected, branch no longer at {}: {}",
                    expected_sha, message
                ),
            });
        }
        Self::expect_success("ref update", response).await?;
        Ok(())
    }

    async fn read_file(&self, branch: &str, path: &str) -> Result<Option<Vec<u8>>, ApiError> {
        let url = self.repo_url(&format!("contents/{}", path));
        let response = self
            .client
            .get(&url)
            .query(&[("ref", branch)])
            .header(header::ACCEPT, "application/vnd.github.raw+json")
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::expect_success("file content", response).await?;
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

impl ReleaseHost for GithubClient {
    async fn release_by_tag(&self, tag: &str) -> Result<Option<Release>, ApiError> {
        let url = self.repo_url(&format!("releases/tags/{}", tag));
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::expect_success("release", response).await?;
        Ok(Some(response.json().await?))
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<Release, ApiError> {
        let url = self.repo_url("releases");
        let response = self.client.post(&url).json(request).send().await?;
        let response = Self::expect_success("release create", response).await?;
        Ok(response.json().await?)
    }

    async fn update_release(
        &self,
        release_id: u64,
        request: &ReleaseRequest,
    ) -> Result<Release, ApiError> {
        let url = self.repo_url(&format!("releases/{}", release_id));
        let response = self.client.patch(&url).json(request).send().await?;
        let response = Self::expect_success("release update", response).await?;
        Ok(response.json().await?)
    }

    async fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        content: &[u8],
    ) -> Result<(), ApiError> {
        let url = if release.upload_url.is_empty() {
            format!(
                "{}/repos/{}/{}/releases/{}/assets?name={}",
                self.upload_base,
                self.owner,
                self.repo,
                release.id,
                urlencoding::encode(name)
            )
        } else {
            release.asset_upload_url(name)
        };
        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await?;
        Self::expect_success("asset upload", response).await?;
        Ok(())
    }
}

impl RunControl for GithubClient {
    async fn cancel_run(&self, run_id: u64) -> Result<(), ApiError> {
        let url = self.repo_url(&format!("actions/runs/{}/cancel", run_id));
        let response = self.client.post(&url).send().await?;
        // 202 Accepted; no polling for the run to actually stop
        Self::expect_success("run cancellation", response).await?;
        Ok(())
    }
}
