//! In-memory doubles for the host traits
//!
//! Shared by the service tests: a fake object store with failure
//! injection (conflicts, per-call errors), a fake release host, and a
//! fake run-control surface. No network involved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::ApiError;
use crate::infrastructure::{ObjectStore, Release, ReleaseHost, ReleaseRequest, RunControl};

fn transient(message: &str) -> ApiError {
    ApiError::Transient {
        status: 502,
        message: message.to_string(),
    }
}

/// Object store double backed by hash maps
#[derive(Default)]
pub struct MemoryStore {
    branches: Mutex<HashMap<String, String>>,
    files: Mutex<HashMap<(String, String), Vec<u8>>>,
    calls: Mutex<Vec<&'static str>>,
    object_counter: AtomicU64,
    commit_count: AtomicU64,
    conflict_on_ref_update: AtomicBool,
    failing_blob_index: Mutex<Option<u64>>,
    blob_counter: AtomicU64,
}

impl MemoryStore {
    pub fn new(branch: &str, tip_sha: &str) -> Self {
        let store = Self::default();
        store
            .branches
            .lock()
            .unwrap()
            .insert(branch.to_string(), tip_sha.to_string());
        store
    }

    pub fn put_file(&self, branch: &str, path: &str, content: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert((branch.to_string(), path.to_string()), content.to_vec());
    }

    pub fn branch_sha(&self, branch: &str) -> String {
        self.branches.lock().unwrap()[branch].clone()
    }

    pub fn created_commits(&self) -> u64 {
        self.commit_count.load(Ordering::SeqCst)
    }

    pub fn call_log(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_ref_update_with_conflict(&self) {
        self.conflict_on_ref_update.store(true, Ordering::SeqCst);
    }

    /// Make the zero-based nth blob creation fail
    pub fn fail_blob_at(&self, index: u64) {
        *self.failing_blob_index.lock().unwrap() = Some(index);
    }

    fn next_sha(&self, kind: &str) -> String {
        let n = self.object_counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{}", kind, n)
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ObjectStore for MemoryStore {
    async fn branch_tip(&self, branch: &str) -> Result<String, ApiError> {
        self.record("branch_tip");
        self.branches
            .lock()
            .unwrap()
            .get(branch)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("branch {}", branch),
            })
    }

    async fn commit_tree(&self, _commit_sha: &str) -> Result<String, ApiError> {
        self.record("commit_tree");
        Ok(self.next_sha("tree"))
    }

    async fn create_blob(&self, _content: &[u8]) -> Result<String, ApiError> {
        self.record("create_blob");
        let index = self.blob_counter.fetch_add(1, Ordering::SeqCst);
        if *self.failing_blob_index.lock().unwrap() == Some(index) {
            return Err(transient("blob creation failed"));
        }
        Ok(self.next_sha("blob"))
    }

    async fn create_tree(
        &self,
        _base_tree: &str,
        _entries: &[(String, String)],
    ) -> Result<String, ApiError> {
        self.record("create_tree");
        Ok(self.next_sha("tree"))
    }

    async fn create_commit(
        &self,
        _message: &str,
        _tree_sha: &str,
        _parent_sha: &str,
    ) -> Result<String, ApiError> {
        self.record("create_commit");
        self.commit_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_sha("commit"))
    }

    async fn update_ref(
        &self,
        branch: &str,
        new_sha: &str,
        expected_sha: &str,
    ) -> Result<(), ApiError> {
        self.record("update_ref");
        if self.conflict_on_ref_update.load(Ordering::SeqCst) {
            return Err(ApiError::Conflict {
                message: "branch moved".to_string(),
            });
        }
        let mut branches = self.branches.lock().unwrap();
        let current = branches.get(branch).cloned().unwrap_or_default();
        if current != expected_sha {
            return Err(ApiError::Conflict {
                message: format!("expected {} but branch is at {}", expected_sha, current),
            });
        }
        branches.insert(branch.to_string(), new_sha.to_string());
        Ok(())
    }

    async fn read_file(&self, branch: &str, path: &str) -> Result<Option<Vec<u8>>, ApiError> {
        self.record("read_file");
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&(branch.to_string(), path.to_string()))
            .cloned())
    }
}

/// Release host double
#[derive(Default)]
pub struct MemoryHost {
    releases: Mutex<Vec<Release>>,
    next_id: AtomicU64,
    pub create_calls: AtomicU32,
    pub update_calls: AtomicU32,
    uploaded: Mutex<Vec<(u64, String)>>,
    /// Number of leading lookup calls that fail transiently
    lookup_failures: AtomicU32,
    /// Number of leading update calls that fail transiently
    update_failures: AtomicU32,
    failing_asset: Mutex<Option<String>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    pub fn fail_next_lookups(&self, count: u32) {
        self.lookup_failures.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_updates(&self, count: u32) {
        self.update_failures.store(count, Ordering::SeqCst);
    }

    /// Every upload of this asset name fails transiently
    pub fn fail_asset(&self, name: &str) {
        *self.failing_asset.lock().unwrap() = Some(name.to_string());
    }

    pub fn release_count(&self) -> usize {
        self.releases.lock().unwrap().len()
    }

    pub fn uploaded_assets(&self) -> Vec<(u64, String)> {
        self.uploaded.lock().unwrap().clone()
    }
}

impl ReleaseHost for MemoryHost {
    async fn release_by_tag(&self, tag: &str) -> Result<Option<Release>, ApiError> {
        let remaining = self.lookup_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.lookup_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(transient("lookup failed"));
        }
        Ok(self
            .releases
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.tag_name == tag)
            .cloned())
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<Release, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let release = Release {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            tag_name: request.tag_name.clone(),
            upload_url: String::new(),
            html_url: String::new(),
            prerelease: request.prerelease,
        };
        self.releases.lock().unwrap().push(release.clone());
        Ok(release)
    }

    async fn update_release(
        &self,
        release_id: u64,
        request: &ReleaseRequest,
    ) -> Result<Release, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.update_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.update_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(transient("update failed"));
        }
        let mut releases = self.releases.lock().unwrap();
        let release = releases
            .iter_mut()
            .find(|r| r.id == release_id)
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("release {}", release_id),
            })?;
        release.prerelease = request.prerelease;
        Ok(release.clone())
    }

    async fn upload_asset(
        &self,
        release: &Release,
        name: &str,
        _content: &[u8],
    ) -> Result<(), ApiError> {
        if self.failing_asset.lock().unwrap().as_deref() == Some(name) {
            return Err(transient("asset upload failed"));
        }
        self.uploaded
            .lock()
            .unwrap()
            .push((release.id, name.to_string()));
        Ok(())
    }
}

/// Run-control double
#[derive(Default)]
pub struct MemoryRunControl {
    pub cancel_calls: AtomicU32,
    fail: AtomicBool,
}

impl MemoryRunControl {
    pub fn failing() -> Self {
        let control = Self::default();
        control.fail.store(true, Ordering::SeqCst);
        control
    }

    pub fn cancelled(&self) -> bool {
        self.cancel_calls.load(Ordering::SeqCst) > 0
    }
}

impl RunControl for MemoryRunControl {
    async fn cancel_run(&self, _run_id: u64) -> Result<(), ApiError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(transient("cancel endpoint unavailable"));
        }
        Ok(())
    }
}
