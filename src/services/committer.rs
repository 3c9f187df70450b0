//! Artifact transaction committer
//!
//! Commits a set of generated files to a branch as one atomic operation
//! through the host's git object database. Six ordered calls: resolve the
//! branch tip, resolve its tree, create one blob per file, create an
//! overlay tree, create a commit, then compare-and-swap the ref.
//!
//! Success is defined solely by the final ref update. Blobs, trees, and
//! commits are content-addressed and unreachable until the ref moves, so
//! a failure at any earlier step leaves the branch untouched with no
//! rollback needed. A rejected ref update means another writer moved the
//! branch; that surfaces as a conflict and is never retried here.

use tracing::{debug, info};

use crate::error::{ApiError, CommitError};
use crate::infrastructure::ObjectStore;

/// Record of one executed (or attempted) commit transaction
#[derive(Debug, Clone)]
pub struct CommitTransaction {
    pub base_branch_sha: String,
    pub base_tree_sha: String,
    /// path -> blob sha, in input order
    pub blob_shas: Vec<(String, String)>,
    pub new_tree_sha: String,
    pub new_commit_sha: String,
}

/// Commit `files` (path, content) to `branch` atomically.
pub async fn commit_files<S: ObjectStore>(
    store: &S,
    branch: &str,
    message: &str,
    files: &[(String, Vec<u8>)],
) -> Result<CommitTransaction, CommitError> {
    if files.is_empty() {
        return Err(CommitError::EmptyFileSet);
    }

    let base_branch_sha = store
        .branch_tip(branch)
        .await
        .map_err(|e| store_failed("resolve branch tip", e))?;

    let base_tree_sha = store
        .commit_tree(&base_branch_sha)
        .await
        .map_err(|e| store_failed("resolve base tree", e))?;

    debug!(
        branch = %branch,
        base = %base_branch_sha,
        tree = %base_tree_sha,
        "Resolved transaction base"
    );

    let mut blob_shas = Vec::with_capacity(files.len());
    for (path, content) in files {
        let sha = store
            .create_blob(content)
            .await
            .map_err(|e| store_failed("create blob", e))?;
        blob_shas.push((path.clone(), sha));
    }

    // Partial overlay on the base tree: paths outside the input mapping
    // are inherited unchanged.
    let new_tree_sha = store
        .create_tree(&base_tree_sha, &blob_shas)
        .await
        .map_err(|e| store_failed("create tree", e))?;

    let new_commit_sha = store
        .create_commit(message, &new_tree_sha, &base_branch_sha)
        .await
        .map_err(|e| store_failed("create commit", e))?;

    match store
        .update_ref(branch, &new_commit_sha, &base_branch_sha)
        .await
    {
        Ok(()) => {
            info!(
                branch = %branch,
                commit = %new_commit_sha,
                files = files.len(),
                "Committed artifact transaction"
            );
            Ok(CommitTransaction {
                base_branch_sha,
                base_tree_sha,
                blob_shas,
                new_tree_sha,
                new_commit_sha,
            })
        }
        Err(ApiError::Conflict { message }) => Err(CommitError::RefConflict {
            branch: branch.to_string(),
            expected: base_branch_sha,
            message,
        }),
        Err(e) => Err(store_failed("update ref", e)),
    }
}

fn store_failed(step: &'static str, source: ApiError) -> CommitError {
    CommitError::StoreFailed { step, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MemoryStore;

    fn files(n: usize) -> Vec<(String, Vec<u8>)> {
        (0..n)
            .map(|i| (format!("path/file{}.txt", i), format!("content {}", i).into_bytes()))
            .collect()
    }

    #[tokio::test]
    async fn test_successful_transaction_moves_ref() {
        let store = MemoryStore::new("main", "base0");
        let tx = commit_files(&store, "main", "release artifacts", &files(2))
            .await
            .unwrap();

        assert_eq!(tx.base_branch_sha, "base0");
        assert_eq!(tx.blob_shas.len(), 2);
        assert_eq!(store.branch_sha("main"), tx.new_commit_sha);
    }

    #[tokio::test]
    async fn test_ref_conflict_leaves_branch_untouched() {
        let store = MemoryStore::new("main", "base0");
        store.fail_ref_update_with_conflict();

        let err = commit_files(&store, "main", "release artifacts", &files(2))
            .await
            .unwrap_err();

        assert!(matches!(err, CommitError::RefConflict { .. }));
        // Objects were created but nothing reachable changed
        assert_eq!(store.branch_sha("main"), "base0");
        assert!(store.created_commits() > 0);
    }

    #[tokio::test]
    async fn test_blob_failure_aborts_before_any_ref_change() {
        let store = MemoryStore::new("main", "base0");
        // First blob succeeds, second fails
        store.fail_blob_at(1);

        let err = commit_files(&store, "main", "release artifacts", &files(2))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommitError::StoreFailed {
                step: "create blob",
                ..
            }
        ));
        assert_eq!(store.branch_sha("main"), "base0");
        assert_eq!(store.created_commits(), 0);
    }

    #[test]
    fn test_empty_file_set_is_rejected() {
        let store = MemoryStore::new("main", "base0");
        let err = tokio_test::block_on(commit_files(&store, "main", "msg", &[])).unwrap_err();
        assert!(matches!(err, CommitError::EmptyFileSet));
        assert!(store.call_log().is_empty());
    }

    #[tokio::test]
    async fn test_calls_are_strictly_ordered() {
        let store = MemoryStore::new("main", "base0");
        commit_files(&store, "main", "msg", &files(1)).await.unwrap();
        assert_eq!(
            store.call_log(),
            vec![
                "branch_tip",
                "commit_tree",
                "create_blob",
                "create_tree",
                "create_commit",
                "update_ref",
            ]
        );
    }
}
