//! storage::batch
//!
//! Atomic multi-path commits.
//!
//! # Protocol
//!
//! A [`Batch`] queues write and delete intents locally. [`Batch::commit`]
//! turns the whole queue into exactly one commit:
//!
//! 1. Resolve the branch to its head ("base commit") and that commit's tree.
//! 2. Upload each written file as a blob; look up each deleted path at the
//!    base commit and keep it only if it exists.
//! 3. Create a tree from the base tree plus those entries. An entry without
//!    a blob SHA removes its path.
//! 4. Create a commit with the base commit as its only parent.
//! 5. Move the branch from the base commit to the new one, without forcing.
//!
//! If another writer moved the branch after step 1, step 5 fails with
//! [`StorageError::Conflict`]; the objects created on the way stay
//! unreachable. Nothing is retried here.
//!
//! An empty queue commits nothing and makes no network calls.
//!
//! # Intents on the same path
//!
//! The last intent for a path wins: a write then a delete deletes, a delete
//! then a write writes. Superseded intents are dropped before any upload.
//!
//! Writes follow tree-edit rules: a write to a path that is a directory on
//! the base replaces that whole subtree. [`ObjectWriter`](super::ObjectWriter)
//! refuses the same case with `PathIsDirectory`.
//!
//! # Failure
//!
//! The batch only becomes Committed after the ref update succeeds (or for an
//! empty queue). Any earlier failure leaves it Uncommitted with its queue
//! intact, so `commit` can be called again.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::backend::{ensure_live, Shared};
use super::error::{classify, StorageError};
use crate::core::paths::ObjectPath;
use crate::core::types::BatchOperation;
use crate::remote::{Contents, NewCommit, NewTreeEntry, RefUpdate};

/// Commit message used when a batch is started without one.
pub const DEFAULT_BATCH_MESSAGE: &str = "Batch update via ghstore";

#[derive(Debug, Default)]
struct BatchState {
    operations: Vec<BatchOperation>,
    committed: bool,
}

/// A queue of intents committed together, created by
/// [`Backend::batch`](super::Backend::batch).
pub struct Batch {
    shared: Arc<Shared>,
    message: String,
    state: Mutex<BatchState>,
}

impl std::fmt::Debug for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Batch {
    pub(crate) fn new(shared: Arc<Shared>, message: &str) -> Self {
        let message = if message.is_empty() {
            DEFAULT_BATCH_MESSAGE.to_string()
        } else {
            message.to_string()
        };
        Self {
            shared,
            message,
            state: Mutex::new(BatchState::default()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Queue a create-or-replace of `path`.
    pub async fn write(&self, path: &str, content: impl Into<Vec<u8>>) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if state.committed {
            return Err(StorageError::BatchAlreadyCommitted);
        }
        let path = ObjectPath::parse_leaf(path)?;
        state.operations.push(BatchOperation::Write {
            path,
            content: content.into(),
        });
        Ok(())
    }

    /// Queue a removal of `path`. Missing paths are skipped at commit time.
    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if state.committed {
            return Err(StorageError::BatchAlreadyCommitted);
        }
        let path = ObjectPath::parse_leaf(path)?;
        state.operations.push(BatchOperation::Delete { path });
        Ok(())
    }

    /// Number of queued intents.
    pub async fn len(&self) -> usize {
        self.state.lock().await.operations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.operations.is_empty()
    }

    pub async fn is_committed(&self) -> bool {
        self.state.lock().await.committed
    }

    /// Queued intents in insertion order.
    pub async fn operations(&self) -> Vec<BatchOperation> {
        self.state.lock().await.operations.clone()
    }

    /// Commit every queued intent as one commit.
    ///
    /// Returns the new head, or `None` when the queue was empty.
    ///
    /// # Errors
    ///
    /// - [`StorageError::BatchAlreadyCommitted`] on a second call
    /// - [`StorageError::Conflict`] if the branch moved during the commit
    /// - [`StorageError::PathIsDirectory`] if a queued delete names a directory
    pub async fn commit(&self, cancel: &CancellationToken) -> Result<Option<String>, StorageError> {
        let mut state = self.state.lock().await;
        if state.committed {
            return Err(StorageError::BatchAlreadyCommitted);
        }
        self.shared.ensure_open().await?;

        if state.operations.is_empty() {
            state.committed = true;
            debug!("empty batch, nothing to commit");
            return Ok(None);
        }

        let head = self.apply(&state.operations, cancel).await?;
        state.committed = true;
        Ok(Some(head))
    }

    async fn apply(
        &self,
        operations: &[BatchOperation],
        cancel: &CancellationToken,
    ) -> Result<String, StorageError> {
        let shared = &self.shared;
        let remote = &shared.remote;
        let branch = &shared.identity.branch;

        ensure_live(cancel)?;
        let base = remote
            .get_ref(branch)
            .await
            .map_err(|e| classify(e, format!("get ref {}", branch)))?;

        ensure_live(cancel)?;
        let base_commit = remote
            .get_commit(&base)
            .await
            .map_err(|e| classify(e, format!("get commit {}", base)))?;

        let intents = last_per_path(operations);
        let mut entries = Vec::with_capacity(intents.len());
        for intent in intents {
            match intent {
                BatchOperation::Write { path, content } => {
                    ensure_live(cancel)?;
                    let sha = remote
                        .create_blob(content)
                        .await
                        .map_err(|e| classify(e, format!("create blob {}", path)))?;
                    entries.push(NewTreeEntry::file(path.as_str(), sha));
                }
                BatchOperation::Delete { path } => {
                    match shared.lookup(path, &base, cancel).await? {
                        None => debug!(path = %path, "skipping delete of missing object"),
                        Some(Contents::Directory(_)) => {
                            return Err(StorageError::PathIsDirectory(path.to_string()));
                        }
                        Some(Contents::File(_)) => entries.push(NewTreeEntry::removal(path.as_str())),
                    }
                }
            }
        }

        ensure_live(cancel)?;
        let tree = remote
            .create_tree(&base_commit.tree_sha, &entries)
            .await
            .map_err(|e| classify(e, format!("create tree on {}", base_commit.tree_sha)))?;

        ensure_live(cancel)?;
        let commit = remote
            .create_commit(NewCommit {
                message: self.message.clone(),
                tree,
                parents: vec![base.clone()],
                author: shared.author.clone(),
            })
            .await
            .map_err(|e| classify(e, "create commit"))?;

        ensure_live(cancel)?;
        let outcome = remote
            .update_ref(branch, &base, &commit)
            .await
            .map_err(|e| classify(e, format!("update ref {}", branch)))?;

        match outcome {
            RefUpdate::Updated { sha } => {
                debug!(
                    repo = %shared.identity.slug(),
                    branch = %branch,
                    commit = %sha,
                    entries = entries.len(),
                    "committed batch"
                );
                Ok(sha)
            }
            RefUpdate::Conflict { current } => {
                warn!(
                    repo = %shared.identity.slug(),
                    branch = %branch,
                    expected = %base,
                    current = current.as_deref().unwrap_or("unknown"),
                    "branch moved during batch commit"
                );
                Err(StorageError::Conflict {
                    branch: branch.clone(),
                    expected: base,
                    current,
                })
            }
        }
    }
}

/// Keep only the last intent per path, ordered by that last occurrence.
fn last_per_path(operations: &[BatchOperation]) -> Vec<&BatchOperation> {
    let last: HashMap<&ObjectPath, usize> = operations
        .iter()
        .enumerate()
        .map(|(index, op)| (op.path(), index))
        .collect();

    operations
        .iter()
        .enumerate()
        .filter(|(index, op)| last.get(op.path()) == Some(index))
        .map(|(_, op)| op)
        .collect()
}
