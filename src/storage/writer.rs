//! storage::writer
//!
//! Buffered single-object writer.
//!
//! # State machine
//!
//! ```text
//! Open --write()--> Open --finalize()--> Closed
//!                                          |
//!                              finalize() again: no-op
//! ```
//!
//! Bytes are buffered in memory. `finalize` looks up the current blob SHA at
//! the path (absent means create), then makes one create-or-update call
//! carrying that SHA. The remote rejects the update if the file changed in
//! between, so a concurrent writer is reported rather than overwritten.
//!
//! The writer is Closed as soon as `finalize` starts, whatever the outcome,
//! and the buffer is discarded.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::backend::{ensure_live, Shared};
use super::error::{classify, StorageError};
use crate::core::paths::ObjectPath;
use crate::remote::{Contents, FileChange};

#[derive(Debug, Default)]
struct WriterState {
    buffer: Vec<u8>,
    closed: bool,
}

/// Writer for one object, created by [`Backend::writer`](super::Backend::writer).
pub struct ObjectWriter {
    shared: Arc<Shared>,
    path: ObjectPath,
    state: Mutex<WriterState>,
}

impl std::fmt::Debug for ObjectWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectWriter")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ObjectWriter {
    pub(crate) fn new(shared: Arc<Shared>, path: ObjectPath) -> Self {
        Self {
            shared,
            path,
            state: Mutex::new(WriterState::default()),
        }
    }

    /// Target path.
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Bytes buffered so far.
    pub async fn buffered(&self) -> usize {
        self.state.lock().await.buffer.len()
    }

    /// Append to the buffer. Returns the number of bytes accepted.
    ///
    /// # Errors
    ///
    /// [`StorageError::WriterClosed`] after `finalize`.
    pub async fn write(&self, data: &[u8]) -> Result<usize, StorageError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(StorageError::WriterClosed);
        }
        state.buffer.extend_from_slice(data);
        Ok(data.len())
    }

    /// Commit the buffered content. Idempotent: a second call succeeds
    /// without touching the remote.
    pub async fn finalize(&self, cancel: &CancellationToken) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        let content = std::mem::take(&mut state.buffer);

        let shared = &self.shared;
        let branch = &shared.identity.branch;
        shared.ensure_open().await?;
        ensure_live(cancel)?;

        let sha = match shared.lookup(&self.path, branch, cancel).await? {
            None => None,
            Some(Contents::Directory(_)) => {
                return Err(StorageError::PathIsDirectory(self.path.to_string()));
            }
            Some(Contents::File(file)) => Some(file.sha),
        };

        ensure_live(cancel)?;
        let size = content.len();
        let result = shared
            .remote
            .put_file(FileChange {
                path: self.path.as_str().to_string(),
                message: shared.template.render(self.path.as_str()),
                content,
                branch: branch.clone(),
                sha,
                author: shared.author.clone(),
            })
            .await
            .map_err(|e| classify(e, format!("write {}", self.path)))?;

        debug!(
            repo = %shared.identity.slug(),
            path = %self.path,
            bytes = size,
            commit = %result.commit_sha,
            "wrote object"
        );
        Ok(())
    }
}
