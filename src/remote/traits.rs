//! remote::traits
//!
//! The transport boundary between the storage layer and a Git hosting API.
//!
//! # Design
//!
//! [`RemoteStore`] is async because every method is a network round trip.
//! It exposes exactly the object- and ref-level calls the storage layer
//! composes: whole-file contents (read, create-or-update, delete) and the
//! low-level Git data calls (blobs, trees, commits, refs) used by batch
//! commits.
//!
//! Errors come back as [`RemoteError`], unclassified. The storage layer
//! maps them onto its own taxonomy exactly once, at the call site.
//!
//! # Ref updates
//!
//! [`RemoteStore::update_ref`] never forces. Its outcome is a [`RefUpdate`]
//! rather than a bool so that a lost race carries the ref's current value
//! back to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::core::types::CommitAuthor;

/// Mode for a regular (non-executable) file in a tree.
pub const FILE_MODE: &str = "100644";

/// Errors from the transport.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// A structured API error payload, surfaced without a response status.
    #[error("API error: {0}")]
    Api(ApiErrorBody),

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// No usable credential.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl RemoteError {
    /// The HTTP status, when the transport exposed one directly.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Shorthand for a 404 with a message.
    pub fn not_found(message: impl Into<String>) -> Self {
        RemoteError::Http {
            status: 404,
            message: message.into(),
        }
    }
}

/// GitHub's error document: `{"message": ..., "documentation_url": ..., "status": "404"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// Status echoed in the payload. GitHub sends it as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ApiErrorBody {
    /// Numeric status from the payload, if present and well formed.
    pub fn status_code(&self) -> Option<u16> {
        self.status.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// Type tag of a single-object contents response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// A single object from the contents endpoint, content still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub path: String,
    pub kind: ContentKind,
    /// Git blob SHA-1 of the stored content
    pub sha: String,
    pub size: u64,
    /// `base64`, or `none` when the object is too large to inline
    pub encoding: String,
    pub content: String,
}

/// One child in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: String,
    pub kind: ContentKind,
    pub sha: String,
    pub size: u64,
}

/// Response of a contents lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    File(FileContent),
    Directory(Vec<DirEntry>),
}

/// Create-or-update of one file through the contents endpoint.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: String,
    pub message: String,
    pub content: Vec<u8>,
    pub branch: String,
    /// Current blob SHA; required when the file already exists
    pub sha: Option<String>,
    pub author: Option<CommitAuthor>,
}

/// Delete of one file through the contents endpoint.
#[derive(Debug, Clone)]
pub struct FileDeletion {
    pub path: String,
    pub message: String,
    /// Current blob SHA, required to authorize the delete
    pub sha: String,
    pub branch: String,
    pub author: Option<CommitAuthor>,
}

/// Result of a contents mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    /// The commit the mutation produced
    pub commit_sha: String,
    /// New blob SHA (absent for deletes)
    pub content_sha: Option<String>,
}

/// A commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommit {
    pub sha: String,
    pub tree_sha: String,
    pub parents: Vec<String>,
    pub message: String,
}

/// Entry kinds in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    Commit,
}

/// One entry of a (recursive) tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    pub kind: EntryKind,
    pub sha: String,
    /// Blob size; absent for trees
    pub size: Option<u64>,
}

/// A tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTree {
    pub sha: String,
    pub entries: Vec<TreeEntry>,
    /// The server cut the listing short
    pub truncated: bool,
}

/// A blob fetched by SHA, content still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitBlob {
    pub sha: String,
    pub size: u64,
    pub encoding: String,
    pub content: String,
}

/// An entry for tree construction relative to a base tree.
///
/// A `None` SHA removes the path from the base tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTreeEntry {
    pub path: String,
    pub mode: String,
    pub sha: Option<String>,
}

impl NewTreeEntry {
    /// Put blob `sha` at `path` as a regular file.
    pub fn file(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: FILE_MODE.to_string(),
            sha: Some(sha.into()),
        }
    }

    /// Remove `path` from the base tree.
    pub fn removal(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: FILE_MODE.to_string(),
            sha: None,
        }
    }

    pub fn is_removal(&self) -> bool {
        self.sha.is_none()
    }
}

/// A commit to create.
#[derive(Debug, Clone)]
pub struct NewCommit {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
    pub author: Option<CommitAuthor>,
}

/// Outcome of a non-forcing ref update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefUpdate {
    /// The ref now points at `sha`.
    Updated { sha: String },
    /// The ref had moved away from the expected commit. `current` is its
    /// value as observed after the rejection, when it could be read.
    Conflict { current: Option<String> },
}

/// Transport to a Git hosting API, bound to one repository.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one instance is shared by a
/// session and every writer and batch it hands out.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Transport name (e.g. "github", "mock").
    fn name(&self) -> &'static str;

    /// Fetch the object at `path` as of `reference`.
    ///
    /// The empty path lists the repository root.
    async fn get_contents(&self, path: &str, reference: &str) -> Result<Contents, RemoteError>;

    /// Create or update one file, producing one commit on `change.branch`.
    async fn put_file(&self, change: FileChange) -> Result<FileCommit, RemoteError>;

    /// Delete one file, producing one commit on `deletion.branch`.
    async fn delete_file(&self, deletion: FileDeletion) -> Result<FileCommit, RemoteError>;

    /// Resolve `branch` to the commit it points at.
    async fn get_ref(&self, branch: &str) -> Result<String, RemoteError>;

    /// Fetch a commit object.
    async fn get_commit(&self, sha: &str) -> Result<GitCommit, RemoteError>;

    /// Store `content` as a blob and return its SHA.
    async fn create_blob(&self, content: &[u8]) -> Result<String, RemoteError>;

    /// Build a tree from `base_tree` plus `entries` (last entry per path wins).
    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[NewTreeEntry],
    ) -> Result<String, RemoteError>;

    /// Create a commit object and return its SHA. Does not move any ref.
    async fn create_commit(&self, commit: NewCommit) -> Result<String, RemoteError>;

    /// Move `branch` from `expected` to `new_sha` without forcing.
    async fn update_ref(
        &self,
        branch: &str,
        expected: &str,
        new_sha: &str,
    ) -> Result<RefUpdate, RemoteError>;

    /// List the tree at `reference`, recursing into subtrees when asked.
    async fn get_tree(&self, reference: &str, recursive: bool) -> Result<GitTree, RemoteError>;

    /// Fetch a blob by SHA. Used for objects too large for the contents endpoint.
    async fn get_blob(&self, sha: &str) -> Result<GitBlob, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_status() {
        assert_eq!(RemoteError::not_found("x").status(), Some(404));
        assert_eq!(RemoteError::Network("down".into()).status(), None);
        assert_eq!(
            RemoteError::Api(ApiErrorBody {
                message: "Not Found".into(),
                documentation_url: None,
                status: Some("404".into()),
            })
            .status(),
            None
        );
    }

    #[test]
    fn api_error_body_status_code() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/rest","status":"401"}"#,
        )
        .unwrap();
        assert_eq!(body.status_code(), Some(401));
        assert_eq!(body.to_string(), "Bad credentials");

        let bare: ApiErrorBody = serde_json::from_str(r#"{"message":"oops"}"#).unwrap();
        assert_eq!(bare.status_code(), None);
    }

    #[test]
    fn remote_error_display() {
        assert_eq!(
            RemoteError::Http {
                status: 422,
                message: "Update is not a fast forward".into()
            }
            .to_string(),
            "HTTP 422: Update is not a fast forward"
        );
        assert_eq!(
            RemoteError::Network("connection refused".into()).to_string(),
            "network error: connection refused"
        );
        assert_eq!(
            RemoteError::Auth(AuthError::InvalidToken).to_string(),
            "authentication failed: token contains characters not allowed in a header"
        );
    }

    #[test]
    fn new_tree_entry_constructors() {
        let file = NewTreeEntry::file("a.txt", "abc");
        assert_eq!(file.mode, FILE_MODE);
        assert!(!file.is_removal());

        let removal = NewTreeEntry::removal("b.txt");
        assert!(removal.is_removal());
        assert_eq!(removal.sha, None);
    }

    #[test]
    fn content_kind_serde() {
        let kind: ContentKind = serde_json::from_str("\"dir\"").unwrap();
        assert_eq!(kind, ContentKind::Dir);
        let kind: EntryKind = serde_json::from_str("\"blob\"").unwrap();
        assert_eq!(kind, EntryKind::Blob);
    }
}
