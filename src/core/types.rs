//! core::types
//!
//! Domain types shared by the storage layer and the remote transport.
//!
//! # Types
//!
//! - [`RepoIdentity`] - Which repository and branch a session is bound to
//! - [`CommitAuthor`] - Optional author override for commits
//! - [`CommitMessageTemplate`] - Message with a `{path}` substitution point
//! - [`ReadOptions`] - Ref selection and client-side read window
//! - [`ObjectInfo`] / [`ObjectKind`] - Result of a stat
//! - [`BatchOperation`] - One queued intent inside a batch
//!
//! # Examples
//!
//! ```
//! use ghstore::core::types::{CommitMessageTemplate, git_blob_sha};
//!
//! let template = CommitMessageTemplate::default();
//! assert_eq!(template.render("a/b.txt"), "Update a/b.txt via ghstore");
//! assert_eq!(template.render_delete("a/b.txt"), "Delete a/b.txt via ghstore");
//!
//! // Same id `git hash-object` prints for an empty file.
//! assert_eq!(git_blob_sha(b""), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
//! ```

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use super::paths::ObjectPath;

/// Immutable identity of the repository a session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch that reads target and writes advance
    pub branch: String,
    /// REST API base URL
    pub api_base: String,
    /// Upload endpoint (enterprise deployments may host it separately)
    pub upload_base: String,
}

impl RepoIdentity {
    /// `owner/repo`, for logs and error messages.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Author override attached to every commit the session creates.
///
/// When absent, the remote attributes commits to the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// Commit message with a single `{path}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CommitMessageTemplate(String);

impl CommitMessageTemplate {
    /// Placeholder replaced by the target path.
    pub const PLACEHOLDER: &'static str = "{path}";

    /// Template used when none is configured.
    pub const DEFAULT: &'static str = "Update {path} via ghstore";

    /// Wrap a template string. An empty string selects the default.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        if template.is_empty() {
            Self::default()
        } else {
            Self(template)
        }
    }

    /// The raw template.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Message for a create or update of `path`.
    pub fn render(&self, path: &str) -> String {
        self.0.replace(Self::PLACEHOLDER, path)
    }

    /// Message for a delete of `path`: the template with "Update" swapped
    /// for "Delete", then rendered. The path itself is never rewritten.
    pub fn render_delete(&self, path: &str) -> String {
        self.0
            .replace("Update", "Delete")
            .replace(Self::PLACEHOLDER, path)
    }
}

impl From<String> for CommitMessageTemplate {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

impl From<CommitMessageTemplate> for String {
    fn from(template: CommitMessageTemplate) -> Self {
        template.0
    }
}

impl Default for CommitMessageTemplate {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

/// Options for a read.
///
/// The window is applied client-side after the whole object is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Bytes to skip from the start. Past the end yields empty content.
    pub offset: u64,
    /// Maximum bytes to return after the offset.
    pub limit: Option<u64>,
    /// Ref to read at (branch, tag or commit). Defaults to the session branch.
    pub reference: Option<String>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn at(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Whether a stat target is a file or a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// A blob with its content hash and size in bytes.
    File { sha: String, size: u64 },
    /// An implicit directory (a prefix of other paths).
    Directory,
}

/// Result of a stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Normalized path
    pub path: String,
    /// File or directory
    pub kind: ObjectKind,
}

impl ObjectInfo {
    /// Size in bytes. Directories report 0.
    pub fn size(&self) -> u64 {
        match &self.kind {
            ObjectKind::File { size, .. } => *size,
            ObjectKind::Directory => 0,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, ObjectKind::Directory)
    }

    /// Content hash (git blob SHA-1). `None` for directories.
    pub fn sha(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::File { sha, .. } => Some(sha),
            ObjectKind::Directory => None,
        }
    }
}

/// A queued batch intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Create or replace the file at `path`.
    Write { path: ObjectPath, content: Vec<u8> },
    /// Remove the file at `path` if it exists.
    Delete { path: ObjectPath },
}

impl BatchOperation {
    pub fn path(&self) -> &ObjectPath {
        match self {
            BatchOperation::Write { path, .. } | BatchOperation::Delete { path } => path,
        }
    }
}

/// Git blob id of `content`: SHA-1 over `blob <len>\0<content>`.
pub fn git_blob_sha(content: &[u8]) -> String {
    git_object_sha("blob", content)
}

/// Git object id for an arbitrary object type and payload.
pub fn git_object_sha(kind: &str, payload: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{} {}\0", kind, payload.len()).as_bytes());
    hasher.update(payload);
    hex::encode(hasher.finalize())
}
