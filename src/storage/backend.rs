//! storage::backend
//!
//! The storage session: lifecycle guard plus the single-round-trip
//! operations (read, exists, stat, list, delete).
//!
//! # Lifecycle
//!
//! A [`Backend`] is Open until [`Backend::close`], which is one-way and
//! idempotent. Every operation checks, in order:
//!
//! 1. the session is open ([`StorageError::BackendClosed`])
//! 2. the caller has not cancelled ([`StorageError::Cancelled`])
//! 3. the path is valid ([`StorageError::InvalidPath`])
//!
//! before any network call. Cancellation is checked again before each later
//! round trip; a call already in flight is never interrupted.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use ghstore::core::types::ReadOptions;
//! use ghstore::remote::mock::MockRemote;
//! use ghstore::storage::{Backend, BackendSettings};
//!
//! # tokio_test::block_on(async {
//! let remote = Arc::new(MockRemote::new());
//! let backend = Backend::with_remote(remote, BackendSettings::new("octocat", "notes"));
//! let cancel = CancellationToken::new();
//!
//! backend.write("a/b.txt", b"hello".to_vec(), &cancel).await.unwrap();
//! let data = backend.read("a/b.txt", &ReadOptions::new(), &cancel).await.unwrap();
//! assert_eq!(data, b"hello");
//! # });
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::batch::Batch;
use super::error::{classify, StorageError};
use super::features::Features;
use super::reader::{apply_window, decode};
use super::writer::ObjectWriter;
use crate::core::config::{Config, DEFAULT_BASE_URL, DEFAULT_BRANCH, DEFAULT_UPLOAD_URL};
use crate::core::paths::ObjectPath;
use crate::core::types::{
    CommitAuthor, CommitMessageTemplate, ObjectInfo, ObjectKind, ReadOptions, RepoIdentity,
};
use crate::remote::{create_remote, Contents, EntryKind, FileDeletion, RemoteStore};

/// Everything a session needs besides the transport.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub identity: RepoIdentity,
    pub commit_message: CommitMessageTemplate,
    pub commit_author: Option<CommitAuthor>,
}

impl BackendSettings {
    /// Settings for `owner/repo` on public GitHub, branch `main`.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            identity: RepoIdentity {
                owner: owner.into(),
                repo: repo.into(),
                branch: DEFAULT_BRANCH.to_string(),
                api_base: DEFAULT_BASE_URL.trim_end_matches('/').to_string(),
                upload_base: DEFAULT_UPLOAD_URL.trim_end_matches('/').to_string(),
            },
            commit_message: CommitMessageTemplate::default(),
            commit_author: None,
        }
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.identity.branch = branch.into();
        self
    }

    pub fn commit_message(mut self, template: CommitMessageTemplate) -> Self {
        self.commit_message = template;
        self
    }

    pub fn commit_author(mut self, author: CommitAuthor) -> Self {
        self.commit_author = Some(author);
        self
    }
}

impl From<&Config> for BackendSettings {
    fn from(config: &Config) -> Self {
        Self {
            identity: config.identity(),
            commit_message: config.commit_message.clone(),
            commit_author: config.commit_author.clone(),
        }
    }
}

/// State shared by a session and the writers and batches it hands out.
pub(crate) struct Shared {
    pub(crate) remote: Arc<dyn RemoteStore>,
    pub(crate) identity: RepoIdentity,
    pub(crate) template: CommitMessageTemplate,
    pub(crate) author: Option<CommitAuthor>,
    closed: RwLock<bool>,
}

impl Shared {
    /// Fail with `BackendClosed` once the session is closed.
    pub(crate) async fn ensure_open(&self) -> Result<(), StorageError> {
        if *self.closed.read().await {
            return Err(StorageError::BackendClosed);
        }
        Ok(())
    }

    /// Fetch the object at `path`, treating NotFound as absence.
    pub(crate) async fn lookup(
        &self,
        path: &ObjectPath,
        reference: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Contents>, StorageError> {
        ensure_live(cancel)?;
        match self.remote.get_contents(path.as_str(), reference).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) => match classify(e, format!("get contents {}", path)) {
                StorageError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }
}

/// Fail with `Cancelled` if the caller gave up.
pub(crate) fn ensure_live(cancel: &CancellationToken) -> Result<(), StorageError> {
    if cancel.is_cancelled() {
        return Err(StorageError::Cancelled);
    }
    Ok(())
}

/// A storage session bound to one repository branch.
///
/// Cheap to clone; clones share the transport and the closed flag.
#[derive(Clone)]
pub struct Backend {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("remote", &self.shared.remote.name())
            .field("identity", &self.shared.identity)
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// Open a session against GitHub.
    ///
    /// # Errors
    ///
    /// [`StorageError::Config`] if owner, repo or token is missing.
    pub fn new(config: &Config) -> Result<Self, StorageError> {
        let remote = create_remote(config)?;
        Ok(Self::with_remote(remote, BackendSettings::from(config)))
    }

    /// Open a session over an existing transport.
    pub fn with_remote(remote: Arc<dyn RemoteStore>, settings: BackendSettings) -> Self {
        debug!(
            remote = remote.name(),
            repo = %settings.identity.slug(),
            branch = %settings.identity.branch,
            "opened storage session"
        );
        Self {
            shared: Arc::new(Shared {
                remote,
                identity: settings.identity,
                template: settings.commit_message,
                author: settings.commit_author,
                closed: RwLock::new(false),
            }),
        }
    }

    pub fn identity(&self) -> &RepoIdentity {
        &self.shared.identity
    }

    /// Capability descriptor.
    pub fn features(&self) -> Features {
        Features::github()
    }

    pub async fn is_closed(&self) -> bool {
        *self.shared.closed.read().await
    }

    /// Close the session. Closing twice is a no-op.
    pub async fn close(&self) {
        let mut closed = self.shared.closed.write().await;
        if !*closed {
            *closed = true;
            debug!(repo = %self.shared.identity.slug(), "closed storage session");
        }
    }

    /// Checks common to every path operation.
    async fn prepare(
        &self,
        raw: &str,
        cancel: &CancellationToken,
    ) -> Result<ObjectPath, StorageError> {
        self.shared.ensure_open().await?;
        ensure_live(cancel)?;
        Ok(ObjectPath::parse(raw)?)
    }

    /// Like [`prepare`](Self::prepare), but the path must name a file.
    async fn prepare_leaf(
        &self,
        raw: &str,
        cancel: &CancellationToken,
    ) -> Result<ObjectPath, StorageError> {
        self.shared.ensure_open().await?;
        ensure_live(cancel)?;
        Ok(ObjectPath::parse_leaf(raw)?)
    }

    /// Read a whole object, then apply the window in `options`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if nothing exists at the path
    /// - [`StorageError::PathIsDirectory`] if the path is a directory
    pub async fn read(
        &self,
        path: &str,
        options: &ReadOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, StorageError> {
        let path = self.prepare(path, cancel).await?;
        let reference = options
            .reference
            .as_deref()
            .unwrap_or(&self.shared.identity.branch);
        let context = format!("read {}", path);

        ensure_live(cancel)?;
        let contents = self
            .shared
            .remote
            .get_contents(path.as_str(), reference)
            .await
            .map_err(|e| classify(e, context.clone()))?;

        let file = match contents {
            Contents::File(file) => file,
            Contents::Directory(_) => return Err(StorageError::PathIsDirectory(path.to_string())),
        };

        let content = if file.encoding == "none" {
            debug!(path = %path, size = file.size, "content not inlined, fetching blob");
            ensure_live(cancel)?;
            let blob = self
                .shared
                .remote
                .get_blob(&file.sha)
                .await
                .map_err(|e| classify(e, format!("get blob {}", file.sha)))?;
            decode(&blob.encoding, &blob.content)
        } else {
            decode(&file.encoding, &file.content)
        }
        .map_err(|e| classify(e, context))?;

        debug!(path = %path, reference, bytes = content.len(), "read object");
        Ok(apply_window(content, options.offset, options.limit))
    }

    /// Whether a file or directory exists at `path`.
    pub async fn exists(&self, path: &str, cancel: &CancellationToken) -> Result<bool, StorageError> {
        let path = self.prepare(path, cancel).await?;
        let found = self
            .shared
            .lookup(&path, &self.shared.identity.branch, cancel)
            .await?;
        Ok(found.is_some())
    }

    /// Describe the object at `path`.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotFound`] if nothing exists at the path.
    pub async fn stat(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<ObjectInfo, StorageError> {
        let path = self.prepare(path, cancel).await?;

        ensure_live(cancel)?;
        let contents = self
            .shared
            .remote
            .get_contents(path.as_str(), &self.shared.identity.branch)
            .await
            .map_err(|e| classify(e, format!("stat {}", path)))?;

        let kind = match contents {
            Contents::Directory(_) => ObjectKind::Directory,
            Contents::File(file) => ObjectKind::File {
                sha: file.sha,
                size: file.size,
            },
        };
        Ok(ObjectInfo {
            path: path.as_str().to_string(),
            kind,
        })
    }

    /// Every file path equal to `prefix` or beneath it, in tree order.
    ///
    /// One recursive tree fetch; the empty prefix lists the whole branch.
    pub async fn list(
        &self,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, StorageError> {
        let prefix = self.prepare(prefix, cancel).await?;
        let branch = &self.shared.identity.branch;

        ensure_live(cancel)?;
        let tree = self
            .shared
            .remote
            .get_tree(branch, true)
            .await
            .map_err(|e| classify(e, format!("list tree {}", branch)))?;

        if tree.truncated {
            warn!(
                repo = %self.shared.identity.slug(),
                branch = %branch,
                "recursive tree listing was truncated by the server"
            );
        }

        let paths: Vec<String> = tree
            .entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::Blob && prefix.covers(&entry.path))
            .map(|entry| entry.path)
            .collect();

        debug!(prefix = %prefix, count = paths.len(), "listed objects");
        Ok(paths)
    }

    /// Delete the file at `path` in its own commit.
    ///
    /// Deleting a path that does not exist succeeds without a commit.
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<(), StorageError> {
        let path = self.prepare_leaf(path, cancel).await?;
        let shared = &self.shared;
        let branch = &shared.identity.branch;

        let sha = match shared.lookup(&path, branch, cancel).await? {
            None => {
                debug!(path = %path, "delete of missing object is a no-op");
                return Ok(());
            }
            Some(Contents::Directory(_)) => {
                return Err(StorageError::PathIsDirectory(path.to_string()));
            }
            Some(Contents::File(file)) => file.sha,
        };

        ensure_live(cancel)?;
        let result = shared
            .remote
            .delete_file(FileDeletion {
                path: path.as_str().to_string(),
                message: shared.template.render_delete(path.as_str()),
                sha,
                branch: branch.clone(),
                author: shared.author.clone(),
            })
            .await
            .map_err(|e| classify(e, format!("delete {}", path)))?;

        debug!(path = %path, commit = %result.commit_sha, "deleted object");
        Ok(())
    }

    /// Open a buffered writer for `path`. Nothing is sent until
    /// [`ObjectWriter::finalize`].
    pub async fn writer(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<ObjectWriter, StorageError> {
        let path = self.prepare_leaf(path, cancel).await?;
        Ok(ObjectWriter::new(Arc::clone(&self.shared), path))
    }

    /// Write `content` to `path` in one commit.
    pub async fn write(
        &self,
        path: &str,
        content: impl Into<Vec<u8>>,
        cancel: &CancellationToken,
    ) -> Result<(), StorageError> {
        let writer = self.writer(path, cancel).await?;
        writer.write(&content.into()).await?;
        writer.finalize(cancel).await
    }

    /// Start a batch. An empty message selects the default.
    pub async fn batch(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<Batch, StorageError> {
        self.shared.ensure_open().await?;
        ensure_live(cancel)?;
        Ok(Batch::new(Arc::clone(&self.shared), message))
    }

    pub async fn copy(
        &self,
        _from: &str,
        _to: &str,
        _cancel: &CancellationToken,
    ) -> Result<(), StorageError> {
        self.unsupported("copy").await
    }

    pub async fn move_object(
        &self,
        _from: &str,
        _to: &str,
        _cancel: &CancellationToken,
    ) -> Result<(), StorageError> {
        self.unsupported("move").await
    }

    pub async fn mkdir(&self, _path: &str, _cancel: &CancellationToken) -> Result<(), StorageError> {
        self.unsupported("mkdir").await
    }

    pub async fn rmdir(&self, _path: &str, _cancel: &CancellationToken) -> Result<(), StorageError> {
        self.unsupported("rmdir").await
    }

    async fn unsupported(&self, operation: &'static str) -> Result<(), StorageError> {
        self.shared.ensure_open().await?;
        Err(StorageError::NotSupported(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock::{FailOn, MockOperation, MockRemote};
    use crate::remote::RemoteError;

    fn backend(remote: &MockRemote) -> Backend {
        Backend::with_remote(
            Arc::new(remote.clone()),
            BackendSettings::new("octocat", "notes"),
        )
    }

    #[test]
    fn settings_from_config() {
        let config = Config {
            owner: "octocat".into(),
            repo: "notes".into(),
            branch: "drafts".into(),
            token: "t".into(),
            ..Config::default()
        };
        let settings = BackendSettings::from(&config);
        assert_eq!(settings.identity.branch, "drafts");
        assert_eq!(settings.identity.api_base, "https://api.github.com");
    }

    #[test]
    fn new_requires_valid_config() {
        let err = Backend::new(&Config::default()).unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_operations() {
        let remote = MockRemote::new();
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        backend.close().await;
        backend.close().await;
        assert!(backend.is_closed().await);

        assert!(matches!(
            backend.read("a", &ReadOptions::new(), &cancel).await,
            Err(StorageError::BackendClosed)
        ));
        assert!(matches!(
            backend.list("", &cancel).await,
            Err(StorageError::BackendClosed)
        ));
        assert!(matches!(
            backend.copy("a", "b", &cancel).await,
            Err(StorageError::BackendClosed)
        ));
        assert!(remote.operations().is_empty());
    }

    #[tokio::test]
    async fn cancelled_before_any_round_trip() {
        let remote = MockRemote::new().with_files([("a.txt", "x")]);
        let backend = backend(&remote);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            backend.stat("a.txt", &cancel).await,
            Err(StorageError::Cancelled)
        ));
        assert!(remote.operations().is_empty());
    }

    #[tokio::test]
    async fn invalid_path_before_network() {
        let remote = MockRemote::new();
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        assert!(matches!(
            backend.read("a/../b", &ReadOptions::new(), &cancel).await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            backend.delete("/", &cancel).await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            backend.writer("", &cancel).await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(remote.operations().is_empty());
    }

    #[tokio::test]
    async fn read_directory_is_distinct_from_not_found() {
        let remote = MockRemote::new().with_files([("a/b.txt", "x")]);
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        assert!(matches!(
            backend.read("a", &ReadOptions::new(), &cancel).await,
            Err(StorageError::PathIsDirectory(p)) if p == "a"
        ));
        assert!(matches!(
            backend.read("missing", &ReadOptions::new(), &cancel).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn read_large_object_falls_back_to_blob() {
        let remote = MockRemote::new()
            .with_files([("big.bin", "0123456789")])
            .with_inline_limit(4);
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        let data = backend
            .read("big.bin", &ReadOptions::new().offset(2).limit(3), &cancel)
            .await
            .unwrap();
        assert_eq!(data, b"234");
        assert!(remote
            .operations()
            .iter()
            .any(|op| matches!(op, MockOperation::GetBlob { .. })));
    }

    #[tokio::test]
    async fn read_at_other_reference() {
        let remote = MockRemote::new().with_files([("a.txt", "old")]);
        let old = remote.head("main").unwrap();
        remote.commit_file("main", "a.txt", "new");
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        let data = backend
            .read("a.txt", &ReadOptions::new().at(old), &cancel)
            .await
            .unwrap();
        assert_eq!(data, b"old");
    }

    #[tokio::test]
    async fn stat_file_and_directory() {
        let remote = MockRemote::new().with_files([("a/b.txt", "hello")]);
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        let file = backend.stat("/a/b.txt", &cancel).await.unwrap();
        assert_eq!(file.path, "a/b.txt");
        assert_eq!(file.size(), 5);
        assert_eq!(
            file.sha(),
            Some(crate::core::types::git_blob_sha(b"hello").as_str())
        );

        let dir = backend.stat("a", &cancel).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir.size(), 0);
        assert_eq!(dir.sha(), None);

        assert!(backend.stat("nope", &cancel).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn exists_reports_files_and_directories() {
        let remote = MockRemote::new().with_files([("a/b.txt", "hello")]);
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        assert!(backend.exists("a/b.txt", &cancel).await.unwrap());
        assert!(backend.exists("a", &cancel).await.unwrap());
        assert!(!backend.exists("c", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn exists_propagates_other_errors() {
        let remote = MockRemote::new().fail_on(FailOn::GetContents(RemoteError::Http {
            status: 403,
            message: "Forbidden".into(),
        }));
        let backend = backend(&remote);

        assert!(matches!(
            backend.exists("a", &CancellationToken::new()).await,
            Err(StorageError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn unsupported_operations() {
        let remote = MockRemote::new();
        let backend = backend(&remote);
        let cancel = CancellationToken::new();

        assert!(matches!(
            backend.move_object("a", "b", &cancel).await,
            Err(StorageError::NotSupported("move"))
        ));
        assert!(matches!(
            backend.mkdir("a", &cancel).await,
            Err(StorageError::NotSupported("mkdir"))
        ));
        assert!(matches!(
            backend.rmdir("a", &cancel).await,
            Err(StorageError::NotSupported("rmdir"))
        ));
        assert!(remote.operations().is_empty());
    }

    #[tokio::test]
    async fn delete_directory_fails() {
        let remote = MockRemote::new().with_files([("a/b.txt", "x")]);
        let backend = backend(&remote);

        assert!(matches!(
            backend.delete("a", &CancellationToken::new()).await,
            Err(StorageError::PathIsDirectory(_))
        ));
        assert_eq!(remote.paths("main"), vec!["a/b.txt"]);
    }

    #[tokio::test]
    async fn delete_uses_delete_message() {
        let remote = MockRemote::new().with_files([("a.txt", "x")]);
        let backend = backend(&remote);

        backend.delete("a.txt", &CancellationToken::new()).await.unwrap();

        let head = remote.head("main").unwrap();
        assert_eq!(remote.commit(&head).unwrap().message, "Delete a.txt via ghstore");
    }
}
