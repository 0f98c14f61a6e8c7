//! remote::mock
//!
//! In-memory Git repository implementing [`RemoteStore`] for deterministic
//! testing.
//!
//! # Design
//!
//! The mock keeps real Git-shaped state: content-addressed blobs, trees
//! (flattened to `path -> blob sha`), commits with parents, and branch refs.
//! Object ids are computed with the same hashing Git uses, so a blob written
//! through the mock has the id GitHub would report for the same bytes.
//!
//! It enforces the rules the storage layer depends on:
//! - contents writes need the current blob SHA when the file exists
//! - ref updates never force, and fail when the branch moved
//!
//! Failure injection ([`FailOn`]), an operation log ([`MockOperation`]) and
//! a one-shot concurrent writer ([`MockRemote::race_before_update_ref`]) let
//! tests drive error paths and lost-race scenarios.
//!
//! # Example
//!
//! ```
//! use ghstore::remote::mock::MockRemote;
//! use ghstore::remote::RemoteStore;
//!
//! # tokio_test::block_on(async {
//! let remote = MockRemote::new().with_files([("a/b.txt", "hello")]);
//!
//! let head = remote.get_ref("main").await.unwrap();
//! assert_eq!(remote.head("main"), Some(head));
//! assert_eq!(remote.file("main", "a/b.txt"), Some(b"hello".to_vec()));
//! # });
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::traits::{
    ContentKind, Contents, DirEntry, EntryKind, FileChange, FileCommit, FileContent,
    FileDeletion, GitBlob, GitCommit, GitTree, NewCommit, NewTreeEntry, RefUpdate, RemoteError,
    RemoteStore, TreeEntry, FILE_MODE,
};
use crate::core::types::{git_blob_sha, git_object_sha};

/// Flattened tree: file path to blob SHA.
type Files = BTreeMap<String, String>;

/// Width at which inline base64 content is wrapped, as GitHub does.
const BASE64_LINE: usize = 60;

/// Mock remote for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones share state.
#[derive(Debug, Clone)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug)]
struct MockRemoteInner {
    blobs: HashMap<String, Vec<u8>>,
    trees: HashMap<String, Files>,
    commits: HashMap<String, GitCommit>,
    refs: HashMap<String, String>,
    /// Mixed into commit ids so identical commits stay distinct.
    clock: u64,
    /// Files larger than this come back from the contents endpoint with
    /// encoding `none`.
    inline_limit: Option<usize>,
    fail_on: Option<FailOn>,
    /// Write committed by "someone else" right before the next ref update.
    race: Option<(String, Vec<u8>)>,
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    GetContents(RemoteError),
    PutFile(RemoteError),
    DeleteFile(RemoteError),
    GetRef(RemoteError),
    GetCommit(RemoteError),
    CreateBlob(RemoteError),
    CreateTree(RemoteError),
    CreateCommit(RemoteError),
    UpdateRef(RemoteError),
    GetTree(RemoteError),
    GetBlob(RemoteError),
}

impl FailOn {
    fn operation(&self) -> &'static str {
        match self {
            FailOn::GetContents(_) => "get_contents",
            FailOn::PutFile(_) => "put_file",
            FailOn::DeleteFile(_) => "delete_file",
            FailOn::GetRef(_) => "get_ref",
            FailOn::GetCommit(_) => "get_commit",
            FailOn::CreateBlob(_) => "create_blob",
            FailOn::CreateTree(_) => "create_tree",
            FailOn::CreateCommit(_) => "create_commit",
            FailOn::UpdateRef(_) => "update_ref",
            FailOn::GetTree(_) => "get_tree",
            FailOn::GetBlob(_) => "get_blob",
        }
    }

    fn error(&self) -> &RemoteError {
        match self {
            FailOn::GetContents(e)
            | FailOn::PutFile(e)
            | FailOn::DeleteFile(e)
            | FailOn::GetRef(e)
            | FailOn::GetCommit(e)
            | FailOn::CreateBlob(e)
            | FailOn::CreateTree(e)
            | FailOn::CreateCommit(e)
            | FailOn::UpdateRef(e)
            | FailOn::GetTree(e)
            | FailOn::GetBlob(e) => e,
        }
    }
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetContents {
        path: String,
        reference: String,
    },
    PutFile {
        path: String,
        branch: String,
        message: String,
        sha: Option<String>,
    },
    DeleteFile {
        path: String,
        branch: String,
        message: String,
        sha: String,
    },
    GetRef {
        branch: String,
    },
    GetCommit {
        sha: String,
    },
    CreateBlob {
        size: usize,
    },
    CreateTree {
        base_tree: String,
        entries: Vec<NewTreeEntry>,
    },
    CreateCommit {
        tree: String,
        parents: Vec<String>,
        message: String,
    },
    UpdateRef {
        branch: String,
        expected: String,
        new_sha: String,
    },
    GetTree {
        reference: String,
        recursive: bool,
    },
    GetBlob {
        sha: String,
    },
}

impl MockOperation {
    /// Whether this call changed (or tried to change) remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            MockOperation::PutFile { .. }
                | MockOperation::DeleteFile { .. }
                | MockOperation::CreateBlob { .. }
                | MockOperation::CreateTree { .. }
                | MockOperation::CreateCommit { .. }
                | MockOperation::UpdateRef { .. }
        )
    }
}

impl MockRemote {
    /// Create a repository whose `main` branch holds one empty commit.
    pub fn new() -> Self {
        let mut inner = MockRemoteInner {
            blobs: HashMap::new(),
            trees: HashMap::new(),
            commits: HashMap::new(),
            refs: HashMap::new(),
            clock: 0,
            inline_limit: None,
            fail_on: None,
            race: None,
            operations: Vec::new(),
        };
        let tree = inner.store_tree(Files::new());
        let root = inner.store_commit(tree, Vec::new(), "Initial commit".to_string());
        inner.refs.insert("main".to_string(), root);

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Seed `main` with files in a single commit.
    pub fn with_files<P, C>(self, files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        {
            let mut inner = self.lock();
            let changes: Vec<(String, Option<Vec<u8>>)> = files
                .into_iter()
                .map(|(p, c)| (p.into(), Some(c.into())))
                .collect();
            inner.commit_on_branch("main", changes, "Seed files".to_string());
        }
        self
    }

    /// Serve files larger than `limit` bytes without inline content.
    pub fn with_inline_limit(self, limit: usize) -> Self {
        self.lock().inline_limit = Some(limit);
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use ghstore::remote::mock::{MockRemote, FailOn};
    /// use ghstore::remote::RemoteError;
    ///
    /// let remote = MockRemote::new()
    ///     .fail_on(FailOn::CreateBlob(RemoteError::Network("reset".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.set_fail_on(fail_on);
        self
    }

    /// Set the failure configuration on a shared handle.
    pub fn set_fail_on(&self, fail_on: FailOn) {
        self.lock().fail_on = Some(fail_on);
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Commit a write of `path` by another client just before the next
    /// `update_ref`, so that update loses the race.
    pub fn race_before_update_ref(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.lock().race = Some((path.into(), content.into()));
    }

    /// Create `branch` pointing at the head of `from`.
    pub fn create_branch(&self, branch: impl Into<String>, from: &str) -> Option<String> {
        let mut inner = self.lock();
        let head = inner.refs.get(from).cloned()?;
        inner.refs.insert(branch.into(), head.clone());
        Some(head)
    }

    /// Commit a write directly on `branch`, bypassing the operation log.
    /// Returns the new head, or `None` if the branch does not exist.
    pub fn commit_file(
        &self,
        branch: &str,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Option<String> {
        let mut inner = self.lock();
        if !inner.refs.contains_key(branch) {
            return None;
        }
        Some(inner.commit_on_branch(
            branch,
            vec![(path.into(), Some(content.into()))],
            "External update".to_string(),
        ))
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Current head of `branch`.
    pub fn head(&self, branch: &str) -> Option<String> {
        self.lock().refs.get(branch).cloned()
    }

    /// Content of `path` at the head of `branch`.
    pub fn file(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        let inner = self.lock();
        let files = inner.files_at(branch)?;
        let sha = files.get(path)?;
        inner.blobs.get(sha).cloned()
    }

    /// Every file path at the head of `branch`, sorted.
    pub fn paths(&self, branch: &str) -> Vec<String> {
        let inner = self.lock();
        inner
            .files_at(branch)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// A commit by SHA.
    pub fn commit(&self, sha: &str) -> Option<GitCommit> {
        self.lock().commits.get(sha).cloned()
    }

    /// Number of commits reachable from `branch`.
    pub fn history_len(&self, branch: &str) -> usize {
        let inner = self.lock();
        let mut count = 0;
        let mut next = inner.refs.get(branch).cloned();
        while let Some(sha) = next {
            count += 1;
            next = inner
                .commits
                .get(&sha)
                .and_then(|c| c.parents.first().cloned());
        }
        count
    }

    fn lock(&self) -> MutexGuard<'_, MockRemoteInner> {
        // A panicking test thread must not wedge every other test sharing the mock
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    fn check_fail(&self, operation: &str) -> Result<(), RemoteError> {
        match &self.lock().fail_on {
            Some(fail) if fail.operation() == operation => Err(fail.error().clone()),
            _ => Ok(()),
        }
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteInner {
    fn store_blob(&mut self, content: Vec<u8>) -> String {
        let sha = git_blob_sha(&content);
        self.blobs.entry(sha.clone()).or_insert(content);
        sha
    }

    fn store_tree(&mut self, files: Files) -> String {
        let sha = tree_sha(&files);
        self.trees.entry(sha.clone()).or_insert(files);
        sha
    }

    fn store_commit(&mut self, tree: String, parents: Vec<String>, message: String) -> String {
        self.clock += 1;
        let mut payload = format!("tree {}\n", tree);
        for parent in &parents {
            payload.push_str(&format!("parent {}\n", parent));
        }
        payload.push_str(&format!("clock {}\n\n{}", self.clock, message));
        let sha = git_object_sha("commit", payload.as_bytes());

        self.commits.insert(
            sha.clone(),
            GitCommit {
                sha: sha.clone(),
                tree_sha: tree,
                parents,
                message,
            },
        );
        sha
    }

    /// Apply writes (`Some`) and removals (`None`) on top of `branch` and
    /// advance it. The branch must exist.
    fn commit_on_branch(
        &mut self,
        branch: &str,
        changes: Vec<(String, Option<Vec<u8>>)>,
        message: String,
    ) -> String {
        let parent = self.refs.get(branch).cloned();
        let mut files = parent
            .as_deref()
            .and_then(|sha| self.files_of_commit(sha))
            .cloned()
            .unwrap_or_default();

        for (path, content) in changes {
            match content {
                Some(content) => {
                    let sha = self.store_blob(content);
                    insert_blob(&mut files, path, sha);
                }
                None => {
                    files.remove(&path);
                }
            }
        }

        let tree = self.store_tree(files);
        let commit = self.store_commit(tree, parent.into_iter().collect(), message);
        self.refs.insert(branch.to_string(), commit.clone());
        commit
    }

    fn files_of_commit(&self, sha: &str) -> Option<&Files> {
        let commit = self.commits.get(sha)?;
        self.trees.get(&commit.tree_sha)
    }

    /// Resolve a branch name or commit SHA to its files.
    fn files_at(&self, reference: &str) -> Option<&Files> {
        let sha = self
            .refs
            .get(reference)
            .map(String::as_str)
            .unwrap_or(reference);
        self.files_of_commit(sha)
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut stack = vec![descendant.to_string()];
        let mut seen = HashSet::new();
        while let Some(sha) = stack.pop() {
            if sha == ancestor {
                return true;
            }
            if !seen.insert(sha.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&sha) {
                stack.extend(commit.parents.iter().cloned());
            }
        }
        false
    }

    fn encode_inline(&self, content: &[u8]) -> (String, String) {
        match self.inline_limit {
            Some(limit) if content.len() > limit => ("none".to_string(), String::new()),
            _ => ("base64".to_string(), wrap(&BASE64.encode(content))),
        }
    }
}

/// Deterministic id for a flattened tree.
fn tree_sha(files: &Files) -> String {
    let mut payload = String::new();
    for (path, sha) in files {
        payload.push_str(&format!("{} {}\0{}\n", FILE_MODE, path, sha));
    }
    git_object_sha("tree", payload.as_bytes())
}

/// Wrap base64 text into fixed-width lines.
fn wrap(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(BASE64_LINE)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Files under `dir` ("" for the root), relative to it.
fn files_under<'a>(files: &'a Files, dir: &'a str) -> impl Iterator<Item = (&'a str, &'a String)> {
    files.iter().filter_map(move |(path, sha)| {
        if dir.is_empty() {
            Some((path.as_str(), sha))
        } else {
            path.strip_prefix(dir)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| (rest, sha))
        }
    })
}

/// Put a blob at `path` the way a Git tree edit does: a directory at `path`
/// and any file standing where one of its parent directories must go are
/// replaced.
fn insert_blob(files: &mut Files, path: String, sha: String) {
    let nested = format!("{}/", path);
    files.retain(|existing, _| {
        !existing.starts_with(&nested) && !path.starts_with(&format!("{}/", existing))
    });
    files.insert(path, sha);
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

fn unprocessable(message: impl Into<String>) -> RemoteError {
    RemoteError::Http {
        status: 422,
        message: message.into(),
    }
}

fn conflict(message: impl Into<String>) -> RemoteError {
    RemoteError::Http {
        status: 409,
        message: message.into(),
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_contents(&self, path: &str, reference: &str) -> Result<Contents, RemoteError> {
        self.record(MockOperation::GetContents {
            path: path.to_string(),
            reference: reference.to_string(),
        });
        self.check_fail("get_contents")?;

        let inner = self.lock();
        let files = inner
            .files_at(reference)
            .ok_or_else(|| RemoteError::not_found(format!("No commit found for the ref {}", reference)))?;

        if let Some(sha) = files.get(path) {
            let content = inner.blobs.get(sha).cloned().unwrap_or_default();
            let (encoding, encoded) = inner.encode_inline(&content);
            return Ok(Contents::File(FileContent {
                path: path.to_string(),
                kind: ContentKind::File,
                sha: sha.clone(),
                size: content.len() as u64,
                encoding,
                content: encoded,
            }));
        }

        let mut children: BTreeMap<String, Files> = BTreeMap::new();
        for (rest, sha) in files_under(files, path) {
            let (child, below) = match rest.split_once('/') {
                Some((child, below)) => (child, Some(below)),
                None => (rest, None),
            };
            let subtree = children.entry(child.to_string()).or_default();
            if let Some(below) = below {
                subtree.insert(below.to_string(), sha.clone());
            }
        }

        if children.is_empty() && !path.is_empty() {
            return Err(RemoteError::not_found("Not Found"));
        }

        let entries = children
            .into_iter()
            .map(|(name, subtree)| {
                let full = join(path, &name);
                match files.get(&full) {
                    Some(sha) => DirEntry {
                        size: inner.blobs.get(sha).map_or(0, |b| b.len() as u64),
                        sha: sha.clone(),
                        kind: ContentKind::File,
                        path: full,
                    },
                    None => DirEntry {
                        sha: tree_sha(&subtree),
                        kind: ContentKind::Dir,
                        size: 0,
                        path: full,
                    },
                }
            })
            .collect();
        Ok(Contents::Directory(entries))
    }

    async fn put_file(&self, change: FileChange) -> Result<FileCommit, RemoteError> {
        self.record(MockOperation::PutFile {
            path: change.path.clone(),
            branch: change.branch.clone(),
            message: change.message.clone(),
            sha: change.sha.clone(),
        });
        self.check_fail("put_file")?;

        let mut inner = self.lock();
        let files = inner
            .files_at(&change.branch)
            .ok_or_else(|| RemoteError::not_found(format!("Branch {} not found", change.branch)))?;

        if files_under(files, &change.path).next().is_some() {
            return Err(unprocessable(format!("{} is a directory", change.path)));
        }

        match (files.get(&change.path), change.sha.as_deref()) {
            (Some(_), None) => {
                return Err(unprocessable("Invalid request.\n\n\"sha\" wasn't supplied."));
            }
            (Some(current), Some(given)) if current != given => {
                return Err(conflict(format!("{} does not match {}", change.path, given)));
            }
            (None, Some(_)) => {
                return Err(unprocessable(format!("{} does not exist", change.path)));
            }
            _ => {}
        }

        let content_sha = git_blob_sha(&change.content);
        let commit_sha = inner.commit_on_branch(
            &change.branch,
            vec![(change.path, Some(change.content))],
            change.message,
        );
        Ok(FileCommit {
            commit_sha,
            content_sha: Some(content_sha),
        })
    }

    async fn delete_file(&self, deletion: FileDeletion) -> Result<FileCommit, RemoteError> {
        self.record(MockOperation::DeleteFile {
            path: deletion.path.clone(),
            branch: deletion.branch.clone(),
            message: deletion.message.clone(),
            sha: deletion.sha.clone(),
        });
        self.check_fail("delete_file")?;

        let mut inner = self.lock();
        let files = inner.files_at(&deletion.branch).ok_or_else(|| {
            RemoteError::not_found(format!("Branch {} not found", deletion.branch))
        })?;

        match files.get(&deletion.path) {
            None => return Err(RemoteError::not_found("Not Found")),
            Some(current) if *current != deletion.sha => {
                return Err(conflict(format!(
                    "{} does not match {}",
                    deletion.path, deletion.sha
                )));
            }
            Some(_) => {}
        }

        let commit_sha = inner.commit_on_branch(
            &deletion.branch,
            vec![(deletion.path, None)],
            deletion.message,
        );
        Ok(FileCommit {
            commit_sha,
            content_sha: None,
        })
    }

    async fn get_ref(&self, branch: &str) -> Result<String, RemoteError> {
        self.record(MockOperation::GetRef {
            branch: branch.to_string(),
        });
        self.check_fail("get_ref")?;

        self.lock()
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| RemoteError::not_found("Not Found"))
    }

    async fn get_commit(&self, sha: &str) -> Result<GitCommit, RemoteError> {
        self.record(MockOperation::GetCommit {
            sha: sha.to_string(),
        });
        self.check_fail("get_commit")?;

        self.lock()
            .commits
            .get(sha)
            .cloned()
            .ok_or_else(|| RemoteError::not_found("Not Found"))
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, RemoteError> {
        self.record(MockOperation::CreateBlob {
            size: content.len(),
        });
        self.check_fail("create_blob")?;

        Ok(self.lock().store_blob(content.to_vec()))
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[NewTreeEntry],
    ) -> Result<String, RemoteError> {
        self.record(MockOperation::CreateTree {
            base_tree: base_tree.to_string(),
            entries: entries.to_vec(),
        });
        self.check_fail("create_tree")?;

        let mut inner = self.lock();
        let mut files = inner
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| unprocessable("base_tree is not a valid tree"))?;

        for entry in entries {
            match &entry.sha {
                Some(sha) => {
                    if !inner.blobs.contains_key(sha) {
                        return Err(unprocessable(format!("{} is not a valid blob", sha)));
                    }
                    insert_blob(&mut files, entry.path.clone(), sha.clone());
                }
                None => {
                    files.remove(&entry.path);
                }
            }
        }

        Ok(inner.store_tree(files))
    }

    async fn create_commit(&self, commit: NewCommit) -> Result<String, RemoteError> {
        self.record(MockOperation::CreateCommit {
            tree: commit.tree.clone(),
            parents: commit.parents.clone(),
            message: commit.message.clone(),
        });
        self.check_fail("create_commit")?;

        let mut inner = self.lock();
        if !inner.trees.contains_key(&commit.tree) {
            return Err(unprocessable("Tree SHA does not exist"));
        }
        if let Some(missing) = commit
            .parents
            .iter()
            .find(|p| !inner.commits.contains_key(p.as_str()))
        {
            return Err(unprocessable(format!("Parent SHA {} does not exist", missing)));
        }

        Ok(inner.store_commit(commit.tree, commit.parents, commit.message))
    }

    async fn update_ref(
        &self,
        branch: &str,
        expected: &str,
        new_sha: &str,
    ) -> Result<RefUpdate, RemoteError> {
        self.record(MockOperation::UpdateRef {
            branch: branch.to_string(),
            expected: expected.to_string(),
            new_sha: new_sha.to_string(),
        });
        self.check_fail("update_ref")?;

        let mut inner = self.lock();
        if let Some((path, content)) = inner.race.take() {
            inner.commit_on_branch(
                branch,
                vec![(path, Some(content))],
                "Concurrent update".to_string(),
            );
        }

        let current = inner
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| RemoteError::not_found("Reference does not exist"))?;

        if !inner.commits.contains_key(new_sha) {
            return Err(unprocessable("Object does not exist"));
        }

        if current != expected || !inner.is_ancestor(&current, new_sha) {
            return Ok(RefUpdate::Conflict {
                current: Some(current),
            });
        }

        inner.refs.insert(branch.to_string(), new_sha.to_string());
        Ok(RefUpdate::Updated {
            sha: new_sha.to_string(),
        })
    }

    async fn get_tree(&self, reference: &str, recursive: bool) -> Result<GitTree, RemoteError> {
        self.record(MockOperation::GetTree {
            reference: reference.to_string(),
            recursive,
        });
        self.check_fail("get_tree")?;

        let inner = self.lock();
        let (sha, files) = match inner.files_at(reference) {
            Some(files) => (tree_sha(files), files),
            None => match inner.trees.get(reference) {
                Some(files) => (reference.to_string(), files),
                None => return Err(RemoteError::not_found("Not Found")),
            },
        };

        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for (path, blob) in files {
            let mut parts: Vec<&str> = path.split('/').collect();
            parts.pop();
            for depth in 1..=parts.len() {
                dirs.insert(parts[..depth].join("/"));
            }
            if recursive || !path.contains('/') {
                entries.push(TreeEntry {
                    path: path.clone(),
                    mode: FILE_MODE.to_string(),
                    kind: EntryKind::Blob,
                    sha: blob.clone(),
                    size: inner.blobs.get(blob).map(|b| b.len() as u64),
                });
            }
        }
        for dir in dirs {
            if recursive || !dir.contains('/') {
                let subtree: Files = files_under(files, &dir)
                    .map(|(rest, sha)| (rest.to_string(), sha.clone()))
                    .collect();
                entries.push(TreeEntry {
                    path: dir,
                    mode: "040000".to_string(),
                    kind: EntryKind::Tree,
                    sha: tree_sha(&subtree),
                    size: None,
                });
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(GitTree {
            sha,
            entries,
            truncated: false,
        })
    }

    async fn get_blob(&self, sha: &str) -> Result<GitBlob, RemoteError> {
        self.record(MockOperation::GetBlob {
            sha: sha.to_string(),
        });
        self.check_fail("get_blob")?;

        let inner = self.lock();
        let content = inner
            .blobs
            .get(sha)
            .ok_or_else(|| RemoteError::not_found("Not Found"))?;
        Ok(GitBlob {
            sha: sha.to_string(),
            size: content.len() as u64,
            encoding: "base64".to_string(),
            content: wrap(&BASE64.encode(content)),
        })
    }
}
