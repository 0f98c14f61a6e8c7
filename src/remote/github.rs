//! remote::github
//!
//! GitHub REST implementation of [`RemoteStore`].
//!
//! # Endpoints
//!
//! | Call            | Endpoint                                              |
//! |-----------------|-------------------------------------------------------|
//! | `get_contents`  | `GET /repos/{o}/{r}/contents/{path}?ref={ref}`        |
//! | `put_file`      | `PUT /repos/{o}/{r}/contents/{path}`                  |
//! | `delete_file`   | `DELETE /repos/{o}/{r}/contents/{path}`               |
//! | `get_ref`       | `GET /repos/{o}/{r}/git/ref/heads/{branch}`           |
//! | `get_commit`    | `GET /repos/{o}/{r}/git/commits/{sha}`                |
//! | `create_blob`   | `POST /repos/{o}/{r}/git/blobs`                       |
//! | `create_tree`   | `POST /repos/{o}/{r}/git/trees`                       |
//! | `create_commit` | `POST /repos/{o}/{r}/git/commits`                     |
//! | `update_ref`    | `PATCH /repos/{o}/{r}/git/refs/heads/{branch}`        |
//! | `get_tree`      | `GET /repos/{o}/{r}/git/trees/{ref}?recursive=1`      |
//! | `get_blob`      | `GET /repos/{o}/{r}/git/blobs/{sha}`                  |
//!
//! # Authentication
//!
//! Every request asks the [`TokenProvider`] for a bearer token. When the
//! provider can refresh, a 401 is retried once with a fresh token. There is
//! no other retry or backoff here.
//!
//! # Ref updates
//!
//! GitHub has no compare-and-swap on refs. A non-forcing update is
//! fast-forward only: it is rejected when the branch has moved to a commit
//! the new one does not descend from. It is not a strict check against the
//! expected base; a branch rewound to an ancestor of that base still
//! accepts the update.
//!
//! A rejection (422, or 409 on some deployments) is re-checked by reading
//! the branch. If it no longer points at the expected base the result is
//! [`RefUpdate::Conflict`] carrying the current head. Otherwise (missing
//! ref, unknown commit, or the read itself fails) the original HTTP error
//! is returned.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ghstore::auth::StaticToken;
//! use ghstore::remote::{github::GitHubRemote, RemoteStore};
//!
//! let provider = Arc::new(StaticToken::new(token, "github.com"));
//! let remote = GitHubRemote::new(provider, "octocat", "notes");
//! let head = remote.get_ref("main").await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{
    ApiErrorBody, ContentKind, Contents, DirEntry, EntryKind, FileChange, FileCommit,
    FileContent, FileDeletion, GitBlob, GitCommit, GitTree, NewCommit, NewTreeEntry, RefUpdate,
    RemoteError, RemoteStore, TreeEntry,
};
use crate::auth::{AuthError, TokenProvider};
use crate::core::types::{CommitAuthor, RepoIdentity};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "ghstore";

/// REST API version pinned in every request.
const API_VERSION: &str = "2022-11-28";

/// GitHub transport bound to one repository.
pub struct GitHubRemote {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token source
    token_provider: Arc<dyn TokenProvider>,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid touching the token provider
impl std::fmt::Debug for GitHubRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRemote")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("token_refreshes", &self.token_provider.refreshes())
            .finish()
    }
}

impl GitHubRemote {
    /// Create a transport against public GitHub.
    pub fn new(
        provider: Arc<dyn TokenProvider>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self::with_api_base(provider, owner, repo, DEFAULT_API_BASE)
    }

    /// Create a transport with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (e.g. `https://github.example.com/api/v3`).
    pub fn with_api_base(
        provider: Arc<dyn TokenProvider>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token_provider: provider,
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a transport for a resolved repository identity.
    pub fn from_identity(identity: &RepoIdentity, provider: Arc<dyn TokenProvider>) -> Self {
        Self::with_api_base(
            provider,
            identity.owner.clone(),
            identity.repo.clone(),
            identity.api_base.clone(),
        )
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the API base URL (no trailing slash).
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    async fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let token = self.token_provider.bearer_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AuthError::InvalidToken)?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Build URL for a repository endpoint from unencoded path segments.
    fn repo_url<'a>(
        &self,
        tail: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| {
            RemoteError::Network(format!("invalid API base URL '{}': {}", self.api_base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RemoteError::Network(format!("API base URL '{}' cannot be a base", self.api_base))
            })?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(tail.into_iter().filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// URL of the contents endpoint for `path`.
    fn contents_url(&self, path: &str) -> Result<Url, RemoteError> {
        self.repo_url(std::iter::once("contents").chain(path.split('/')))
    }

    /// Send a request, retrying once on 401 if the token can refresh.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, RemoteError> {
        let response = self.send_once(method.clone(), url.clone(), body).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.token_provider.refreshes() {
            debug!(%method, path = url.path(), "retrying after 401 with refreshed token");
            return self.send_once(method, url, body).await;
        }

        Ok(response)
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, RemoteError> {
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .headers(self.headers().await?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        debug!(
            %method,
            path = url.path(),
            status = response.status().as_u16(),
            "github request"
        );
        Ok(response)
    }

    /// Serialize a request body.
    fn body<T: Serialize>(value: &T) -> Result<serde_json::Value, RemoteError> {
        serde_json::to_value(value)
            .map_err(|e| RemoteError::Decode(format!("failed to encode request: {}", e)))
    }

    /// Decode a successful response, or map an error response.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            // A success status with an error document in the body
            match serde_json::from_slice::<ApiErrorBody>(&bytes) {
                Ok(body) => RemoteError::Api(body),
                Err(_) => RemoteError::Decode(format!("failed to parse response: {}", e)),
            }
        })
    }

    /// Map a non-success response to an error.
    async fn error_from_response(response: Response) -> RemoteError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };
        RemoteError::Http { status, message }
    }
}

#[async_trait]
impl RemoteStore for GitHubRemote {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_contents(&self, path: &str, reference: &str) -> Result<Contents, RemoteError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", reference);

        let response = self.send(Method::GET, url, None).await?;
        let contents: GitHubContents = Self::decode(response).await?;
        Ok(contents.into())
    }

    async fn put_file(&self, change: FileChange) -> Result<FileCommit, RemoteError> {
        let url = self.contents_url(&change.path)?;
        let body = Self::body(&PutFileBody {
            message: &change.message,
            content: BASE64.encode(&change.content),
            branch: &change.branch,
            sha: change.sha.as_deref(),
            author: change.author.as_ref().map(GitHubAuthor::from),
        })?;

        let response = self.send(Method::PUT, url, Some(&body)).await?;
        let result: GitHubFileCommit = Self::decode(response).await?;
        Ok(result.into())
    }

    async fn delete_file(&self, deletion: FileDeletion) -> Result<FileCommit, RemoteError> {
        let url = self.contents_url(&deletion.path)?;
        let body = Self::body(&DeleteFileBody {
            message: &deletion.message,
            sha: &deletion.sha,
            branch: &deletion.branch,
            author: deletion.author.as_ref().map(GitHubAuthor::from),
        })?;

        let response = self.send(Method::DELETE, url, Some(&body)).await?;
        let result: GitHubFileCommit = Self::decode(response).await?;
        Ok(result.into())
    }

    async fn get_ref(&self, branch: &str) -> Result<String, RemoteError> {
        let url = self.repo_url(["git", "ref", "heads"].into_iter().chain(branch.split('/')))?;

        let response = self.send(Method::GET, url, None).await?;
        let git_ref: GitHubRef = Self::decode(response).await?;
        Ok(git_ref.object.sha)
    }

    async fn get_commit(&self, sha: &str) -> Result<GitCommit, RemoteError> {
        let url = self.repo_url(["git", "commits", sha])?;

        let response = self.send(Method::GET, url, None).await?;
        let commit: GitHubCommit = Self::decode(response).await?;
        Ok(commit.into())
    }

    async fn create_blob(&self, content: &[u8]) -> Result<String, RemoteError> {
        let url = self.repo_url(["git", "blobs"])?;
        let body = Self::body(&CreateBlobBody {
            content: BASE64.encode(content),
            encoding: "base64",
        })?;

        let response = self.send(Method::POST, url, Some(&body)).await?;
        let blob: GitHubSha = Self::decode(response).await?;
        Ok(blob.sha)
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[NewTreeEntry],
    ) -> Result<String, RemoteError> {
        let url = self.repo_url(["git", "trees"])?;
        let body = Self::body(&CreateTreeBody {
            base_tree,
            tree: entries
                .iter()
                .map(|entry| CreateTreeEntry {
                    path: &entry.path,
                    mode: &entry.mode,
                    kind: "blob",
                    sha: entry.sha.as_deref(),
                })
                .collect(),
        })?;

        let response = self.send(Method::POST, url, Some(&body)).await?;
        let tree: GitHubSha = Self::decode(response).await?;
        Ok(tree.sha)
    }

    async fn create_commit(&self, commit: NewCommit) -> Result<String, RemoteError> {
        let url = self.repo_url(["git", "commits"])?;
        let body = Self::body(&CreateCommitBody {
            message: &commit.message,
            tree: &commit.tree,
            parents: &commit.parents,
            author: commit.author.as_ref().map(GitHubAuthor::from),
        })?;

        let response = self.send(Method::POST, url, Some(&body)).await?;
        let created: GitHubSha = Self::decode(response).await?;
        Ok(created.sha)
    }

    async fn update_ref(
        &self,
        branch: &str,
        expected: &str,
        new_sha: &str,
    ) -> Result<RefUpdate, RemoteError> {
        let url = self.repo_url(["git", "refs", "heads"].into_iter().chain(branch.split('/')))?;
        let body = Self::body(&UpdateRefBody {
            sha: new_sha,
            force: false,
        })?;

        debug!(branch, expected, new_sha, "updating ref");
        let response = self.send(Method::PATCH, url, Some(&body)).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(RefUpdate::Updated {
                sha: new_sha.to_string(),
            });
        }

        let error = Self::error_from_response(response).await;
        if status != StatusCode::UNPROCESSABLE_ENTITY && status != StatusCode::CONFLICT {
            return Err(error);
        }

        // Only a moved branch is a conflict; a missing ref or commit is not
        match self.get_ref(branch).await {
            Ok(current) if current != expected => {
                debug!(branch, expected, current = %current, "ref update rejected");
                Ok(RefUpdate::Conflict {
                    current: Some(current),
                })
            }
            _ => Err(error),
        }
    }

    async fn get_tree(&self, reference: &str, recursive: bool) -> Result<GitTree, RemoteError> {
        let mut url = self.repo_url(["git", "trees", reference])?;
        if recursive {
            url.query_pairs_mut().append_pair("recursive", "1");
        }

        let response = self.send(Method::GET, url, None).await?;
        let tree: GitHubTree = Self::decode(response).await?;
        Ok(tree.into())
    }

    async fn get_blob(&self, sha: &str) -> Result<GitBlob, RemoteError> {
        let url = self.repo_url(["git", "blobs", sha])?;

        let response = self.send(Method::GET, url, None).await?;
        let blob: GitHubBlob = Self::decode(response).await?;
        Ok(GitBlob {
            sha: blob.sha,
            size: blob.size,
            encoding: blob.encoding,
            content: blob.content,
        })
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Commit author as the API expects it.
#[derive(Serialize)]
struct GitHubAuthor<'a> {
    name: &'a str,
    email: &'a str,
}

impl<'a> From<&'a CommitAuthor> for GitHubAuthor<'a> {
    fn from(author: &'a CommitAuthor) -> Self {
        Self {
            name: &author.name,
            email: &author.email,
        }
    }
}

/// Request body for create-or-update of a file.
#[derive(Serialize)]
struct PutFileBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<GitHubAuthor<'a>>,
}

/// Request body for deleting a file.
#[derive(Serialize)]
struct DeleteFileBody<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<GitHubAuthor<'a>>,
}

/// Request body for creating a blob.
#[derive(Serialize)]
struct CreateBlobBody {
    content: String,
    encoding: &'static str,
}

/// Request body for creating a tree.
#[derive(Serialize)]
struct CreateTreeBody<'a> {
    base_tree: &'a str,
    tree: Vec<CreateTreeEntry<'a>>,
}

/// One tree entry. `sha: null` is serialized, not skipped: it means delete.
#[derive(Serialize)]
struct CreateTreeEntry<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: Option<&'a str>,
}

/// Request body for creating a commit.
#[derive(Serialize)]
struct CreateCommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<GitHubAuthor<'a>>,
}

/// Request body for moving a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// Any object reduced to its SHA.
#[derive(Deserialize)]
struct GitHubSha {
    sha: String,
}

/// Contents endpoint response: one object, or a directory listing.
#[derive(Deserialize)]
#[serde(untagged)]
enum GitHubContents {
    Directory(Vec<GitHubContentItem>),
    File(GitHubContentItem),
}

/// One item from the contents endpoint.
#[derive(Deserialize)]
struct GitHubContentItem {
    #[serde(rename = "type")]
    kind: ContentKind,
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl From<GitHubContents> for Contents {
    fn from(contents: GitHubContents) -> Self {
        match contents {
            GitHubContents::Directory(items) => Contents::Directory(
                items
                    .into_iter()
                    .map(|item| DirEntry {
                        path: item.path,
                        kind: item.kind,
                        sha: item.sha,
                        size: item.size,
                    })
                    .collect(),
            ),
            GitHubContents::File(item) => Contents::File(FileContent {
                path: item.path,
                kind: item.kind,
                sha: item.sha,
                size: item.size,
                encoding: item.encoding.unwrap_or_else(|| "none".to_string()),
                content: item.content.unwrap_or_default(),
            }),
        }
    }
}

/// Response of a contents mutation.
#[derive(Deserialize)]
struct GitHubFileCommit {
    content: Option<GitHubSha>,
    commit: GitHubSha,
}

impl From<GitHubFileCommit> for FileCommit {
    fn from(result: GitHubFileCommit) -> Self {
        FileCommit {
            commit_sha: result.commit.sha,
            content_sha: result.content.map(|c| c.sha),
        }
    }
}

/// Ref response.
#[derive(Deserialize)]
struct GitHubRef {
    object: GitHubSha,
}

/// Commit response.
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    tree: GitHubSha,
    #[serde(default)]
    parents: Vec<GitHubSha>,
    #[serde(default)]
    message: String,
}

impl From<GitHubCommit> for GitCommit {
    fn from(commit: GitHubCommit) -> Self {
        GitCommit {
            sha: commit.sha,
            tree_sha: commit.tree.sha,
            parents: commit.parents.into_iter().map(|p| p.sha).collect(),
            message: commit.message,
        }
    }
}

/// Tree response.
#[derive(Deserialize)]
struct GitHubTree {
    sha: String,
    tree: Vec<GitHubTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Tree entry response.
#[derive(Deserialize)]
struct GitHubTreeEntry {
    path: String,
    mode: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    sha: String,
    size: Option<u64>,
}

impl From<GitHubTree> for GitTree {
    fn from(tree: GitHubTree) -> Self {
        GitTree {
            sha: tree.sha,
            entries: tree
                .tree
                .into_iter()
                .map(|e| TreeEntry {
                    path: e.path,
                    mode: e.mode,
                    kind: e.kind,
                    sha: e.sha,
                    size: e.size,
                })
                .collect(),
            truncated: tree.truncated,
        }
    }
}

/// Blob response.
#[derive(Deserialize)]
struct GitHubBlob {
    sha: String,
    #[serde(default)]
    size: u64,
    encoding: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;

    fn remote() -> GitHubRemote {
        GitHubRemote::new(
            Arc::new(StaticToken::new("token", "github.com")),
            "octocat",
            "hello-world",
        )
    }

    #[test]
    fn name_and_accessors() {
        let remote = remote();
        assert_eq!(remote.name(), "github");
        assert_eq!(remote.owner(), "octocat");
        assert_eq!(remote.repo(), "hello-world");
        assert_eq!(remote.api_base(), "https://api.github.com");
    }

    #[test]
    fn with_api_base_trims_slash() {
        let remote = GitHubRemote::with_api_base(
            Arc::new(StaticToken::new("token", "github.example.com")),
            "owner",
            "repo",
            "https://github.example.com/api/v3/",
        );
        assert_eq!(remote.api_base(), "https://github.example.com/api/v3");
        assert_eq!(
            remote.repo_url(["git", "blobs"]).unwrap().as_str(),
            "https://github.example.com/api/v3/repos/owner/repo/git/blobs"
        );
    }

    #[test]
    fn contents_url_encodes_segments() {
        let remote = remote();
        assert_eq!(
            remote.contents_url("docs/read me.md").unwrap().as_str(),
            "https://api.github.com/repos/octocat/hello-world/contents/docs/read%20me.md"
        );
        assert_eq!(
            remote.contents_url("").unwrap().as_str(),
            "https://api.github.com/repos/octocat/hello-world/contents"
        );
    }

    #[test]
    fn tree_ref_is_a_single_segment() {
        let remote = remote();
        assert_eq!(
            remote.repo_url(["git", "trees", "feature/x"]).unwrap().as_str(),
            "https://api.github.com/repos/octocat/hello-world/git/trees/feature%2Fx"
        );
    }

    #[test]
    fn invalid_api_base_is_reported() {
        let remote = GitHubRemote::with_api_base(
            Arc::new(StaticToken::new("token", "x")),
            "o",
            "r",
            "not a url",
        );
        assert!(matches!(
            remote.repo_url(["git"]),
            Err(RemoteError::Network(_))
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let remote = GitHubRemote::new(
            Arc::new(StaticToken::new("secret_token_abc123", "github.com")),
            "owner",
            "repo",
        );
        let output = format!("{:?}", remote);
        assert!(!output.contains("secret_token_abc123"));
        assert!(output.contains("owner"));
    }

    #[test]
    fn tree_entry_serializes_null_sha_for_removal() {
        let body = CreateTreeBody {
            base_tree: "base",
            tree: vec![CreateTreeEntry {
                path: "gone.txt",
                mode: "100644",
                kind: "blob",
                sha: None,
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tree"][0]["sha"], serde_json::Value::Null);
        assert_eq!(json["tree"][0]["type"], "blob");
    }

    #[test]
    fn put_body_omits_missing_sha_and_author() {
        let body = PutFileBody {
            message: "m",
            content: BASE64.encode(b"hi"),
            branch: "main",
            sha: None,
            author: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert!(json.get("author").is_none());
        assert_eq!(json["content"], "aGk=");
    }

    #[test]
    fn contents_response_shapes() {
        let file: GitHubContents = serde_json::from_str(
            r#"{"type":"file","path":"a.txt","sha":"abc","size":5,"encoding":"base64","content":"aGVsbG8=\n"}"#,
        )
        .unwrap();
        match Contents::from(file) {
            Contents::File(f) => {
                assert_eq!(f.kind, ContentKind::File);
                assert_eq!(f.encoding, "base64");
                assert_eq!(f.size, 5);
            }
            other => panic!("expected file, got {:?}", other),
        }

        let dir: GitHubContents = serde_json::from_str(
            r#"[{"type":"file","path":"a/b.txt","sha":"1","size":1},{"type":"dir","path":"a/c","sha":"2","size":0}]"#,
        )
        .unwrap();
        match Contents::from(dir) {
            Contents::Directory(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].kind, ContentKind::Dir);
            }
            other => panic!("expected directory, got {:?}", other),
        }
    }

    #[test]
    fn contents_without_inline_content_reports_none_encoding() {
        let file: GitHubContents = serde_json::from_str(
            r#"{"type":"file","path":"big.bin","sha":"abc","size":5000000,"encoding":"none","content":""}"#,
        )
        .unwrap();
        let Contents::File(f) = Contents::from(file) else {
            panic!("expected file");
        };
        assert_eq!(f.encoding, "none");
        assert!(f.content.is_empty());
    }
}
