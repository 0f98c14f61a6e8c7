//! core::config
//!
//! Configuration loading.
//!
//! # Sources
//!
//! A [`Config`] can be built from:
//! - Defaults ([`Config::default`])
//! - A TOML file ([`Config::load`])
//! - A string map, for callers that carry options as key/value pairs
//!   ([`Config::from_map`])
//! - Environment variables ([`Config::from_env`])
//!
//! None of the loaders validate; call [`Config::validate`] (or let
//! [`crate::storage::Backend::new`] do it) before connecting.
//!
//! # Environment Variables
//!
//! Each option reads `GHSTORE_GITHUB_<NAME>` first. The common ones fall back
//! to the variables GitHub tooling already sets:
//!
//! | Option         | Primary                         | Fallback         |
//! |----------------|---------------------------------|------------------|
//! | owner          | `GHSTORE_GITHUB_OWNER`          | `GITHUB_OWNER`   |
//! | repo           | `GHSTORE_GITHUB_REPO`           | `GITHUB_REPO`    |
//! | branch         | `GHSTORE_GITHUB_BRANCH`         |                  |
//! | token          | `GHSTORE_GITHUB_TOKEN`          | `GITHUB_TOKEN`   |
//! | base_url       | `GHSTORE_GITHUB_BASE_URL`       | `GITHUB_API_URL` |
//! | upload_url     | `GHSTORE_GITHUB_UPLOAD_URL`     |                  |
//! | commit_message | `GHSTORE_GITHUB_COMMIT_MESSAGE` |                  |
//! | author name    | `GHSTORE_GITHUB_COMMIT_AUTHOR_NAME`  |             |
//! | author email   | `GHSTORE_GITHUB_COMMIT_AUTHOR_EMAIL` |             |
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use ghstore::core::config::Config;
//!
//! let mut options = HashMap::new();
//! options.insert("owner".to_string(), "octocat".to_string());
//! options.insert("repo".to_string(), "notes".to_string());
//! options.insert("token".to_string(), "ghp_example".to_string());
//!
//! let config = Config::from_map(&options);
//! assert_eq!(config.branch, "main");
//! assert!(config.validate().is_ok());
//! ```

pub mod schema;

pub use schema::{Config, DEFAULT_BASE_URL, DEFAULT_BRANCH, DEFAULT_UPLOAD_URL};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{CommitAuthor, CommitMessageTemplate};

/// Prefix for crate-specific environment variables.
const ENV_PREFIX: &str = "GHSTORE_GITHUB_";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("owner is required")]
    MissingOwner,

    #[error("repo is required")]
    MissingRepo,

    #[error("token is required")]
    MissingToken,

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

impl Config {
    /// Read a TOML config file.
    ///
    /// # Errors
    ///
    /// `ReadError` if the file cannot be read, `ParseError` if it is not
    /// valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build a config from string options.
    ///
    /// Recognized keys: `owner`, `repo`, `branch`, `token`, `base_url`,
    /// `upload_url`, `commit_message`, `commit_author_name`,
    /// `commit_author_email`. Blank values for keys with a default keep the
    /// default. Unknown keys are ignored.
    pub fn from_map(options: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| options.get(key).cloned())
    }

    /// Build a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(v) = lookup("owner") {
            config.owner = v;
        }
        if let Some(v) = lookup("repo") {
            config.repo = v;
        }
        if let Some(v) = lookup("token") {
            config.token = v;
        }
        if let Some(v) = lookup("branch").filter(|v| !v.is_empty()) {
            config.branch = v;
        }
        if let Some(v) = lookup("base_url").filter(|v| !v.is_empty()) {
            config.base_url = v;
        }
        if let Some(v) = lookup("upload_url").filter(|v| !v.is_empty()) {
            config.upload_url = v;
        }
        if let Some(v) = lookup("commit_message").filter(|v| !v.is_empty()) {
            config.commit_message = CommitMessageTemplate::new(v);
        }

        let name = lookup("commit_author_name").unwrap_or_default();
        let email = lookup("commit_author_email").unwrap_or_default();
        if !name.is_empty() || !email.is_empty() {
            config.commit_author = Some(CommitAuthor { name, email });
        }

        config
    }
}

/// Map a config key to its environment variable, with GitHub fallbacks.
fn env_lookup(key: &str) -> Option<String> {
    let primary = format!("{}{}", ENV_PREFIX, key.to_uppercase());
    let fallback = match key {
        "owner" => Some("GITHUB_OWNER"),
        "repo" => Some("GITHUB_REPO"),
        "token" => Some("GITHUB_TOKEN"),
        "base_url" => Some("GITHUB_API_URL"),
        _ => None,
    };

    std::env::var(&primary)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.and_then(|name| std::env::var(name).ok()))
        .filter(|v| !v.is_empty())
}
