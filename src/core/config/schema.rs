//! core::config::schema
//!
//! Configuration schema for a storage session.
//!
//! # Example
//!
//! ```toml
//! owner = "octocat"
//! repo = "notes"
//! branch = "main"
//! token = "ghp_..."
//! commit_message = "Update {path} from notes-sync"
//!
//! [commit_author]
//! name = "Notes Bot"
//! email = "bot@example.com"
//! ```
//!
//! # Validation
//!
//! `owner`, `repo` and `token` are required. Everything else has a default.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{CommitAuthor, CommitMessageTemplate, RepoIdentity};

/// Default branch.
pub const DEFAULT_BRANCH: &str = "main";

/// Default REST API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// Default upload URL.
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com/";

/// Session configuration.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Repository owner (user or organization). Required.
    pub owner: String,

    /// Repository name. Required.
    pub repo: String,

    /// Branch to read from and commit to.
    pub branch: String,

    /// Personal access or app token. Required.
    pub token: String,

    /// REST API base URL. Set for GitHub Enterprise
    /// (e.g. `https://github.example.com/api/v3/`).
    pub base_url: String,

    /// Upload URL. Set for GitHub Enterprise.
    pub upload_url: String,

    /// Commit message template; `{path}` is replaced with the target path.
    pub commit_message: CommitMessageTemplate,

    /// Author for commits. Unset means the authenticated user.
    pub commit_author: Option<CommitAuthor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            commit_message: CommitMessageTemplate::default(),
            commit_author: None,
        }
    }
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("has_token", &!self.token.is_empty())
            .field("base_url", &self.base_url)
            .field("upload_url", &self.upload_url)
            .field("commit_message", &self.commit_message)
            .field("commit_author", &self.commit_author)
            .finish()
    }
}

impl Config {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// `MissingOwner`, `MissingRepo` or `MissingToken`, in that order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_empty() {
            return Err(ConfigError::MissingOwner);
        }
        if self.repo.is_empty() {
            return Err(ConfigError::MissingRepo);
        }
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }

    /// Whether the API base points somewhere other than public GitHub.
    pub fn is_enterprise(&self) -> bool {
        trim_slash(&self.base_url) != trim_slash(DEFAULT_BASE_URL)
    }

    /// Resolve the repository identity, filling defaults for blank fields.
    pub fn identity(&self) -> RepoIdentity {
        RepoIdentity {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: non_empty_or(&self.branch, DEFAULT_BRANCH),
            api_base: trim_slash(&non_empty_or(&self.base_url, DEFAULT_BASE_URL)).to_string(),
            upload_base: trim_slash(&non_empty_or(&self.upload_url, DEFAULT_UPLOAD_URL))
                .to_string(),
        }
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn trim_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            owner: "octocat".into(),
            repo: "notes".into(),
            token: "ghp_secret".into(),
            ..Config::default()
        }
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.branch, "main");
        assert_eq!(config.base_url, "https://api.github.com/");
        assert_eq!(config.upload_url, "https://uploads.github.com/");
        assert_eq!(config.commit_message.as_str(), "Update {path} via ghstore");
        assert!(config.commit_author.is_none());
        assert!(!config.is_enterprise());
    }

    #[test]
    fn validate_requires_owner_repo_token() {
        assert!(valid().validate().is_ok());

        let mut config = valid();
        config.owner.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingOwner)));

        let mut config = valid();
        config.repo.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRepo)));

        let mut config = valid();
        config.token.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn identity_trims_trailing_slash() {
        let identity = valid().identity();
        assert_eq!(identity.api_base, "https://api.github.com");
        assert_eq!(identity.upload_base, "https://uploads.github.com");
        assert_eq!(identity.branch, "main");
    }

    #[test]
    fn identity_falls_back_on_blank_fields() {
        let mut config = valid();
        config.branch.clear();
        config.base_url.clear();
        let identity = config.identity();
        assert_eq!(identity.branch, "main");
        assert_eq!(identity.api_base, "https://api.github.com");
    }

    #[test]
    fn enterprise_detection() {
        let mut config = valid();
        config.base_url = "https://github.example.com/api/v3/".into();
        assert!(config.is_enterprise());

        config.base_url = "https://api.github.com".into();
        assert!(!config.is_enterprise());
    }

    #[test]
    fn debug_redacts_token() {
        let output = format!("{:?}", valid());
        assert!(!output.contains("ghp_secret"));
        assert!(output.contains("has_token"));
    }

    #[test]
    fn parses_toml() {
        let config: Config = toml::from_str(
            r#"
            owner = "octocat"
            repo = "notes"
            token = "t"
            branch = "drafts"
            commit_message = "Sync {path}"

            [commit_author]
            name = "Bot"
            email = "bot@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.branch, "drafts");
        assert_eq!(config.commit_message.render("x"), "Sync x");
        assert_eq!(
            config.commit_author,
            Some(CommitAuthor {
                name: "Bot".into(),
                email: "bot@example.com".into()
            })
        );
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<Config, _> = toml::from_str("owner = \"a\"\ncolour = \"blue\"\n");
        assert!(result.is_err());
    }
}
