//! remote::factory
//!
//! Transport selection and creation.
//!
//! # Design
//!
//! Callers use [`create_remote`] instead of constructing a transport
//! directly, so the storage layer only ever sees `Arc<dyn RemoteStore>`.
//! There is one hosting provider; the factory exists to keep credential
//! wiring and endpoint resolution in one place.
//!
//! # Example
//!
//! ```
//! use ghstore::core::config::Config;
//! use ghstore::remote::create_remote;
//!
//! let config = Config {
//!     owner: "octocat".into(),
//!     repo: "notes".into(),
//!     token: "ghp_example".into(),
//!     ..Config::default()
//! };
//! let remote = create_remote(&config).unwrap();
//! assert_eq!(remote.name(), "github");
//! ```

use std::sync::Arc;

use reqwest::Url;

use super::github::GitHubRemote;
use super::traits::RemoteStore;
use crate::auth::StaticToken;
use crate::core::config::{Config, ConfigError};

/// Host credentials are issued for when the API base is public GitHub.
const PUBLIC_HOST: &str = "github.com";

/// Create the transport for a validated configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError`] from [`Config::validate`].
pub fn create_remote(config: &Config) -> Result<Arc<dyn RemoteStore>, ConfigError> {
    config.validate()?;

    let identity = config.identity();
    let provider = Arc::new(StaticToken::new(config.token.clone(), token_host(config)));
    Ok(Arc::new(GitHubRemote::from_identity(&identity, provider)))
}

/// Host a token is scoped to, derived from the API base URL.
pub fn token_host(config: &Config) -> String {
    if !config.is_enterprise() {
        return PUBLIC_HOST.to_string();
    }
    Url::parse(&config.base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| PUBLIC_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            owner: "octocat".into(),
            repo: "notes".into(),
            token: "t".into(),
            ..Config::default()
        }
    }

    #[test]
    fn create_validates_first() {
        let mut missing = config();
        missing.token.clear();
        assert!(matches!(
            create_remote(&missing),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn create_github_remote() {
        let remote = create_remote(&config()).unwrap();
        assert_eq!(remote.name(), "github");
    }

    #[test]
    fn token_host_public_and_enterprise() {
        assert_eq!(token_host(&config()), "github.com");

        let mut enterprise = config();
        enterprise.base_url = "https://github.example.com/api/v3/".into();
        assert_eq!(token_host(&enterprise), "github.example.com");
    }
}
