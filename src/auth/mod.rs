//! auth
//!
//! Bearer-token supply for the remote transport.
//!
//! # Design
//!
//! Token acquisition and refresh live outside this crate. The transport only
//! needs something that hands it a bearer token per request, which is what
//! [`TokenProvider`] describes. [`StaticToken`] covers the common case of a
//! personal access token read from configuration.
//!
//! Tokens never appear in logs, errors or `Debug` output.
//!
//! # Example
//!
//! ```
//! use ghstore::auth::{StaticToken, TokenProvider};
//!
//! # tokio_test::block_on(async {
//! let provider = StaticToken::new("ghp_example", "github.com");
//! assert_eq!(provider.bearer_token().await.unwrap(), "ghp_example");
//! assert!(!provider.refreshes());
//! # });
//! ```

mod errors;

pub use errors::AuthError;

/// Trait for providing bearer tokens to the remote transport.
///
/// Implementors must never log or expose token values.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a valid bearer token, refreshing if necessary.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] if no token exists
    /// - [`AuthError::Expired`] if the token cannot be renewed
    /// - [`AuthError::RefreshFailed`] if a refresh attempt fails
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Whether calling [`bearer_token`](Self::bearer_token) again after a 401
    /// can yield a different token. The transport retries once when true.
    fn refreshes(&self) -> bool {
        false
    }

    /// The host this provider authenticates for.
    fn host(&self) -> &str;
}

/// A fixed token that is never refreshed.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
    host: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            host: host.into(),
        }
    }
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::NotAuthenticated(self.host.clone()));
        }
        Ok(self.token.clone())
    }

    fn host(&self) -> &str {
        &self.host
    }
}
