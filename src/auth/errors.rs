//! auth::errors
//!
//! Credential error types.
//!
//! Error messages never contain token values.
//!
//! # Example
//!
//! ```
//! use ghstore::auth::AuthError;
//!
//! let err = AuthError::NotAuthenticated("github.com".to_string());
//! assert!(err.to_string().contains("github.com"));
//! ```

use thiserror::Error;

/// Errors from credential providers.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No credential exists for the host.
    #[error("not authenticated for host '{0}'")]
    NotAuthenticated(String),

    /// The credential expired and cannot be refreshed.
    #[error("authentication expired for host '{0}'")]
    Expired(String),

    /// A refresh attempt failed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// The token cannot be sent as an HTTP header value.
    #[error("token contains characters not allowed in a header")]
    InvalidToken,
}

impl AuthError {
    /// Whether the caller has to supply a new credential to continue.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated(_) | AuthError::Expired(_) | AuthError::InvalidToken
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_does_not_leak_anything_but_host() {
        assert_eq!(
            AuthError::NotAuthenticated("github.com".into()).to_string(),
            "not authenticated for host 'github.com'"
        );
        assert_eq!(
            AuthError::Expired("ghe.example.com".into()).to_string(),
            "authentication expired for host 'ghe.example.com'"
        );
    }

    #[test]
    fn needs_reauth() {
        assert!(AuthError::NotAuthenticated("h".into()).needs_reauth());
        assert!(AuthError::Expired("h".into()).needs_reauth());
        assert!(AuthError::InvalidToken.needs_reauth());
        assert!(!AuthError::RefreshFailed("timeout".into()).needs_reauth());
    }
}
