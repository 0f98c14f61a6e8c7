//! storage::error
//!
//! The storage error taxonomy and the classifier that maps transport
//! failures onto it.
//!
//! # Classification
//!
//! The transport reports failures two ways: an HTTP status on the error, or
//! a structured API error document whose status travels inside the payload.
//! [`classify`] looks at the status first and falls back to the payload, so
//! no other component has to care which shape it got.
//!
//! | Observed                         | Result                          |
//! |----------------------------------|---------------------------------|
//! | 404                              | [`StorageError::NotFound`]      |
//! | 401, 403, or no usable token     | [`StorageError::PermissionDenied`] |
//! | anything else                    | [`StorageError::Transport`]     |
//!
//! Every remote failure goes through [`classify`] exactly once, at the call
//! site that made the round trip.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::paths::PathError;
use crate::remote::RemoteError;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object does not exist at the requested ref.
    #[error("not found: {0}")]
    NotFound(String),

    /// The credential was rejected or lacks access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The path failed validation.
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// The operation is not offered by this backend.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),

    /// The writer was already finalized.
    #[error("writer is closed")]
    WriterClosed,

    /// The session was closed.
    #[error("backend is closed")]
    BackendClosed,

    /// The batch was already committed.
    #[error("batch already committed")]
    BatchAlreadyCommitted,

    /// A file operation targeted a directory.
    #[error("path is a directory: {0}")]
    PathIsDirectory(String),

    /// The branch moved between resolving the base commit and updating the
    /// ref. Re-read and retry at a higher layer.
    #[error(
        "commit conflict on branch '{branch}': expected {expected}, found {}",
        .current.as_deref().unwrap_or("unknown")
    )]
    Conflict {
        branch: String,
        expected: String,
        current: Option<String>,
    },

    /// The caller's cancellation token fired before a round trip started.
    #[error("operation cancelled")]
    Cancelled,

    /// The session could not be created from its configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other remote failure, with the call that produced it.
    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: RemoteError,
    },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    /// Whether retrying the same operation after re-reading could succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Map a transport failure onto the storage taxonomy.
///
/// `context` names the call and target (e.g. `"get contents a/b.txt"`); it
/// is kept for the catch-all variant only.
pub fn classify(err: RemoteError, context: impl Into<String>) -> StorageError {
    let status = err.status().or(match &err {
        RemoteError::Api(body) => body.status_code(),
        _ => None,
    });

    match status {
        Some(404) => return StorageError::NotFound(context.into()),
        Some(401) | Some(403) => return StorageError::PermissionDenied(err.to_string()),
        _ => {}
    }

    match err {
        RemoteError::Auth(auth) => StorageError::PermissionDenied(auth.to_string()),
        other => StorageError::Transport {
            context: context.into(),
            source: other,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::remote::ApiErrorBody;

    fn http(status: u16) -> RemoteError {
        RemoteError::Http {
            status,
            message: "msg".into(),
        }
    }

    fn api(status: Option<&str>) -> RemoteError {
        RemoteError::Api(ApiErrorBody {
            message: "Not Found".into(),
            documentation_url: None,
            status: status.map(str::to_string),
        })
    }

    #[test]
    fn classify_by_status() {
        assert!(matches!(
            classify(http(404), "get a"),
            StorageError::NotFound(ctx) if ctx == "get a"
        ));
        assert!(matches!(
            classify(http(401), "get a"),
            StorageError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify(http(403), "get a"),
            StorageError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify(http(500), "get a"),
            StorageError::Transport { .. }
        ));
    }

    #[test]
    fn classify_falls_back_to_payload() {
        assert!(matches!(
            classify(api(Some("404")), "get a"),
            StorageError::NotFound(_)
        ));
        assert!(matches!(
            classify(api(Some("403")), "get a"),
            StorageError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify(api(None), "get a"),
            StorageError::Transport { .. }
        ));
    }

    #[test]
    fn classify_auth_failure() {
        assert!(matches!(
            classify(RemoteError::Auth(AuthError::InvalidToken), "get ref"),
            StorageError::PermissionDenied(_)
        ));
    }

    #[test]
    fn transport_keeps_context_and_source() {
        let err = classify(RemoteError::Network("connection reset".into()), "create blob");
        assert_eq!(err.to_string(), "create blob: network error: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn conflict_display() {
        let err = StorageError::Conflict {
            branch: "main".into(),
            expected: "aaa".into(),
            current: Some("bbb".into()),
        };
        assert_eq!(
            err.to_string(),
            "commit conflict on branch 'main': expected aaa, found bbb"
        );
        assert!(err.is_conflict());

        let unknown = StorageError::Conflict {
            branch: "main".into(),
            expected: "aaa".into(),
            current: None,
        };
        assert!(unknown.to_string().ends_with("found unknown"));
    }

    #[test]
    fn invalid_path_from_path_error() {
        let err: StorageError = PathError::Root.into();
        assert!(matches!(err, StorageError::InvalidPath(PathError::Root)));
    }
}
