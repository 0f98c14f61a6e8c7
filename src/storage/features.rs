//! storage::features
//!
//! Capability descriptor reported by [`crate::storage::Backend::features`].

use std::fmt;

/// Content hash kinds a backend can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    /// Git blob SHA-1 (`blob <len>\0<content>`).
    GitSha1,
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKind::GitSha1 => write!(f, "git-sha1"),
        }
    }
}

/// What this backend can and cannot do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    pub copy: bool,
    pub r#move: bool,
    pub mkdir: bool,
    pub rmdir: bool,
    pub stat: bool,
    pub hashes: Vec<HashKind>,
    /// Objects can be streamed without buffering them whole.
    pub streaming: bool,
    /// Every mutation is a commit in the branch history.
    pub versioning: bool,
    /// Offset/limit reads (applied client-side).
    pub range_read: bool,
    pub list_prefix: bool,
}

impl Features {
    /// The fixed descriptor of the GitHub backend.
    pub fn github() -> Self {
        Self {
            copy: false,
            r#move: false,
            mkdir: false,
            rmdir: false,
            stat: true,
            hashes: vec![HashKind::GitSha1],
            streaming: false,
            versioning: true,
            range_read: true,
            list_prefix: true,
        }
    }

    pub fn supports_hash(&self, kind: HashKind) -> bool {
        self.hashes.contains(&kind)
    }
}
