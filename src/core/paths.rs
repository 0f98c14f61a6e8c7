//! core::paths
//!
//! Path validation and normalization for repository objects.
//!
//! # Rules
//!
//! - A path containing a `..` segment is rejected. The check runs on the raw
//!   input, before any cleaning, so `a/../../etc` cannot be cleaned into
//!   something that looks harmless first.
//! - Normalization strips the leading slash, collapses `.` segments and
//!   repeated separators, and maps the lexical root (`""`, `"."`, `"/"`) to
//!   the empty string.
//! - The empty path denotes the repository root. It is a valid target for
//!   reads, listing and stat, but never for writes or deletes.
//!
//! # Example
//!
//! ```
//! use ghstore::core::paths::{normalize, validate, ObjectPath};
//!
//! assert!(validate("docs/../secrets").is_err());
//! assert_eq!(normalize("/a//b/./c/"), "a/b/c");
//! assert_eq!(normalize("."), "");
//!
//! let path = ObjectPath::parse("/notes/today.md").unwrap();
//! assert_eq!(path.as_str(), "notes/today.md");
//! assert!(!path.is_root());
//! ```

use thiserror::Error;

/// Errors from path validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path contains a `..` segment.
    #[error("invalid path '{0}': parent directory segments are not allowed")]
    Traversal(String),

    /// The operation needs a concrete leaf path but got the repository root.
    #[error("invalid path: operation requires a file path, not the repository root")]
    Root,
}

/// Check a raw path for traversal segments.
///
/// The empty path is valid and denotes the repository root.
pub fn validate(raw: &str) -> Result<(), PathError> {
    if raw.split('/').any(|segment| segment == "..") {
        return Err(PathError::Traversal(raw.to_string()));
    }
    Ok(())
}

/// Canonicalize a path for the remote API.
///
/// Lexical only: no remote lookup, and `..` segments (which [`validate`]
/// rejects anyway) pop the previous segment like a rooted path clean.
pub fn normalize(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// A validated, normalized object path.
///
/// Construction goes through [`ObjectPath::parse`] (any path, including the
/// root) or [`ObjectPath::parse_leaf`] (must name a file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Validate then normalize a raw path. The root is allowed.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        validate(raw)?;
        Ok(Self(normalize(raw)))
    }

    /// Like [`ObjectPath::parse`], but rejects the repository root.
    ///
    /// Used by writes and deletes, which need a concrete leaf.
    pub fn parse_leaf(raw: &str) -> Result<Self, PathError> {
        let path = Self::parse(raw)?;
        if path.is_root() {
            return Err(PathError::Root);
        }
        Ok(path)
    }

    /// The repository root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// The normalized path string (no leading slash).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the repository root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `candidate` is this path or lies beneath it.
    ///
    /// Matching is segment-aware: the prefix `a` covers `a` and `a/b.txt`
    /// but not `ab/other.txt`. The root covers everything.
    pub fn covers(&self, candidate: &str) -> bool {
        if self.is_root() {
            return true;
        }
        match candidate.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod validate {
        use super::*;

        #[test]
        fn accepts_plain_paths() {
            assert!(validate("").is_ok());
            assert!(validate("a").is_ok());
            assert!(validate("a/b/c.txt").is_ok());
            assert!(validate("/leading/slash").is_ok());
            assert!(validate("./dot/segment").is_ok());
        }

        #[test]
        fn rejects_parent_segments() {
            assert_eq!(
                validate("../etc/passwd"),
                Err(PathError::Traversal("../etc/passwd".into()))
            );
            assert!(validate("a/../b").is_err());
            assert!(validate("a/..").is_err());
            assert!(validate("..").is_err());
        }

        #[test]
        fn checks_raw_input_before_cleaning() {
            // Cleans to "b", but the raw string still carries a traversal.
            assert!(validate("a/../b").is_err());
            assert_eq!(normalize("a/../b"), "b");
        }

        #[test]
        fn dots_inside_a_name_are_fine() {
            assert!(validate("release..notes.md").is_ok());
            assert!(validate("a/...").is_ok());
        }
    }

    mod normalize {
        use super::*;

        #[test]
        fn root_forms_map_to_empty() {
            assert_eq!(normalize(""), "");
            assert_eq!(normalize("."), "");
            assert_eq!(normalize("/"), "");
            assert_eq!(normalize("//./"), "");
        }

        #[test]
        fn strips_leading_and_trailing_slashes() {
            assert_eq!(normalize("/a/b"), "a/b");
            assert_eq!(normalize("a/b/"), "a/b");
        }

        #[test]
        fn collapses_dots_and_separators() {
            assert_eq!(normalize("a//b///c"), "a/b/c");
            assert_eq!(normalize("./a/./b"), "a/b");
        }

        #[test]
        fn idempotent_on_samples() {
            for raw in ["", "/", "a", "/a//b/", "./x/./y", "a/b/../c"] {
                let once = normalize(raw);
                assert_eq!(normalize(&once), once, "input: {raw:?}");
            }
        }
    }

    mod object_path {
        use super::*;

        #[test]
        fn parse_leaf_rejects_root() {
            assert_eq!(ObjectPath::parse_leaf(""), Err(PathError::Root));
            assert_eq!(ObjectPath::parse_leaf("/"), Err(PathError::Root));
            assert_eq!(ObjectPath::parse_leaf("."), Err(PathError::Root));
        }

        #[test]
        fn parse_leaf_rejects_traversal_first() {
            assert!(matches!(
                ObjectPath::parse_leaf(".."),
                Err(PathError::Traversal(_))
            ));
        }

        #[test]
        fn covers_is_segment_aware() {
            let prefix = ObjectPath::parse("a").unwrap();
            assert!(prefix.covers("a"));
            assert!(prefix.covers("a/b.txt"));
            assert!(!prefix.covers("ab/other.txt"));
            assert!(!prefix.covers("b/a"));
        }

        #[test]
        fn root_covers_everything() {
            let root = ObjectPath::root();
            assert!(root.covers("a"));
            assert!(root.covers("z/y/x"));
        }

        #[test]
        fn display() {
            let path = ObjectPath::parse("/a/b/c.txt").unwrap();
            assert_eq!(path.to_string(), "a/b/c.txt");
            assert_eq!(ObjectPath::root().to_string(), "/");
        }
    }
}
