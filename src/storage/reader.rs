//! storage::reader
//!
//! Content decoding and the client-side read window.
//!
//! The contents endpoint returns whole objects as (line-wrapped) base64.
//! Objects too large to inline come back with encoding `none` and must be
//! fetched as blobs by SHA; [`Backend::read`](super::Backend::read) handles
//! that branch and uses [`decode`] for both.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::remote::RemoteError;

/// Decode transport content to raw bytes.
pub(crate) fn decode(encoding: &str, content: &str) -> Result<Vec<u8>, RemoteError> {
    match encoding {
        "base64" => {
            let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            BASE64
                .decode(compact)
                .map_err(|e| RemoteError::Decode(format!("invalid base64 content: {}", e)))
        }
        "" | "utf-8" => Ok(content.as_bytes().to_vec()),
        other => Err(RemoteError::Decode(format!(
            "unsupported content encoding '{}'",
            other
        ))),
    }
}

/// Apply an offset/limit window to fetched content.
///
/// An offset at or past the end yields empty content, not an error.
pub(crate) fn apply_window(mut content: Vec<u8>, offset: u64, limit: Option<u64>) -> Vec<u8> {
    let len = content.len() as u64;
    if offset >= len {
        return Vec::new();
    }
    if offset > 0 {
        content.drain(..offset as usize);
    }
    if let Some(limit) = limit {
        if (content.len() as u64) > limit {
            content.truncate(limit as usize);
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_wrapped_base64() {
        assert_eq!(decode("base64", "aGVs\nbG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode("base64", "!!!"),
            Err(RemoteError::Decode(_))
        ));
        assert!(matches!(
            decode("gzip", "x"),
            Err(RemoteError::Decode(_))
        ));
    }

    #[test]
    fn window_slices_and_truncates() {
        let data = b"hello world".to_vec();
        assert_eq!(apply_window(data.clone(), 0, None), b"hello world");
        assert_eq!(apply_window(data.clone(), 6, None), b"world");
        assert_eq!(apply_window(data.clone(), 0, Some(5)), b"hello");
        assert_eq!(apply_window(data.clone(), 6, Some(100)), b"world");
        assert_eq!(apply_window(data.clone(), 2, Some(0)), b"");
    }

    #[test]
    fn window_offset_past_end_is_empty() {
        assert!(apply_window(b"abc".to_vec(), 3, None).is_empty());
        assert!(apply_window(b"abc".to_vec(), 99, Some(1)).is_empty());
        assert!(apply_window(Vec::new(), 0, None).is_empty());
    }
}
