//! Content fingerprints using blake3.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let tag = hash::etag("some content"); // -> "\"a1b2c3d4e5f60718\""
//! ```

/// Hex fingerprint of `content` (first 8 bytes of the blake3 digest).
#[inline]
pub fn fingerprint(content: &str) -> String {
    let hash = blake3::hash(content.as_bytes());
    hex::encode(&hash.as_bytes()[..8])
}

/// Strong HTTP entity tag for `content`.
pub fn etag(content: &str) -> String {
    format!("\"{}\"", fingerprint(content))
}

/// Whether an `If-None-Match` header value matches `etag`.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate == etag || candidate.strip_prefix("W/") == Some(etag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        assert_eq!(fingerprint("hello"), fingerprint("hello"));
        assert_ne!(fingerprint("hello"), fingerprint("world"));
        assert_eq!(fingerprint("").len(), 16);
    }

    #[test]
    fn test_etag_is_quoted() {
        let tag = etag("hello");
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert_eq!(tag.len(), 18);
    }

    #[test]
    fn test_etag_matches() {
        let tag = etag("hello");
        assert!(etag_matches(&tag, &tag));
        assert!(etag_matches(&format!("\"other\", {tag}"), &tag));
        assert!(etag_matches(&format!("W/{tag}"), &tag));
        assert!(etag_matches("*", &tag));
        assert!(!etag_matches(&etag("world"), &tag));
    }
}
