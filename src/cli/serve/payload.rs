//! Write payload normalization.
//!
//! Turns a request body into the document value handed to the reconciler:
//! - JSON bodies: the `content` field when it is a string, otherwise `""`
//! - anything else: the body itself as UTF-8 text

use serde_json::Value;
use thiserror::Error;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Why a body was rejected. Maps to a 4xx response.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("body is not valid UTF-8")]
    InvalidUtf8,

    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("body exceeds {MAX_BODY_BYTES} bytes")]
    TooLarge,

    #[error("failed to read body: {0}")]
    Read(#[from] std::io::Error),
}

impl PayloadError {
    pub fn status(&self) -> u16 {
        match self {
            Self::TooLarge => 413,
            Self::InvalidUtf8 | Self::InvalidJson(_) | Self::Read(_) => 400,
        }
    }
}

/// Normalize a write body to document text.
pub fn normalize_payload(body: Vec<u8>, is_json: bool) -> Result<String, PayloadError> {
    if body.len() > MAX_BODY_BYTES {
        return Err(PayloadError::TooLarge);
    }
    if !is_json {
        return String::from_utf8(body).map_err(|_| PayloadError::InvalidUtf8);
    }

    let value: Value = serde_json::from_slice(&body)?;
    Ok(match value {
        Value::Object(mut map) => match map.remove("content") {
            Some(Value::String(content)) => content,
            _ => String::new(),
        },
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(body: &str) -> Result<String, PayloadError> {
        normalize_payload(body.as_bytes().to_vec(), true)
    }

    #[test]
    fn test_json_string_content() {
        assert_eq!(json(r#"{"content":"hello"}"#).unwrap(), "hello");
        assert_eq!(json(r#"{"content":"","extra":1}"#).unwrap(), "");
    }

    #[test]
    fn test_json_non_string_content_is_empty() {
        for body in [
            r#"{"content":42}"#,
            r#"{"content":null}"#,
            r#"{"content":["a"]}"#,
            r#"{"content":{"nested":"x"}}"#,
            r#"{}"#,
            r#""just a string""#,
            "[1,2]",
        ] {
            assert_eq!(json(body).unwrap(), "", "body: {body}");
        }
    }

    #[test]
    fn test_json_malformed_is_rejected() {
        let err = json("{\"content\": ").unwrap_err();
        assert!(matches!(err, PayloadError::InvalidJson(_)));
        assert_eq!(err.status(), 400);
        assert!(json("").is_err());
    }

    #[test]
    fn test_raw_text_passthrough() {
        let body = "line one\nline two ✓".as_bytes().to_vec();
        assert_eq!(normalize_payload(body, false).unwrap(), "line one\nline two ✓");
        assert_eq!(normalize_payload(Vec::new(), false).unwrap(), "");
    }

    #[test]
    fn test_raw_json_looking_text_is_kept_verbatim() {
        let body = br#"{"content":"x"}"#.to_vec();
        assert_eq!(normalize_payload(body, false).unwrap(), r#"{"content":"x"}"#);
    }

    #[test]
    fn test_raw_invalid_utf8_is_rejected() {
        let err = normalize_payload(vec![0xff, 0xfe], false).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidUtf8));
    }

    #[test]
    fn test_oversized_body_is_rejected() {
        let err = normalize_payload(vec![b'a'; MAX_BODY_BYTES + 1], false).unwrap_err();
        assert_eq!(err.status(), 413);
    }
}
