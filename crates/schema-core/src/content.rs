//! `contentEncoding`/`contentMediaType`/`contentSchema`: annotation-only
//! unless the compiler is configured to assert them (§3.1 "Content").
use base64::Engine;

/// Decode a `contentEncoding: base64` string, reporting whether it is valid
/// base64. Errors surface as [`crate::error::ValidationErrorKind::ContentEncoding`]
/// only when assertion is enabled; by default this result is discarded and
/// only the `contentEncoding` name is recorded as an annotation.
#[must_use]
pub fn decode_base64(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(value)
}

/// Whether `bytes` parses as the named media type. Only `application/json`
/// is checked structurally; any other media type is accepted without
/// inspection (the core has no general-purpose media-type registry).
#[must_use]
pub fn matches_media_type(media_type: &str, bytes: &[u8]) -> bool {
    if media_type.eq_ignore_ascii_case("application/json") {
        serde_json::from_slice::<serde_json::Value>(bytes).is_ok()
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_base64() {
        assert_eq!(decode_base64("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(decode_base64("not base64!!").is_err());
    }

    #[test]
    fn json_media_type_checks_structure() {
        assert!(matches_media_type("application/json", b"{}"));
        assert!(!matches_media_type("application/json", b"not json"));
    }
}
