//! Base64 boundary codec and length checks.
//!
//! Every binary value crosses the operation boundary as standard padded
//! Base64. Engines below this layer only see raw bytes.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::CryptoError;

/// Encode bytes as standard padded Base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a Base64 field.
///
/// `field` names the input in the error message.
pub fn decode(field: &str, text: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(text.trim())
        .map_err(|_| CryptoError::invalid(format!("{field} is not valid Base64")))
}

/// Decode a Base64 field that must be exactly `N` bytes long.
pub fn decode_exact<const N: usize>(field: &str, text: &str) -> Result<[u8; N], CryptoError> {
    let bytes = decode(field, text)?;
    to_array(field, &bytes)
}

/// Copy a slice into a fixed-size array, failing on length mismatch.
pub fn to_array<const N: usize>(field: &str, bytes: &[u8]) -> Result<[u8; N], CryptoError> {
    bytes.try_into().map_err(|_| {
        CryptoError::invalid(format!("{field} must be {N} bytes, got {}", bytes.len()))
    })
}

/// Decode a field that must be present and non-empty.
pub fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CryptoError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CryptoError::invalid(format!("missing required field '{field}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_key_encodes_to_known_text() {
        let text = encode(&[0u8; 32]);
        assert_eq!(text, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=");
        assert_eq!(decode("key", &text).unwrap(), vec![0u8; 32]);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode("iv", "not base64!!").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidParameter(msg) if msg.contains("iv")));
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        assert_eq!(decode("x", " aGk=\n").unwrap(), b"hi");
    }

    #[test]
    fn decode_exact_checks_length() {
        let iv: [u8; 16] = decode_exact("iv", &encode(&[7u8; 16])).unwrap();
        assert_eq!(iv, [7u8; 16]);

        let err = decode_exact::<12>("nonce", &encode(&[0u8; 16])).unwrap_err();
        assert_eq!(err, CryptoError::InvalidParameter("nonce must be 12 bytes, got 16".into()));
    }

    #[test]
    fn empty_input_decodes_to_empty() {
        assert!(decode("data", "").unwrap().is_empty());
    }

    #[test]
    fn require_rejects_missing_and_blank() {
        assert!(require("text", None).is_err());
        assert!(require("text", Some("  ")).is_err());
        assert_eq!(require("text", Some("hi")).unwrap(), "hi");
    }
}
