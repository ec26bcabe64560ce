//! Error types for Cipherkit operations.
//!
//! Every engine validates its own inputs and fails with a specific
//! [`CryptoError`]. The variant maps onto a transport-neutral [`ErrorKind`]
//! that callers use to pick a response class.
//!
//! `DecryptionFailed` and `AuthenticationFailed` carry fixed messages. They
//! must never say which part of the input was wrong.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Bad size, curve-independent parameter or missing field
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Symmetric key is not exactly 32 bytes
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Required key length in bytes
        expected: usize,
        /// Supplied key length in bytes
        actual: usize,
    },

    /// Plaintext exceeds the RSA-OAEP limit for the key
    #[error("message too long: {len} bytes exceeds the {max}-byte limit for this key")]
    MessageTooLong {
        /// Supplied plaintext length
        len: usize,
        /// Largest plaintext the key can carry
        max: usize,
    },

    /// Padding, key or IV mismatch. Deliberately opaque.
    #[error("decryption failed")]
    DecryptionFailed,

    /// AEAD tag did not verify. The message may be forged.
    #[error("authentication failed: message may have been tampered with")]
    AuthenticationFailed,

    /// Signature did not verify in a hybrid exchange
    #[error("invalid signature: message may have been altered")]
    InvalidSignature,

    /// No live key-exchange session for this identifier
    #[error("session not found: {session_id}")]
    SessionNotFound {
        /// Caller-supplied session identifier
        session_id: String,
    },

    /// A live key-exchange session already uses this identifier
    #[error("duplicate session: {session_id}")]
    DuplicateSession {
        /// Caller-supplied session identifier
        session_id: String,
    },

    /// Curve name is not one of P-256, P-384, P-521
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// Key bytes could not be parsed as the expected DER structure
    #[error("malformed {what} encoding")]
    MalformedKeyEncoding {
        /// Which key was being parsed
        what: &'static str,
    },

    /// Library-level failure that is not the caller's fault
    #[error("internal error: {0}")]
    Internal(String),
}

impl CryptoError {
    /// Transport-neutral kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::InvalidKeySize { .. } => ErrorKind::InvalidKeySize,
            Self::MessageTooLong { .. } => ErrorKind::MessageTooLong,
            Self::DecryptionFailed => ErrorKind::DecryptionFailed,
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            Self::InvalidSignature => ErrorKind::InvalidSignature,
            Self::SessionNotFound { .. } => ErrorKind::SessionNotFound,
            Self::DuplicateSession { .. } => ErrorKind::DuplicateSession,
            Self::UnsupportedCurve(_) => ErrorKind::UnsupportedCurve,
            Self::MalformedKeyEncoding { .. } => ErrorKind::MalformedKeyEncoding,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Kind of failure, as exposed at the operation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`CryptoError::InvalidParameter`]
    InvalidParameter,
    /// See [`CryptoError::InvalidKeySize`]
    InvalidKeySize,
    /// See [`CryptoError::MessageTooLong`]
    MessageTooLong,
    /// See [`CryptoError::DecryptionFailed`]
    DecryptionFailed,
    /// See [`CryptoError::AuthenticationFailed`]
    AuthenticationFailed,
    /// See [`CryptoError::InvalidSignature`]
    InvalidSignature,
    /// See [`CryptoError::SessionNotFound`]
    SessionNotFound,
    /// See [`CryptoError::DuplicateSession`]
    DuplicateSession,
    /// See [`CryptoError::UnsupportedCurve`]
    UnsupportedCurve,
    /// See [`CryptoError::MalformedKeyEncoding`]
    MalformedKeyEncoding,
    /// See [`CryptoError::Internal`]
    Internal,
}

impl ErrorKind {
    /// Returns true if the caller supplied bad input.
    ///
    /// Only [`ErrorKind::Internal`] is the service's own fault. A transport
    /// maps client errors to a 4xx-style response and internal ones to 5xx.
    pub fn is_client_error(self) -> bool {
        !matches!(self, Self::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_failure_messages_are_generic() {
        assert_eq!(CryptoError::DecryptionFailed.to_string(), "decryption failed");
        assert!(!CryptoError::AuthenticationFailed.to_string().contains("tag"));
    }

    #[test]
    fn kinds_map_one_to_one() {
        let err = CryptoError::SessionNotFound { session_id: "abc".to_string() };
        assert_eq!(err.kind(), ErrorKind::SessionNotFound);
        assert_eq!(err.to_string(), "session not found: abc");

        let err = CryptoError::InvalidKeySize { expected: 32, actual: 16 };
        assert_eq!(err.kind(), ErrorKind::InvalidKeySize);
    }

    #[test]
    fn only_internal_is_server_side() {
        assert!(ErrorKind::MessageTooLong.is_client_error());
        assert!(ErrorKind::AuthenticationFailed.is_client_error());
        assert!(!ErrorKind::Internal.is_client_error());
    }
}
