//! Request and response types for the operation boundary.
//!
//! Every binary field is standard padded Base64. Field names serialize in
//! camelCase. Optional outputs are omitted rather than sent as `null`.

use cipherkit_crypto::{CryptoError, ErrorKind};
use serde::{Deserialize, Serialize};

/// Plaintext plus a symmetric key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetricEncryptRequest {
    /// UTF-8 plaintext
    pub text: String,
    /// Base64 32-byte key
    pub key: String,
}

/// AES-256-CBC decryption input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AesDecryptRequest {
    /// Base64 ciphertext
    pub ciphertext: String,
    /// Base64 32-byte key
    pub key: String,
    /// Base64 16-byte IV
    pub iv: String,
}

/// ChaCha20-Poly1305 decryption input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaChaDecryptRequest {
    /// Base64 ciphertext
    pub ciphertext: String,
    /// Base64 32-byte key
    pub key: String,
    /// Base64 12-byte nonce
    pub nonce: String,
    /// Base64 16-byte tag
    pub tag: String,
}

/// A freshly generated symmetric key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetricKeyResponse {
    /// Base64 32-byte key
    pub key: String,
}

/// AES-256-CBC output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AesEncryptResponse {
    /// Base64 ciphertext
    pub ciphertext: String,
    /// Base64 16-byte IV
    pub iv: String,
}

/// ChaCha20-Poly1305 output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaChaEncryptResponse {
    /// Base64 ciphertext
    pub ciphertext: String,
    /// Base64 12-byte nonce
    pub nonce: String,
    /// Base64 16-byte tag
    pub tag: String,
}

/// Decrypted UTF-8 text.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    /// Recovered plaintext
    pub text: String,
}

/// RSA or DSA key generation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySizeRequest {
    /// Modulus size in bits
    pub key_size: usize,
}

/// ECDSA key generation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveRequest {
    /// `P-256`, `P-384`, `P-521` or a SEC alias
    pub curve: String,
}

/// A generated asymmetric key pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairResponse {
    /// Base64 DER `SubjectPublicKeyInfo`
    pub public_key: String,
    /// Base64 DER PKCS#8
    pub private_key: String,
    /// `RSA`, `DSA` or `ECDSA`
    pub algorithm: String,
    /// Modulus size for RSA and DSA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_size: Option<usize>,
    /// Curve for ECDSA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
}

/// RSA-OAEP encryption input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaEncryptRequest {
    /// UTF-8 plaintext
    pub text: String,
    /// Base64 DER RSA public key
    pub public_key: String,
}

/// RSA-OAEP decryption input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaDecryptRequest {
    /// Base64 ciphertext
    pub ciphertext: String,
    /// Base64 DER RSA private key
    pub private_key: String,
}

/// Opaque ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CiphertextResponse {
    /// Base64 ciphertext
    pub ciphertext: String,
}

/// Signing input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    /// UTF-8 message
    pub message: String,
    /// Base64 DER DSA or EC private key
    pub private_key: String,
    /// `DSA` or `ECDSA`
    pub algorithm: String,
}

/// A signature with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResponse {
    /// The signed message, echoed back
    pub message: String,
    /// Base64 signature
    pub signature: String,
    /// `DSA` or `ECDSA`
    pub algorithm: String,
    /// Always `SHA-256`
    pub hash_algorithm: String,
}

/// Verification input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// UTF-8 message
    pub message: String,
    /// Base64 signature
    pub signature: String,
    /// Base64 DER DSA or EC public key
    pub public_key: String,
}

/// Outcome of a signature or password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Whether the check passed
    pub valid: bool,
}

/// Key-exchange `init` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhInitRequest {
    /// Caller-chosen session identifier
    pub session_id: String,
}

/// Group parameters and the initiator's public value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhInitResponse {
    /// Session identifier, echoed back
    pub session_id: String,
    /// Base64 big-endian public value
    pub public_key: String,
    /// Base64 big-endian prime
    pub prime: String,
    /// Base64 big-endian generator
    pub generator: String,
}

/// Key-exchange `complete` input.
///
/// `prime` and `generator` are only used when no live session exists for
/// `session_id` (responder path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhCompleteRequest {
    /// Session identifier from `init`, or a fresh one for the responder
    pub session_id: String,
    /// Base64 big-endian public value of the other party
    pub peer_public_key: String,
    /// Base64 big-endian prime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime: Option<String>,
    /// Base64 big-endian generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

/// Derived key, plus the responder's public value on the responder path.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhCompleteResponse {
    /// Session identifier, echoed back
    pub session_id: String,
    /// Base64 32-byte SHA-256 of the shared secret
    pub derived_key: String,
    /// Base64 public value to send back to the initiator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Encrypt-then-sign input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridEncryptRequest {
    /// UTF-8 plaintext
    pub text: String,
    /// Base64 DER RSA public key of the recipient
    pub recipient_public_key: String,
    /// Base64 DER DSA or EC private key of the sender
    pub sender_private_key: String,
    /// `DSA` or `ECDSA`
    pub algorithm: String,
}

/// Encrypt-then-sign output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridEncryptResponse {
    /// Base64 RSA-OAEP ciphertext
    pub ciphertext: String,
    /// Base64 signature over the ciphertext bytes
    pub signature: String,
    /// `DSA` or `ECDSA`
    pub algorithm: String,
}

/// Verify-then-decrypt input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridDecryptRequest {
    /// Base64 RSA-OAEP ciphertext
    pub ciphertext: String,
    /// Base64 signature over the ciphertext bytes
    pub signature: String,
    /// Base64 DER DSA or EC public key of the sender
    pub sender_public_key: String,
    /// Base64 DER RSA private key of the recipient
    pub recipient_private_key: String,
}

/// Password hashing input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashPasswordRequest {
    /// The password
    pub password: String,
}

/// Password check input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordRequest {
    /// Candidate password
    pub password: String,
    /// PHC string from an earlier hash
    pub hash: String,
}

/// `Debug` that prints `[REDACTED]` in place of secret fields.
macro_rules! redacted_debug {
    ($ty:ident { shown: [$($shown:ident),*], secret: [$($secret:ident),*] }) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    $(.field(stringify!($shown), &self.$shown))*
                    $(.field(stringify!($secret), &"[REDACTED]"))*
                    .finish()
            }
        }
    };
}

redacted_debug!(SymmetricEncryptRequest { shown: [], secret: [text, key] });
redacted_debug!(AesDecryptRequest { shown: [ciphertext, iv], secret: [key] });
redacted_debug!(ChaChaDecryptRequest { shown: [ciphertext, nonce, tag], secret: [key] });
redacted_debug!(SymmetricKeyResponse { shown: [], secret: [key] });
redacted_debug!(TextResponse { shown: [], secret: [text] });
redacted_debug!(KeyPairResponse {
    shown: [public_key, algorithm, key_size, curve],
    secret: [private_key]
});
redacted_debug!(RsaEncryptRequest { shown: [public_key], secret: [text] });
redacted_debug!(RsaDecryptRequest { shown: [ciphertext], secret: [private_key] });
redacted_debug!(SignRequest { shown: [message, algorithm], secret: [private_key] });
redacted_debug!(DhCompleteResponse { shown: [session_id, public_key], secret: [derived_key] });
redacted_debug!(HybridEncryptRequest {
    shown: [recipient_public_key, algorithm],
    secret: [text, sender_private_key]
});
redacted_debug!(HybridDecryptRequest {
    shown: [ciphertext, signature, sender_public_key],
    secret: [recipient_private_key]
});
redacted_debug!(HashPasswordRequest { shown: [], secret: [password] });
redacted_debug!(VerifyPasswordRequest { shown: [hash], secret: [password] });

/// A PHC hash string or hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashResponse {
    /// Argon2id PHC string, or lowercase hex SHA-256
    pub hash: String,
}

/// Digest input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestRequest {
    /// UTF-8 text to hash
    pub text: String,
}

/// A failed operation, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    /// Error kind
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl From<&CryptoError> for Failure {
    fn from(err: &CryptoError) -> Self {
        Self { kind: err.kind(), message: err.to_string() }
    }
}

impl From<CryptoError> for Failure {
    fn from(err: CryptoError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_camel_case() {
        let request: DhCompleteRequest = serde_json::from_str(
            r#"{"sessionId":"s1","peerPublicKey":"Ag==","prime":"Aw==","generator":"Ag=="}"#,
        )
        .unwrap();
        assert_eq!(request.session_id, "s1");
        assert_eq!(request.prime.as_deref(), Some("Aw=="));
    }

    #[test]
    fn optional_outputs_are_omitted() {
        let response = DhCompleteResponse {
            session_id: "s".to_string(),
            derived_key: "k".to_string(),
            public_key: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"sessionId":"s","derivedKey":"k"}"#);
    }

    #[test]
    fn failure_carries_kind_name() {
        let failure = Failure::from(CryptoError::DecryptionFailed);
        let json = serde_json::to_value(&failure).unwrap();

        assert_eq!(json["kind"], "DecryptionFailed");
        assert_eq!(json["message"], "decryption failed");
    }

    #[test]
    fn secrets_do_not_leak_through_debug() {
        let request = VerifyPasswordRequest {
            password: "hunter2".to_string(),
            hash: "$argon2id$".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("argon2id"));

        let request = AesDecryptRequest {
            ciphertext: "Y2lwaGVy".to_string(),
            key: "c2VjcmV0LWtleS1ieXRlcw==".to_string(),
            iv: "aXY=".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(!debug.contains("c2VjcmV0LWtleS1ieXRlcw=="));
        assert!(debug.contains("Y2lwaGVy"));

        let request = HybridEncryptRequest {
            text: "attack at dawn".to_string(),
            recipient_public_key: "cHVi".to_string(),
            sender_private_key: "cHJpdmF0ZQ==".to_string(),
            algorithm: "ECDSA".to_string(),
        };
        let debug = format!("{request:?}");
        assert!(!debug.contains("attack at dawn"));
        assert!(!debug.contains("cHJpdmF0ZQ=="));
        assert!(debug.contains("ECDSA"));
    }
}
