//! Wire protocol: one JSON request per line in, one JSON response per line
//! out.
//!
//! Requests are tagged by `op`:
//!
//! ```json
//! {"op": "encryptAes", "text": "hello", "key": "AAAA...="}
//! ```
//!
//! Responses carry either `data` or `error`, never both:
//!
//! ```json
//! {"ok": true, "data": {"ciphertext": "...", "iv": "..."}}
//! {"ok": false, "error": {"kind": "InvalidKeySize", "message": "..."}}
//! ```

use cipherkit_core::{
    CryptoError, CryptoService, Environment, Failure,
    api::{
        AesDecryptRequest, ChaChaDecryptRequest, CurveRequest, DhCompleteRequest, DhInitRequest,
        DigestRequest, HashPasswordRequest, HybridDecryptRequest, HybridEncryptRequest,
        KeySizeRequest, RsaDecryptRequest, RsaEncryptRequest, SignRequest,
        SymmetricEncryptRequest, VerifyPasswordRequest, VerifyRequest,
    },
};
use serde::{Deserialize, Serialize};

/// A decoded request line.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    /// Random 256-bit key
    GenerateSymmetricKey,
    /// AES-256-CBC encrypt
    EncryptAes(SymmetricEncryptRequest),
    /// AES-256-CBC decrypt
    DecryptAes(AesDecryptRequest),
    /// ChaCha20-Poly1305 encrypt
    EncryptChacha20(SymmetricEncryptRequest),
    /// ChaCha20-Poly1305 decrypt
    DecryptChacha20(ChaChaDecryptRequest),
    /// RSA key pair
    GenerateRsaKeyPair(KeySizeRequest),
    /// DSA key pair
    GenerateDsaKeyPair(KeySizeRequest),
    /// ECDSA key pair
    GenerateEcdsaKeyPair(CurveRequest),
    /// RSA-OAEP encrypt
    EncryptRsa(RsaEncryptRequest),
    /// RSA-OAEP decrypt
    DecryptRsa(RsaDecryptRequest),
    /// DSA/ECDSA sign
    Sign(SignRequest),
    /// DSA/ECDSA verify
    Verify(VerifyRequest),
    /// Start a key exchange
    DhInit(DhInitRequest),
    /// Finish a key exchange
    DhComplete(DhCompleteRequest),
    /// Encrypt-then-sign
    EncryptAndSign(HybridEncryptRequest),
    /// Verify-then-decrypt
    VerifyAndDecrypt(HybridDecryptRequest),
    /// Argon2id hash
    HashPassword(HashPasswordRequest),
    /// Argon2id verify
    VerifyPassword(VerifyPasswordRequest),
    /// SHA-256 hex digest
    Sha256(DigestRequest),
}

impl Request {
    /// Operation name, for logs.
    pub fn op(&self) -> &'static str {
        match self {
            Self::GenerateSymmetricKey => "generateSymmetricKey",
            Self::EncryptAes(_) => "encryptAes",
            Self::DecryptAes(_) => "decryptAes",
            Self::EncryptChacha20(_) => "encryptChacha20",
            Self::DecryptChacha20(_) => "decryptChacha20",
            Self::GenerateRsaKeyPair(_) => "generateRsaKeyPair",
            Self::GenerateDsaKeyPair(_) => "generateDsaKeyPair",
            Self::GenerateEcdsaKeyPair(_) => "generateEcdsaKeyPair",
            Self::EncryptRsa(_) => "encryptRsa",
            Self::DecryptRsa(_) => "decryptRsa",
            Self::Sign(_) => "sign",
            Self::Verify(_) => "verify",
            Self::DhInit(_) => "dhInit",
            Self::DhComplete(_) => "dhComplete",
            Self::EncryptAndSign(_) => "encryptAndSign",
            Self::VerifyAndDecrypt(_) => "verifyAndDecrypt",
            Self::HashPassword(_) => "hashPassword",
            Self::VerifyPassword(_) => "verifyPassword",
            Self::Sha256(_) => "sha256",
        }
    }

    /// Run the request against `service`.
    pub fn execute<E: Environment>(
        &self,
        service: &CryptoService<E>,
    ) -> Result<serde_json::Value, CryptoError> {
        match self {
            Self::GenerateSymmetricKey => to_value(&service.generate_symmetric_key()),
            Self::EncryptAes(r) => to_value(&service.encrypt_aes(r)?),
            Self::DecryptAes(r) => to_value(&service.decrypt_aes(r)?),
            Self::EncryptChacha20(r) => to_value(&service.encrypt_chacha20(r)?),
            Self::DecryptChacha20(r) => to_value(&service.decrypt_chacha20(r)?),
            Self::GenerateRsaKeyPair(r) => to_value(&service.generate_rsa_key_pair(r)?),
            Self::GenerateDsaKeyPair(r) => to_value(&service.generate_dsa_key_pair(r)?),
            Self::GenerateEcdsaKeyPair(r) => to_value(&service.generate_ecdsa_key_pair(r)?),
            Self::EncryptRsa(r) => to_value(&service.encrypt_rsa(r)?),
            Self::DecryptRsa(r) => to_value(&service.decrypt_rsa(r)?),
            Self::Sign(r) => to_value(&service.sign(r)?),
            Self::Verify(r) => to_value(&service.verify(r)?),
            Self::DhInit(r) => to_value(&service.dh_init(r)?),
            Self::DhComplete(r) => to_value(&service.dh_complete(r)?),
            Self::EncryptAndSign(r) => to_value(&service.encrypt_and_sign(r)?),
            Self::VerifyAndDecrypt(r) => to_value(&service.verify_and_decrypt(r)?),
            Self::HashPassword(r) => to_value(&service.hash_password(r)?),
            Self::VerifyPassword(r) => to_value(&service.verify_password(r)?),
            Self::Sha256(r) => to_value(&service.sha256(r)),
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, CryptoError> {
    serde_json::to_value(value)
        .map_err(|e| CryptoError::Internal(format!("response encoding failed: {e}")))
}

/// A response line.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Response {
    /// Whether the operation succeeded
    pub ok: bool,
    /// Operation output on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Failure on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl Response {
    /// Successful response.
    pub fn success(data: serde_json::Value) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    /// Failed response.
    pub fn failure(failure: Failure) -> Self {
        Self { ok: false, data: None, error: Some(failure) }
    }
}

impl From<Result<serde_json::Value, CryptoError>> for Response {
    fn from(result: Result<serde_json::Value, CryptoError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(Failure::from(err)),
        }
    }
}
