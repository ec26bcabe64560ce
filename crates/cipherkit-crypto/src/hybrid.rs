//! Encrypt-then-sign and verify-then-decrypt.
//!
//! The signature covers the RSA-OAEP ciphertext bytes, so a recipient can
//! reject a forged message without touching their private key.

use rand_core::CryptoRngCore;

use crate::{
    asymmetric::{self, SignatureAlgorithm},
    error::CryptoError,
};

/// Ciphertext plus the sender's signature over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// RSA-OAEP ciphertext for the recipient
    pub ciphertext: Vec<u8>,
    /// Sender's signature over `ciphertext`
    pub signature: Vec<u8>,
}

/// Encrypt for the recipient, then sign the ciphertext.
///
/// # Errors
///
/// - `MessageTooLong`: plaintext exceeds the recipient key's OAEP limit
/// - `MalformedKeyEncoding`: either key fails to parse
/// - `InvalidParameter`: signing key does not match `algorithm`
pub fn encrypt_and_sign(
    plaintext: &[u8],
    recipient_public_key: &[u8],
    sender_private_key: &[u8],
    algorithm: SignatureAlgorithm,
    rng: &mut impl CryptoRngCore,
) -> Result<SealedMessage, CryptoError> {
    let ciphertext = asymmetric::encrypt_rsa(plaintext, recipient_public_key, rng)?;
    let signed = asymmetric::sign(&ciphertext, sender_private_key, algorithm)?;

    Ok(SealedMessage { ciphertext, signature: signed.signature })
}

/// Verify the sender's signature, then decrypt.
///
/// Decryption is never attempted unless the signature verifies.
///
/// # Errors
///
/// - `InvalidSignature`: signature is wrong or not a valid encoding
/// - `MalformedKeyEncoding`: either key fails to parse
/// - `DecryptionFailed`: signature is good but the ciphertext is not for
///   this recipient
pub fn verify_and_decrypt(
    sealed: &SealedMessage,
    sender_public_key: &[u8],
    recipient_private_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let valid = match asymmetric::verify(&sealed.ciphertext, &sealed.signature, sender_public_key) {
        Ok(valid) => valid,
        // A signature that does not even parse is as bad as a wrong one
        Err(CryptoError::InvalidParameter(_)) => false,
        Err(e) => return Err(e),
    };
    if !valid {
        return Err(CryptoError::InvalidSignature);
    }

    asymmetric::decrypt_rsa(&sealed.ciphertext, recipient_private_key)
}
