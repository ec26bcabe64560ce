//! RSA key generation and RSA-OAEP (SHA-256) encryption.

use rand_core::CryptoRngCore;
use rsa::{
    Oaep, RsaPrivateKey, RsaPublicKey,
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
    traits::PublicKeyParts,
};
use sha2::Sha256;

use super::{AsymmetricKeyPair, KeyAlgorithm};
use crate::error::CryptoError;

/// Smallest accepted RSA modulus
pub const RSA_MIN_BITS: usize = 2048;

/// Largest accepted RSA modulus
pub const RSA_MAX_BITS: usize = 4096;

/// SHA-256 output length (hLen in RFC 8017)
const HASH_LEN: usize = 32;

/// Generate an RSA key pair.
///
/// # Errors
///
/// - `InvalidParameter`: `bits` outside `[2048, 4096]`
pub fn generate_rsa_key_pair(
    bits: usize,
    rng: &mut impl CryptoRngCore,
) -> Result<AsymmetricKeyPair, CryptoError> {
    if !(RSA_MIN_BITS..=RSA_MAX_BITS).contains(&bits) {
        return Err(CryptoError::invalid(format!(
            "RSA key size must be between {RSA_MIN_BITS} and {RSA_MAX_BITS} bits, got {bits}"
        )));
    }

    let private_key = RsaPrivateKey::new(rng, bits)
        .map_err(|e| CryptoError::Internal(format!("RSA key generation failed: {e}")))?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_der = private_key
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Internal(format!("RSA private key encoding failed: {e}")))?;
    let public_der = public_key
        .to_public_key_der()
        .map_err(|e| CryptoError::Internal(format!("RSA public key encoding failed: {e}")))?;

    Ok(AsymmetricKeyPair::new(
        KeyAlgorithm::Rsa { bits },
        public_der.into_vec(),
        private_der.as_bytes().to_vec(),
    ))
}

/// Largest plaintext RSA-OAEP(SHA-256) can carry for a `modulus_len`-byte
/// key: `k - 2*hLen - 2`.
pub fn max_oaep_message_len(modulus_len: usize) -> usize {
    modulus_len.saturating_sub(2 * HASH_LEN + 2)
}

/// Encrypt with RSA-OAEP (SHA-256, MGF1-SHA-256).
///
/// Payloads beyond the OAEP limit are rejected, not chunked. Use the
/// symmetric engines for anything longer.
///
/// # Errors
///
/// - `MalformedKeyEncoding`: `public_key` is not an RSA SPKI DER
/// - `MessageTooLong`: plaintext exceeds [`max_oaep_message_len`]
pub fn encrypt_rsa(
    plaintext: &[u8],
    public_key: &[u8],
    rng: &mut impl CryptoRngCore,
) -> Result<Vec<u8>, CryptoError> {
    let public_key = RsaPublicKey::from_public_key_der(public_key)
        .map_err(|_| CryptoError::MalformedKeyEncoding { what: "RSA public key" })?;

    let max = max_oaep_message_len(public_key.size());
    if plaintext.len() > max {
        return Err(CryptoError::MessageTooLong { len: plaintext.len(), max });
    }

    public_key
        .encrypt(rng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| CryptoError::Internal(format!("RSA encryption failed: {e}")))
}

/// Decrypt RSA-OAEP (SHA-256) ciphertext.
///
/// # Errors
///
/// - `MalformedKeyEncoding`: `private_key` is not an RSA PKCS#8 DER
/// - `DecryptionFailed`: padding check failed or the key does not match.
///   The cause is not reported.
pub fn decrypt_rsa(ciphertext: &[u8], private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let private_key = RsaPrivateKey::from_pkcs8_der(private_key)
        .map_err(|_| CryptoError::MalformedKeyEncoding { what: "RSA private key" })?;

    private_key
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use rand_chacha::{ChaCha20Rng, rand_core::SeedableRng};

    use super::*;

    #[test]
    fn oaep_limit_for_common_sizes() {
        assert_eq!(max_oaep_message_len(256), 190);
        assert_eq!(max_oaep_message_len(384), 318);
        assert_eq!(max_oaep_message_len(512), 446);
        assert_eq!(max_oaep_message_len(10), 0);
    }

    #[test]
    fn key_size_range_is_enforced() {
        let mut rng = ChaCha20Rng::from_seed([1; 32]);

        for bits in [0, 1024, 2047, 4097, 8192] {
            let err = generate_rsa_key_pair(bits, &mut rng).unwrap_err();
            assert!(matches!(err, CryptoError::InvalidParameter(_)), "{bits} bits accepted");
        }
    }

    #[test]
    fn garbage_keys_are_malformed() {
        let mut rng = ChaCha20Rng::from_seed([1; 32]);

        assert_eq!(
            encrypt_rsa(b"hi", b"not a key", &mut rng).unwrap_err(),
            CryptoError::MalformedKeyEncoding { what: "RSA public key" }
        );
        assert_eq!(
            decrypt_rsa(b"hi", b"not a key").unwrap_err(),
            CryptoError::MalformedKeyEncoding { what: "RSA private key" }
        );
    }
}
