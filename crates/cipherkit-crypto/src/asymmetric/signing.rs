//! DSA and ECDSA key generation, signing and verification.
//!
//! The message is always hashed with SHA-256 before signing. Raw input is
//! never signed. Nonces are derived deterministically (RFC 6979), so signing
//! needs no RNG.
//!
//! Verification infers the scheme and curve from the OID inside the
//! `SubjectPublicKeyInfo`. A `false` result is a normal outcome. Only an
//! unparseable key or signature is an error.

use dsa::{
    Components, KeySize,
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
};
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};
use signature::{DigestSigner, DigestVerifier, SignatureEncoding};

use super::{AsymmetricKeyPair, Curve, HASH_ALGORITHM, KeyAlgorithm, SignatureAlgorithm, SignedMessage};
use crate::error::CryptoError;

/// Smallest accepted DSA modulus
pub const DSA_MIN_BITS: usize = 1024;

/// Largest accepted DSA modulus
pub const DSA_MAX_BITS: usize = 3072;

/// Generate a DSA key pair.
///
/// Only the FIPS 186 sizes 1024 (N=160), 2048 (N=256) and 3072 (N=256) are
/// available. Domain parameter generation is slow for large moduli.
///
/// # Errors
///
/// - `InvalidParameter`: `bits` outside `[1024, 3072]` or not a FIPS size
pub fn generate_dsa_key_pair(
    bits: usize,
    rng: &mut impl CryptoRngCore,
) -> Result<AsymmetricKeyPair, CryptoError> {
    if !(DSA_MIN_BITS..=DSA_MAX_BITS).contains(&bits) {
        return Err(CryptoError::invalid(format!(
            "DSA key size must be between {DSA_MIN_BITS} and {DSA_MAX_BITS} bits, got {bits}"
        )));
    }

    #[allow(deprecated)]
    let key_size = match bits {
        1024 => KeySize::DSA_1024_160,
        2048 => KeySize::DSA_2048_256,
        3072 => KeySize::DSA_3072_256,
        other => {
            return Err(CryptoError::invalid(format!(
                "DSA key size must be one of 1024, 2048 or 3072 bits, got {other}"
            )));
        },
    };

    let components = Components::generate(rng, key_size);
    let signing_key = dsa::SigningKey::generate(rng, components);

    let private_der = signing_key
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Internal(format!("DSA private key encoding failed: {e}")))?;
    let public_der = signing_key
        .verifying_key()
        .to_public_key_der()
        .map_err(|e| CryptoError::Internal(format!("DSA public key encoding failed: {e}")))?;

    Ok(AsymmetricKeyPair::new(
        KeyAlgorithm::Dsa { bits },
        public_der.into_vec(),
        private_der.as_bytes().to_vec(),
    ))
}

/// Generate an ECDSA key pair on a named curve.
pub fn generate_ecdsa_key_pair(
    curve: Curve,
    rng: &mut impl CryptoRngCore,
) -> Result<AsymmetricKeyPair, CryptoError> {
    let (public_der, private_der) = match curve {
        Curve::P256 => nist_p256::generate(rng)?,
        Curve::P384 => nist_p384::generate(rng)?,
        Curve::P521 => nist_p521::generate(rng)?,
    };

    Ok(AsymmetricKeyPair::new(KeyAlgorithm::Ecdsa { curve }, public_der, private_der))
}

/// Sign `message` with a DSA or ECDSA PKCS#8 private key.
///
/// # Errors
///
/// - `MalformedKeyEncoding`: `private_key` is not a DSA or EC PKCS#8 DER
/// - `InvalidParameter`: the key belongs to the other scheme
pub fn sign(
    message: &[u8],
    private_key: &[u8],
    algorithm: SignatureAlgorithm,
) -> Result<SignedMessage, CryptoError> {
    let key = ParsedSigningKey::from_pkcs8_der(private_key)?;
    if key.algorithm() != algorithm {
        return Err(CryptoError::invalid(format!(
            "private key is a {} key but {} was requested",
            key.algorithm().as_str(),
            algorithm.as_str()
        )));
    }

    let digest = Sha256::new_with_prefix(message);
    let signature = match &key {
        ParsedSigningKey::Dsa(key) => {
            let signature: dsa::Signature = key
                .try_sign_digest(digest)
                .map_err(|e| CryptoError::Internal(format!("DSA signing failed: {e}")))?;
            signature.to_vec()
        },
        ParsedSigningKey::Ecdsa(curve, scalar) => {
            let digest = digest.finalize();
            match curve {
                Curve::P256 => nist_p256::sign(scalar, &digest)?,
                Curve::P384 => nist_p384::sign(scalar, &digest)?,
                Curve::P521 => nist_p521::sign(scalar, &digest)?,
            }
        },
    };

    Ok(SignedMessage {
        message: message.to_vec(),
        signature,
        algorithm,
        hash_algorithm: HASH_ALGORITHM,
    })
}

/// Verify a signature over `message` with a DSA or ECDSA SPKI public key.
///
/// # Errors
///
/// - `MalformedKeyEncoding`: `public_key` is not a DSA or EC SPKI DER
/// - `InvalidParameter`: `signature` is not a well-formed encoding for the
///   key's scheme
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, CryptoError> {
    if let Ok(key) = dsa::VerifyingKey::from_public_key_der(public_key) {
        let signature = dsa::Signature::try_from(signature)
            .map_err(|_| CryptoError::invalid("signature is not a valid DSA encoding"))?;
        return Ok(key.verify_digest(Sha256::new_with_prefix(message), &signature).is_ok());
    }

    let digest = Sha256::digest(message);
    if let Some(valid) = nist_p256::verify(public_key, &digest, signature)? {
        return Ok(valid);
    }
    if let Some(valid) = nist_p384::verify(public_key, &digest, signature)? {
        return Ok(valid);
    }
    if let Some(valid) = nist_p521::verify(public_key, &digest, signature)? {
        return Ok(valid);
    }

    Err(CryptoError::MalformedKeyEncoding { what: "DSA/ECDSA public key" })
}

/// A parsed signing key. Lives only for the duration of one `sign` call.
enum ParsedSigningKey {
    Dsa(dsa::SigningKey),
    Ecdsa(Curve, zeroize::Zeroizing<Vec<u8>>),
}

impl ParsedSigningKey {
    fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        if let Ok(key) = dsa::SigningKey::from_pkcs8_der(der) {
            return Ok(Self::Dsa(key));
        }
        if let Some(scalar) = nist_p256::secret_scalar(der) {
            return Ok(Self::Ecdsa(Curve::P256, scalar));
        }
        if let Some(scalar) = nist_p384::secret_scalar(der) {
            return Ok(Self::Ecdsa(Curve::P384, scalar));
        }
        if let Some(scalar) = nist_p521::secret_scalar(der) {
            return Ok(Self::Ecdsa(Curve::P521, scalar));
        }

        Err(CryptoError::MalformedKeyEncoding { what: "DSA/ECDSA private key" })
    }

    fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Dsa(_) => SignatureAlgorithm::Dsa,
            Self::Ecdsa(..) => SignatureAlgorithm::Ecdsa,
        }
    }
}

/// Left-pad a SHA-256 digest so it is at least half the curve's field size.
///
/// The ECDSA prehash API rejects digests shorter than half the field (P-521
/// needs 33 bytes). Leading zeros leave the integer value unchanged, which
/// matches how X9.62 treats a hash shorter than the group order.
fn prehash(digest: &[u8], field_size: usize) -> Vec<u8> {
    let min_len = field_size.div_ceil(2);
    if digest.len() >= min_len {
        return digest.to_vec();
    }

    let mut padded = vec![0u8; field_size - digest.len()];
    padded.extend_from_slice(digest);
    padded
}

/// Stamp out per-curve ECDSA helpers. Each NIST curve crate exposes the same
/// API shape under a different concrete type.
macro_rules! nist_curve {
    ($module:ident, $krate:ident, $field_size:expr, $name:literal) => {
        mod $module {
            use rand_core::CryptoRngCore;
            use signature::hazmat::{PrehashSigner, PrehashVerifier};
            use zeroize::Zeroizing;
            use $krate::{
                PublicKey, SecretKey,
                ecdsa::{Signature, SigningKey, VerifyingKey},
                pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
            };

            use super::prehash;
            use crate::error::CryptoError;

            pub(super) fn generate(
                rng: &mut impl CryptoRngCore,
            ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
                let secret = SecretKey::random(rng);
                let private_der = secret.to_pkcs8_der().map_err(|e| {
                    CryptoError::Internal(format!("{} private key encoding failed: {e}", $name))
                })?;
                let public_der = secret.public_key().to_public_key_der().map_err(|e| {
                    CryptoError::Internal(format!("{} public key encoding failed: {e}", $name))
                })?;

                Ok((public_der.into_vec(), private_der.as_bytes().to_vec()))
            }

            pub(super) fn secret_scalar(der: &[u8]) -> Option<Zeroizing<Vec<u8>>> {
                let secret = SecretKey::from_pkcs8_der(der).ok()?;
                Some(Zeroizing::new(secret.to_bytes().to_vec()))
            }

            pub(super) fn sign(scalar: &[u8], digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
                let signing_key = SigningKey::from_slice(scalar)
                    .map_err(|_| CryptoError::MalformedKeyEncoding { what: "ECDSA private key" })?;
                let signature: Signature = signing_key
                    .sign_prehash(&prehash(digest, $field_size))
                    .map_err(|e| CryptoError::Internal(format!("{} signing failed: {e}", $name)))?;

                Ok(signature.to_bytes().to_vec())
            }

            /// `None` if `der` is not a key on this curve.
            pub(super) fn verify(
                der: &[u8],
                digest: &[u8],
                signature: &[u8],
            ) -> Result<Option<bool>, CryptoError> {
                let Ok(public_key) = PublicKey::from_public_key_der(der) else {
                    return Ok(None);
                };
                let verifying_key = VerifyingKey::from_sec1_bytes(&public_key.to_sec1_bytes())
                    .map_err(|_| CryptoError::MalformedKeyEncoding { what: "ECDSA public key" })?;
                let signature = Signature::from_slice(signature).map_err(|_| {
                    CryptoError::invalid(format!("signature is not a valid {} ECDSA encoding", $name))
                })?;

                Ok(Some(
                    verifying_key
                        .verify_prehash(&prehash(digest, $field_size), &signature)
                        .is_ok(),
                ))
            }
        }
    };
}

nist_curve!(nist_p256, p256, 32, "P-256");
nist_curve!(nist_p384, p384, 48, "P-384");
nist_curve!(nist_p521, p521, 66, "P-521");

#[cfg(test)]
mod tests {
    use rand_chacha::{ChaCha20Rng, rand_core::SeedableRng};

    use super::*;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn prehash_pads_only_when_needed() {
        let digest = [0xAA; 32];

        assert_eq!(prehash(&digest, 32), digest.to_vec());
        assert_eq!(prehash(&digest, 48), digest.to_vec());

        let padded = prehash(&digest, 66);
        assert_eq!(padded.len(), 66);
        assert!(padded[..34].iter().all(|&b| b == 0));
        assert_eq!(&padded[34..], &digest);
    }

    #[test]
    fn dsa_size_validation() {
        let mut rng = rng();

        for bits in [512, 1023, 3073, 4096] {
            assert!(matches!(
                generate_dsa_key_pair(bits, &mut rng),
                Err(CryptoError::InvalidParameter(msg)) if msg.contains("between")
            ));
        }
        assert!(matches!(
            generate_dsa_key_pair(1536, &mut rng),
            Err(CryptoError::InvalidParameter(msg)) if msg.contains("one of")
        ));
    }

    #[test]
    fn ecdsa_sign_verify_all_curves() {
        let mut rng = rng();

        for curve in [Curve::P256, Curve::P384, Curve::P521] {
            let pair = generate_ecdsa_key_pair(curve, &mut rng).unwrap();
            assert_eq!(pair.algorithm(), KeyAlgorithm::Ecdsa { curve });

            let signed = sign(b"document", pair.private_key(), SignatureAlgorithm::Ecdsa).unwrap();
            assert_eq!(signed.hash_algorithm, "SHA-256");
            assert!(verify(b"document", &signed.signature, pair.public_key()).unwrap(), "{curve}");
            assert!(!verify(b"documentx", &signed.signature, pair.public_key()).unwrap(), "{curve}");
        }
    }

    #[test]
    fn ecdsa_signing_is_deterministic() {
        let pair = generate_ecdsa_key_pair(Curve::P256, &mut rng()).unwrap();

        let a = sign(b"same", pair.private_key(), SignatureAlgorithm::Ecdsa).unwrap();
        let b = sign(b"same", pair.private_key(), SignatureAlgorithm::Ecdsa).unwrap();
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn signature_from_other_key_does_not_verify() {
        let mut rng = rng();
        let alice = generate_ecdsa_key_pair(Curve::P384, &mut rng).unwrap();
        let mallory = generate_ecdsa_key_pair(Curve::P384, &mut rng).unwrap();

        let signed = sign(b"pay bob", mallory.private_key(), SignatureAlgorithm::Ecdsa).unwrap();
        assert!(!verify(b"pay bob", &signed.signature, alice.public_key()).unwrap());
    }

    #[test]
    fn algorithm_mismatch_is_rejected() {
        let pair = generate_ecdsa_key_pair(Curve::P256, &mut rng()).unwrap();

        let err = sign(b"m", pair.private_key(), SignatureAlgorithm::Dsa).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidParameter(msg) if msg.contains("ECDSA")));
    }

    #[test]
    fn malformed_inputs_raise() {
        let pair = generate_ecdsa_key_pair(Curve::P256, &mut rng()).unwrap();

        assert!(matches!(
            verify(b"m", &[0u8; 64], b"junk"),
            Err(CryptoError::MalformedKeyEncoding { .. })
        ));
        assert!(matches!(
            verify(b"m", &[1, 2, 3], pair.public_key()),
            Err(CryptoError::InvalidParameter(_))
        ));
        assert!(matches!(
            sign(b"m", b"junk", SignatureAlgorithm::Ecdsa),
            Err(CryptoError::MalformedKeyEncoding { .. })
        ));
    }

    #[test]
    fn dsa_1024_sign_verify() {
        let pair = generate_dsa_key_pair(1024, &mut rng()).unwrap();
        assert_eq!(pair.algorithm(), KeyAlgorithm::Dsa { bits: 1024 });

        let signed = sign(b"contract", pair.private_key(), SignatureAlgorithm::Dsa).unwrap();
        assert!(verify(b"contract", &signed.signature, pair.public_key()).unwrap());
        assert!(!verify(b"contractx", &signed.signature, pair.public_key()).unwrap());
    }
}
