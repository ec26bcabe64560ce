//! Symmetric encryption: AES-256-CBC and ChaCha20-Poly1305.
//!
//! IVs and nonces are always drawn from the caller's CSPRNG inside the
//! encrypt functions. There is no way to pass one in for encryption, so a
//! nonce can only repeat if the RNG does.
//!
//! # Failure semantics
//!
//! - AES-CBC has no integrity check. Bad padding, a wrong key and a wrong IV
//!   all collapse into [`CryptoError::DecryptionFailed`].
//! - ChaCha20-Poly1305 verifies the tag before releasing plaintext. A
//!   mismatch is [`CryptoError::AuthenticationFailed`]: treat the message as
//!   forged and discard it.

use std::fmt;

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use chacha20poly1305::{
    ChaCha20Poly1305, Nonce, Tag,
    aead::{AeadInPlace, KeyInit},
};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Symmetric key size (256 bits)
pub const KEY_SIZE: usize = 32;

/// AES-CBC IV size
pub const AES_IV_SIZE: usize = 16;

/// ChaCha20-Poly1305 nonce size
pub const CHACHA_NONCE_SIZE: usize = 12;

/// Poly1305 tag size
pub const TAG_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// A 256-bit symmetric key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Generate a fresh key from a CSPRNG.
    pub fn generate(rng: &mut impl CryptoRngCore) -> Self {
        let mut key = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut key);
        Self(key)
    }

    /// Wrap caller-supplied key bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidKeySize`: `bytes` is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeySize { expected: KEY_SIZE, actual: bytes.len() })?;
        Ok(Self(key))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Output of an AES-256-CBC encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AesCbcEnvelope {
    /// Random per-message IV
    pub iv: [u8; AES_IV_SIZE],
    /// PKCS#7-padded ciphertext (multiple of 16 bytes)
    pub ciphertext: Vec<u8>,
}

/// Output of a ChaCha20-Poly1305 encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AeadEnvelope {
    /// Random per-message nonce
    pub nonce: [u8; CHACHA_NONCE_SIZE],
    /// Ciphertext, same length as the plaintext
    pub ciphertext: Vec<u8>,
    /// Detached Poly1305 tag over the ciphertext
    pub tag: [u8; TAG_SIZE],
}

/// Encrypt with AES-256-CBC and PKCS#7 padding under a fresh random IV.
pub fn encrypt_aes_cbc(
    plaintext: &[u8],
    key: &SymmetricKey,
    rng: &mut impl CryptoRngCore,
) -> AesCbcEnvelope {
    let mut iv = [0u8; AES_IV_SIZE];
    rng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    AesCbcEnvelope { iv, ciphertext }
}

/// Decrypt an AES-256-CBC envelope.
///
/// # Errors
///
/// - `DecryptionFailed`: padding is invalid, ciphertext is not block
///   aligned, or the key/IV do not match. The cause is not reported.
pub fn decrypt_aes_cbc(envelope: &AesCbcEnvelope, key: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
    Aes256CbcDec::new(key.as_bytes().into(), (&envelope.iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Encrypt with ChaCha20-Poly1305 under a fresh random nonce.
///
/// No associated data is bound. The tag is returned detached.
pub fn encrypt_chacha20(
    plaintext: &[u8],
    key: &SymmetricKey,
    rng: &mut impl CryptoRngCore,
) -> AeadEnvelope {
    let mut nonce = [0u8; CHACHA_NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    let mut buffer = plaintext.to_vec();

    let Ok(tag) = cipher.encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
    else {
        unreachable!("ChaCha20-Poly1305 encryption cannot fail below the 256 GiB length limit");
    };

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    AeadEnvelope { nonce, ciphertext: buffer, tag: tag_bytes }
}

/// Decrypt a ChaCha20-Poly1305 envelope.
///
/// The tag is checked before any plaintext is returned.
///
/// # Errors
///
/// - `AuthenticationFailed`: tag mismatch (tampered data, wrong key or wrong
///   nonce)
pub fn decrypt_chacha20(envelope: &AeadEnvelope, key: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    let mut buffer = envelope.ciphertext.clone();

    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&envelope.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&envelope.tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(buffer)
}
