//! Fuzz target for symmetric decryption
//!
//! # Strategy
//!
//! - Arbitrary keys, IVs, nonces, tags and ciphertexts (misaligned, empty)
//! - Genuine ChaCha20-Poly1305 envelopes with one byte corrupted
//! - Genuine AES-CBC envelopes under a different key
//!
//! # Invariants
//!
//! - Decryption NEVER panics on arbitrary input
//! - Corrupted ChaCha20 envelopes always fail authentication
//! - Untouched envelopes always round-trip
//! - AES failures are always the generic `DecryptionFailed`

#![no_main]

use arbitrary::Arbitrary;
use cipherkit_crypto::{
    symmetric::{
        decrypt_aes_cbc, decrypt_chacha20, encrypt_aes_cbc, encrypt_chacha20, AeadEnvelope,
        AesCbcEnvelope,
    },
    CryptoError, SymmetricKey,
};
use libfuzzer_sys::fuzz_target;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

#[derive(Debug, Clone, Arbitrary)]
enum Scenario {
    RawAes { key: [u8; 32], iv: [u8; 16], ciphertext: Vec<u8> },
    RawChaCha { key: [u8; 32], nonce: [u8; 12], ciphertext: Vec<u8>, tag: [u8; 16] },
    CorruptChaCha { seed: [u8; 32], plaintext: Vec<u8>, position: usize, mask: u8 },
    WrongAesKey { seed: [u8; 32], plaintext: Vec<u8>, other_key: [u8; 32] },
}

fuzz_target!(|scenario: Scenario| {
    match scenario {
        Scenario::RawAes { key, iv, ciphertext } => {
            let key = SymmetricKey::from_slice(&key).unwrap();
            let envelope = AesCbcEnvelope { iv, ciphertext };
            if let Err(err) = decrypt_aes_cbc(&envelope, &key) {
                assert_eq!(err, CryptoError::DecryptionFailed);
            }
        },
        Scenario::RawChaCha { key, nonce, ciphertext, tag } => {
            let key = SymmetricKey::from_slice(&key).unwrap();
            let envelope = AeadEnvelope { nonce, ciphertext, tag };
            if let Err(err) = decrypt_chacha20(&envelope, &key) {
                assert_eq!(err, CryptoError::AuthenticationFailed);
            }
        },
        Scenario::CorruptChaCha { seed, plaintext, position, mask } => {
            let mut rng = ChaCha20Rng::from_seed(seed);
            let key = SymmetricKey::generate(&mut rng);
            let mut envelope = encrypt_chacha20(&plaintext, &key, &mut rng);

            assert_eq!(decrypt_chacha20(&envelope, &key).unwrap(), plaintext);

            if mask == 0 {
                return;
            }
            let total = envelope.ciphertext.len() + envelope.tag.len();
            let position = position % total;
            if position < envelope.ciphertext.len() {
                envelope.ciphertext[position] ^= mask;
            } else {
                envelope.tag[position - envelope.ciphertext.len()] ^= mask;
            }

            assert_eq!(decrypt_chacha20(&envelope, &key), Err(CryptoError::AuthenticationFailed));
        },
        Scenario::WrongAesKey { seed, plaintext, other_key } => {
            let mut rng = ChaCha20Rng::from_seed(seed);
            let key = SymmetricKey::generate(&mut rng);
            let envelope = encrypt_aes_cbc(&plaintext, &key, &mut rng);

            assert_eq!(decrypt_aes_cbc(&envelope, &key).unwrap(), plaintext);

            let other = SymmetricKey::from_slice(&other_key).unwrap();
            if let Err(err) = decrypt_aes_cbc(&envelope, &other) {
                assert_eq!(err, CryptoError::DecryptionFailed);
            }
        },
    }
});
