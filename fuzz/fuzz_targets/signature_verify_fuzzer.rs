//! Fuzz target for signature verification
//!
//! # Strategy
//!
//! - Arbitrary public key, signature and message bytes
//! - Genuine P-256 signatures with corrupted signature bytes
//! - Genuine P-256 signatures checked against an altered message
//!
//! # Invariants
//!
//! - Verification NEVER panics on arbitrary input
//! - Garbage keys or signatures are rejected as malformed, never a panic
//! - A corrupted signature or message never verifies
//! - An untouched signature always verifies

#![no_main]

use arbitrary::Arbitrary;
use cipherkit_crypto::{
    asymmetric::{generate_ecdsa_key_pair, sign, verify},
    CryptoError, Curve, SignatureAlgorithm,
};
use libfuzzer_sys::fuzz_target;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

#[derive(Debug, Clone, Arbitrary)]
enum Scenario {
    Raw { message: Vec<u8>, signature: Vec<u8>, public_key: Vec<u8> },
    CorruptSignature { seed: [u8; 32], message: Vec<u8>, position: usize, mask: u8 },
    AlteredMessage { seed: [u8; 32], message: Vec<u8>, suffix: Vec<u8> },
}

fuzz_target!(|scenario: Scenario| {
    match scenario {
        Scenario::Raw { message, signature, public_key } => {
            if let Err(err) = verify(&message, &signature, &public_key) {
                assert!(matches!(
                    err,
                    CryptoError::MalformedKeyEncoding { .. } | CryptoError::InvalidParameter(_)
                ));
            }
        },
        Scenario::CorruptSignature { seed, message, position, mask } => {
            let mut rng = ChaCha20Rng::from_seed(seed);
            let pair = generate_ecdsa_key_pair(Curve::P256, &mut rng).unwrap();
            let mut signed = sign(&message, pair.private_key(), SignatureAlgorithm::Ecdsa).unwrap();

            assert!(verify(&message, &signed.signature, pair.public_key()).unwrap());

            if mask == 0 {
                return;
            }
            let position = position % signed.signature.len();
            signed.signature[position] ^= mask;

            match verify(&message, &signed.signature, pair.public_key()) {
                Ok(valid) => assert!(!valid),
                Err(err) => assert!(matches!(err, CryptoError::InvalidParameter(_))),
            }
        },
        Scenario::AlteredMessage { seed, message, suffix } => {
            if suffix.is_empty() {
                return;
            }
            let mut rng = ChaCha20Rng::from_seed(seed);
            let pair = generate_ecdsa_key_pair(Curve::P256, &mut rng).unwrap();
            let signed = sign(&message, pair.private_key(), SignatureAlgorithm::Ecdsa).unwrap();

            let mut altered = message.clone();
            altered.extend_from_slice(&suffix);
            assert!(!verify(&altered, &signed.signature, pair.public_key()).unwrap());
        },
    }
});
