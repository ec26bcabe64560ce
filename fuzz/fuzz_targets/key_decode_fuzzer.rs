//! Fuzz target for key and parameter decoding
//!
//! Every entry point that parses caller-supplied key material gets the same
//! arbitrary bytes.
//!
//! # Strategy
//!
//! - Random bytes as RSA SPKI/PKCS#8, DSA/EC PKCS#8 and DH parameters
//! - Random text as Base64 and as Argon2 PHC strings
//!
//! # Invariants
//!
//! - NEVER panic on malformed key material
//! - Unparseable PHC strings are `InvalidParameter`
//! - DH parameters outside the accepted range are `InvalidParameter`

#![no_main]

use arbitrary::Arbitrary;
use cipherkit_crypto::{
    asymmetric::{decrypt_rsa, encrypt_rsa, sign},
    codec,
    key_exchange::DhParameters,
    password::verify_password,
    CryptoError, SignatureAlgorithm,
};
use libfuzzer_sys::fuzz_target;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    key: Vec<u8>,
    payload: Vec<u8>,
    text: String,
    generator: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let mut rng = ChaCha20Rng::from_seed([7; 32]);

    let _ = encrypt_rsa(&input.payload, &input.key, &mut rng);
    let _ = decrypt_rsa(&input.payload, &input.key);

    for algorithm in [SignatureAlgorithm::Dsa, SignatureAlgorithm::Ecdsa] {
        let _ = sign(&input.payload, &input.key, algorithm);
    }

    // Bound the modpow cost: parameter checks run before any arithmetic
    if input.key.len() <= 1024 {
        if let Ok(params) = DhParameters::from_bytes(&input.key, &input.generator) {
            let pair = params.generate_key_pair(&mut rng);
            let _ = params.derive_key(pair.private_exponent(), &input.payload);
        }
    }

    let _ = codec::decode("fuzz", &input.text);
    if let Err(err) = verify_password("password", &input.text) {
        assert!(matches!(err, CryptoError::InvalidParameter(_)));
    }
});
