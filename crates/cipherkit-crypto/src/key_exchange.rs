//! Finite-field Diffie-Hellman over MODP groups.
//!
//! Pure math: parameter validation, ephemeral key generation and shared
//! secret derivation. Session bookkeeping lives in the operation layer.
//!
//! The raw shared secret never leaves this module. It is left-padded to the
//! prime length and hashed with SHA-256 into the derived key.

use rand_core::CryptoRngCore;
use rsa::BigUint;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// RFC 3526 group 14: the 2048-bit MODP safe prime.
const MODP_2048_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

/// Generator of the RFC 3526 groups
const MODP_GENERATOR: u32 = 2;

/// Smallest prime accepted from a peer
pub const MIN_PRIME_BITS: usize = 2048;

/// Largest prime accepted from a peer. Bounds the modpow cost.
pub const MAX_PRIME_BITS: usize = 8192;

/// Derived key length (SHA-256 output)
pub const DERIVED_KEY_SIZE: usize = 32;

/// Validated group parameters `(p, g)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhParameters {
    prime: BigUint,
    generator: BigUint,
}

/// An ephemeral key pair. The private exponent is zeroized on drop.
pub struct DhKeyPair {
    private_exponent: Zeroizing<Vec<u8>>,
    public_value: Vec<u8>,
}

impl DhKeyPair {
    /// Big-endian private exponent.
    pub fn private_exponent(&self) -> &[u8] {
        &self.private_exponent
    }

    /// Big-endian public value `g^x mod p`.
    pub fn public_value(&self) -> &[u8] {
        &self.public_value
    }

    /// Split into `(private_exponent, public_value)`.
    pub fn into_parts(self) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
        (self.private_exponent, self.public_value)
    }
}

impl DhParameters {
    /// The RFC 3526 2048-bit MODP group with generator 2.
    pub fn modp_2048() -> Self {
        let Some(prime) = BigUint::parse_bytes(MODP_2048_PRIME.as_bytes(), 16) else {
            unreachable!("MODP_2048_PRIME is a valid hex constant");
        };
        Self { prime, generator: BigUint::from(MODP_GENERATOR) }
    }

    /// Parameters supplied by a peer, as big-endian bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter`: prime is even or outside 2048..=8192 bits, or
    ///   the generator is outside `[2, p-2]`
    pub fn from_bytes(prime: &[u8], generator: &[u8]) -> Result<Self, CryptoError> {
        let prime = BigUint::from_bytes_be(prime);
        let bits = prime.bits();
        if !(MIN_PRIME_BITS..=MAX_PRIME_BITS).contains(&bits) {
            return Err(CryptoError::invalid(format!(
                "DH prime must be between {MIN_PRIME_BITS} and {MAX_PRIME_BITS} bits, got {bits}"
            )));
        }
        if !is_odd(&prime) {
            return Err(CryptoError::invalid("DH prime must be odd"));
        }

        let generator = BigUint::from_bytes_be(generator);
        if !in_open_range(&generator, &prime) {
            return Err(CryptoError::invalid("DH generator must lie in [2, p-2]"));
        }

        Ok(Self { prime, generator })
    }

    /// Big-endian prime.
    pub fn prime_bytes(&self) -> Vec<u8> {
        self.prime.to_bytes_be()
    }

    /// Big-endian generator.
    pub fn generator_bytes(&self) -> Vec<u8> {
        self.generator.to_bytes_be()
    }

    fn prime_len(&self) -> usize {
        self.prime.bits().div_ceil(8)
    }

    /// Generate an ephemeral key pair: `x` uniform-ish in `[2, p-2]`,
    /// `y = g^x mod p`.
    pub fn generate_key_pair(&self, rng: &mut impl CryptoRngCore) -> DhKeyPair {
        // 64 extra bits keep the modular reduction bias negligible
        let mut seed = Zeroizing::new(vec![0u8; self.prime_len() + 8]);
        rng.fill_bytes(&mut seed);

        let two = BigUint::from(2u32);
        let range = &self.prime - BigUint::from(3u32);
        let exponent = (BigUint::from_bytes_be(&seed) % &range) + &two;

        let public_value = self.generator.modpow(&exponent, &self.prime);

        DhKeyPair {
            private_exponent: Zeroizing::new(exponent.to_bytes_be()),
            public_value: public_value.to_bytes_be(),
        }
    }

    /// Compute `SHA-256(pad(peer^x mod p))`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter`: peer public value outside `[2, p-2]`, which
    ///   would force the shared secret into a trivial subgroup
    pub fn derive_key(
        &self,
        private_exponent: &[u8],
        peer_public: &[u8],
    ) -> Result<Zeroizing<[u8; DERIVED_KEY_SIZE]>, CryptoError> {
        let peer = BigUint::from_bytes_be(peer_public);
        if !in_open_range(&peer, &self.prime) {
            return Err(CryptoError::invalid("peer public key must lie in [2, p-2]"));
        }

        let exponent = BigUint::from_bytes_be(private_exponent);
        let shared = peer.modpow(&exponent, &self.prime);

        let shared_bytes = Zeroizing::new(shared.to_bytes_be());
        let mut padded = Zeroizing::new(vec![0u8; self.prime_len()]);
        let offset = padded.len() - shared_bytes.len();
        padded[offset..].copy_from_slice(&shared_bytes);

        let mut key = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
        key.copy_from_slice(&Sha256::digest(padded.as_slice()));
        Ok(key)
    }
}

fn is_odd(value: &BigUint) -> bool {
    value.to_bytes_be().last().is_some_and(|b| b & 1 == 1)
}

/// `2 <= value <= p - 2`
fn in_open_range(value: &BigUint, prime: &BigUint) -> bool {
    let two = BigUint::from(2u32);
    let upper = prime - &two;
    *value >= two && *value <= upper
}
