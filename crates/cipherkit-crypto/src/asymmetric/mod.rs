//! Asymmetric primitives: RSA-OAEP encryption and DSA/ECDSA signatures.
//!
//! Keys travel as DER: public keys as `SubjectPublicKeyInfo`, private keys
//! as PKCS#8. Nothing here holds a parsed key across calls. Every operation
//! re-parses the DER it is given.

mod oaep;
mod signing;

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

pub use self::{
    oaep::{
        RSA_MAX_BITS, RSA_MIN_BITS, decrypt_rsa, encrypt_rsa, generate_rsa_key_pair,
        max_oaep_message_len,
    },
    signing::{
        DSA_MAX_BITS, DSA_MIN_BITS, generate_dsa_key_pair, generate_ecdsa_key_pair, sign, verify,
    },
};
use crate::error::CryptoError;

/// Hash algorithm used for OAEP and for every signature.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Named NIST curves supported for ECDSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curve {
    /// NIST P-256 (`prime256v1`)
    #[serde(rename = "P-256")]
    P256,
    /// NIST P-384 (`secp384r1`)
    #[serde(rename = "P-384")]
    P384,
    /// NIST P-521 (`secp521r1`)
    #[serde(rename = "P-521")]
    P521,
}

impl Curve {
    /// Parse a curve name. Accepts NIST and SEC/X9.62 spellings.
    ///
    /// # Errors
    ///
    /// - `UnsupportedCurve`: any other name
    pub fn parse(name: &str) -> Result<Self, CryptoError> {
        match name.trim() {
            "P-256" | "prime256v1" | "secp256r1" => Ok(Self::P256),
            "P-384" | "secp384r1" => Ok(Self::P384),
            "P-521" | "secp521r1" => Ok(Self::P521),
            other => Err(CryptoError::UnsupportedCurve(other.to_string())),
        }
    }

    /// NIST name of the curve.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature scheme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignatureAlgorithm {
    /// FIPS 186 DSA
    Dsa,
    /// ECDSA over a NIST curve
    Ecdsa,
}

impl SignatureAlgorithm {
    /// Parse `"DSA"` or `"ECDSA"` (case-insensitive).
    pub fn parse(name: &str) -> Result<Self, CryptoError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DSA" => Ok(Self::Dsa),
            "ECDSA" => Ok(Self::Ecdsa),
            other => Err(CryptoError::invalid(format!("unknown signature algorithm '{other}'"))),
        }
    }

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dsa => "DSA",
            Self::Ecdsa => "ECDSA",
        }
    }
}

/// Algorithm and size of a generated key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// RSA with the given modulus size
    Rsa {
        /// Modulus size in bits
        bits: usize,
    },
    /// DSA with the given modulus size
    Dsa {
        /// Modulus size in bits
        bits: usize,
    },
    /// ECDSA on a named curve
    Ecdsa {
        /// Curve the key lives on
        curve: Curve,
    },
}

impl KeyAlgorithm {
    /// Algorithm family name (`RSA`, `DSA`, `ECDSA`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rsa { .. } => "RSA",
            Self::Dsa { .. } => "DSA",
            Self::Ecdsa { .. } => "ECDSA",
        }
    }
}

/// A generated key pair.
///
/// The private half is zeroized on drop and redacted from `Debug`. It is
/// handed only to the caller that asked for generation.
#[derive(Clone)]
pub struct AsymmetricKeyPair {
    algorithm: KeyAlgorithm,
    public_key: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl AsymmetricKeyPair {
    pub(crate) fn new(algorithm: KeyAlgorithm, public_key: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self { algorithm, public_key, private_key: Zeroizing::new(private_key) }
    }

    /// Algorithm and size of this pair.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// DER `SubjectPublicKeyInfo`.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// DER PKCS#8 private key.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

impl fmt::Debug for AsymmetricKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsymmetricKeyPair")
            .field("algorithm", &self.algorithm)
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// A message with its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    /// The signed bytes
    pub message: Vec<u8>,
    /// Signature encoding (DER for DSA, fixed `r || s` for ECDSA)
    pub signature: Vec<u8>,
    /// Scheme that produced the signature
    pub algorithm: SignatureAlgorithm,
    /// Digest applied before signing
    pub hash_algorithm: &'static str,
}
