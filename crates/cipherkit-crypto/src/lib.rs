//! Cipherkit Cryptographic Engines
//!
//! Cryptographic building blocks for Cipherkit. Pure functions over raw
//! bytes. Callers provide the CSPRNG, so every engine is deterministic
//! under a seeded RNG in tests.
//!
//! # Engines
//!
//! ```text
//! symmetric     AES-256-CBC, ChaCha20-Poly1305
//! asymmetric    RSA-OAEP(SHA-256), DSA and ECDSA over SHA-256
//! key_exchange  MODP Diffie-Hellman, SHA-256 key derivation
//! hybrid        encrypt-then-sign, verify-then-decrypt
//! password      Argon2id
//! digest        SHA-256
//! ```
//!
//! Keys are handled as encoded bytes: 32 raw bytes for symmetric keys, DER
//! `SubjectPublicKeyInfo` and PKCS#8 for asymmetric keys. Nothing holds a
//! parsed key between calls.
//!
//! # Security
//!
//! Confidentiality:
//! - Fresh random IV or nonce per encryption, never caller supplied
//! - RSA payloads beyond the OAEP limit are refused, not chunked
//!
//! Integrity:
//! - ChaCha20-Poly1305 tags are checked before any plaintext is released
//! - Hybrid messages are verified before the private key is used
//! - AES-CBC is unauthenticated. Its failures are reported generically.
//!
//! Secret hygiene:
//! - Symmetric keys, private keys and DH exponents zeroize on drop
//! - `Debug` output of key types redacts private material

#![forbid(unsafe_code)]

pub mod asymmetric;
pub mod codec;
pub mod digest;
pub mod error;
pub mod hybrid;
pub mod key_exchange;
pub mod password;
pub mod symmetric;

pub use asymmetric::{AsymmetricKeyPair, Curve, KeyAlgorithm, SignatureAlgorithm, SignedMessage};
pub use error::{CryptoError, ErrorKind};
pub use hybrid::SealedMessage;
pub use key_exchange::{DhKeyPair, DhParameters};
pub use symmetric::{AeadEnvelope, AesCbcEnvelope, SymmetricKey};
