//! Operation layer.
//!
//! [`CryptoService`] is the one canonical entry point per primitive. It
//! decodes Base64 inputs, runs the engine from `cipherkit-crypto` and
//! re-encodes the result. The only state it owns is the Diffie-Hellman
//! session store.
//!
//! Key material, plaintext and passwords never reach the logs. Session ids
//! do.

use cipherkit_crypto::{
    AsymmetricKeyPair, CryptoError, Curve, DhParameters, KeyAlgorithm, SignatureAlgorithm,
    SymmetricKey, asymmetric, codec, digest, hybrid, password,
    symmetric::{
        self, AES_IV_SIZE, AeadEnvelope, AesCbcEnvelope, CHACHA_NONCE_SIZE, TAG_SIZE,
    },
};
use zeroize::Zeroizing;

use crate::{
    api::{
        AesDecryptRequest, AesEncryptResponse, ChaChaDecryptRequest, ChaChaEncryptResponse,
        CiphertextResponse, CurveRequest, DhCompleteRequest, DhCompleteResponse, DhInitRequest,
        DhInitResponse, DigestRequest, HashPasswordRequest, HashResponse, HybridDecryptRequest,
        HybridEncryptRequest, HybridEncryptResponse, KeyPairResponse, KeySizeRequest,
        RsaDecryptRequest, RsaEncryptRequest, SignRequest, SignatureResponse,
        SymmetricEncryptRequest, SymmetricKeyResponse, TextResponse, VerifyPasswordRequest,
        VerifyRequest, VerifyResponse,
    },
    config::ServiceConfig,
    env::{EnvRng, Environment},
    sessions::{DhSession, DhSessionStore},
};

/// The Cipherkit operation layer.
///
/// Cheap to clone: clones share the session store.
#[derive(Clone)]
pub struct CryptoService<E: Environment> {
    env: E,
    config: ServiceConfig,
    sessions: DhSessionStore<E::Instant>,
    group: DhParameters,
}

impl<E: Environment> CryptoService<E> {
    /// Create a service over `env`.
    pub fn new(env: E, config: ServiceConfig) -> Self {
        let sessions = DhSessionStore::new(&config);
        Self { env, config, sessions, group: DhParameters::modp_2048() }
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The key-exchange session store.
    pub fn sessions(&self) -> &DhSessionStore<E::Instant> {
        &self.sessions
    }

    fn rng(&self) -> EnvRng<'_, E> {
        EnvRng::new(&self.env)
    }

    /// Generate a random 256-bit symmetric key.
    pub fn generate_symmetric_key(&self) -> SymmetricKeyResponse {
        let key = SymmetricKey::generate(&mut self.rng());
        SymmetricKeyResponse { key: codec::encode(key.as_bytes()) }
    }

    /// AES-256-CBC encrypt under a fresh IV.
    pub fn encrypt_aes(
        &self,
        request: &SymmetricEncryptRequest,
    ) -> Result<AesEncryptResponse, CryptoError> {
        let key = decode_key(&request.key)?;
        let envelope = symmetric::encrypt_aes_cbc(request.text.as_bytes(), &key, &mut self.rng());

        Ok(AesEncryptResponse {
            ciphertext: codec::encode(&envelope.ciphertext),
            iv: codec::encode(&envelope.iv),
        })
    }

    /// AES-256-CBC decrypt.
    ///
    /// Bad padding, a wrong key or IV and non-UTF-8 output all surface as
    /// one generic `DecryptionFailed`.
    pub fn decrypt_aes(&self, request: &AesDecryptRequest) -> Result<TextResponse, CryptoError> {
        let key = decode_key(&request.key)?;
        let envelope = AesCbcEnvelope {
            iv: codec::decode_exact::<AES_IV_SIZE>("iv", &request.iv)?,
            ciphertext: codec::decode("ciphertext", &request.ciphertext)?,
        };

        let plaintext = symmetric::decrypt_aes_cbc(&envelope, &key)?;
        Ok(TextResponse { text: utf8(plaintext)? })
    }

    /// ChaCha20-Poly1305 encrypt under a fresh nonce.
    pub fn encrypt_chacha20(
        &self,
        request: &SymmetricEncryptRequest,
    ) -> Result<ChaChaEncryptResponse, CryptoError> {
        let key = decode_key(&request.key)?;
        let envelope = symmetric::encrypt_chacha20(request.text.as_bytes(), &key, &mut self.rng());

        Ok(ChaChaEncryptResponse {
            ciphertext: codec::encode(&envelope.ciphertext),
            nonce: codec::encode(&envelope.nonce),
            tag: codec::encode(&envelope.tag),
        })
    }

    /// ChaCha20-Poly1305 decrypt. The tag is checked first.
    pub fn decrypt_chacha20(
        &self,
        request: &ChaChaDecryptRequest,
    ) -> Result<TextResponse, CryptoError> {
        let key = decode_key(&request.key)?;
        let envelope = AeadEnvelope {
            nonce: codec::decode_exact::<CHACHA_NONCE_SIZE>("nonce", &request.nonce)?,
            ciphertext: codec::decode("ciphertext", &request.ciphertext)?,
            tag: codec::decode_exact::<TAG_SIZE>("tag", &request.tag)?,
        };

        let plaintext = symmetric::decrypt_chacha20(&envelope, &key)?;
        Ok(TextResponse { text: utf8(plaintext)? })
    }

    /// Generate an RSA key pair of `keySize` bits.
    pub fn generate_rsa_key_pair(
        &self,
        request: &KeySizeRequest,
    ) -> Result<KeyPairResponse, CryptoError> {
        let pair = asymmetric::generate_rsa_key_pair(request.key_size, &mut self.rng())?;
        tracing::debug!(bits = request.key_size, "generated RSA key pair");
        Ok(key_pair_response(&pair))
    }

    /// Generate a DSA key pair of `keySize` bits.
    pub fn generate_dsa_key_pair(
        &self,
        request: &KeySizeRequest,
    ) -> Result<KeyPairResponse, CryptoError> {
        let pair = asymmetric::generate_dsa_key_pair(request.key_size, &mut self.rng())?;
        tracing::debug!(bits = request.key_size, "generated DSA key pair");
        Ok(key_pair_response(&pair))
    }

    /// Generate an ECDSA key pair on a named curve.
    pub fn generate_ecdsa_key_pair(
        &self,
        request: &CurveRequest,
    ) -> Result<KeyPairResponse, CryptoError> {
        let curve = Curve::parse(&request.curve)?;
        let pair = asymmetric::generate_ecdsa_key_pair(curve, &mut self.rng())?;
        tracing::debug!(%curve, "generated ECDSA key pair");
        Ok(key_pair_response(&pair))
    }

    /// RSA-OAEP(SHA-256) encrypt.
    pub fn encrypt_rsa(
        &self,
        request: &RsaEncryptRequest,
    ) -> Result<CiphertextResponse, CryptoError> {
        let public_key = codec::decode("publicKey", &request.public_key)?;
        let ciphertext =
            asymmetric::encrypt_rsa(request.text.as_bytes(), &public_key, &mut self.rng())?;

        Ok(CiphertextResponse { ciphertext: codec::encode(&ciphertext) })
    }

    /// RSA-OAEP(SHA-256) decrypt.
    pub fn decrypt_rsa(&self, request: &RsaDecryptRequest) -> Result<TextResponse, CryptoError> {
        let ciphertext = codec::decode("ciphertext", &request.ciphertext)?;
        let private_key = Zeroizing::new(codec::decode("privateKey", &request.private_key)?);

        let plaintext = asymmetric::decrypt_rsa(&ciphertext, &private_key)?;
        Ok(TextResponse { text: utf8(plaintext)? })
    }

    /// Sign the SHA-256 digest of a message.
    pub fn sign(&self, request: &SignRequest) -> Result<SignatureResponse, CryptoError> {
        let algorithm = parse_algorithm(&request.algorithm)?;
        let private_key = Zeroizing::new(codec::decode("privateKey", &request.private_key)?);

        let signed = asymmetric::sign(request.message.as_bytes(), &private_key, algorithm)?;

        Ok(SignatureResponse {
            message: request.message.clone(),
            signature: codec::encode(&signed.signature),
            algorithm: signed.algorithm.as_str().to_string(),
            hash_algorithm: signed.hash_algorithm.to_string(),
        })
    }

    /// Verify a signature. `valid: false` is a normal outcome.
    pub fn verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, CryptoError> {
        let signature = codec::decode("signature", &request.signature)?;
        let public_key = codec::decode("publicKey", &request.public_key)?;

        let valid = asymmetric::verify(request.message.as_bytes(), &signature, &public_key)?;
        Ok(VerifyResponse { valid })
    }

    /// Start a key exchange as the initiator.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter`: empty session id
    /// - `DuplicateSession`: a live session already uses this id
    pub fn dh_init(&self, request: &DhInitRequest) -> Result<DhInitResponse, CryptoError> {
        let session_id = codec::require("sessionId", Some(request.session_id.as_str()))?;

        // Cheap rejection before the modpow. `insert` re-checks under the lock.
        if self.sessions.contains(session_id, self.env.now()) {
            return Err(CryptoError::DuplicateSession { session_id: session_id.to_string() });
        }

        let (private_exponent, public_value) =
            self.group.generate_key_pair(&mut self.rng()).into_parts();
        let now = self.env.now();
        let session = DhSession {
            params: self.group.clone(),
            private_exponent,
            public_value: public_value.clone(),
            created_at: now,
        };

        self.sessions.insert(session_id, session, now)?;
        tracing::debug!(%session_id, "DH session created");

        Ok(DhInitResponse {
            session_id: session_id.to_string(),
            public_key: codec::encode(&public_value),
            prime: codec::encode(&self.group.prime_bytes()),
            generator: codec::encode(&self.group.generator_bytes()),
        })
    }

    /// Finish a key exchange.
    ///
    /// With a live session for `sessionId` the stored exponent is used and
    /// the session is consumed, whatever the outcome. Otherwise, if `prime`
    /// and `generator` are supplied, this side acts as the responder: it
    /// generates its own pair under those parameters and returns its public
    /// value alongside the derived key.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound`: no live session and no parameters supplied
    /// - `InvalidParameter`: peer value or supplied parameters are weak
    pub fn dh_complete(
        &self,
        request: &DhCompleteRequest,
    ) -> Result<DhCompleteResponse, CryptoError> {
        let session_id = codec::require("sessionId", Some(request.session_id.as_str()))?;
        let peer_public = codec::decode("peerPublicKey", &request.peer_public_key)?;

        if let Some(session) = self.sessions.take(session_id, self.env.now()) {
            let key = session.params.derive_key(&session.private_exponent, &peer_public)?;
            tracing::debug!(%session_id, "DH session completed");

            return Ok(DhCompleteResponse {
                session_id: session_id.to_string(),
                derived_key: codec::encode(key.as_slice()),
                public_key: None,
            });
        }

        let (Some(prime), Some(generator)) = (&request.prime, &request.generator) else {
            return Err(CryptoError::SessionNotFound { session_id: session_id.to_string() });
        };

        let params = DhParameters::from_bytes(
            &codec::decode("prime", prime)?,
            &codec::decode("generator", generator)?,
        )?;
        let pair = params.generate_key_pair(&mut self.rng());
        let key = params.derive_key(pair.private_exponent(), &peer_public)?;
        tracing::debug!(%session_id, "DH exchange completed as responder");

        Ok(DhCompleteResponse {
            session_id: session_id.to_string(),
            derived_key: codec::encode(key.as_slice()),
            public_key: Some(codec::encode(pair.public_value())),
        })
    }

    /// Encrypt for the recipient, then sign the ciphertext.
    pub fn encrypt_and_sign(
        &self,
        request: &HybridEncryptRequest,
    ) -> Result<HybridEncryptResponse, CryptoError> {
        let algorithm = parse_algorithm(&request.algorithm)?;
        let recipient_public_key =
            codec::decode("recipientPublicKey", &request.recipient_public_key)?;
        let sender_private_key =
            Zeroizing::new(codec::decode("senderPrivateKey", &request.sender_private_key)?);

        let sealed = hybrid::encrypt_and_sign(
            request.text.as_bytes(),
            &recipient_public_key,
            &sender_private_key,
            algorithm,
            &mut self.rng(),
        )?;

        Ok(HybridEncryptResponse {
            ciphertext: codec::encode(&sealed.ciphertext),
            signature: codec::encode(&sealed.signature),
            algorithm: algorithm.as_str().to_string(),
        })
    }

    /// Verify the sender's signature, then decrypt.
    pub fn verify_and_decrypt(
        &self,
        request: &HybridDecryptRequest,
    ) -> Result<TextResponse, CryptoError> {
        let sealed = hybrid::SealedMessage {
            ciphertext: codec::decode("ciphertext", &request.ciphertext)?,
            signature: codec::decode("signature", &request.signature)?,
        };
        let sender_public_key = codec::decode("senderPublicKey", &request.sender_public_key)?;
        let recipient_private_key =
            Zeroizing::new(codec::decode("recipientPrivateKey", &request.recipient_private_key)?);

        let plaintext =
            hybrid::verify_and_decrypt(&sealed, &sender_public_key, &recipient_private_key)?;
        Ok(TextResponse { text: utf8(plaintext)? })
    }

    /// Hash a password with Argon2id.
    pub fn hash_password(&self, request: &HashPasswordRequest) -> Result<HashResponse, CryptoError> {
        let hash = password::hash_password(&request.password, &mut self.rng())?;
        Ok(HashResponse { hash })
    }

    /// Check a password against a PHC string.
    pub fn verify_password(
        &self,
        request: &VerifyPasswordRequest,
    ) -> Result<VerifyResponse, CryptoError> {
        let valid = password::verify_password(&request.password, &request.hash)?;
        Ok(VerifyResponse { valid })
    }

    /// Lowercase hex SHA-256 of the text.
    pub fn sha256(&self, request: &DigestRequest) -> HashResponse {
        HashResponse { hash: digest::sha256_hex(request.text.as_bytes()) }
    }
}

fn decode_key(text: &str) -> Result<SymmetricKey, CryptoError> {
    let bytes = Zeroizing::new(codec::decode("key", text)?);
    SymmetricKey::from_slice(&bytes)
}

fn parse_algorithm(name: &str) -> Result<SignatureAlgorithm, CryptoError> {
    SignatureAlgorithm::parse(codec::require("algorithm", Some(name))?)
}

/// Decrypted bytes that are not text are reported like any other failed
/// decryption.
fn utf8(plaintext: Vec<u8>) -> Result<String, CryptoError> {
    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        zeroize::Zeroize::zeroize(&mut bytes);
        CryptoError::DecryptionFailed
    })
}

fn key_pair_response(pair: &AsymmetricKeyPair) -> KeyPairResponse {
    let (key_size, curve) = match pair.algorithm() {
        KeyAlgorithm::Rsa { bits } | KeyAlgorithm::Dsa { bits } => (Some(bits), None),
        KeyAlgorithm::Ecdsa { curve } => (None, Some(curve.as_str().to_string())),
    };

    KeyPairResponse {
        public_key: codec::encode(pair.public_key()),
        private_key: codec::encode(pair.private_key()),
        algorithm: pair.algorithm().name().to_string(),
        key_size,
        curve,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Clone)]
    struct FixedEnv;

    impl Environment for FixedEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            Duration::ZERO
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(0x42);
        }
    }

    fn service() -> CryptoService<FixedEnv> {
        CryptoService::new(FixedEnv, ServiceConfig::default())
    }

    #[test]
    fn zero_key_hello_roundtrip() {
        let service = service();
        let key = codec::encode(&[0u8; 32]);

        let encrypted = service
            .encrypt_aes(&SymmetricEncryptRequest { text: "hello".to_string(), key: key.clone() })
            .unwrap();
        let decrypted = service
            .decrypt_aes(&AesDecryptRequest {
                ciphertext: encrypted.ciphertext,
                key,
                iv: encrypted.iv,
            })
            .unwrap();

        assert_eq!(decrypted.text, "hello");
    }

    #[test]
    fn short_key_is_invalid_key_size() {
        let err = service()
            .encrypt_chacha20(&SymmetricEncryptRequest {
                text: "x".to_string(),
                key: codec::encode(&[0u8; 16]),
            })
            .unwrap_err();

        assert_eq!(err, CryptoError::InvalidKeySize { expected: 32, actual: 16 });
    }

    #[test]
    fn short_iv_is_invalid_parameter() {
        let err = service()
            .decrypt_aes(&AesDecryptRequest {
                ciphertext: codec::encode(&[0u8; 16]),
                key: codec::encode(&[0u8; 32]),
                iv: codec::encode(&[0u8; 8]),
            })
            .unwrap_err();

        assert!(matches!(err, CryptoError::InvalidParameter(msg) if msg.contains("iv")));
    }

    #[test]
    fn non_utf8_plaintext_is_generic_failure() {
        let key = SymmetricKey::from_slice(&[9u8; 32]).unwrap();
        let envelope = symmetric::encrypt_chacha20(&[0xFF, 0xFE], &key, &mut EnvRng::new(&FixedEnv));

        let err = service()
            .decrypt_chacha20(&ChaChaDecryptRequest {
                ciphertext: codec::encode(&envelope.ciphertext),
                key: codec::encode(key.as_bytes()),
                nonce: codec::encode(&envelope.nonce),
                tag: codec::encode(&envelope.tag),
            })
            .unwrap_err();

        assert_eq!(err, CryptoError::DecryptionFailed);
    }

    #[test]
    fn sha256_of_text() {
        let response = service().sha256(&DigestRequest { text: "abc".to_string() });
        assert_eq!(
            response.hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn empty_session_id_rejected() {
        let err = service().dh_init(&DhInitRequest { session_id: "  ".to_string() }).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidParameter(_)));
    }

    #[test]
    fn unknown_session_without_parameters_is_not_found() {
        let err = service()
            .dh_complete(&DhCompleteRequest {
                session_id: "ghost".to_string(),
                peer_public_key: "Ag==".to_string(),
                prime: None,
                generator: None,
            })
            .unwrap_err();

        assert_eq!(err, CryptoError::SessionNotFound { session_id: "ghost".to_string() });
    }
}
