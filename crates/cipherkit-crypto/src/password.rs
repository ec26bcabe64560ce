//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=65536,t=3,p=2$...`). Cost
//! parameters travel inside the string, so verification keeps working if
//! the defaults below change.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::{self, SaltString},
};
use rand_core::CryptoRngCore;

use crate::error::CryptoError;

/// Memory cost in KiB (64 MiB)
pub const MEMORY_COST_KIB: u32 = 65_536;

/// Number of passes
pub const TIME_COST: u32 = 3;

/// Degree of parallelism
pub const PARALLELISM: u32 = 2;

/// Largest memory cost accepted from a stored hash (256 MiB)
pub const MAX_MEMORY_COST_KIB: u32 = 4 * MEMORY_COST_KIB;

/// Largest number of passes accepted from a stored hash
pub const MAX_TIME_COST: u32 = 4 * TIME_COST;

/// Largest parallelism accepted from a stored hash
pub const MAX_PARALLELISM: u32 = 4 * PARALLELISM;

/// Hash a password with Argon2id and a fresh 16-byte salt.
///
/// # Errors
///
/// - `InvalidParameter`: empty password
pub fn hash_password(password: &str, rng: &mut impl CryptoRngCore) -> Result<String, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::invalid("password must not be empty"));
    }

    let salt = SaltString::generate(rng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CryptoError::Internal(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Check a password against a PHC hash string.
///
/// Costs come from the hash itself, so they are bounded before any work is
/// done: a hash asking for more than [`MAX_MEMORY_COST_KIB`],
/// [`MAX_TIME_COST`] or [`MAX_PARALLELISM`] is refused.
///
/// # Errors
///
/// - `InvalidParameter`: `hash` is not a parseable Argon2id PHC string, or
///   its costs exceed the limits
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CryptoError> {
    let parsed = PasswordHash::new(hash.trim())
        .map_err(|e| CryptoError::invalid(format!("password hash is malformed: {e}")))?;
    check_costs(&parsed)?;

    // Params come from the PHC string, not from the defaults
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CryptoError::invalid(format!("password hash is unusable: {e}"))),
    }
}

fn check_costs(parsed: &PasswordHash<'_>) -> Result<(), CryptoError> {
    if parsed.algorithm != Algorithm::Argon2id.ident() {
        return Err(CryptoError::invalid(format!(
            "password hash algorithm must be argon2id, got {}",
            parsed.algorithm
        )));
    }

    let params = Params::try_from(parsed)
        .map_err(|e| CryptoError::invalid(format!("password hash parameters are invalid: {e}")))?;
    if params.m_cost() > MAX_MEMORY_COST_KIB
        || params.t_cost() > MAX_TIME_COST
        || params.p_cost() > MAX_PARALLELISM
    {
        return Err(CryptoError::invalid(format!(
            "password hash costs m={},t={},p={} exceed m={MAX_MEMORY_COST_KIB},t={MAX_TIME_COST},p={MAX_PARALLELISM}",
            params.m_cost(),
            params.t_cost(),
            params.p_cost()
        )));
    }

    Ok(())
}

fn hasher() -> Result<Argon2<'static>, CryptoError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| CryptoError::Internal(format!("invalid Argon2 parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[cfg(test)]
mod tests {
    use rand_chacha::{ChaCha20Rng, rand_core::SeedableRng};

    use super::*;

    #[test]
    fn hash_embeds_parameters() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let hash = hash_password("correct horse", &mut rng).unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=65536,t=3,p=2$"), "{hash}");
    }

    #[test]
    fn verify_accepts_right_and_rejects_wrong() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let hash = hash_password("hunter2", &mut rng).unwrap();

        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let a = hash_password("pw", &mut rng).unwrap();
        let b = hash_password("pw", &mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_password_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        assert!(matches!(hash_password("", &mut rng), Err(CryptoError::InvalidParameter(_))));
    }

    const SALT_AND_OUTPUT: &str =
        "c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    #[test]
    fn excessive_costs_refused_before_hashing() {
        for costs in ["m=4294967295,t=1,p=1", "m=65536,t=1000,p=2", "m=65536,t=3,p=64"] {
            let hash = format!("$argon2id$v=19${costs}${SALT_AND_OUTPUT}");
            assert!(
                matches!(verify_password("pw", &hash), Err(CryptoError::InvalidParameter(_))),
                "{costs}"
            );
        }
    }

    #[test]
    fn other_argon2_variants_refused() {
        let hash = format!("$argon2i$v=19$m=65536,t=3,p=2${SALT_AND_OUTPUT}");
        assert!(matches!(verify_password("pw", &hash), Err(CryptoError::InvalidParameter(_))));
    }

    #[test]
    fn in_bounds_foreign_hash_is_checked_normally() {
        let hash = format!("$argon2id$v=19$m=64,t=1,p=1${SALT_AND_OUTPUT}");
        assert!(!verify_password("pw", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_invalid_parameter() {
        assert!(matches!(
            verify_password("pw", "not a phc string"),
            Err(CryptoError::InvalidParameter(_))
        ));
    }
}
