//! Environment abstraction for deterministic testing.
//!
//! Decouples the operation layer from system resources (time, randomness).
//! Tests drive a manual clock and a seeded RNG; production uses
//! [`SystemEnv`].

use std::time::Duration;

use rand_core::{CryptoRng, RngCore};

/// Environment providing monotonic time and cryptographic randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `random_bytes()` uses cryptographically secure entropy in production
pub trait Environment: Clone + Send + Sync + 'static {
    /// Instant type used by this environment.
    ///
    /// Production uses `std::time::Instant`. Tests can use any monotonic
    /// counter, e.g. a `Duration` since a virtual epoch.
    type Instant: Copy + Ord + Send + Sync + std::fmt::Debug + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG
    fn random_bytes(&self, buffer: &mut [u8]);
}

/// Production environment using system time and the OS RNG.
///
/// # Panics
///
/// `random_bytes` panics if the OS RNG fails. Without working entropy no
/// key, IV, nonce or salt can be generated safely, so there is nothing
/// sensible to fall back to.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot generate key material");
    }
}

/// Adapts an [`Environment`] into a `rand_core` CSPRNG for the engines.
pub struct EnvRng<'a, E: Environment> {
    env: &'a E,
}

impl<'a, E: Environment> EnvRng<'a, E> {
    /// Borrow `env` as an RNG.
    pub fn new(env: &'a E) -> Self {
        Self { env }
    }
}

impl<E: Environment> RngCore for EnvRng<'_, E> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.env.random_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.env.random_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.env.random_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.env.random_bytes(dest);
        Ok(())
    }
}

// Sound only because `Environment::random_bytes` is required to be a CSPRNG
impl<E: Environment> CryptoRng for EnvRng<'_, E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::disallowed_methods)]
    fn system_env_time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1, "Time should advance");
    }

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn env_rng_draws_from_environment() {
        #[derive(Clone)]
        struct FixedEnv;

        impl Environment for FixedEnv {
            type Instant = Duration;

            fn now(&self) -> Duration {
                Duration::ZERO
            }

            fn random_bytes(&self, buffer: &mut [u8]) {
                buffer.fill(0x5A);
            }
        }

        let env = FixedEnv;
        let mut rng = EnvRng::new(&env);

        let mut buf = [0u8; 5];
        rng.fill_bytes(&mut buf);
        assert_eq!(buf, [0x5A; 5]);
        assert_eq!(rng.next_u32(), 0x5A5A_5A5A);
        assert_eq!(rng.next_u64(), 0x5A5A_5A5A_5A5A_5A5A);
    }
}
