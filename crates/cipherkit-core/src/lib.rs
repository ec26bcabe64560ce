//! Cipherkit operation layer.
//!
//! Wraps the pure engines of [`cipherkit_crypto`] in one operation per
//! primitive, with Base64 at the boundary and the key-exchange session
//! lifecycle managed here.
//!
//! # Components
//!
//! - [`CryptoService`]: canonical operation contract
//! - [`DhSessionStore`]: bounded, expiring store of initiator DH state
//! - [`Environment`]: clock and randomness, swappable for tests
//! - [`SystemEnv`]: production environment (real time, OS RNG)
//!
//! # Key exchange
//!
//! ```text
//! initiator                         responder
//!   dh_init(id) ──── p, g, A ──────►
//!                                    dh_complete(id, A, p, g) -> key, B
//!   ◄──────────────── B ─────────────
//!   dh_complete(id, B) -> key
//! ```
//!
//! The initiator's session is consumed by its `dh_complete`. Replaying it
//! fails with `SessionNotFound`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod env;
pub mod service;
pub mod sessions;

pub use api::Failure;
pub use cipherkit_crypto::{CryptoError, ErrorKind};
pub use config::ServiceConfig;
pub use env::{EnvRng, Environment, SystemEnv};
pub use service::CryptoService;
pub use sessions::{DhSession, DhSessionStore, InsertOutcome};
