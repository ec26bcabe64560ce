//! Diffie-Hellman session store.
//!
//! Holds the initiator's half of a key exchange between `init` and
//! `complete`. A session is consumed (removed) by the first `take`, so a
//! replayed `complete` finds nothing. Sessions expire after a TTL and are
//! swept on every access, oldest first. Capacity is bounded; inserting past
//! it evicts the oldest live session.
//!
//! Insertion order is creation order because the clock is monotonic, so the
//! front of the queue is always the oldest candidate for expiry.

#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]
#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use cipherkit_crypto::{CryptoError, DhParameters};
use zeroize::Zeroizing;

use crate::config::ServiceConfig;

/// Initiator state for one key exchange.
///
/// The private exponent is zeroized when the session is dropped, whether it
/// was completed, expired or evicted.
pub struct DhSession<I> {
    /// Group the exchange runs in
    pub params: DhParameters,
    /// Initiator's ephemeral private exponent
    pub private_exponent: Zeroizing<Vec<u8>>,
    /// Initiator's public value
    pub public_value: Vec<u8>,
    /// When `init` created the session
    pub created_at: I,
}

impl<I: fmt::Debug> fmt::Debug for DhSession<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhSession")
            .field("public_value_len", &self.public_value.len())
            .field("private_exponent", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Result of inserting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Session stored.
    Stored,
    /// Session stored and the oldest live session was evicted.
    Evicted {
        /// Identifier of the evicted session
        session_id: String,
    },
}

/// In-memory session store keyed by caller session identifier.
///
/// Thread-safe via `Arc<Mutex<_>>`. Clone shares the same underlying
/// storage. Every operation sweeps expired sessions under the same lock, so
/// a racing `init`/`complete` never observes a half-expired session.
pub struct DhSessionStore<I> {
    inner: Arc<Mutex<StoreInner<I>>>,
}

impl<I> Clone for DhSessionStore<I> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

struct StoreInner<I> {
    sessions: HashMap<String, DhSession<I>>,
    /// Session ids in creation order (oldest at front)
    order: VecDeque<String>,
    ttl: Duration,
    max_sessions: usize,
}

impl<I> StoreInner<I>
where
    I: Copy + Ord + std::ops::Sub<Output = Duration>,
{
    fn is_expired(&self, session: &DhSession<I>, now: I) -> bool {
        now - session.created_at >= self.ttl
    }

    /// Drop expired sessions from the front of the queue.
    fn sweep(&mut self, now: I) {
        while let Some(id) = self.order.front() {
            let expired = self.sessions.get(id).map(|session| self.is_expired(session, now));
            match expired {
                Some(false) => break,
                Some(true) => {
                    tracing::debug!(session_id = %id, "DH session expired");
                    self.sessions.remove(id);
                },
                // Already taken; stale queue entry
                None => {},
            }
            self.order.pop_front();
        }
    }

    fn evict_oldest(&mut self) -> Option<String> {
        while let Some(id) = self.order.pop_front() {
            if self.sessions.remove(&id).is_some() {
                return Some(id);
            }
        }
        None
    }
}

impl<I> DhSessionStore<I>
where
    I: Copy + Ord + std::ops::Sub<Output = Duration>,
{
    /// Create an empty store with the configured TTL and capacity.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                sessions: HashMap::new(),
                order: VecDeque::new(),
                ttl: config.session_ttl,
                max_sessions: config.max_sessions.max(1),
            })),
        }
    }

    /// Store a fresh session under `session_id`.
    ///
    /// An expired session with the same id is silently replaced.
    ///
    /// # Errors
    ///
    /// - `DuplicateSession`: a live session already uses `session_id`
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert(
        &self,
        session_id: &str,
        session: DhSession<I>,
        now: I,
    ) -> Result<InsertOutcome, CryptoError> {
        let mut inner = self.inner.lock().expect("DhSessionStore mutex poisoned");
        inner.sweep(now);

        if inner.sessions.contains_key(session_id) {
            return Err(CryptoError::DuplicateSession { session_id: session_id.to_string() });
        }

        let outcome = if inner.sessions.len() >= inner.max_sessions {
            match inner.evict_oldest() {
                Some(evicted) => {
                    tracing::info!(session_id = %evicted, "DH session store full, evicted oldest");
                    InsertOutcome::Evicted { session_id: evicted }
                },
                None => InsertOutcome::Stored,
            }
        } else {
            InsertOutcome::Stored
        };

        inner.sessions.insert(session_id.to_string(), session);
        inner.order.push_back(session_id.to_string());

        Ok(outcome)
    }

    /// Remove and return the live session for `session_id`.
    ///
    /// Returns `None` if no session exists or it has expired.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn take(&self, session_id: &str, now: I) -> Option<DhSession<I>> {
        let mut inner = self.inner.lock().expect("DhSessionStore mutex poisoned");
        inner.sweep(now);

        let session = inner.sessions.remove(session_id);
        if session.is_some() {
            inner.order.retain(|id| id != session_id);
        }
        session
    }

    /// True if a live session uses `session_id` as of `now`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn contains(&self, session_id: &str, now: I) -> bool {
        let mut inner = self.inner.lock().expect("DhSessionStore mutex poisoned");
        inner.sweep(now);
        inner.sessions.contains_key(session_id)
    }

    /// Number of live sessions as of `now`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self, now: I) -> usize {
        let mut inner = self.inner.lock().expect("DhSessionStore mutex poisoned");
        inner.sweep(now);
        inner.sessions.len()
    }

    /// True if no live sessions remain as of `now`.
    pub fn is_empty(&self, now: I) -> bool {
        self.len(now) == 0
    }

    /// Capacity limit.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn capacity(&self) -> usize {
        let inner = self.inner.lock().expect("DhSessionStore mutex poisoned");
        inner.max_sessions
    }
}
