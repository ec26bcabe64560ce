//! Service configuration.

use std::time::Duration;

/// Default lifetime of an uncompleted key-exchange session
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(300);

/// Default cap on live key-exchange sessions
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Operation-layer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// How long an `init`ed session waits for its `complete`
    pub session_ttl: Duration,
    /// Live sessions kept before the oldest is evicted
    pub max_sessions: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { session_ttl: DEFAULT_SESSION_TTL, max_sessions: DEFAULT_MAX_SESSIONS }
    }
}
