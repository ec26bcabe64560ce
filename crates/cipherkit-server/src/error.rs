//! Server error types.

use thiserror::Error;

/// Errors that stop the request loop.
///
/// Per-request failures never surface here. They are reported to the
/// caller as a failure response and the loop continues.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reading requests or writing responses failed.
    ///
    /// Fatal: the peer on the other end of stdio is gone.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be serialized.
    ///
    /// Should never happen. Indicates a bug.
    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid startup configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
