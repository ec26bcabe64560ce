//! Cipherkit operation server.
//!
//! Thin JSON-lines shell over [`cipherkit_core::CryptoService`]: reads one
//! request per line, writes one response per line. No transport security
//! and no semantics of its own. Logs go to stderr so stdout carries only
//! responses.
//!
//! # Components
//!
//! - [`Server`]: request loop over any `BufRead`/`Write` pair
//! - [`Request`] / [`Response`]: the wire protocol
//! - [`ServerRuntimeConfig`]: limits plus the service configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod request;

use std::io::{BufRead, Read, Write};

use cipherkit_core::{
    CryptoError, CryptoService, Environment, Failure, ServiceConfig, SystemEnv,
};
pub use error::ServerError;
pub use request::{Request, Response};

/// Default cap on one request line
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Requests longer than this are rejected without parsing
    pub max_request_bytes: usize,
    /// Operation-layer configuration (session TTL, capacity)
    pub service: ServiceConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { max_request_bytes: DEFAULT_MAX_REQUEST_BYTES, service: ServiceConfig::default() }
    }
}

/// JSON-lines request loop.
pub struct Server<E: Environment> {
    service: CryptoService<E>,
    config: ServerRuntimeConfig,
}

impl Server<SystemEnv> {
    /// Server over the real clock and OS RNG.
    pub fn new(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        Self::with_env(SystemEnv::new(), config)
    }
}

impl<E: Environment> Server<E> {
    /// Server over a custom environment.
    pub fn with_env(env: E, config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        if config.max_request_bytes == 0 {
            return Err(ServerError::Config("max_request_bytes must be positive".to_string()));
        }
        if config.service.session_ttl.is_zero() {
            return Err(ServerError::Config("session TTL must be positive".to_string()));
        }

        let service = CryptoService::new(env, config.service.clone());
        Ok(Self { service, config })
    }

    /// The operation layer behind this server.
    pub fn service(&self) -> &CryptoService<E> {
        &self.service
    }

    /// Serve requests until `input` reaches EOF.
    ///
    /// Per-request failures become failure responses. Only I/O errors end
    /// the loop early. At most `max_request_bytes + 1` bytes of a line are
    /// buffered; the rest of an oversized line is discarded unread.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<(), ServerError> {
        tracing::info!("Cipherkit server ready");

        let limit = self.config.max_request_bytes;
        // Room for a CRLF terminator on a line exactly at the limit
        let cap = (limit as u64).saturating_add(2);
        let mut line = Vec::new();

        loop {
            line.clear();
            let read = input.by_ref().take(cap).read_until(b'\n', &mut line)?;
            if read == 0 {
                break;
            }

            let terminated = line.last() == Some(&b'\n');
            if terminated {
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
            }

            let response = if line.len() > limit {
                if !terminated {
                    discard_line(&mut input)?;
                }
                self.oversized()
            } else if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            } else {
                match std::str::from_utf8(&line) {
                    Ok(text) => self.handle_line(text),
                    Err(_) => {
                        tracing::warn!(len = line.len(), "Request is not valid UTF-8");
                        invalid_request("request is not valid UTF-8".to_string())
                    },
                }
            };

            serde_json::to_writer(&mut output, &response)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Decode, execute and answer one request line.
    pub fn handle_line(&self, line: &str) -> Response {
        if line.len() > self.config.max_request_bytes {
            return self.oversized();
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Malformed request: {}", e);
                return invalid_request(format!("malformed request: {e}"));
            },
        };

        let op = request.op();
        tracing::debug!(op, "Handling request");

        let result = request.execute(&self.service);
        if let Err(err) = &result {
            if err.kind().is_client_error() {
                tracing::warn!(op, kind = ?err.kind(), "Operation failed: {}", err);
            } else {
                tracing::error!(op, "Operation failed: {}", err);
            }
        }
        Response::from(result)
    }

    fn oversized(&self) -> Response {
        tracing::warn!(limit = self.config.max_request_bytes, "Request exceeds size limit");
        invalid_request(format!("request exceeds {} bytes", self.config.max_request_bytes))
    }
}

fn invalid_request(message: String) -> Response {
    Response::failure(Failure::from(CryptoError::InvalidParameter(message)))
}

/// Consume input up to and including the next newline, or to EOF.
fn discard_line<R: BufRead>(input: &mut R) -> std::io::Result<()> {
    loop {
        let (used, found) = {
            let available = input.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        input.consume(used);
        if found {
            return Ok(());
        }
    }
}
