//! Cipherkit server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve requests on stdin, responses on stdout
//! echo '{"op":"sha256","text":"abc"}' | cipherkit-server
//!
//! # Shorter key-exchange window, verbose logs on stderr
//! cipherkit-server --session-ttl-secs 60 --log-level debug
//! ```

use std::{io, time::Duration};

use cipherkit_core::ServiceConfig;
use cipherkit_server::{DEFAULT_MAX_REQUEST_BYTES, Server, ServerRuntimeConfig};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Cipherkit operation server
#[derive(Parser, Debug)]
#[command(name = "cipherkit-server")]
#[command(about = "Cryptographic operations over JSON lines on stdio")]
#[command(version)]
struct Args {
    /// Seconds an initiated key exchange waits for completion
    #[arg(long, default_value = "300")]
    session_ttl_secs: u64,

    /// Maximum live key-exchange sessions
    #[arg(long, default_value = "10000")]
    max_sessions: usize,

    /// Maximum bytes in one request line
    #[arg(long, default_value_t = DEFAULT_MAX_REQUEST_BYTES)]
    max_request_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    tracing::info!("Cipherkit server starting");
    tracing::info!(
        session_ttl_secs = args.session_ttl_secs,
        max_sessions = args.max_sessions,
        "Key-exchange session limits"
    );

    let config = ServerRuntimeConfig {
        max_request_bytes: args.max_request_bytes,
        service: ServiceConfig {
            session_ttl: Duration::from_secs(args.session_ttl_secs),
            max_sessions: args.max_sessions,
        },
    };

    let server = Server::new(config)?;
    server.run(io::stdin().lock(), io::stdout().lock())?;

    Ok(())
}
