//! Fuzz target for the JSON-lines request handler
//!
//! # Strategy
//!
//! - Arbitrary text lines (invalid UTF-8 is dropped by `from_utf8`)
//! - Structured requests with arbitrary field values for cheap operations
//!
//! # Invariants
//!
//! - NEVER panic on a request line
//! - Every line yields exactly one response
//! - A response carries `data` xor `error`

#![no_main]

use arbitrary::Arbitrary;
use cipherkit_server::{Server, ServerRuntimeConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Line {
    Raw(Vec<u8>),
    Symmetric { op: SymmetricOp, text: String, key: String, iv: String, tag: String },
    Digest { text: String },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum SymmetricOp {
    EncryptAes,
    DecryptAes,
    EncryptChacha20,
    DecryptChacha20,
}

impl SymmetricOp {
    fn name(self) -> &'static str {
        match self {
            Self::EncryptAes => "encryptAes",
            Self::DecryptAes => "decryptAes",
            Self::EncryptChacha20 => "encryptChacha20",
            Self::DecryptChacha20 => "decryptChacha20",
        }
    }
}

// Debug quoting is not always valid JSON, which also exercises the parse
// failure path
fn quote(text: &str) -> String {
    format!("{text:?}")
}

fuzz_target!(|line: Line| {
    let Ok(server) = Server::new(ServerRuntimeConfig::default()) else {
        return;
    };

    let text = match line {
        Line::Raw(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => return,
        },
        Line::Symmetric { op, text, key, iv, tag } => format!(
            r#"{{"op":"{}","text":{},"ciphertext":{},"key":{},"iv":{},"nonce":{},"tag":{}}}"#,
            op.name(),
            quote(&text),
            quote(&text),
            quote(&key),
            quote(&iv),
            quote(&iv),
            quote(&tag),
        ),
        Line::Digest { text } => format!(r#"{{"op":"sha256","text":{}}}"#, quote(&text)),
    };

    let response = server.handle_line(&text);
    assert_eq!(response.ok, response.error.is_none());
    assert_eq!(response.ok, response.data.is_some());
});
