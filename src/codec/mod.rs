//! Wire codec.
//!
//! Every textual field exchanged with the server is base64-encoded and the
//! resulting ASCII letters are then rotated 13 places. The rotation is its
//! own inverse, so decoding just runs the two steps in reverse order.
//!
//! This is obfuscation only. It offers no confidentiality.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Errors produced when a payload is not valid output of [`encode`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes `text` into its wire form. Empty input stays empty.
pub fn encode(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    rot13(&STANDARD.encode(text.as_bytes()))
}

/// Decodes a wire payload back into text. Empty input stays empty.
pub fn decode(payload: &str) -> Result<String, CodecError> {
    if payload.is_empty() {
        return Ok(String::new());
    }
    let bytes = STANDARD.decode(rot13(payload))?;
    Ok(String::from_utf8(bytes)?)
}

/// Rotates ASCII letters by 13 positions, preserving case. Anything else,
/// digits and base64 padding included, passes through untouched.
pub fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}
