//! The `error` module defines the error taxonomy surfaced by the protocol
//! client.
//!
//! Lower layers keep their own narrow error types (`CodecError`,
//! `TransportError`); everything a caller sees from a `Client` operation is
//! folded into [`ClientError`].

use thiserror::Error;

use crate::codec::CodecError;
use crate::transport::TransportError;

/// A response body that could not be turned into the expected structure.
#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport could not complete the exchange.
    #[error("network failure: {0}")]
    Network(#[from] TransportError),

    /// The server answered with a status the operation does not accept.
    #[error("{operation} failed with status {status}: {body}")]
    Protocol {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The server answered successfully but the body did not decode.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] MalformedResponse),
}

impl ClientError {
    /// The HTTP status behind a protocol failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}
