//! The `transport` module is the single point where the client talks HTTP.
//!
//! The protocol client only needs one capability from it: send a
//! form-encoded request to a path on the server and hand back the status
//! and body. [`Transport`] captures exactly that, so the client can be
//! driven by [`ReqwestTransport`] in production and by a recording mock in
//! tests.

pub mod reqwest_client;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
mod tests;

use futures_util::future::BoxFuture;
use thiserror::Error;

pub use reqwest_client::ReqwestTransport;

/// HTTP methods used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// A form-encoded request relative to the server's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub method: Method,
    /// Path without the leading slash, e.g. `SUBSCRIBE`.
    pub path: &'static str,
    pub fields: Vec<(String, String)>,
}

impl FormRequest {
    pub fn post(path: &'static str) -> Self {
        Self {
            method: Method::Post,
            path,
            fields: Vec::new(),
        }
    }

    pub fn put(path: &'static str) -> Self {
        Self {
            method: Method::Put,
            path,
            fields: Vec::new(),
        }
    }

    /// Appends a field whose value is already in wire form.
    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    /// Looks up the first field with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The exchange could not be completed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("invalid server address {0:?}")]
    InvalidAddress(String),
}

/// Sends form-encoded requests and returns status and body.
pub trait Transport: Send + Sync {
    fn send(&self, request: FormRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>>;
}
