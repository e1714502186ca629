//! The `utils` module provides the error types shared by every client
//! operation and the logging setup used by the `moustique` binary.

pub mod error;
pub mod logging;
