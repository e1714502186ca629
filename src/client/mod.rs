//! The `client` module is the protocol side of the crate.
//!
//! It provides [`Client`], which speaks the HTTP protocol through a
//! [`Transport`](crate::transport::Transport), owns the subscription
//! registry and dispatches picked-up messages to registered callbacks.

pub mod dispatch;
pub mod message;
pub mod moustique_client;

pub use dispatch::DispatchReport;
pub use message::{Message, PickupBatch};
pub use moustique_client::{Client, Credentials, PERMANENT_REDIRECT, ServerQuery};
