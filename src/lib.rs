//! # Moustique client
//!
//! `moustique_client` talks to a Moustique publish/subscribe and key-value
//! server over plain HTTP. Clients publish messages and values, register
//! callbacks for topics, and poll the server for messages buffered for them.
//!
//! ## Core Modules
//!
//! - `codec`: The reversible text transform applied to every wire field.
//! - `identity`: Derives a unique client name when none is supplied.
//! - `transport`: The HTTP seam (`Transport`) and its `reqwest` implementation.
//! - `registry`: Topic to callback mapping, including reserved system topics.
//! - `client`: The protocol client and the pickup dispatcher.
//! - `config`: Loads client settings from files and the environment.
//! - `utils`: Error types and logging setup.
//!
//! ```no_run
//! # async fn run() -> Result<(), moustique_client::ClientError> {
//! let client = moustique_client::Client::new("127.0.0.1", 33335, Some("demo"))?;
//! client
//!     .subscribe("/test/topic", |topic: &str, message: &str, from: &str| {
//!         println!("{topic}: {message} (from {from})");
//!     })
//!     .await?;
//! client.publish("/test/topic", "hello").await?;
//! client.pickup().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod identity;
pub mod registry;
pub mod transport;
pub mod utils;

pub use client::{Client, DispatchReport, Message, ServerQuery};
pub use registry::{Handler, RESUBSCRIBE_TOPIC, SystemHandler};
pub use utils::error::ClientError;
