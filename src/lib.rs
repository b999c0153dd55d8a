//! # angel-proxy
//!
//! A stateless HTTP proxy in front of the Angel One SmartAPI
//! [`loginByMpin`](https://smartapi.angelbroking.com/docs) and `getLTP`
//! endpoints. Callers send one JSON request naming an `action`; the proxy
//! validates it, attaches the broker's mandatory headers, makes exactly one
//! upstream call and answers with a single normalized envelope.
//!
//! ## Quick Start
//!
//! ```no_run
//! use angel_proxy::config::ProxyConfig;
//!
//! #[tokio::main]
//! async fn main() -> angel_proxy::error::Result<()> {
//!     angel_proxy::server::serve(ProxyConfig::from_env()?).await
//! }
//! ```
//!
//! The pipeline can also be driven without a server:
//!
//! ```no_run
//! use angel_proxy::client::AngelClient;
//!
//! # async fn run() -> angel_proxy::error::Result<()> {
//! let client = AngelClient::new()?;
//! let resp = angel_proxy::proxy::handle(&client, br#"{"action":"getLTP"}"#).await;
//! assert_eq!(resp.http_status().as_u16(), 400);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod headers;
pub mod outcome;
pub mod proxy;
pub mod server;
pub mod shell;
pub mod types;
pub mod validate;

/// Re-export the upstream client at crate root for convenience.
pub use client::AngelClient;
/// Re-export the response envelope.
pub use envelope::ProxyResponse;
/// Re-export the error type and Result alias.
pub use error::{ProxyError, Result};
