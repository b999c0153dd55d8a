//! Request and response types for the proxy and the broker endpoints it
//! forwards to.
//!
//! ## Organization
//!
//! - [`auth`]: `loginByMpin` request fields, upstream body and session tokens
//! - [`market_quote`]: `getLTP` request fields, upstream body and LTP payload
//! - [`instrument`]: popular NSE instruments for the client shell

pub mod auth;
pub mod instrument;
pub mod market_quote;
