//! Upstream endpoint implementations.
//!
//! Each sub-module adds an `async` method to
//! [`AngelClient`](crate::client::AngelClient) via an `impl` block. Every
//! method makes exactly one outbound call and returns its classified
//! [`UpstreamOutcome`](crate::outcome::UpstreamOutcome).
//!
//! | Module | Endpoint | Description |
//! |---|---|---|
//! | [`auth`] | `loginByMpin` | MPIN + TOTP login, returns session tokens |
//! | [`market_quote`] | `getLTP` | Last traded price of one instrument |

pub mod auth;
pub mod market_quote;

use crate::client::AngelClient;
use crate::error::Result;
use crate::outcome::UpstreamOutcome;
use crate::validate::ProxyRequest;

impl AngelClient {
    /// Forward a validated request to the endpoint its action names.
    pub async fn dispatch(&self, request: &ProxyRequest) -> Result<UpstreamOutcome> {
        match request {
            ProxyRequest::LoginByMpin(fields) => self.login_by_mpin(fields).await,
            ProxyRequest::GetLtp(fields) => self.get_ltp(fields).await,
        }
    }
}
