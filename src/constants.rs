//! Constants for the Angel One SmartAPI and the proxy's defaults.
//!
//! Contains the upstream base URL and endpoint paths, the fixed header values
//! the broker expects on every call, and the proxy's default CORS and
//! diagnostic settings. These are used internally by
//! [`AngelClient`](crate::client::AngelClient) and
//! [`ProxyConfig`](crate::config::ProxyConfig), but are also exported for
//! advanced usage.

// ---------------------------------------------------------------------------
// Upstream URLs
// ---------------------------------------------------------------------------

/// Base URL for the Angel One SmartAPI REST endpoints.
pub const API_BASE_URL: &str = "https://apiconnect.angelone.in";

/// Path of the MPIN + TOTP login endpoint.
pub const LOGIN_BY_MPIN_PATH: &str = "/rest/auth/angelbroking/user/v1/loginByMpin";

/// Path of the last-traded-price endpoint.
pub const GET_LTP_PATH: &str = "/rest/secure/angelbroking/order/v1/getLTP";

// ---------------------------------------------------------------------------
// Fixed upstream headers
// ---------------------------------------------------------------------------

/// Fixed header values the broker expects on every request.
pub mod broker_headers {
    /// Browser-like user agent.
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    /// `Origin` header value.
    pub const ORIGIN: &str = "https://smartapi.angelone.in";
    /// `Referer` header value.
    pub const REFERER: &str = "https://smartapi.angelone.in/";
    /// `X-UserType` header value.
    pub const USER_TYPE: &str = "USER";
    /// `X-SourceID` header value.
    pub const SOURCE_ID: &str = "WEB";
    /// Placeholder for `X-ClientLocalIP` and `X-ClientPublicIP`.
    pub const CLIENT_IP: &str = "CLIENT_IP";
    /// Placeholder for `X-MACAddress`.
    pub const MAC_ADDRESS: &str = "MAC_ADDRESS";
}

// ---------------------------------------------------------------------------
// Proxy defaults
// ---------------------------------------------------------------------------

/// Default bind address of the proxy server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Default `Access-Control-Allow-Origin` value.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

/// Default `Access-Control-Allow-Headers` allow-list.
pub const DEFAULT_ALLOWED_HEADERS: &[&str] = &["authorization", "x-client-info", "apikey", "content-type"];

/// Largest request body the proxy reads, in bytes.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Default timeout applied to each upstream call, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Characters of a non-JSON upstream body echoed back as `rawResponse`.
pub const RAW_RESPONSE_SNIPPET_CHARS: usize = 200;

/// Characters of an upstream body written to the debug log.
pub const LOG_SNIPPET_CHARS: usize = 500;

/// Fixed key the client shell stores credentials under.
pub const CREDENTIALS_KEY: &str = "angel_one_credentials";
