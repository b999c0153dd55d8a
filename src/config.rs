//! Proxy configuration.
//!
//! [`ProxyConfig`] holds the listen address, CORS settings and the
//! [`UpstreamConfig`] endpoints. [`ProxyConfig::from_env`] resolves them from
//! `ANGEL_*` environment variables, falling back to the broker's production
//! URLs.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::constants::{
    API_BASE_URL, DEFAULT_ALLOWED_HEADERS, DEFAULT_ALLOWED_ORIGIN, DEFAULT_BIND_ADDR,
    DEFAULT_UPSTREAM_TIMEOUT_SECS, GET_LTP_PATH, LOGIN_BY_MPIN_PATH,
};
use crate::error::{ProxyError, Result};

/// Where and how the proxy reaches the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub login_url: Url,
    pub ltp_url: Url,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Both endpoints under `base_url`, with the default timeout.
    ///
    /// Useful for pointing the proxy at a sandbox or mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            login_url: Url::parse(&format!("{base}{LOGIN_BY_MPIN_PATH}"))?,
            ltp_url: Url::parse(&format!("{base}{GET_LTP_PATH}"))?,
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        })
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            login_url: Url::parse(&format!("{API_BASE_URL}{LOGIN_BY_MPIN_PATH}"))
                .unwrap_or_else(|_| unreachable!("constant URL parses")),
            ltp_url: Url::parse(&format!("{API_BASE_URL}{GET_LTP_PATH}"))
                .unwrap_or_else(|_| unreachable!("constant URL parses")),
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

/// Configuration for the proxy server.
///
/// Resolved from environment variables:
/// - `ANGEL_PROXY_ADDR`: listen address (default: `127.0.0.1:8787`)
/// - `ANGEL_PROXY_ALLOWED_ORIGIN`: `Access-Control-Allow-Origin` value (default: `*`)
/// - `ANGEL_PROXY_ALLOWED_HEADERS`: comma-separated request-header allow-list
///   (default: `authorization, x-client-info, apikey, content-type`)
/// - `ANGEL_API_BASE_URL`: broker base URL (default: `https://apiconnect.angelone.in`)
/// - `ANGEL_LOGIN_URL` / `ANGEL_LTP_URL`: full endpoint overrides
/// - `ANGEL_UPSTREAM_TIMEOUT_SECS`: per-call upstream timeout (default: 30)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
    pub allowed_headers: Vec<String>,
    pub upstream: UpstreamConfig,
}

impl ProxyConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// Unparseable numbers fall back to their defaults; unparseable
    /// addresses and URLs are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("ANGEL_PROXY_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|e| ProxyError::InvalidArgument(format!("ANGEL_PROXY_ADDR: {e}")))?;

        let allowed_origin = lookup("ANGEL_PROXY_ALLOWED_ORIGIN")
            .map(|o| o.trim().to_owned())
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_owned());

        let allowed_headers = match lookup("ANGEL_PROXY_ALLOWED_HEADERS") {
            Some(list) => list
                .split(',')
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_HEADERS.iter().map(|h| (*h).to_owned()).collect(),
        };

        let base = lookup("ANGEL_API_BASE_URL").unwrap_or_else(|| API_BASE_URL.to_owned());
        let mut upstream = UpstreamConfig::with_base_url(&base)?;
        if let Some(url) = lookup("ANGEL_LOGIN_URL") {
            upstream.login_url = Url::parse(&url)?;
        }
        if let Some(url) = lookup("ANGEL_LTP_URL") {
            upstream.ltp_url = Url::parse(&url)?;
        }
        upstream.timeout = Duration::from_secs(
            lookup("ANGEL_UPSTREAM_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        );

        Ok(Self {
            bind_addr,
            allowed_origin,
            allowed_headers,
            upstream,
        })
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_owned(),
            allowed_headers: DEFAULT_ALLOWED_HEADERS.iter().map(|h| (*h).to_owned()).collect(),
            upstream: UpstreamConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ProxyConfig> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ProxyConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_when_no_env_vars() {
        let config = config(&[]).unwrap();

        assert_eq!(config, ProxyConfig::default());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8787");
        assert_eq!(config.allowed_origin, "*");
        assert_eq!(
            config.allowed_headers,
            ["authorization", "x-client-info", "apikey", "content-type"]
        );
        assert_eq!(
            config.upstream.login_url.as_str(),
            "https://apiconnect.angelone.in/rest/auth/angelbroking/user/v1/loginByMpin"
        );
        assert_eq!(
            config.upstream.ltp_url.as_str(),
            "https://apiconnect.angelone.in/rest/secure/angelbroking/order/v1/getLTP"
        );
        assert_eq!(config.upstream.timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_all_env_vars() {
        let config = config(&[
            ("ANGEL_PROXY_ADDR", "0.0.0.0:9000"),
            ("ANGEL_PROXY_ALLOWED_ORIGIN", "https://app.example.com"),
            ("ANGEL_PROXY_ALLOWED_HEADERS", "Content-Type, X-Trace ,"),
            ("ANGEL_API_BASE_URL", "http://127.0.0.1:4000/"),
            ("ANGEL_LTP_URL", "http://quotes.local/ltp"),
            ("ANGEL_UPSTREAM_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.allowed_origin, "https://app.example.com");
        assert_eq!(config.allowed_headers, ["content-type", "x-trace"]);
        assert_eq!(
            config.upstream.login_url.as_str(),
            "http://127.0.0.1:4000/rest/auth/angelbroking/user/v1/loginByMpin"
        );
        assert_eq!(config.upstream.ltp_url.as_str(), "http://quotes.local/ltp");
        assert_eq!(config.upstream.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        for bad in ["soon", "0", "-3"] {
            let config = config(&[("ANGEL_UPSTREAM_TIMEOUT_SECS", bad)]).unwrap();
            assert_eq!(config.upstream.timeout, Duration::from_secs(30));
        }
    }

    #[test]
    fn invalid_addr_is_an_error() {
        let err = config(&[("ANGEL_PROXY_ADDR", "not-an-addr")]).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidArgument(ref m) if m.contains("ANGEL_PROXY_ADDR")));
    }

    #[test]
    fn invalid_url_is_an_error() {
        let err = config(&[("ANGEL_LOGIN_URL", "::nope")]).unwrap_err();
        assert!(matches!(err, ProxyError::Url(_)));
    }
}
