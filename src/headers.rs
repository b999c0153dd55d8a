//! Broker-mandated request headers.
//!
//! Every upstream call carries the same fixed set of declarations and
//! placeholder network-identity fields, plus the caller's API key and, for
//! authenticated endpoints, a bearer token. [`BrokerHeaders::new`] is a pure
//! function of those two inputs; turning the set into a
//! [`reqwest::header::HeaderMap`] is a separate, fallible step because a
//! caller-supplied value may contain bytes HTTP does not allow.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::constants::broker_headers::*;
use crate::error::{ProxyError, Result};

/// Ordered list of header name/value pairs for one upstream call.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerHeaders {
    entries: Vec<(&'static str, String)>,
}

impl BrokerHeaders {
    /// Build the header set for a call made with `api_key`, optionally
    /// authenticated with `jwt_token`.
    pub fn new(api_key: &str, jwt_token: Option<&str>) -> Self {
        let mut entries = vec![
            ("Content-Type", "application/json".to_owned()),
            ("Accept", "application/json".to_owned()),
            ("User-Agent", USER_AGENT.to_owned()),
            ("Origin", ORIGIN.to_owned()),
            ("Referer", REFERER.to_owned()),
            ("X-UserType", USER_TYPE.to_owned()),
            ("X-SourceID", SOURCE_ID.to_owned()),
            ("X-ClientLocalIP", CLIENT_IP.to_owned()),
            ("X-ClientPublicIP", CLIENT_IP.to_owned()),
            ("X-MACAddress", MAC_ADDRESS.to_owned()),
            ("X-PrivateKey", api_key.to_owned()),
        ];
        if let Some(jwt) = jwt_token {
            entries.push(("Authorization", format!("Bearer {jwt}")));
        }
        Self { entries }
    }

    /// Look up a header value by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(n, v)| (*n, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into a `HeaderMap`, failing if a caller-supplied value is not
    /// a valid header value.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let value = HeaderValue::from_str(value).map_err(|_| {
                ProxyError::InvalidArgument(format!("{name} contains invalid characters"))
            })?;
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProxyError::Internal(format!("bad header name {name}: {e}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl std::fmt::Debug for BrokerHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.entries {
            let shown = match *name {
                "X-PrivateKey" | "Authorization" => "<redacted>",
                _ => value.as_str(),
            };
            map.entry(name, &shown);
        }
        map.finish()
    }
}
