#![allow(missing_docs)]
//! Market Quote types: LTP (last traded price) for a single instrument.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Proxy request fields
// ---------------------------------------------------------------------------

/// Validated fields of a `getLTP` proxy request. All values are trimmed and
/// non-empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFields {
    pub api_key: String,
    pub jwt_token: String,
    pub exchange: String,
    pub tradingsymbol: String,
    pub symboltoken: String,
}

impl fmt::Debug for QuoteFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteFields")
            .field("api_key", &"<redacted>")
            .field("jwt_token", &"<redacted>")
            .field("exchange", &self.exchange)
            .field("tradingsymbol", &self.tradingsymbol)
            .field("symboltoken", &self.symboltoken)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Upstream request body
// ---------------------------------------------------------------------------

/// Request body for the broker's `getLTP` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LtpRequest<'a> {
    pub exchange: &'a str,
    pub tradingsymbol: &'a str,
    pub symboltoken: &'a str,
}

impl<'a> From<&'a QuoteFields> for LtpRequest<'a> {
    fn from(fields: &'a QuoteFields) -> Self {
        Self {
            exchange: &fields.exchange,
            tradingsymbol: &fields.tradingsymbol,
            symboltoken: &fields.symboltoken,
        }
    }
}

// ---------------------------------------------------------------------------
// LTP response data
// ---------------------------------------------------------------------------

/// LTP payload found in the `data` of a successful quote response.
///
/// Only `ltp` is required; the broker usually echoes the instrument and
/// includes the day's OHLC as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtpData {
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub tradingsymbol: Option<String>,
    #[serde(default)]
    pub symboltoken: Option<String>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    pub ltp: f64,
}
