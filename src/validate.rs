//! Request validation.
//!
//! [`ProxyRequest::parse`] turns raw request bytes into a typed, trimmed
//! field set or a [`ProxyError`] describing the first problem found. It has
//! no side effects and never touches the network, so every rejection here is
//! guaranteed to happen before any upstream call.
//!
//! Checks run in this order:
//!
//! 1. body empty or whitespace-only → [`ProxyError::EmptyBody`]
//! 2. body not a JSON object → [`ProxyError::InvalidJson`]
//! 3. no non-blank `action` string → [`ProxyError::MissingAction`]
//! 4. `action` not recognised → [`ProxyError::UnknownAction`]
//! 5. a required field absent or blank → [`ProxyError::MissingFields`]
//! 6. `mpin` / `totp` not 4 / 6 ASCII digits → [`ProxyError::InvalidFormat`]

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FormatField, ProxyError, Result};
use crate::types::auth::LoginFields;
use crate::types::market_quote::QuoteFields;

/// Wire name of the login action.
pub const ACTION_LOGIN_BY_MPIN: &str = "loginByMpin";
/// Wire name of the quote action.
pub const ACTION_GET_LTP: &str = "getLTP";

const LOGIN_REQUIRED: &str = "apiKey, clientId, mpin, and totp are all required";
const QUOTE_REQUIRED: &str =
    "apiKey, jwtToken, exchange, tradingsymbol, and symboltoken are all required";

/// The operations the proxy forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LoginByMpin,
    GetLtp,
}

impl Action {
    /// The wire name carried in the request's `action` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoginByMpin => ACTION_LOGIN_BY_MPIN,
            Self::GetLtp => ACTION_GET_LTP,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated proxy request.
///
/// Serializes to the same action-tagged JSON the proxy accepts, which is how
/// the client shell builds its requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action")]
pub enum ProxyRequest {
    #[serde(rename = "loginByMpin")]
    LoginByMpin(LoginFields),
    #[serde(rename = "getLTP")]
    GetLtp(QuoteFields),
}

impl ProxyRequest {
    /// Parse and validate a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|e| ProxyError::InvalidJson(format!("body is not UTF-8: {e}")))?;
        if text.trim().is_empty() {
            return Err(ProxyError::EmptyBody);
        }

        let value: Value =
            serde_json::from_str(text).map_err(|e| ProxyError::InvalidJson(e.to_string()))?;
        let Value::Object(obj) = value else {
            return Err(ProxyError::InvalidJson("body is not a JSON object".into()));
        };

        let action = match obj.get("action") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim(),
            _ => return Err(ProxyError::MissingAction),
        };

        match action {
            ACTION_LOGIN_BY_MPIN => parse_login(&obj).map(Self::LoginByMpin),
            ACTION_GET_LTP => parse_quote(&obj).map(Self::GetLtp),
            other => Err(ProxyError::UnknownAction(other.to_owned())),
        }
    }

    /// The action this request performs.
    pub fn action(&self) -> Action {
        match self {
            Self::LoginByMpin(_) => Action::LoginByMpin,
            Self::GetLtp(_) => Action::GetLtp,
        }
    }
}

fn parse_login(obj: &Map<String, Value>) -> Result<LoginFields> {
    let (Some(api_key), Some(client_id), Some(mpin), Some(totp)) = (
        field(obj, "apiKey"),
        field(obj, "clientId"),
        field(obj, "mpin"),
        field(obj, "totp"),
    ) else {
        return Err(ProxyError::MissingFields {
            required: LOGIN_REQUIRED,
        });
    };

    check_digits(&mpin, FormatField::Mpin)?;
    check_digits(&totp, FormatField::Totp)?;

    Ok(LoginFields {
        api_key,
        client_id,
        mpin,
        totp,
    })
}

fn parse_quote(obj: &Map<String, Value>) -> Result<QuoteFields> {
    let (Some(api_key), Some(jwt_token), Some(exchange), Some(tradingsymbol), Some(symboltoken)) = (
        field(obj, "apiKey"),
        field(obj, "jwtToken"),
        field(obj, "exchange"),
        field(obj, "tradingsymbol"),
        field(obj, "symboltoken"),
    ) else {
        return Err(ProxyError::MissingFields {
            required: QUOTE_REQUIRED,
        });
    };

    Ok(QuoteFields {
        api_key,
        jwt_token,
        exchange,
        tradingsymbol,
        symboltoken,
    })
}

/// Read a field as trimmed text.
///
/// Strings are trimmed; numbers and booleans are rendered as text (so an
/// MPIN sent as the number `1234` is accepted). Null, arrays, objects and
/// blank strings count as absent.
fn field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match obj.get(key)? {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn check_digits(value: &str, which: FormatField) -> Result<()> {
    if value.len() == which.digits() && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ProxyError::InvalidFormat(which))
    }
}
