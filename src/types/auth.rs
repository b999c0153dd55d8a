//! Authentication types: MPIN + TOTP login.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Proxy request fields
// ---------------------------------------------------------------------------

/// Validated fields of a `loginByMpin` proxy request.
///
/// All values are already trimmed; `mpin` is exactly 4 ASCII digits and
/// `totp` exactly 6.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginFields {
    pub api_key: String,
    pub client_id: String,
    pub mpin: String,
    pub totp: String,
}

impl fmt::Debug for LoginFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFields")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("mpin", &"<redacted>")
            .field("totp", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Upstream request body
// ---------------------------------------------------------------------------

/// Request body for the broker's `loginByMpin` endpoint.
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub clientcode: &'a str,
    pub mpin: &'a str,
    pub totp: &'a str,
}

impl<'a> From<&'a LoginFields> for LoginRequest<'a> {
    fn from(fields: &'a LoginFields) -> Self {
        Self {
            clientcode: &fields.client_id,
            mpin: &fields.mpin,
            totp: &fields.totp,
        }
    }
}

// ---------------------------------------------------------------------------
// Login response data
// ---------------------------------------------------------------------------

/// Session tokens returned in the `data` of a successful login.
///
/// The proxy never inspects these; the caller resubmits `jwt_token` on the
/// next quote request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub jwt_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub feed_token: Option<String>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("jwt_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("feed_token", &self.feed_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
