//! Response normalization.
//!
//! Whatever happened to a request (rejected input, an unreachable broker, an
//! odd broker reply, or success), the caller receives exactly one of two JSON
//! shapes:
//!
//! - [`SuccessEnvelope`]: `{ "status": true, "message": …, "data": … }`, HTTP 200
//! - [`ErrorEnvelope`]: `{ "error": …, "code": …, "details"?, "status"?,
//!   "rawResponse"?, "angelOneResponse"? }`, with a 4xx/5xx status
//!
//! [`ProxyResponse`] holds one or the other and implements axum's
//! [`IntoResponse`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ProxyError;
use crate::outcome::UpstreamOutcome;
use crate::validate::{ACTION_GET_LTP, ACTION_LOGIN_BY_MPIN, Action};

/// Machine-readable error kinds carried in [`ErrorEnvelope::code`].
pub mod codes {
    pub const EMPTY_BODY: &str = "EMPTY_BODY";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
    pub const UNREADABLE_BODY: &str = "UNREADABLE_BODY";
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const MISSING_ACTION: &str = "MISSING_ACTION";
    pub const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";
    pub const MISSING_FIELDS: &str = "MISSING_FIELDS";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const ANGEL_UNREACHABLE: &str = "ANGEL_UNREACHABLE";
    pub const ANGEL_EMPTY_BODY: &str = "ANGEL_EMPTY_BODY";
    pub const ANGEL_NON_JSON: &str = "ANGEL_NON_JSON";
    pub const ANGEL_API_ERROR: &str = "ANGEL_API_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Success shape. `T` defaults to raw JSON; the client shell decodes it into
/// a concrete type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope<T = Value> {
    pub status: bool,
    pub message: String,
    pub data: T,
}

/// Failure shape. Optional members are omitted when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Upstream HTTP status, when the failure came from the broker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angel_one_response: Option<Value>,
}

impl ErrorEnvelope {
    fn new(error: &str, code: &str) -> Self {
        Self {
            error: error.to_owned(),
            code: Some(code.to_owned()),
            ..Self::default()
        }
    }

    fn details(mut self, details: impl Into<Value>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// The single response produced for one proxy request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyResponse {
    Success(SuccessEnvelope),
    Failure {
        http_status: StatusCode,
        body: ErrorEnvelope,
    },
}

impl ProxyResponse {
    fn failure(http_status: StatusCode, body: ErrorEnvelope) -> Self {
        Self::Failure { http_status, body }
    }

    /// Normalize a request that failed before or outside the upstream call.
    pub fn from_error(err: &ProxyError) -> Self {
        use ProxyError::*;

        let bad_request = |body| Self::failure(StatusCode::BAD_REQUEST, body);
        match err {
            EmptyBody => bad_request(
                ErrorEnvelope::new("Empty request body", codes::EMPTY_BODY)
                    .details("Send JSON with action field"),
            ),
            PayloadTooLarge { limit } => Self::failure(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorEnvelope::new("Request body too large", codes::PAYLOAD_TOO_LARGE)
                    .details(format!("Request body must not exceed {limit} bytes")),
            ),
            UnreadableBody(reason) => bad_request(
                ErrorEnvelope::new("Failed to read request body", codes::UNREADABLE_BODY)
                    .details(reason.as_str()),
            ),
            InvalidJson(_) => bad_request(
                ErrorEnvelope::new("Invalid JSON", codes::INVALID_JSON)
                    .details("Ensure Content-Type: application/json and valid JSON"),
            ),
            MissingAction => bad_request(ErrorEnvelope::new("Missing action", codes::MISSING_ACTION)),
            UnknownAction(_) => bad_request(
                ErrorEnvelope::new("Unknown action", codes::UNKNOWN_ACTION).details(format!(
                    "supported actions: {ACTION_LOGIN_BY_MPIN}, {ACTION_GET_LTP}"
                )),
            ),
            MissingFields { required } => bad_request(
                ErrorEnvelope::new("Missing required fields", codes::MISSING_FIELDS)
                    .details(*required),
            ),
            InvalidFormat(field) => bad_request(
                ErrorEnvelope::new(&format!("Invalid {field} format"), codes::INVALID_FORMAT)
                    .details(format!("{field} must be exactly {} digits", field.digits())),
            ),
            InvalidArgument(msg) => bad_request(
                ErrorEnvelope::new("Invalid argument", codes::INVALID_ARGUMENT)
                    .details(msg.as_str()),
            ),
            Remote { .. } | NoCredentials | NotLoggedIn | Http(_) | Json(_) | Url(_) | Io(_)
            | Internal(_) => Self::internal(),
        }
    }

    /// The generic 500 used for faults the caller cannot act on.
    pub fn internal() -> Self {
        Self::failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorEnvelope::new("Unexpected error", codes::INTERNAL),
        )
    }

    /// Normalize the outcome of the upstream call made for `action`.
    pub fn from_outcome(action: Action, outcome: UpstreamOutcome) -> Self {
        match outcome {
            UpstreamOutcome::Unreachable { reason } => Self::failure(
                StatusCode::BAD_GATEWAY,
                ErrorEnvelope::new("Failed to reach Angel One API", codes::ANGEL_UNREACHABLE)
                    .details(reason),
            ),
            UpstreamOutcome::EmptyBody { status, headers } => Self::failure(
                StatusCode::BAD_GATEWAY,
                ErrorEnvelope {
                    status: Some(status.as_u16()),
                    ..ErrorEnvelope::new("Empty response from Angel One API", codes::ANGEL_EMPTY_BODY)
                        .details(json!({ "endpoint": action.as_str(), "headers": headers }))
                },
            ),
            UpstreamOutcome::NonJson { status, snippet } => Self::failure(
                StatusCode::BAD_GATEWAY,
                ErrorEnvelope {
                    status: Some(status.as_u16()),
                    raw_response: Some(snippet),
                    ..ErrorEnvelope::new("Invalid response from Angel One API", codes::ANGEL_NON_JSON)
                        .details("API returned non-JSON response")
                },
            ),
            UpstreamOutcome::Error {
                status,
                message,
                body,
            } => Self::failure(
                status,
                ErrorEnvelope {
                    status: Some(status.as_u16()),
                    angel_one_response: Some(body),
                    ..ErrorEnvelope::new("Angel One API error", codes::ANGEL_API_ERROR)
                        .details(message.unwrap_or_else(|| fallback_detail(action).to_owned()))
                },
            ),
            UpstreamOutcome::Success { message, data } => Self::Success(SuccessEnvelope {
                status: true,
                message,
                data,
            }),
        }
    }

    /// HTTP status the response is sent with.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success(_) => StatusCode::OK,
            Self::Failure { http_status, .. } => *http_status,
        }
    }

    /// The `code` of a failure, `None` on success.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { body, .. } => body.code.as_deref(),
        }
    }

    /// The response body as JSON.
    pub fn to_json(&self) -> Value {
        let serialized = match self {
            Self::Success(body) => serde_json::to_value(body),
            Self::Failure { body, .. } => serde_json::to_value(body),
        };
        serialized.unwrap_or_else(|_| json!({ "error": "Unexpected error", "code": codes::INTERNAL }))
    }
}

impl From<ProxyError> for ProxyResponse {
    fn from(err: ProxyError) -> Self {
        Self::from_error(&err)
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        (self.http_status(), Json(self.to_json())).into_response()
    }
}

/// Detail used when the broker's error body says nothing useful.
fn fallback_detail(action: Action) -> &'static str {
    match action {
        Action::LoginByMpin => "Authentication failed",
        Action::GetLtp => "Failed to fetch market data",
    }
}
