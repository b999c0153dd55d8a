//! Classification of raw upstream responses.
//!
//! The broker's responses are irregular: an HTTP 200 may arrive with an empty
//! body, an error page may be HTML, and a JSON body may or may not nest its
//! payload under `data`. [`classify`] folds all of that into one
//! [`UpstreamOutcome`] so the response normalizer can be a total match.
//!
//! Rules, applied in order:
//!
//! 1. transport failure → [`UpstreamOutcome::Unreachable`] (produced by the
//!    client, never by [`classify`])
//! 2. empty or whitespace-only body, whatever the status → [`UpstreamOutcome::EmptyBody`]
//! 3. body that is not JSON → [`UpstreamOutcome::NonJson`]
//! 4. status outside 200–299 → [`UpstreamOutcome::Error`]
//! 5. otherwise → [`UpstreamOutcome::Success`]

use std::collections::BTreeMap;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::constants::RAW_RESPONSE_SNIPPET_CHARS;

/// What one upstream call amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// The call never produced a response (connect error, timeout, broken
    /// body stream).
    Unreachable {
        reason: String,
    },

    /// The broker answered with no body.
    EmptyBody {
        status: StatusCode,
        headers: BTreeMap<String, String>,
    },

    /// The broker answered with something that is not JSON.
    NonJson {
        status: StatusCode,
        /// Leading characters of the body, for diagnostics.
        snippet: String,
    },

    /// The broker answered with JSON and a non-2xx status.
    Error {
        status: StatusCode,
        /// `message`, else `errorMessage`, from the body.
        message: Option<String>,
        body: Value,
    },

    /// The broker answered with JSON and a 2xx status.
    Success {
        /// The body's `message`, or `"OK"`.
        message: String,
        /// The body's `data` if present, else the whole body.
        data: Value,
    },
}

/// Classify a response that was received in full.
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &str) -> UpstreamOutcome {
    if body.trim().is_empty() {
        return UpstreamOutcome::EmptyBody {
            status,
            headers: header_dump(headers),
        };
    }

    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return UpstreamOutcome::NonJson {
            status,
            snippet: truncate_chars(body, RAW_RESPONSE_SNIPPET_CHARS).to_owned(),
        };
    };

    if !status.is_success() {
        return UpstreamOutcome::Error {
            status,
            message: upstream_message(&json),
            body: json,
        };
    }

    let message = non_empty_str(&json, "message").unwrap_or_else(|| "OK".to_owned());
    UpstreamOutcome::Success {
        message,
        data: unwrap_data(json),
    }
}

/// The broker's explanation for a failure, preferring `message` over
/// `errorMessage`.
pub fn upstream_message(body: &Value) -> Option<String> {
    non_empty_str(body, "message").or_else(|| non_empty_str(body, "errorMessage"))
}

/// Return the `data` member of an object body if it has one, else the body.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}

fn non_empty_str(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn header_dump(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_owned(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// The first `max` characters of `s`, never splitting a code point.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn no_headers() -> HeaderMap {
        HeaderMap::new()
    }

    #[test]
    fn empty_body_with_200_is_not_success() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        for body in ["", "  \n"] {
            let outcome = classify(StatusCode::OK, &headers, body);
            let UpstreamOutcome::EmptyBody { status, headers } = outcome else {
                panic!("expected EmptyBody, got {outcome:?}");
            };
            assert_eq!(status, StatusCode::OK);
            assert_eq!(headers.get("x-request-id").map(String::as_str), Some("abc"));
        }
    }

    #[test]
    fn html_body_is_non_json_and_truncated() {
        let body = format!("<html>{}</html>", "x".repeat(500));
        let outcome = classify(StatusCode::BAD_GATEWAY, &no_headers(), &body);
        let UpstreamOutcome::NonJson { status, snippet } = outcome else {
            panic!("expected NonJson");
        };
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(snippet.chars().count(), RAW_RESPONSE_SNIPPET_CHARS);
        assert!(snippet.starts_with("<html>"));
    }

    #[test]
    fn non_json_check_precedes_status_check() {
        let outcome = classify(StatusCode::UNAUTHORIZED, &no_headers(), "Unauthorized");
        assert!(matches!(outcome, UpstreamOutcome::NonJson { .. }));
    }

    #[test]
    fn error_status_prefers_message_over_error_message() {
        let outcome = classify(
            StatusCode::UNAUTHORIZED,
            &no_headers(),
            r#"{"message":"Invalid apikey","errorMessage":"other"}"#,
        );
        assert_eq!(
            outcome,
            UpstreamOutcome::Error {
                status: StatusCode::UNAUTHORIZED,
                message: Some("Invalid apikey".into()),
                body: json!({"message":"Invalid apikey","errorMessage":"other"}),
            }
        );
    }

    #[test]
    fn error_status_falls_back_to_error_message() {
        let outcome = classify(
            StatusCode::FORBIDDEN,
            &no_headers(),
            r#"{"message":"","errorMessage":"Access denied"}"#,
        );
        let UpstreamOutcome::Error { message, .. } = outcome else {
            panic!("expected Error");
        };
        assert_eq!(message.as_deref(), Some("Access denied"));
    }

    #[test]
    fn error_status_without_message() {
        let outcome = classify(StatusCode::INTERNAL_SERVER_ERROR, &no_headers(), "[1,2]");
        let UpstreamOutcome::Error { message, body, .. } = outcome else {
            panic!("expected Error");
        };
        assert!(message.is_none());
        assert_eq!(body, json!([1, 2]));
    }

    #[test]
    fn success_unwraps_nested_data() {
        let outcome = classify(
            StatusCode::OK,
            &no_headers(),
            r#"{"status":true,"data":{"ltp":2847.65}}"#,
        );
        assert_eq!(
            outcome,
            UpstreamOutcome::Success {
                message: "OK".into(),
                data: json!({"ltp": 2847.65}),
            }
        );
    }

    #[test]
    fn success_without_data_keeps_whole_body() {
        let outcome = classify(
            StatusCode::OK,
            &no_headers(),
            r#"{"message":"SUCCESS","ltp":19100}"#,
        );
        assert_eq!(
            outcome,
            UpstreamOutcome::Success {
                message: "SUCCESS".into(),
                data: json!({"message":"SUCCESS","ltp":19100}),
            }
        );
    }

    #[test]
    fn explicit_null_data_is_still_data() {
        let outcome = classify(StatusCode::OK, &no_headers(), r#"{"status":false,"data":null}"#);
        assert_eq!(
            outcome,
            UpstreamOutcome::Success {
                message: "OK".into(),
                data: Value::Null,
            }
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
