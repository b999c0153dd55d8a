//! Core HTTP client for the Angel One SmartAPI.
//!
//! The [`AngelClient`] struct wraps [`reqwest::Client`] with the configured
//! endpoint URLs and timeout. Unlike a typed API client it does not
//! deserialize responses into fixed structs: every call returns an
//! [`UpstreamOutcome`], because the proxy must report the broker's irregular
//! responses faithfully rather than fail on them.
//!
//! Endpoint methods are added to `AngelClient` via `impl` blocks in the
//! [`crate::api`] module.

use serde::Serialize;
use url::Url;

use crate::config::UpstreamConfig;
use crate::constants::LOG_SNIPPET_CHARS;
use crate::error::Result;
use crate::headers::BrokerHeaders;
use crate::outcome::{UpstreamOutcome, classify, truncate_chars};

/// HTTP client for the broker's login and quote endpoints.
///
/// Cheap to clone: the underlying connection pool is shared.
///
/// # Example
///
/// ```no_run
/// use angel_proxy::client::AngelClient;
///
/// # fn main() -> angel_proxy::error::Result<()> {
/// let client = AngelClient::with_base_url("http://127.0.0.1:4000")?;
/// assert!(client.login_url().as_str().ends_with("/loginByMpin"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AngelClient {
    http: reqwest::Client,
    login_url: Url,
    ltp_url: Url,
}

impl AngelClient {
    /// Create a client for the production endpoints.
    pub fn new() -> Result<Self> {
        Self::from_config(&UpstreamConfig::default())
    }

    /// Create a client whose endpoints live under a custom base URL.
    ///
    /// Useful for testing against a sandbox or mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::from_config(&UpstreamConfig::with_base_url(base_url)?)
    }

    /// Create a client from explicit upstream settings.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            login_url: config.login_url.clone(),
            ltp_url: config.ltp_url.clone(),
        })
    }

    /// Returns a reference to the underlying `reqwest::Client`.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// URL of the MPIN login endpoint.
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// URL of the LTP endpoint.
    pub fn ltp_url(&self) -> &Url {
        &self.ltp_url
    }

    // -----------------------------------------------------------------------
    // Raw HTTP helper
    // -----------------------------------------------------------------------

    /// POST `body` as JSON to `url` with `headers` and classify the result.
    ///
    /// Makes exactly one request and never retries. The only error is a
    /// header value that cannot be sent; transport failures come back as
    /// [`UpstreamOutcome::Unreachable`].
    pub async fn post_raw<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        headers: &BrokerHeaders,
        body: &B,
    ) -> Result<UpstreamOutcome> {
        let header_map = headers.to_header_map()?;
        tracing::debug!(%url, "POST");

        let resp = match self
            .http
            .post(url.clone())
            .headers(header_map)
            .json(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(%url, error = %e, "upstream request failed");
                return Ok(UpstreamOutcome::Unreachable {
                    reason: e.to_string(),
                });
            }
        };

        let status = resp.status();
        let resp_headers = resp.headers().clone();
        tracing::info!(%url, status = status.as_u16(), "upstream responded");

        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(%url, error = %e, "failed reading upstream body");
                return Ok(UpstreamOutcome::Unreachable {
                    reason: e.to_string(),
                });
            }
        };
        tracing::debug!(body = truncate_chars(&text, LOG_SNIPPET_CHARS), "upstream raw response");

        let outcome = classify(status, &resp_headers, &text);
        match &outcome {
            UpstreamOutcome::EmptyBody { .. } => {
                tracing::warn!(%url, status = status.as_u16(), "upstream returned an empty body");
            }
            UpstreamOutcome::NonJson { .. } => {
                tracing::warn!(%url, status = status.as_u16(), "upstream returned non-JSON");
            }
            _ => {}
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn with_base_url_builds_both_endpoints() {
        let client = AngelClient::with_base_url("http://127.0.0.1:4000/").unwrap();
        assert_eq!(
            client.login_url().as_str(),
            "http://127.0.0.1:4000/rest/auth/angelbroking/user/v1/loginByMpin"
        );
        assert_eq!(
            client.ltp_url().as_str(),
            "http://127.0.0.1:4000/rest/secure/angelbroking/order/v1/getLTP"
        );
    }

    #[tokio::test]
    async fn post_raw_sends_headers_and_json_body() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/echo")
                    .header("x-privatekey", "k1")
                    .header("x-usertype", "USER")
                    .json_body(serde_json::json!({"a": 1}));
                then.status(200).body(r#"{"data":{"ok":true}}"#);
            })
            .await;

        let client = AngelClient::new().unwrap();
        let url = Url::parse(&server.url("/echo")).unwrap();
        let outcome = client
            .post_raw(&url, &BrokerHeaders::new("k1", None), &serde_json::json!({"a": 1}))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            UpstreamOutcome::Success {
                message: "OK".into(),
                data: serde_json::json!({"ok": true}),
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        // Bind and drop a listener to get a port nothing is serving on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = AngelClient::new().unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/x")).unwrap();

        let outcome = client
            .post_raw(&url, &BrokerHeaders::new("k", None), &serde_json::json!({}))
            .await
            .unwrap();

        assert!(matches!(outcome, UpstreamOutcome::Unreachable { .. }));
    }

    #[tokio::test]
    async fn timeout_is_unreachable() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|_when, then| {
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .body(r#"{"data":1}"#);
            })
            .await;

        let mut config = UpstreamConfig::with_base_url(&server.base_url()).unwrap();
        config.timeout = Duration::from_millis(50);
        let client = AngelClient::from_config(&config).unwrap();
        let url = client.ltp_url().clone();

        let outcome = client
            .post_raw(&url, &BrokerHeaders::new("k", Some("j")), &serde_json::json!({}))
            .await
            .unwrap();

        assert!(matches!(outcome, UpstreamOutcome::Unreachable { .. }));
    }

    #[tokio::test]
    async fn invalid_header_value_is_an_error_and_sends_nothing() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|_when, then| {
                then.status(200).body("{}");
            })
            .await;

        let client = AngelClient::with_base_url(&server.base_url()).unwrap();
        let url = client.login_url().clone();
        let result = client
            .post_raw(&url, &BrokerHeaders::new("bad\nkey", None), &serde_json::json!({}))
            .await;

        assert!(result.is_err());
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn error_status_is_classified() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|_when, then| {
                then.status(401).body(r#"{"message":"Invalid apikey"}"#);
            })
            .await;

        let client = AngelClient::with_base_url(&server.base_url()).unwrap();
        let url = client.login_url().clone();
        let outcome = client
            .post_raw(&url, &BrokerHeaders::new("k", None), &serde_json::json!({}))
            .await
            .unwrap();

        let UpstreamOutcome::Error { status, message, .. } = outcome else {
            panic!("expected Error, got {outcome:?}");
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message.as_deref(), Some("Invalid apikey"));
    }
}
