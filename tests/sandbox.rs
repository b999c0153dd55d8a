//! Live tests against the real Angel One SmartAPI.
//!
//! # Running
//!
//! These tests need real credentials and a TOTP code that is still valid
//! when the test runs. Set the following environment variables first:
//!
//! ```sh
//! export ANGEL_API_KEY="your-api-key"
//! export ANGEL_CLIENT_ID="your-client-id"
//! export ANGEL_MPIN="1234"
//! export ANGEL_TOTP="123456"
//! cargo test --test sandbox -- --nocapture --test-threads=1
//! ```
//!
//! Without these env vars, every test is silently skipped.
//!
//! # What is tested
//!
//! - **Login**: MPIN + TOTP through the full pipeline returns a JWT
//! - **LTP**: login then a quote for RELIANCE-EQ
//! - **Bad API key**: no session token comes back

use angel_proxy::client::AngelClient;
use angel_proxy::proxy;
use angel_proxy::ProxyResponse;
use serde_json::{json, Value};

/// Live credentials from the environment.
struct Live {
    api_key: String,
    client_id: String,
    mpin: String,
    totp: String,
}

fn live_credentials() -> Option<Live> {
    let var = |k: &str| std::env::var(k).ok().filter(|v| !v.is_empty());
    Some(Live {
        api_key: var("ANGEL_API_KEY")?,
        client_id: var("ANGEL_CLIENT_ID")?,
        mpin: var("ANGEL_MPIN")?,
        totp: var("ANGEL_TOTP")?,
    })
}

/// Macro to skip a test when credentials are missing.
macro_rules! require_client {
    () => {
        match live_credentials() {
            Some(c) => (AngelClient::new().expect("client builds"), c),
            None => {
                eprintln!("⏭  Skipped (ANGEL_API_KEY / ANGEL_CLIENT_ID / ANGEL_MPIN / ANGEL_TOTP not set)");
                return;
            }
        }
    };
}

async fn login(client: &AngelClient, live: &Live, api_key: &str) -> ProxyResponse {
    let body = json!({
        "action": "loginByMpin",
        "apiKey": api_key,
        "clientId": live.client_id,
        "mpin": live.mpin,
        "totp": live.totp,
    });
    proxy::handle(client, body.to_string().as_bytes()).await
}

// ===================================================================
// Login
// ===================================================================

#[tokio::test]
async fn test_login_returns_jwt() {
    let (client, live) = require_client!();
    let resp = login(&client, &live, &live.api_key).await;
    let json = resp.to_json();
    println!("login → HTTP {} {}", resp.http_status(), json["message"]);

    assert_eq!(resp.http_status().as_u16(), 200, "login failed: {json}");
    assert_eq!(json["status"], true);
    assert!(json["data"]["jwtToken"].as_str().is_some_and(|t| !t.is_empty()));
}

// ===================================================================
// Market data
// ===================================================================

#[tokio::test]
async fn test_ltp_after_login() {
    let (client, live) = require_client!();
    let json = login(&client, &live, &live.api_key).await.to_json();
    let Some(jwt) = json["data"]["jwtToken"].as_str() else {
        panic!("login failed: {json}");
    };

    let body = json!({
        "action": "getLTP",
        "apiKey": live.api_key,
        "jwtToken": jwt,
        "exchange": "NSE",
        "tradingsymbol": "RELIANCE-EQ",
        "symboltoken": "2885",
    });
    let resp = proxy::handle(&client, body.to_string().as_bytes()).await;
    let json: Value = resp.to_json();
    println!("RELIANCE-EQ → {json}");

    assert_eq!(resp.http_status().as_u16(), 200);
    assert!(json["data"]["ltp"].as_f64().is_some_and(|p| p > 0.0));
}

// ===================================================================
// Error handling
// ===================================================================

#[tokio::test]
async fn test_bad_api_key_yields_no_token() {
    let (client, live) = require_client!();
    let resp = login(&client, &live, "definitely-not-a-key").await;
    let json = resp.to_json();
    println!("bad key → HTTP {} {json}", resp.http_status());

    // The broker may answer 200 with `status:false`, which passes through as
    // a success envelope, or with an error status.
    assert!(json["data"]["jwtToken"].is_null(), "unexpected token: {json}");
}
