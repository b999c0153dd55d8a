//! Client shell: talks to a running proxy the way a front end would.
//!
//! [`ProxyClient`] speaks the proxy's request/response schema over HTTP.
//! [`ShellSession`] adds cached credentials, a login step and quote fetching
//! on top. Session tokens live only in memory.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::credentials::{CredentialStore, StoredCredentials};
use crate::envelope::{ErrorEnvelope, SuccessEnvelope};
use crate::error::{ProxyError, Result};
use crate::types::auth::{LoginFields, SessionTokens};
use crate::types::instrument::Instrument;
use crate::types::market_quote::{LtpData, QuoteFields};
use crate::validate::ProxyRequest;

/// HTTP client for the proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ProxyClient {
    /// Create a client for the proxy at `endpoint`
    /// (e.g. `http://127.0.0.1:8787/angel-one-proxy`).
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            endpoint: Url::parse(endpoint)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Log in with MPIN + TOTP and return the session tokens.
    pub async fn login_by_mpin(&self, fields: &LoginFields) -> Result<SessionTokens> {
        let env: SuccessEnvelope<SessionTokens> =
            self.call(&ProxyRequest::LoginByMpin(fields.clone())).await?;
        Ok(env.data)
    }

    /// Fetch the last traded price of one instrument.
    pub async fn get_ltp(&self, fields: &QuoteFields) -> Result<LtpData> {
        let env: SuccessEnvelope<LtpData> =
            self.call(&ProxyRequest::GetLtp(fields.clone())).await?;
        Ok(env.data)
    }

    /// POST one request and decode the success envelope's `data` as `R`.
    pub async fn call<R: DeserializeOwned>(
        &self,
        request: &ProxyRequest,
    ) -> Result<SuccessEnvelope<R>> {
        tracing::debug!(url = %self.endpoint, action = %request.action(), "POST");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        Self::handle_response(resp).await
    }

    /// Turn a proxy response into the decoded envelope or a
    /// [`ProxyError::Remote`].
    async fn handle_response<R: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<SuccessEnvelope<R>> {
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let Ok(body) = serde_json::from_slice::<Value>(&bytes) else {
            return Err(ProxyError::Remote {
                status: status.as_u16(),
                error: "proxy returned a non-JSON response".into(),
                code: None,
                details: Some(String::from_utf8_lossy(&bytes).into_owned()),
            });
        };

        if body.get("error").is_some() || !status.is_success() {
            return Err(remote_error(status.as_u16(), body));
        }
        Ok(serde_json::from_value(body)?)
    }
}

fn remote_error(status: u16, body: Value) -> ProxyError {
    match serde_json::from_value::<ErrorEnvelope>(body) {
        Ok(env) => ProxyError::Remote {
            status,
            error: env.error,
            code: env.code,
            details: env.details.map(|d| match d {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        },
        Err(_) => ProxyError::Remote {
            status,
            error: "unexpected response from proxy".into(),
            code: None,
            details: None,
        },
    }
}

/// A last traded price as fetched by the shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub exchange: String,
    pub token: String,
    pub ltp: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Credentials, a login and quote fetching, over one [`ProxyClient`].
#[derive(Debug)]
pub struct ShellSession<S> {
    client: ProxyClient,
    store: S,
    tokens: Option<SessionTokens>,
}

impl<S: CredentialStore> ShellSession<S> {
    pub fn new(client: ProxyClient, store: S) -> Self {
        Self {
            client,
            store,
            tokens: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the cached credentials. Drops any active session.
    pub fn save_credentials(&mut self, creds: &StoredCredentials) -> Result<()> {
        self.store.save(creds)?;
        self.tokens = None;
        Ok(())
    }

    /// Forget the cached credentials and the active session.
    pub fn clear_credentials(&mut self) -> Result<()> {
        self.store.clear()?;
        self.tokens = None;
        Ok(())
    }

    /// The cached credentials, or [`ProxyError::NoCredentials`].
    pub fn credentials(&self) -> Result<StoredCredentials> {
        self.store.load()?.ok_or(ProxyError::NoCredentials)
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.is_some()
    }

    /// Log in with a fresh TOTP code.
    ///
    /// `mpin` overrides the cached MPIN; one of the two must be present.
    pub async fn login(&mut self, totp: &str, mpin: Option<&str>) -> Result<&SessionTokens> {
        let creds = self.credentials()?;
        let mpin = mpin
            .map(str::to_owned)
            .or(creds.mpin)
            .ok_or_else(|| ProxyError::InvalidArgument("no MPIN given or saved".into()))?;

        tracing::info!(client_id = %creds.client_id, "logging in through proxy");
        let fields = LoginFields {
            api_key: creds.api_key,
            client_id: creds.client_id,
            mpin,
            totp: totp.trim().to_owned(),
        };
        let tokens = self.client.login_by_mpin(&fields).await?;
        Ok(self.tokens.insert(tokens))
    }

    /// Fetch the LTP of `instrument` with the active session.
    pub async fn fetch_quote(&self, instrument: &Instrument) -> Result<Quote> {
        let tokens = self.tokens.as_ref().ok_or(ProxyError::NotLoggedIn)?;
        let creds = self.credentials()?;

        let fields = QuoteFields {
            api_key: creds.api_key,
            jwt_token: tokens.jwt_token.clone(),
            exchange: instrument.exchange.clone(),
            tradingsymbol: instrument.symbol.clone(),
            symboltoken: instrument.token.clone(),
        };
        let data = self.client.get_ltp(&fields).await?;

        Ok(Quote {
            symbol: instrument.symbol.clone(),
            exchange: instrument.exchange.clone(),
            token: instrument.token.clone(),
            ltp: data.ltp,
            fetched_at: Utc::now(),
        })
    }
}
