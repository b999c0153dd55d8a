//! HTTP surface of the proxy.
//!
//! [`build_router`] wires the pipeline into an axum [`Router`] with CORS and
//! panic handling; [`serve`] binds it to the configured address. Request
//! tracing is added by [`serve`] rather than [`build_router`], so in-process
//! tests drive the router without a subscriber.

use std::any::Any;

use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::client::AngelClient;
use crate::config::ProxyConfig;
use crate::constants::MAX_REQUEST_BODY_BYTES;
use crate::envelope::ProxyResponse;
use crate::error::{ProxyError, Result};
use crate::proxy;

/// Build the proxy router.
///
/// Routes `POST /` and `POST /angel-one-proxy` to the pipeline. `OPTIONS`
/// is answered by the CORS layer with an empty 200. Bodies over
/// [`MAX_REQUEST_BODY_BYTES`] get a 413 envelope. Every response, including
/// panics turned into 500s, carries the CORS headers from `config`.
pub fn build_router(client: AngelClient, config: &ProxyConfig) -> Result<Router> {
    let allow_headers = config
        .allowed_headers
        .iter()
        .map(|h| {
            HeaderName::from_bytes(h.as_bytes())
                .map_err(|e| ProxyError::InvalidArgument(format!("allowed header {h:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    let allow_headers_value = HeaderValue::from_str(&config.allowed_headers.join(", "))
        .map_err(|e| ProxyError::InvalidArgument(format!("allowed headers: {e}")))?;

    let cors = CorsLayer::new()
        .allow_origin(allow_origin(&config.allowed_origin)?)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(allow_headers);

    let router = Router::new()
        .route("/", post(proxy_handler))
        .route("/angel-one-proxy", post(proxy_handler))
        .with_state(client)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            allow_headers_value,
        ))
        .layer(cors);

    Ok(router)
}

/// Serve the proxy on `config.bind_addr` until Ctrl-C.
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let client = AngelClient::from_config(&config.upstream)?;
    let app = build_router(client, &config)?.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        login_url = %config.upstream.login_url,
        ltp_url = %config.upstream.ltp_url,
        "angel-proxy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn allow_origin(origin: &str) -> Result<AllowOrigin> {
    if origin == "*" {
        return Ok(AllowOrigin::any());
    }
    let value = HeaderValue::from_str(origin)
        .map_err(|e| ProxyError::InvalidArgument(format!("allowed origin {origin:?}: {e}")))?;
    Ok(AllowOrigin::exact(value))
}

async fn proxy_handler(
    State(client): State<AngelClient>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> ProxyResponse {
    match body {
        Ok(body) => proxy::handle(&client, &body).await,
        Err(rejection) => {
            let err = body_error(&rejection);
            proxy::log_rejection(&err);
            ProxyResponse::from(err)
        }
    }
}

fn body_error(rejection: &BytesRejection) -> ProxyError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProxyError::PayloadTooLarge {
            limit: MAX_REQUEST_BODY_BYTES,
        }
    } else {
        ProxyError::UnreadableBody(rejection.body_text())
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");
    ProxyResponse::internal().into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn rejects_unusable_cors_settings() {
        let client = AngelClient::new().unwrap();

        let config = ProxyConfig {
            allowed_origin: "bad\norigin".into(),
            ..ProxyConfig::default()
        };
        assert!(build_router(client.clone(), &config).is_err());

        let config = ProxyConfig {
            allowed_headers: vec!["not a header".into()],
            ..ProxyConfig::default()
        };
        assert!(build_router(client, &config).is_err());
    }

    #[tokio::test]
    async fn exact_origin_is_echoed() {
        let config = ProxyConfig {
            allowed_origin: "https://app.example.com".into(),
            ..ProxyConfig::default()
        };
        let router = build_router(AngelClient::new().unwrap(), &config).unwrap();

        let resp = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("origin", "https://app.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "https://app.example.com"
        );
    }

    #[tokio::test]
    async fn panic_becomes_internal_envelope() {
        async fn boom() -> &'static str {
            panic!("boom")
        }
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response));

        let resp = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Unexpected error", "code": "INTERNAL"}));
    }
}
