//! Serve the Angel One proxy.
//!
//! # Usage
//!
//! ```sh
//! export ANGEL_PROXY_ADDR="127.0.0.1:8787"   # optional
//! cargo run --bin angel-proxy --features cli
//! ```
//!
//! Settings are read from the environment (and `.env.local` if present);
//! see [`angel_proxy::config::ProxyConfig`].

use angel_proxy::config::ProxyConfig;

#[tokio::main]
async fn main() -> angel_proxy::error::Result<()> {
    // Optional in development; production sets the variables directly.
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ProxyConfig::from_env()?;
    angel_proxy::server::serve(config).await
}
