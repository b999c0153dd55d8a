//! Command-line client for a running proxy: keep credentials, log in with a
//! TOTP code and print one last traded price.
//!
//! # Usage
//!
//! ```sh
//! cargo run --bin ltp_check --features cli -- save --api-key KEY --client-id A123 --mpin 1234
//! cargo run --bin ltp_check --features cli -- quote --totp 123456 --symbol TCS
//! ```

use std::path::PathBuf;

use angel_proxy::credentials::{CredentialStore, FileCredentialStore, StoredCredentials};
use angel_proxy::error::{ProxyError, Result};
use angel_proxy::shell::{ProxyClient, ShellSession};
use angel_proxy::types::instrument::{self, Instrument};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ltp_check", about = "Fetch Angel One last traded prices through the proxy")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Proxy endpoint
    #[arg(long, default_value = "http://127.0.0.1:8787/angel-one-proxy")]
    proxy_url: String,

    /// Directory holding the credential file
    #[arg(long, default_value = ".")]
    store_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Save API key, client id and optionally the MPIN
    Save {
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        mpin: Option<String>,
    },
    /// Delete the saved credentials
    Clear,
    /// Show what is saved (secrets masked)
    Show,
    /// List popular instruments, optionally filtered
    Instruments { term: Option<String> },
    /// Log in and print the LTP of one instrument
    Quote {
        /// Current 6-digit code from the authenticator app
        #[arg(long)]
        totp: String,
        /// MPIN, if not saved
        #[arg(long)]
        mpin: Option<String>,
        /// Trading symbol or company name
        #[arg(long, default_value = "RELIANCE-EQ")]
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let store = FileCredentialStore::new(&cli.store_dir);

    match cli.command {
        Command::Save {
            api_key,
            client_id,
            mpin,
        } => {
            store.save(&StoredCredentials {
                api_key: api_key.trim().to_owned(),
                client_id: client_id.trim().to_owned(),
                mpin: mpin.map(|m| m.trim().to_owned()).filter(|m| !m.is_empty()),
            })?;
            println!("Saved credentials to {}", store.path().display());
        }
        Command::Clear => {
            store.clear()?;
            println!("Cleared saved credentials");
        }
        Command::Show => match store.load()? {
            Some(creds) => {
                println!("Client ID: {}", creds.client_id);
                println!("API key:   {}", mask(&creds.api_key));
                println!("MPIN:      {}", if creds.mpin.is_some() { "saved" } else { "not saved" });
            }
            None => println!("No saved credentials"),
        },
        Command::Instruments { term } => {
            for i in instrument::search(term.as_deref().unwrap_or("")) {
                println!("{:<8} {:<15} {:>6}  {}", i.exchange, i.symbol, i.token, i.name);
            }
        }
        Command::Quote { totp, mpin, symbol } => {
            let instrument = resolve(&symbol)?;
            let mut session = ShellSession::new(ProxyClient::new(&cli.proxy_url)?, store);

            session.login(&totp, mpin.as_deref()).await?;
            let quote = session.fetch_quote(&instrument).await?;

            println!(
                "{} ({}) LTP ₹{:.2}  at {}",
                quote.symbol,
                quote.exchange,
                quote.ltp,
                quote.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    Ok(())
}

/// Exact symbol match first, then the first search hit.
fn resolve(term: &str) -> Result<Instrument> {
    let all = instrument::popular_instruments();
    if let Some(hit) = all.iter().find(|i| i.symbol.eq_ignore_ascii_case(term.trim())) {
        return Ok(hit.clone());
    }
    instrument::search(term)
        .into_iter()
        .next()
        .ok_or_else(|| ProxyError::InvalidArgument(format!("no instrument matches {term:?}")))
}

fn mask(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{tail}")
}
