//! A small catalog of liquid NSE instruments for the client shell.
//!
//! The broker identifies an instrument by exchange, trading symbol and
//! symbol token together; this table saves users from looking tokens up.

use serde::{Deserialize, Serialize};

/// An instrument the quote endpoint can be asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub exchange: String,
    pub symbol: String,
    pub token: String,
    pub name: String,
}

impl Instrument {
    pub fn new(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        token: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
            token: token.into(),
            name: name.into(),
        }
    }
}

/// `(symbol, token, name)` for the popular NSE equities.
const POPULAR: &[(&str, &str, &str)] = &[
    ("RELIANCE-EQ", "2885", "Reliance Industries"),
    ("TCS-EQ", "11536", "Tata Consultancy Services"),
    ("INFY-EQ", "1594", "Infosys Limited"),
    ("HDFCBANK-EQ", "1333", "HDFC Bank"),
    ("ICICIBANK-EQ", "4963", "ICICI Bank"),
    ("HINDUNILVR-EQ", "356", "Hindustan Unilever"),
    ("ITC-EQ", "424", "ITC Limited"),
    ("SBIN-EQ", "3045", "State Bank of India"),
    ("BHARTIARTL-EQ", "10604", "Bharti Airtel"),
    ("KOTAKBANK-EQ", "1922", "Kotak Mahindra Bank"),
];

/// All catalog entries, in display order.
pub fn popular_instruments() -> Vec<Instrument> {
    POPULAR
        .iter()
        .map(|(symbol, token, name)| Instrument::new("NSE", *symbol, *token, *name))
        .collect()
}

/// Case-insensitive substring search over symbol and company name.
///
/// An empty term matches everything.
pub fn search(term: &str) -> Vec<Instrument> {
    let needle = term.trim().to_lowercase();
    popular_instruments()
        .into_iter()
        .filter(|i| {
            i.symbol.to_lowercase().contains(&needle) || i.name.to_lowercase().contains(&needle)
        })
        .collect()
}
