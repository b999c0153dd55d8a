//! Error types for the `angel-proxy` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, ProxyError>`.
//!
//! [`ProxyError`] covers:
//! - **Input errors**: empty or unparseable request bodies, missing or
//!   malformed fields, unknown actions
//! - **Client shell errors**: error envelopes returned by the proxy, missing
//!   credentials or session
//! - **Transport errors**: network, TLS, timeout failures on the shell side
//! - **JSON, URL and I/O errors**: deserialization, configuration and
//!   credential-file failures
//!
//! Failures reported by (or while talking to) the upstream broker are *not*
//! errors here; they are classified into
//! [`UpstreamOutcome`](crate::outcome::UpstreamOutcome) variants.

use std::fmt;

/// Which credential field failed its format check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatField {
    /// The 4-digit MPIN.
    Mpin,
    /// The 6-digit TOTP code.
    Totp,
}

impl FormatField {
    /// Number of ASCII digits the field must contain.
    pub fn digits(self) -> usize {
        match self {
            Self::Mpin => 4,
            Self::Totp => 6,
        }
    }

    /// Upper-case label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Mpin => "MPIN",
            Self::Totp => "TOTP",
        }
    }
}

impl fmt::Display for FormatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// All possible errors produced by the proxy and its client shell.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The request body was zero-length or whitespace-only.
    #[error("Empty request body")]
    EmptyBody,

    /// The request body exceeds the proxy's size limit.
    #[error("Request body too large (limit {limit} bytes)")]
    PayloadTooLarge {
        /// Maximum accepted body size in bytes.
        limit: usize,
    },

    /// The request body could not be read off the connection.
    #[error("Failed to read request body: {0}")]
    UnreadableBody(String),

    /// The request body could not be parsed as a JSON object.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The JSON object has no usable `action` string.
    #[error("Missing action")]
    MissingAction,

    /// The `action` names an operation this proxy does not offer.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// At least one field required by the action is absent or blank.
    #[error("Missing required fields: {required}")]
    MissingFields {
        /// Human-readable list of the fields the action requires.
        required: &'static str,
    },

    /// `mpin` or `totp` is not the expected number of digits.
    #[error("Invalid {0} format")]
    InvalidFormat(FormatField),

    /// The caller provided a value that cannot be forwarded (e.g. a header
    /// value with control characters).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The proxy answered with an error envelope.
    #[error("proxy returned HTTP {status}: {error}")]
    Remote {
        /// HTTP status of the proxy response.
        status: u16,
        /// The envelope's `error` text.
        error: String,
        /// The envelope's machine-readable `code`, if any.
        code: Option<String>,
        /// The envelope's `details`, rendered as text.
        details: Option<String>,
    },

    /// No credentials have been saved in the credential store.
    #[error("no saved credentials; save apiKey and clientId first")]
    NoCredentials,

    /// A quote was requested before a successful login.
    #[error("not logged in; call login first")]
    NotLoggedIn,

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize or deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Reading or writing the credential file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else that should surface as a generic server fault.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProxyError>;
