//! Error types for cfddns.

use thiserror::Error;

/// Result type alias for cfddns.
pub type Result<T> = std::result::Result<T, Error>;

/// cfddns error types.
///
/// Variants are deliberately distinct so callers can tell "fetch failed"
/// apart from "update rejected" and "bad configuration".
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credentials, malformed target spec).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/transport error (connect, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the Cloudflare API.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Malformed response body.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Public IP resolution failed.
    #[error("IP resolution failed: {0}")]
    IpResolve(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
