//! Error types for card-lookup

use thiserror::Error;

/// Errors that can occur while querying a lookup service
#[derive(Error, Debug)]
pub enum LookupError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Service answered with a non-success status
    #[error("{service} returned status {status} for {url}")]
    Status {
        service: &'static str,
        url: String,
        status: u16,
    },

    /// Response body did not match the expected shape
    #[error("malformed response from {service}: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },

    /// Card record carries neither a top-level image nor per-face images
    #[error("card {0} has no image URIs")]
    MissingImage(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Http(err.to_string())
    }
}
