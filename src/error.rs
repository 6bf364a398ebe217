//! Error handling for the profile-sync client

use std::fmt;
use thiserror::Error;

/// Unified error type for the profile-sync client
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or a non-success HTTP status with no more specific cause
    #[error("Network error: {0}")]
    Network(String),

    /// The remote service rejected the payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced record no longer exists remotely
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local-only: a response referred to a record not present in the canonical list
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl Error {
    /// Create a new network error
    pub fn network<T: fmt::Display>(msg: T) -> Self {
        Error::Network(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(msg: T) -> Self {
        Error::NotFound(msg.to_string())
    }

    /// Create a new consistency error
    pub fn consistency<T: fmt::Display>(msg: T) -> Self {
        Error::Consistency(msg.to_string())
    }
}
