//! Configuration options for the profile-sync client

use std::env;
use std::time::Duration;

/// Environment variable naming the base address of the remote CRUD API
pub const BASE_URL_ENV: &str = "USER_API_URL";

/// Base address used when no explicit address or environment variable is given
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration options for the profile-sync client
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// The request timeout, applied to every API call when set
    pub request_timeout: Option<Duration>,
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Resolve the base address from the environment, falling back to the
    /// local development default
    pub fn base_url_from_env() -> String {
        env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    }
}
