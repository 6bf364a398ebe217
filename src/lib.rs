//! profile-sync
//!
//! A client-side manager for a collection of user profiles backed by a remote
//! CRUD API. The crate owns the authoritative in-memory copy of the
//! collection ([`store::CollectionStore`]), mediates every mutation through
//! the remote service ([`api::ApiClient`]), and exposes an observable
//! [`store::CollectionState`] that presentation code renders from.
//!
//! Rendering, transport routing, and the remote service itself are outside
//! this crate; consumers hold read-only state snapshots plus intent-dispatch
//! handles only.

pub mod api;
pub mod config;
pub mod error;
pub mod profile;
pub mod store;

use std::sync::Arc;

use reqwest::Client;

use crate::api::ApiClient;
use crate::config::ClientOptions;
use crate::store::CollectionStore;

/// The main entry point for the profile-sync client
pub struct ProfileSync {
    /// The base address of the remote CRUD API
    pub url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
}

impl ProfileSync {
    /// Create a new client against `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use profile_sync::ProfileSync;
    ///
    /// let sync = ProfileSync::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::new_with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use profile_sync::{ProfileSync, config::ClientOptions};
    ///
    /// let options = ClientOptions::default()
    ///     .with_request_timeout(Some(Duration::from_secs(10)));
    /// let sync = ProfileSync::new_with_options("http://localhost:8000", options);
    /// ```
    pub fn new_with_options(base_url: &str, options: ClientOptions) -> Self {
        Self {
            url: base_url.to_string(),
            http_client: Client::new(),
            options,
        }
    }

    /// Create a new client from the `USER_API_URL` environment variable,
    /// falling back to the local development address
    pub fn from_env() -> Self {
        Self::new(&ClientOptions::base_url_from_env())
    }

    /// Build a stateless API client for direct CRUD calls
    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.url, self.http_client.clone(), self.options.request_timeout)
    }

    /// Build a collection store ready for
    /// [`load_initial`](CollectionStore::load_initial)
    pub fn store(&self) -> Arc<CollectionStore> {
        Arc::new(CollectionStore::new(self.api()))
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::profile::{ProfileDraft, ProfileId, UserProfile};
    pub use crate::store::{CollectionState, CollectionStore};
    pub use crate::ProfileSync;
}
