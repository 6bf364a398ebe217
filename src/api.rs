//! The remote service client: stateless CRUD calls against the user profile API

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::profile::{ProfileDraft, ProfileId, UserProfile};

/// Client for the remote user profile CRUD API
///
/// Holds no collection state; each call completes exactly once with a parsed
/// result or a single typed failure. No call is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The base address of the remote API
    base_url: String,

    /// HTTP client
    client: Client,

    /// Per-request timeout, unlimited when `None`
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Create a new ApiClient
    pub(crate) fn new(base_url: &str, client: Client, timeout: Option<Duration>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Build an absolute endpoint URL from the base address
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(path)?)
    }

    /// Fetch the full collection
    pub async fn list_all(&self) -> Result<Vec<UserProfile>, Error> {
        let url = self.endpoint("/users")?;
        debug!("GET {}", url);
        let response = self.prepare(self.client.get(url)).send().await?;
        let response = Self::check_status(response).await?;
        let profiles = response.json::<Vec<UserProfile>>().await?;
        Ok(profiles)
    }

    /// Submit a new record; the service assigns id and timestamps
    pub async fn create(&self, draft: &ProfileDraft) -> Result<UserProfile, Error> {
        let url = self.endpoint("/users")?;
        debug!("POST {}", url);
        let response = self.prepare(self.client.post(url).json(draft)).send().await?;
        let response = Self::check_status(response).await?;
        let profile = response.json::<UserProfile>().await?;
        Ok(profile)
    }

    /// Replace the mutable fields of an existing record
    pub async fn update(&self, id: ProfileId, draft: &ProfileDraft) -> Result<UserProfile, Error> {
        let url = self.endpoint(&format!("/users/{}", id))?;
        debug!("PUT {}", url);
        let response = self.prepare(self.client.put(url).json(draft)).send().await?;
        let response = Self::check_status(response).await?;
        let profile = response.json::<UserProfile>().await?;
        Ok(profile)
    }

    /// Delete the record identified by `id`
    pub async fn remove(&self, id: ProfileId) -> Result<(), Error> {
        let url = self.endpoint(&format!("/users/{}", id))?;
        debug!("DELETE {}", url);
        let response = self.prepare(self.client.delete(url)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Probe the service health endpoint
    pub async fn health(&self) -> Result<(), Error> {
        let url = self.endpoint("/health")?;
        let response = self.prepare(self.client.get(url)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Classify a non-success status into a typed failure, carrying the
    /// response text as context
    async fn check_status(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => Error::not_found(text),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::validation(text),
            _ => Error::network(format!("Request failed with status {}: {}", status, text)),
        })
    }
}
