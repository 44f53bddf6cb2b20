//! Studio HTTP Client
//!
//! A typed HTTP client for the remote image-generation API used by Character
//! Image Studio: authentication, credits and payments, generation requests,
//! and asset status/download.
//!
//! # Example
//!
//! ```no_run
//! use studio_client::StudioClient;
//! use studio_core::dto::generation::SeedRequest;
//!
//! # async fn example() -> studio_client::Result<()> {
//! let client = StudioClient::new("https://api-imagegen.neuko.ai");
//! client.login("my-client-id", "my-client-secret").await?;
//!
//! let generation = client.generate_seed(SeedRequest::new("a knight in red armor")).await?;
//! println!("Generation: {:?}", generation.job_id());
//! # Ok(())
//! # }
//! ```

mod assets;
mod auth;
mod credits;
pub mod error;
mod generate;
mod payments;

// Re-export commonly used types
pub use assets::ImageData;
pub use auth::Registration;
pub use error::{ClientError, Result};
pub use credits::DEFAULT_TRANSACTION_LIMIT;
pub use generate::RetryPolicy;
pub use studio_core::domain::account::Credentials;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use studio_core::dto::Envelope;
use tracing::{debug, warn};

/// Default base URL of the generation API
pub const DEFAULT_API_URL: &str = "https://api-imagegen.neuko.ai";

pub(crate) const AUTH_TIMEOUT: Duration = Duration::from_secs(15);
pub(crate) const LEDGER_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const TURNAROUND_TIMEOUT: Duration = Duration::from_secs(180);
pub(crate) const ASSET_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the image-generation API
///
/// The client keeps the user's credentials in memory. Authenticated calls
/// send the access token; when the API answers 401 and a client id/secret
/// pair is known, the client logs in again once and repeats the call.
/// Callers that persist credentials should read them back with
/// [`StudioClient::credentials`] after a call.
#[derive(Clone)]
pub struct StudioClient {
    /// Base URL of the API (e.g., "https://api-imagegen.neuko.ai")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Credentials shared between clones
    credentials: Arc<RwLock<Credentials>>,
    /// Retry policy for turnaround submissions
    retry: RetryPolicy,
}

impl fmt::Debug for StudioClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl StudioClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use studio_client::StudioClient;
    ///
    /// let client = StudioClient::new("https://api-imagegen.neuko.ai");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            credentials: Arc::new(RwLock::new(Credentials::default())),
            retry: RetryPolicy::default(),
        }
    }

    /// Seed the client with previously stored credentials
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        self.set_credentials(credentials);
        self
    }

    /// Override the retry policy used for turnaround submissions
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Snapshot of the current credentials
    pub fn credentials(&self) -> Credentials {
        match self.credentials.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the current credentials
    pub fn set_credentials(&self, credentials: Credentials) {
        match self.credentials.write() {
            Ok(mut guard) => *guard = credentials,
            Err(poisoned) => *poisoned.into_inner() = credentials,
        }
    }

    pub(crate) fn update_credentials(&self, update: Credentials) {
        let mut current = self.credentials();
        current.merge(update);
        self.set_credentials(current);
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    /// Send a request that needs the bearer token
    ///
    /// `build` is called again when the request has to be repeated after a
    /// fresh login.
    pub(crate) async fn send_authed<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let token = match self.credentials().access_token {
            Some(token) => token,
            None => self.relogin().await?,
        };

        let response = build(&self.client).bearer_auth(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if self.credentials().login_pair().is_none() {
            return Ok(response);
        }

        warn!("Access token rejected, logging in again");
        let token = self.relogin().await?;
        Ok(build(&self.client).bearer_auth(&token).send().await?)
    }

    /// Log in with the stored client id/secret and return the new token
    async fn relogin(&self) -> Result<String> {
        let credentials = self.credentials();
        let (client_id, client_secret) = credentials
            .login_pair()
            .ok_or(ClientError::MissingCredentials)?;

        let login = self.login(client_id, client_secret).await?;
        Ok(login.access_token)
    }

    /// Send an authenticated request and decode the JSON body
    pub(crate) async fn authed_json<T, F>(&self, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = self.send_authed(build).await?;
        self.handle_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success status codes become typed errors. The body may be wrapped
    /// in a `data` field or not.
    pub(crate) async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let url = response.url().path().to_string();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!("{} -> HTTP {}: {}", url, status, truncate(&error_text, 200));
            return Err(ClientError::from_status(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        serde_json::from_str::<Envelope<T>>(&body)
            .map(Envelope::into_inner)
            .map_err(|e| {
                ClientError::ParseError(format!(
                    "Failed to parse JSON response from {} (HTTP {}): {}: {}",
                    url,
                    status.as_u16(),
                    e,
                    truncate(&body, 200)
                ))
            })
    }
}

/// Cut a string to at most `max` characters for log and error messages
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
