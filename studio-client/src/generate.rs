//! Generation endpoints

use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::{GENERATE_TIMEOUT, StudioClient, TURNAROUND_TIMEOUT};
use studio_core::dto::generation::{
    CreateRequest, GenerationResponse, RandomRequest, SeedRequest, TurnaroundRequest,
    TurnaroundResponse, cap_references,
};
use tracing::{info, warn};

/// Retry policy for turnaround submissions
///
/// The API gateway answers 502/503/504 or times out while it is overloaded.
/// Attempt `n` that fails this way is followed by a pause of `n * base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Pause after failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(10),
        }
    }
}

impl StudioClient {
    // =============================================================================
    // Single Images
    // =============================================================================

    /// Generate a seed image from a text prompt
    pub async fn generate_seed(&self, req: SeedRequest) -> Result<GenerationResponse> {
        let url = self.url("/api/v1/generate/seed");
        self.authed_json(|c| c.post(&url).timeout(GENERATE_TIMEOUT).json(&req))
            .await
    }

    /// Generate a scene featuring a character
    ///
    /// At most 15 reference images are sent.
    pub async fn generate_create(&self, req: CreateRequest) -> Result<GenerationResponse> {
        if req.reference_image_urls.is_empty() {
            return Err(ClientError::InvalidRequest(
                "at least one reference image is required".to_string(),
            ));
        }

        let req = CreateRequest {
            reference_image_urls: cap_references(&req.reference_image_urls),
            ..req
        };
        let url = self.url("/api/v1/generate/create");
        self.authed_json(|c| c.post(&url).timeout(GENERATE_TIMEOUT).json(&req))
            .await
    }

    /// Generate a random scene featuring a character
    ///
    /// At most 15 reference images are sent.
    pub async fn generate_random(&self, req: RandomRequest) -> Result<GenerationResponse> {
        if req.reference_image_urls.is_empty() {
            return Err(ClientError::InvalidRequest(
                "at least one reference image is required".to_string(),
            ));
        }

        let req = RandomRequest {
            reference_image_urls: cap_references(&req.reference_image_urls),
            ..req
        };
        let url = self.url("/api/v1/generate/random");
        self.authed_json(|c| c.post(&url).timeout(GENERATE_TIMEOUT).json(&req))
            .await
    }

    // =============================================================================
    // Turnaround Batches
    // =============================================================================

    /// Submit a character turnaround: one generation per prompt
    ///
    /// Gateway errors, timeouts and non-JSON answers are retried according
    /// to the client's [`RetryPolicy`].
    pub async fn generate_turnaround(&self, req: TurnaroundRequest) -> Result<TurnaroundResponse> {
        if req.seed_image_url.trim().is_empty() {
            return Err(ClientError::InvalidRequest("seed image is required".to_string()));
        }
        if req.prompts.is_empty() {
            return Err(ClientError::InvalidRequest("at least one prompt is required".to_string()));
        }

        info!(
            "Submitting turnaround: {} prompts, seed length {}",
            req.prompts.len(),
            req.seed_image_url.len()
        );

        let url = self.url("/api/v1/generate/turnaround");
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match self
                .send_authed(|c| c.post(&url).timeout(TURNAROUND_TIMEOUT).json(&req))
                .await
            {
                Ok(response) => self.handle_response::<TurnaroundResponse>(response).await,
                Err(e) => Err(e),
            };

            match result {
                Err(e) if attempt < max_attempts && is_retryable_submission(&e) => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "Turnaround attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

fn is_retryable_submission(error: &ClientError) -> bool {
    match error {
        ClientError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ClientError::ParseError(_) => true,
        // a server error page that is not JSON comes from the proxy, not the API
        ClientError::ApiError { status, message } if *status >= 500 => {
            error.is_gateway_error()
                || serde_json::from_str::<serde::de::IgnoredAny>(message).is_err()
        }
        other => other.is_gateway_error(),
    }
}
