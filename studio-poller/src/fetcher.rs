//! Job fetchers
//!
//! The pollers only need two questions answered about a job: its status, and
//! its download URL once it is completed. Both are traits so the pollers can
//! run against the HTTP client or against scripted responses.

use anyhow::{Context, Result};
use async_trait::async_trait;
use studio_client::StudioClient;
use studio_core::domain::job::{JobId, StatusReport};

/// Reports the current status of a generation job
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Fetches the normalized status of a job
    ///
    /// An error means the status could not be determined this time; the
    /// pollers treat it as pending and ask again next round.
    ///
    /// # Arguments
    /// * `job_id` - The job to query
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusReport>;
}

/// Resolves the download URL of a completed job
#[async_trait]
pub trait DownloadFetcher: Send + Sync {
    /// Fetches the download URL of a completed job
    ///
    /// Returns `Ok(None)` when the response carries no usable URL.
    ///
    /// # Arguments
    /// * `job_id` - The completed job
    async fn fetch_download_url(&self, job_id: &JobId) -> Result<Option<String>>;
}

#[async_trait]
impl StatusFetcher for StudioClient {
    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusReport> {
        let status = self
            .asset_status(job_id)
            .await
            .with_context(|| format!("Failed to fetch status of {}", job_id))?;
        Ok(status.report())
    }
}

#[async_trait]
impl DownloadFetcher for StudioClient {
    async fn fetch_download_url(&self, job_id: &JobId) -> Result<Option<String>> {
        let download = self
            .asset_download(job_id)
            .await
            .with_context(|| format!("Failed to fetch download URL of {}", job_id))?;
        Ok(download.url().map(str::to_string))
    }
}
