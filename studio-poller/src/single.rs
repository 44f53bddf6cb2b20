//! Single-job poller
//!
//! Polls one generation job (seed, create or random) until it completes,
//! fails, runs out of attempts, or is cancelled.

use std::sync::Arc;
use studio_core::domain::job::{JobId, JobStatus};
use studio_core::domain::progress::{ProgressUpdate, SingleProgress};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SinglePollConfig;
use crate::error::PollError;
use crate::fetcher::{DownloadFetcher, StatusFetcher};
use crate::progress::{LogProgress, ProgressSink};

/// How a single-job poll ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleOutcome {
    /// The job completed and its image can be downloaded from `url`
    Completed { url: String, rounds: u32 },
    /// The job failed, or completed without a usable download URL
    Failed { message: Option<String> },
    /// The job was still pending after every attempt
    TimedOut { rounds: u32 },
    /// Polling stopped because of a cancellation request
    Cancelled,
}

impl SingleOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Completed { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Poller for a single job
pub struct SinglePoller {
    config: SinglePollConfig,
    status: Arc<dyn StatusFetcher>,
    download: Arc<dyn DownloadFetcher>,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl SinglePoller {
    pub fn new(
        config: SinglePollConfig,
        status: Arc<dyn StatusFetcher>,
        download: Arc<dyn DownloadFetcher>,
    ) -> Self {
        Self {
            config,
            status,
            download,
            progress: Arc::new(LogProgress),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Polls `job_id` until it reaches a terminal state
    ///
    /// Query errors count as a pending answer. The download URL is fetched
    /// once, right after the job reports completion.
    pub async fn poll(&self, job_id: &JobId) -> Result<SingleOutcome, PollError> {
        self.config.validate()?;
        let max_rounds = self.config.max_rounds;

        for round in 1..=max_rounds {
            if self.cancel.is_cancelled() {
                return Ok(SingleOutcome::Cancelled);
            }

            self.progress
                .report(&ProgressUpdate::Single(SingleProgress::new(round, max_rounds)));

            match self.status.fetch_status(job_id).await {
                Ok(report) => match report.status {
                    JobStatus::Completed => return Ok(self.resolve(job_id, round).await),
                    JobStatus::Failed => {
                        warn!("Job {} failed", job_id);
                        return Ok(SingleOutcome::Failed {
                            message: report.error_message,
                        });
                    }
                    JobStatus::Pending => debug!("Job {} still pending", job_id.short()),
                },
                Err(e) => warn!("Status query for {} failed: {:#}", job_id, e),
            }

            if round == max_rounds {
                break;
            }

            tokio::select! {
                () = self.cancel.cancelled() => return Ok(SingleOutcome::Cancelled),
                () = sleep(self.config.round_delay) => {}
            }
        }

        warn!("Job {} still pending after {} attempts", job_id, max_rounds);
        Ok(SingleOutcome::TimedOut { rounds: max_rounds })
    }

    async fn resolve(&self, job_id: &JobId, rounds: u32) -> SingleOutcome {
        match self.download.fetch_download_url(job_id).await {
            Ok(Some(url)) => {
                info!("Job {} completed after {} attempt(s)", job_id, rounds);
                SingleOutcome::Completed { url, rounds }
            }
            Ok(None) => SingleOutcome::Failed {
                message: Some("completed without a download URL".to_string()),
            },
            Err(e) => SingleOutcome::Failed {
                message: Some(format!("{:#}", e)),
            },
        }
    }
}
