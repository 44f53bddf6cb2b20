//! Batch poller
//!
//! Polls a batch of generation jobs in rounds until every job is terminal or
//! the round budget runs out.
//!
//! Each round walks the still-pending jobs in input order and queries them one
//! at a time. A completed job gets exactly one download-URL query; a failed
//! job is dropped. Query errors are logged and the job is asked again next
//! round. Between rounds the poller sleeps for the configured delay, unless
//! cancellation is requested first.

use std::sync::Arc;
use studio_core::domain::batch::{BatchOutcome, BatchState};
use studio_core::domain::job::{JobId, JobStatus};
use studio_core::domain::progress::{BatchProgress, ProgressUpdate};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BatchPollConfig;
use crate::error::PollError;
use crate::fetcher::{DownloadFetcher, StatusFetcher};
use crate::progress::{LogProgress, ProgressSink};

/// Round-based poller for a batch of jobs
pub struct BatchPoller {
    config: BatchPollConfig,
    status: Arc<dyn StatusFetcher>,
    download: Arc<dyn DownloadFetcher>,
    progress: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl BatchPoller {
    /// Creates a new batch poller
    ///
    /// # Arguments
    /// * `config` - Round budget, delay and phase labels
    /// * `status` - Answers job status queries
    /// * `download` - Answers download-URL queries for completed jobs
    pub fn new(
        config: BatchPollConfig,
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

    /// Sends progress updates to `sink` instead of the debug log
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Stops polling early when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &BatchPollConfig {
        &self.config
    }

    /// Polls the batch until every job is terminal, the round budget is spent,
    /// or cancellation is requested
    ///
    /// Duplicate IDs are polled independently, once per occurrence. The
    /// outcome lists resolved URLs in input order; jobs that failed or never
    /// left pending are reported separately and are absent from the URLs.
    ///
    /// # Errors
    /// * `PollError::EmptyBatch` - `job_ids` is empty
    /// * `PollError::InvalidConfig` - the configuration does not validate
    pub async fn poll(&self, job_ids: &[JobId]) -> Result<BatchOutcome, PollError> {
        if job_ids.is_empty() {
            return Err(PollError::EmptyBatch);
        }
        self.config.validate()?;

        let max_rounds = self.config.max_rounds;
        let mut state = BatchState::new(job_ids);
        let mut rounds = 0;
        let mut cancelled = false;

        info!(
            "Polling {} job(s) for up to {} rounds ({:?} apart)",
            state.total(),
            max_rounds,
            self.config.round_delay
        );

        'rounds: for round in 1..=max_rounds {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            rounds = round;
            self.progress
                .report(&ProgressUpdate::RoundStarted(self.snapshot(&state, round)));

            for position in state.pending_positions() {
                if self.cancel.is_cancelled() {
                    cancelled = true;
                    break 'rounds;
                }
                self.poll_position(&mut state, position).await;
            }

            self.progress
                .report(&ProgressUpdate::RoundFinished(self.snapshot(&state, round)));
            info!(
                "Round {}/{}: {} completed, {} failed, {} pending",
                round,
                max_rounds,
                state.completed(),
                state.failed(),
                state.pending()
            );

            if state.is_finished() || round == max_rounds {
                break;
            }

            tokio::select! {
                () = self.cancel.cancelled() => {
                    cancelled = true;
                    break 'rounds;
                }
                () = sleep(self.config.round_delay) => {}
            }
        }

        if cancelled {
            warn!("Polling cancelled after {} round(s)", rounds);
        } else if !state.is_finished() {
            warn!(
                "Round budget exhausted with {} job(s) still pending",
                state.pending()
            );
        }

        let outcome = state.into_outcome(rounds, cancelled);
        info!("{}", outcome.summary());
        Ok(outcome)
    }

    // =============================================================================
    // Internals
    // =============================================================================

    /// Queries one pending position and records any terminal transition
    async fn poll_position(&self, state: &mut BatchState, position: usize) {
        let Some(job_id) = state.job_id(position).cloned() else {
            return;
        };

        let report = match self.status.fetch_status(&job_id).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Status query for {} failed, retrying next round: {:#}", job_id, e);
                return;
            }
        };

        match report.status {
            JobStatus::Pending => debug!("Job {} still pending", job_id.short()),
            JobStatus::Failed => {
                warn!(
                    "Job {} failed: {}",
                    job_id,
                    report.error_message.as_deref().unwrap_or("no reason given")
                );
                state.mark_failed(position);
            }
            JobStatus::Completed => match self.download.fetch_download_url(&job_id).await {
                Ok(Some(url)) => {
                    debug!("Job {} completed", job_id.short());
                    state.mark_completed(position, url);
                }
                Ok(None) => {
                    warn!("Job {} completed without a download URL", job_id);
                    state.mark_failed(position);
                }
                Err(e) => {
                    warn!("Download URL for {} unavailable: {:#}", job_id, e);
                    state.mark_failed(position);
                }
            },
        }
    }

    fn snapshot(&self, state: &BatchState, round: u32) -> BatchProgress {
        BatchProgress::from_state(state, round, self.config.max_rounds, &self.config.phases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedFetcher, ids, url_for};
    use anyhow::anyhow;
    use std::sync::Mutex;
    use std::time::Duration;
    use studio_core::domain::job::StatusReport;
    use tokio::time::Instant;

    fn poller(config: BatchPollConfig, fetcher: &Arc<ScriptedFetcher>) -> BatchPoller {
        BatchPoller::new(config, fetcher.clone(), fetcher.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_in_first_round() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| Ok(StatusReport::completed())));
        let outcome = poller(BatchPollConfig::default(), &fetcher)
            .poll(&ids(&["a"]))
            .await
            .unwrap();

        assert_eq!(outcome.resolved, vec![(JobId::from("a"), url_for("a"))]);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(fetcher.status_calls("a"), 1);
        assert_eq!(fetcher.download_calls("a"), 1);
        assert!(outcome.is_complete_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_never_downloaded() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| {
            Ok(StatusReport::failed(Some("nsfw".into())))
        }));
        let outcome = poller(BatchPollConfig::default(), &fetcher)
            .poll(&ids(&["a"]))
            .await
            .unwrap();

        assert!(outcome.resolved.is_empty());
        assert_eq!(outcome.failed, ids(&["a"]));
        assert_eq!(outcome.rounds, 1);
        assert_eq!(fetcher.status_calls("a"), 1);
        assert_eq!(fetcher.download_calls("a"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_until_round_budget_runs_out() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| Ok(StatusReport::pending())));
        let config = BatchPollConfig::new(5, Duration::from_secs(10));
        let started = Instant::now();
        let outcome = poller(config, &fetcher).poll(&ids(&["a"])).await.unwrap();

        assert!(outcome.resolved.is_empty());
        assert_eq!(outcome.unresolved, ids(&["a"]));
        assert_eq!(outcome.rounds, 5);
        assert!(!outcome.cancelled);
        assert_eq!(fetcher.status_calls("a"), 5);
        // no pause after the last round
        assert_eq!(started.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_batch() {
        // a completes in round 1, b fails in round 2, c never resolves
        let fetcher = Arc::new(ScriptedFetcher::new(|id, nth| match (id, nth) {
            ("a", _) => Ok(StatusReport::completed()),
            ("b", 0) => Ok(StatusReport::pending()),
            ("b", _) => Ok(StatusReport::failed(None)),
            _ => Ok(StatusReport::pending()),
        }));
        let config = BatchPollConfig::new(3, Duration::from_secs(10));
        let outcome = poller(config, &fetcher)
            .poll(&ids(&["a", "b", "c"]))
            .await
            .unwrap();

        assert_eq!(outcome.resolved, vec![(JobId::from("a"), url_for("a"))]);
        assert_eq!(outcome.failed, ids(&["b"]));
        assert_eq!(outcome.unresolved, ids(&["c"]));
        assert_eq!(outcome.rounds, 3);
        assert_eq!(fetcher.status_calls("a"), 1);
        assert_eq!(fetcher.status_calls("b"), 2);
        assert_eq!(fetcher.status_calls("c"), 3);
        assert_eq!(fetcher.download_calls("b"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_in_input_order() {
        let fetcher = Arc::new(ScriptedFetcher::new(|id, nth| match (id, nth) {
            ("y", 0) => Ok(StatusReport::pending()),
            _ => Ok(StatusReport::completed()),
        }));
        poller(BatchPollConfig::default(), &fetcher)
            .poll(&ids(&["z", "y", "x"]))
            .await
            .unwrap();

        assert_eq!(fetcher.status_log(), vec!["z", "y", "x", "y"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_job_never_requeried() {
        let fetcher = Arc::new(ScriptedFetcher::new(|id, _| match id {
            "done" => Ok(StatusReport::completed()),
            _ => Ok(StatusReport::pending()),
        }));
        let config = BatchPollConfig::new(4, Duration::from_secs(1));
        let outcome = poller(config, &fetcher)
            .poll(&ids(&["done", "slow"]))
            .await
            .unwrap();

        assert_eq!(fetcher.status_calls("done"), 1);
        assert_eq!(fetcher.download_calls("done"), 1);
        assert_eq!(fetcher.status_calls("slow"), 4);
        assert_eq!(outcome.urls(), vec![url_for("done")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_errors_are_retried() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, nth| {
            if nth < 2 {
                Err(anyhow!("connection reset"))
            } else {
                Ok(StatusReport::completed())
            }
        }));
        let outcome = poller(BatchPollConfig::default(), &fetcher)
            .poll(&ids(&["a"]))
            .await
            .unwrap();

        assert_eq!(outcome.rounds, 3);
        assert_eq!(outcome.urls(), vec![url_for("a")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_failure_marks_job_failed() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(|_, _| Ok(StatusReport::completed())).with_download(|id| {
                match id {
                    "blank" => Ok(None),
                    "broken" => Err(anyhow!("HTTP 500")),
                    other => Ok(Some(url_for(other))),
                }
            }),
        );
        let outcome = poller(BatchPollConfig::default(), &fetcher)
            .poll(&ids(&["blank", "ok", "broken"]))
            .await
            .unwrap();

        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.urls(), vec![url_for("ok")]);
        assert_eq!(outcome.failed, ids(&["blank", "broken"]));
        assert_eq!(fetcher.download_calls("broken"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repolling_a_finished_batch_is_stable() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| Ok(StatusReport::completed())));
        let poller = poller(BatchPollConfig::default(), &fetcher);
        let first = poller.poll(&ids(&["a", "b"])).await.unwrap();
        let second = poller.poll(&ids(&["a", "b"])).await.unwrap();

        assert_eq!(first.resolved, second.resolved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_ids_polled_independently() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, nth| match nth {
            0 => Ok(StatusReport::pending()),
            _ => Ok(StatusReport::completed()),
        }));
        let outcome = poller(BatchPollConfig::default(), &fetcher)
            .poll(&ids(&["a", "a"]))
            .await
            .unwrap();

        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.resolved.len(), 2);
        assert_eq!(fetcher.status_calls("a"), 3);
        assert_eq!(fetcher.download_calls("a"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_mid_round() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let fetcher = Arc::new(ScriptedFetcher::new(move |id, _| {
            if id == "b" {
                trigger.cancel();
            }
            Ok(StatusReport::completed())
        }));
        let outcome = poller(BatchPollConfig::default(), &fetcher)
            .with_cancellation(token)
            .poll(&ids(&["a", "b", "c"]))
            .await
            .unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.urls(), vec![url_for("a"), url_for("b")]);
        assert_eq!(outcome.unresolved, ids(&["c"]));
        assert_eq!(fetcher.status_calls("c"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_round_delay() {
        let token = CancellationToken::new();
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| Ok(StatusReport::pending())));
        let poller = poller(BatchPollConfig::default(), &fetcher).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            sleep(Duration::from_secs(15)).await;
            token.cancel();
        });
        let started = Instant::now();
        let outcome = poller.poll(&ids(&["a"])).await.unwrap();
        canceller.await.unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.rounds, 2);
        assert_eq!(fetcher.status_calls("a"), 2);
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| Ok(StatusReport::completed())));
        let outcome = poller(BatchPollConfig::default(), &fetcher)
            .with_cancellation(token)
            .poll(&ids(&["a"]))
            .await
            .unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.rounds, 0);
        assert!(fetcher.status_log().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_is_an_error() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| Ok(StatusReport::completed())));
        let result = poller(BatchPollConfig::default(), &fetcher).poll(&[]).await;
        assert_eq!(result, Err(PollError::EmptyBatch));
        assert!(fetcher.status_log().is_empty());
    }

    #[tokio::test]
    async fn test_zero_rounds_is_rejected() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_, _| Ok(StatusReport::completed())));
        let config = BatchPollConfig::new(0, Duration::ZERO);
        let result = poller(config, &fetcher).poll(&ids(&["a"])).await;
        assert!(matches!(result, Err(PollError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_reports_each_round() {
        let seen: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let fetcher = Arc::new(ScriptedFetcher::new(|id, nth| match (id, nth) {
            ("b", 0) => Ok(StatusReport::pending()),
            _ => Ok(StatusReport::completed()),
        }));
        poller(BatchPollConfig::default(), &fetcher)
            .with_progress(Arc::new(move |update: &ProgressUpdate| {
                sink.lock().unwrap().push(update.clone())
            }))
            .poll(&ids(&["a", "b"]))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        match &seen[1] {
            ProgressUpdate::RoundFinished(p) => {
                assert_eq!(p.round, 1);
                assert_eq!(p.completed, 1);
                assert_eq!(p.phase, "Finishing up references...");
            }
            other => panic!("unexpected update {:?}", other),
        }
        match &seen[3] {
            ProgressUpdate::RoundFinished(p) => assert_eq!(p.completed, 2),
            other => panic!("unexpected update {:?}", other),
        }
    }
}
