//! Studio Poller
//!
//! Polls generation jobs until they reach a terminal state.
//!
//! - [`BatchPoller`]: sweeps a set of jobs in rounds, fetching the download
//!   URL of each job once it completes, and returns whatever resolved.
//! - [`SinglePoller`]: the same for one job, with a shorter delay.
//!
//! Both issue one query at a time, in input order, and honour a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) checked at the
//! top of each round and before each query.

pub mod batch;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod progress;
pub mod single;

#[cfg(test)]
mod testing;

pub use batch::BatchPoller;
pub use config::{BatchPollConfig, SinglePollConfig};
pub use error::PollError;
pub use fetcher::{DownloadFetcher, StatusFetcher};
pub use progress::{LogProgress, ProgressSink};
pub use single::{SingleOutcome, SinglePoller};
