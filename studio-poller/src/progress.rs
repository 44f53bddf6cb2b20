//! Progress sinks
//!
//! Pollers push [`ProgressUpdate`]s into a sink after each step. Sinks must
//! not block; a slow sink delays the next query.

use studio_core::domain::progress::ProgressUpdate;
use tracing::debug;

/// Receives progress notifications from a poller
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Sink that writes progress to the debug log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, update: &ProgressUpdate) {
        match update {
            ProgressUpdate::RoundStarted(p) => {
                debug!("Round {}/{} started: {}", p.round, p.max_rounds, p.text())
            }
            ProgressUpdate::RoundFinished(p) => {
                debug!("Round {}/{} finished: {}", p.round, p.max_rounds, p.text())
            }
            ProgressUpdate::Single(p) => {
                debug!("Attempt {}/{}: {}", p.round, p.max_rounds, p.text())
            }
        }
    }
}
