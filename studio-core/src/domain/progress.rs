//! Progress reporting types
//!
//! Progress is advisory only: the pollers emit it so a front end can show a
//! percentage and a phase label while jobs are running.

use serde::{Deserialize, Serialize};

use super::batch::BatchState;

/// Percent never reaches 100 while polling is still running
const MAX_RUNNING_PERCENT: f64 = 95.0;
const BASE_PERCENT: f64 = 5.0;

/// Maps a completion fraction into the 5..=95 range used by progress bars
pub fn running_percent(fraction: f64) -> f64 {
    (BASE_PERCENT + fraction.clamp(0.0, 1.0) * 90.0).min(MAX_RUNNING_PERCENT)
}

/// One phase threshold: the label applies once the ready fraction reaches `min_ready`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseStep {
    pub min_ready: f64,
    pub label: String,
}

/// Phase labels for a batch, chosen from how many jobs are completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTable {
    /// Label shown while nothing is ready yet
    pub idle: String,
    /// Ascending thresholds applied once at least one job is ready
    pub steps: Vec<PhaseStep>,
}

impl PhaseTable {
    /// Label for `ready` completed jobs out of `total`
    pub fn label(&self, ready: usize, total: usize) -> &str {
        if ready == 0 || total == 0 {
            return &self.idle;
        }

        let fraction = ready as f64 / total as f64;
        self.steps
            .iter()
            .rev()
            .find(|step| fraction >= step.min_ready)
            .map(|step| step.label.as_str())
            .unwrap_or(&self.idle)
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        let step = |min_ready: f64, label: &str| PhaseStep {
            min_ready,
            label: label.to_string(),
        };

        Self {
            idle: "Generating reference images...".to_string(),
            steps: vec![
                step(0.0, "Building character profile..."),
                step(0.5, "Finishing up references..."),
                step(0.9, "Almost done..."),
            ],
        }
    }
}

/// Snapshot of a batch poll
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProgress {
    pub round: u32,
    pub max_rounds: u32,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub total: usize,
    pub percent: f64,
    pub phase: String,
}

impl BatchProgress {
    pub fn from_state(state: &BatchState, round: u32, max_rounds: u32, phases: &PhaseTable) -> Self {
        let total = state.total();
        let completed = state.completed();
        let fraction = if total == 0 {
            0.0
        } else {
            state.done() as f64 / total as f64
        };

        Self {
            round,
            max_rounds,
            completed,
            failed: state.failed(),
            pending: state.pending(),
            total,
            percent: running_percent(fraction),
            phase: phases.label(completed, total).to_string(),
        }
    }

    /// Text shown next to the progress bar
    pub fn text(&self) -> String {
        format!("{} {}/{} ready", self.phase, self.completed, self.total)
    }
}

const SINGLE_MESSAGES: [&str; 5] = [
    "Warming up the AI...",
    "Composing your scene...",
    "Painting the details...",
    "Rendering final touches...",
    "Almost there...",
];

/// Snapshot of a single-job poll
#[derive(Debug, Clone, PartialEq)]
pub struct SingleProgress {
    pub round: u32,
    pub max_rounds: u32,
    pub percent: f64,
    pub message: &'static str,
}

impl SingleProgress {
    pub fn new(round: u32, max_rounds: u32) -> Self {
        let fraction = if max_rounds == 0 {
            0.0
        } else {
            round as f64 / max_rounds as f64
        };
        let percent = running_percent(fraction);
        let idx = ((percent / 100.0) * SINGLE_MESSAGES.len() as f64).floor() as usize;

        Self {
            round,
            max_rounds,
            percent,
            message: SINGLE_MESSAGES[idx.min(SINGLE_MESSAGES.len() - 1)],
        }
    }

    pub fn text(&self) -> String {
        format!("{} {}%", self.message, self.percent.round())
    }
}

/// Progress notification emitted by the pollers
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// A batch round is about to query the pending jobs
    RoundStarted(BatchProgress),
    /// A batch round has queried every pending job
    RoundFinished(BatchProgress),
    /// A single-job poll is about to query the job
    Single(SingleProgress),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobId;

    #[test]
    fn test_default_phase_labels_match_reference_thresholds() {
        let phases = PhaseTable::default();
        assert_eq!(phases.label(0, 20), "Generating reference images...");
        assert_eq!(phases.label(1, 20), "Building character profile...");
        assert_eq!(phases.label(9, 20), "Building character profile...");
        assert_eq!(phases.label(10, 20), "Finishing up references...");
        assert_eq!(phases.label(17, 20), "Finishing up references...");
        assert_eq!(phases.label(18, 20), "Almost done...");
        assert_eq!(phases.label(20, 20), "Almost done...");
    }

    #[test]
    fn test_running_percent_bounds() {
        assert_eq!(running_percent(0.0), 5.0);
        assert_eq!(running_percent(0.5), 50.0);
        assert_eq!(running_percent(1.0), 95.0);
    }

    #[test]
    fn test_batch_progress_from_state() {
        let ids: Vec<JobId> = (0..4).map(|i| JobId::from(format!("g{i}"))).collect();
        let mut state = BatchState::new(&ids);
        state.mark_completed(0, "u".into());
        state.mark_failed(1);

        let progress = BatchProgress::from_state(&state, 2, 90, &PhaseTable::default());
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.pending, 2);
        assert_eq!(progress.percent, 50.0);
        assert_eq!(progress.text(), "Building character profile... 1/4 ready");
    }

    #[test]
    fn test_single_progress_messages_rotate() {
        assert_eq!(SingleProgress::new(1, 120).message, "Warming up the AI...");
        assert_eq!(SingleProgress::new(60, 120).message, "Painting the details...");
        assert_eq!(SingleProgress::new(120, 120).message, "Almost there...");
    }
}
