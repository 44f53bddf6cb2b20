//! Batch state and outcome
//!
//! `BatchState` is the working set of one batch poll. Every input position is
//! tracked separately, so duplicate job IDs are polled independently. An entry
//! only ever moves from `Pending` to a terminal state.

use std::collections::HashMap;

use super::job::{JobId, JobState};

/// Working set of a batch poll
#[derive(Debug, Clone)]
pub struct BatchState {
    entries: Vec<(JobId, JobState)>,
}

impl BatchState {
    /// Creates a state with every job marked pending
    pub fn new(job_ids: &[JobId]) -> Self {
        Self {
            entries: job_ids
                .iter()
                .map(|id| (id.clone(), JobState::Pending))
                .collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, JobState::Completed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, JobState::Failed))
    }

    pub fn pending(&self) -> usize {
        self.count(|s| matches!(s, JobState::Pending))
    }

    /// Number of entries in a terminal state
    pub fn done(&self) -> usize {
        self.total() - self.pending()
    }

    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(|(_, s)| s.is_terminal())
    }

    /// Positions of the entries that are still pending, in input order
    pub fn pending_positions(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (_, s))| !s.is_terminal())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn job_id(&self, position: usize) -> Option<&JobId> {
        self.entries.get(position).map(|(id, _)| id)
    }

    pub fn state(&self, position: usize) -> Option<&JobState> {
        self.entries.get(position).map(|(_, s)| s)
    }

    /// Marks a pending entry completed. Returns false if the entry was already terminal.
    pub fn mark_completed(&mut self, position: usize, url: String) -> bool {
        self.transition(position, JobState::Completed { url })
    }

    /// Marks a pending entry failed. Returns false if the entry was already terminal.
    pub fn mark_failed(&mut self, position: usize) -> bool {
        self.transition(position, JobState::Failed)
    }

    /// Consumes the state into the result handed back to the caller
    pub fn into_outcome(self, rounds: u32, cancelled: bool) -> BatchOutcome {
        let total = self.entries.len();
        let mut resolved = Vec::new();
        let mut failed = Vec::new();
        let mut unresolved = Vec::new();

        for (id, state) in self.entries {
            match state {
                JobState::Completed { url } => resolved.push((id, url)),
                JobState::Failed => failed.push(id),
                JobState::Pending => unresolved.push(id),
            }
        }

        BatchOutcome {
            total,
            resolved,
            failed,
            unresolved,
            rounds,
            cancelled,
        }
    }

    fn transition(&mut self, position: usize, next: JobState) -> bool {
        match self.entries.get_mut(position) {
            Some((_, state)) if !state.is_terminal() => {
                *state = next;
                true
            }
            _ => false,
        }
    }

    fn count(&self, pred: impl Fn(&JobState) -> bool) -> usize {
        self.entries.iter().filter(|(_, s)| pred(s)).count()
    }
}

/// Result of a batch poll
///
/// Partial success is a normal outcome: jobs that failed or never left
/// pending are simply absent from `resolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Number of input positions
    pub total: usize,
    /// Completed jobs with their download URL, in input order
    pub resolved: Vec<(JobId, String)>,
    /// Jobs that reached a failed state
    pub failed: Vec<JobId>,
    /// Jobs still pending when polling stopped; can be polled again later
    pub unresolved: Vec<JobId>,
    /// Rounds performed
    pub rounds: u32,
    /// Polling stopped because of a cancellation request
    pub cancelled: bool,
}

impl BatchOutcome {
    /// Job ID to URL map of the resolved jobs
    pub fn resolved_map(&self) -> HashMap<JobId, String> {
        self.resolved.iter().cloned().collect()
    }

    /// Resolved URLs in input order
    pub fn urls(&self) -> Vec<String> {
        self.resolved.iter().map(|(_, url)| url.clone()).collect()
    }

    pub fn is_complete_success(&self) -> bool {
        self.resolved.len() == self.total
    }

    pub fn is_total_failure(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Human readable "N of M completed" summary
    pub fn summary(&self) -> String {
        format!("{} of {} images completed", self.resolved.len(), self.total)
    }
}
