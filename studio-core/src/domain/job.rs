//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one generation request, as issued by the API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in log lines (first 8 characters)
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job status as seen by the pollers
///
/// The API reports an open set of status strings. They are collapsed into
/// three states by [`JobStatus::normalize`]:
///
/// | reported                          | status      |
/// |-----------------------------------|-------------|
/// | `completed`, `succeeded`, `done`  | `Completed` |
/// | `failed`, `error`                 | `Failed`    |
/// | anything else                     | `Pending`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

const COMPLETED_SYNONYMS: &[&str] = &["completed", "succeeded", "done"];
const FAILED_SYNONYMS: &[&str] = &["failed", "error"];

impl JobStatus {
    /// Map a reported status string onto the three-state enum
    pub fn normalize(reported: &str) -> Self {
        let reported = reported.trim();
        if COMPLETED_SYNONYMS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(reported))
        {
            JobStatus::Completed
        } else if FAILED_SYNONYMS.iter().any(|s| s.eq_ignore_ascii_case(reported)) {
            JobStatus::Failed
        } else {
            JobStatus::Pending
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// Normalized answer to a status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub status: JobStatus,
    pub error_message: Option<String>,
}

impl StatusReport {
    pub fn pending() -> Self {
        Self {
            status: JobStatus::Pending,
            error_message: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: JobStatus::Completed,
            error_message: None,
        }
    }

    pub fn failed(message: Option<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            error_message: message,
        }
    }
}

/// Per-job state tracked while a batch is being polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Completed { url: String },
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_completed_synonyms() {
        for s in ["completed", "succeeded", "done", "DONE", " Succeeded "] {
            assert_eq!(JobStatus::normalize(s), JobStatus::Completed, "{s}");
        }
    }

    #[test]
    fn test_normalize_failed_synonyms() {
        assert_eq!(JobStatus::normalize("failed"), JobStatus::Failed);
        assert_eq!(JobStatus::normalize("error"), JobStatus::Failed);
        assert_eq!(JobStatus::normalize("Error"), JobStatus::Failed);
    }

    #[test]
    fn test_normalize_unknown_is_pending() {
        for s in ["pending", "processing", "queued", "", "?", "complete"] {
            assert_eq!(JobStatus::normalize(s), JobStatus::Pending, "{s}");
        }
    }

    #[test]
    fn test_job_id_short() {
        assert_eq!(JobId::from("abcdef0123456789").short(), "abcdef01");
        assert_eq!(JobId::from("abc").short(), "abc");
    }

    #[test]
    fn test_job_id_serializes_as_string() {
        let id = JobId::from("gen-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"gen-1\"");
    }
}
