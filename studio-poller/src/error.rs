//! Poller errors
//!
//! Only problems with the input are errors. Job failures, timeouts and
//! cancellation are ordinary outcomes.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    /// No job IDs were supplied
    #[error("cannot poll an empty batch")]
    EmptyBatch,

    /// The poll configuration is unusable
    #[error("invalid poll configuration: {0}")]
    InvalidConfig(String),
}
