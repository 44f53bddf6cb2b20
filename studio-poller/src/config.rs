//! Poll configuration
//!
//! Defines the round budget and pacing of the batch and single-job pollers.
//! Defaults match the pacing the generation API tolerates; every value can be
//! overridden from the environment.

use std::time::Duration;
use studio_core::domain::progress::PhaseTable;

use crate::error::PollError;

/// Batch poller configuration
#[derive(Debug, Clone)]
pub struct BatchPollConfig {
    /// Upper bound on polling rounds
    pub max_rounds: u32,

    /// Pause between rounds
    pub round_delay: Duration,

    /// Phase labels shown while the batch is running
    pub phases: PhaseTable,
}

impl BatchPollConfig {
    pub fn new(max_rounds: u32, round_delay: Duration) -> Self {
        Self {
            max_rounds,
            round_delay,
            phases: PhaseTable::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// - STUDIO_BATCH_MAX_ROUNDS (optional, default: 90)
    /// - STUDIO_BATCH_ROUND_DELAY_SECS (optional, seconds, default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_rounds = std::env::var("STUDIO_BATCH_MAX_ROUNDS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_rounds);

        let round_delay = std::env::var("STUDIO_BATCH_ROUND_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.round_delay);

        Self {
            max_rounds,
            round_delay,
            ..defaults
        }
    }

    pub fn with_phases(mut self, phases: PhaseTable) -> Self {
        self.phases = phases;
        self
    }

    /// Worst-case wall-clock time spent waiting between rounds
    pub fn max_wait(&self) -> Duration {
        self.round_delay * self.max_rounds.saturating_sub(1)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), PollError> {
        if self.max_rounds == 0 {
            return Err(PollError::InvalidConfig(
                "max_rounds must be greater than 0".to_string(),
            ));
        }

        let mut previous = f64::NEG_INFINITY;
        for step in &self.phases.steps {
            if !(0.0..=1.0).contains(&step.min_ready) {
                return Err(PollError::InvalidConfig(format!(
                    "phase threshold {} is outside 0..=1",
                    step.min_ready
                )));
            }
            if step.min_ready < previous {
                return Err(PollError::InvalidConfig(
                    "phase thresholds must be ascending".to_string(),
                ));
            }
            previous = step.min_ready;
        }

        Ok(())
    }
}

impl Default for BatchPollConfig {
    fn default() -> Self {
        Self::new(90, Duration::from_secs(10))
    }
}

/// Single-job poller configuration
#[derive(Debug, Clone)]
pub struct SinglePollConfig {
    pub max_rounds: u32,
    pub round_delay: Duration,
}

impl SinglePollConfig {
    pub fn new(max_rounds: u32, round_delay: Duration) -> Self {
        Self {
            max_rounds,
            round_delay,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// - STUDIO_SINGLE_MAX_ROUNDS (optional, default: 120)
    /// - STUDIO_SINGLE_ROUND_DELAY_MS (optional, milliseconds, default: 2500)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_rounds = std::env::var("STUDIO_SINGLE_MAX_ROUNDS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_rounds);

        let round_delay = std::env::var("STUDIO_SINGLE_ROUND_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.round_delay);

        Self {
            max_rounds,
            round_delay,
        }
    }

    pub fn validate(&self) -> Result<(), PollError> {
        if self.max_rounds == 0 {
            return Err(PollError::InvalidConfig(
                "max_rounds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SinglePollConfig {
    fn default() -> Self {
        Self::new(120, Duration::from_millis(2500))
    }
}
