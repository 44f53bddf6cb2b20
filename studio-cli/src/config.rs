//! Configuration module
//!
//! Settings shared by every command: API location, data directory and the
//! poll pacing read from the environment.

use std::path::PathBuf;
use studio_poller::{BatchPollConfig, SinglePollConfig};

/// Data directory used when none is given
pub const DEFAULT_DATA_DIR: &str = "studio-data";

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the generation API
    pub api_url: String,
    /// Directory holding credentials, characters and the gallery
    pub data_dir: PathBuf,
    /// Pacing of turnaround batches
    pub batch: BatchPollConfig,
    /// Pacing of single-image generations
    pub single: SinglePollConfig,
}

impl Config {
    pub fn new(api_url: String, data_dir: Option<PathBuf>) -> Self {
        Self {
            api_url,
            data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            batch: BatchPollConfig::from_env(),
            single: SinglePollConfig::from_env(),
        }
    }
}
