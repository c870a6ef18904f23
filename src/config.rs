//! Simulation settings.
//!
//! Settings load from JSON, every field is optional:
//!
//! ```json
//! {
//!   "max_iterations": 100,
//!   "stable_ticks": 10,
//!   "max_ticks": 1000,
//!   "timeout_policy": "warn",
//!   "log_level": "info"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// What a propagation pass does when it hits the iteration cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Log a warning, report a warning fault and keep the partially settled values.
    Warn,
    /// Fail the pass with [SimError::SimulationTimeout](crate::SimError::SimulationTimeout).
    Abort,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        TimeoutPolicy::Warn
    }
}

/// Limits and policies of a [Circuit](crate::Circuit).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Iterations one propagation pass may take before it is considered unstable.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Consecutive ticks with unchanged outputs after which a run counts as stable.
    #[serde(default = "default_stable_ticks")]
    pub stable_ticks: usize,

    /// Ticks after which a run gives up waiting for stability.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,

    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_iterations() -> usize {
    100
}

fn default_stable_ticks() -> usize {
    10
}

fn default_max_ticks() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            stable_ticks: default_stable_ticks(),
            max_ticks: default_max_ticks(),
            timeout_policy: TimeoutPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

impl SimConfig {
    /// Parses and validates settings from a JSON string.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates settings from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.stable_ticks == 0 {
            return Err(ConfigError::Validation(
                "stable_ticks must be at least 1".to_string(),
            ));
        }
        if self.max_ticks < self.stable_ticks {
            return Err(ConfigError::Validation(format!(
                "max_ticks ({}) must not be smaller than stable_ticks ({})",
                self.max_ticks, self.stable_ticks
            )));
        }
        Ok(())
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    pub fn with_ticks(mut self, stable_ticks: usize, max_ticks: usize) -> Self {
        self.stable_ticks = stable_ticks;
        self.max_ticks = max_ticks;
        self
    }
}
