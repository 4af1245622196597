//! Race configuration types
//!
//! The configuration is a flat record read once per run and never mutated.
//! Field names on the wire are camelCase (`lapLen`, `startDelta`, ...).

use crate::clock;
use crate::types::{RaceError, Result, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Number of targets on each firing line
pub const TARGETS_PER_FIRING_LINE: u32 = 5;

/// Configuration for a single race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    /// Number of main laps a competitor must complete to finish
    pub laps: u32,

    /// Length of a main lap in meters
    pub lap_len: f64,

    /// Length of a penalty lap in meters
    pub penalty_len: f64,

    /// Number of firing lines (five targets each)
    pub firing_lines: u32,

    /// Scheduled start of the race (`HH:MM:SS.mmm`)
    pub start: String,

    /// Maximum tolerated lateness past the assigned start (`H:MM:SS`)
    pub start_delta: String,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            laps: 1,
            lap_len: 1000.0,
            penalty_len: 150.0,
            firing_lines: 1,
            start: "10:00:00.000".to_string(),
            start_delta: "00:01:30".to_string(),
        }
    }
}

impl RaceConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: RaceConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric fields against their allowed ranges
    pub fn validate(&self) -> Result<()> {
        if self.laps < 1 {
            return Err(RaceError::InvalidConfig("laps must be at least 1".to_string()));
        }
        if !(self.lap_len.is_finite() && self.lap_len > 0.0) {
            return Err(RaceError::InvalidConfig(format!(
                "lapLen must be a positive number, got {}",
                self.lap_len
            )));
        }
        if !(self.penalty_len.is_finite() && self.penalty_len > 0.0) {
            return Err(RaceError::InvalidConfig(format!(
                "penaltyLen must be a positive number, got {}",
                self.penalty_len
            )));
        }
        Ok(())
    }

    /// Builder method: set the lap count
    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = laps;
        self
    }

    /// Builder method: set the main lap length
    pub fn with_lap_len(mut self, meters: f64) -> Self {
        self.lap_len = meters;
        self
    }

    /// Builder method: set the penalty lap length
    pub fn with_penalty_len(mut self, meters: f64) -> Self {
        self.penalty_len = meters;
        self
    }

    /// Builder method: set the number of firing lines
    pub fn with_firing_lines(mut self, firing_lines: u32) -> Self {
        self.firing_lines = firing_lines;
        self
    }

    /// Builder method: set the scheduled race start
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Builder method: set the allowed start lateness
    pub fn with_start_delta(mut self, start_delta: impl Into<String>) -> Self {
        self.start_delta = start_delta.into();
        self
    }

    /// Total number of targets each competitor shoots at
    pub fn total_targets(&self) -> u64 {
        u64::from(self.firing_lines) * u64::from(TARGETS_PER_FIRING_LINE)
    }

    /// Allowed start lateness, or `None` if `startDelta` does not parse
    pub fn start_delta(&self) -> Option<Duration> {
        clock::parse_clock_duration(&self.start_delta).ok()
    }

    /// Scheduled race start as a time of day
    pub fn start_time(&self) -> Result<Timestamp> {
        clock::parse_timestamp(&self.start)
    }
}
