//! Tracker error types

use flight_core::CoreError;
use flight_filter::FilterError;
use thiserror::Error;

/// Errors surfaced while building tracks for a flight
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Trajectory error: {0}")]
    Core(#[from] CoreError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Filter update failed at time step {time_step}: {source}")]
    FilterStep {
        time_step: u64,
        #[source]
        source: FilterError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrackerError {
    pub fn filter_step(time_step: u64, source: FilterError) -> Self {
        Self::FilterStep { time_step, source }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
