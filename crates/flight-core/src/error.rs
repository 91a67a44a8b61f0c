//! Error types for the flight trajectory core

use thiserror::Error;

/// Core error type for projection, dead reckoning and trajectory lookup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Trajectory has no valid observations")]
    EmptyTrajectory,

    #[error("Time step {current} at index {index} precedes {previous}")]
    UnorderedTimeSteps {
        index: usize,
        previous: u64,
        current: u64,
    },

    #[error("Degenerate interpolation interval: observations share time step {time_step}")]
    DegenerateInterpolationInterval { time_step: u64 },

    #[error("Polar singularity in {operation}: {detail}")]
    PolarSingularity {
        operation: &'static str,
        detail: String,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn degenerate_interval(time_step: u64) -> Self {
        Self::DegenerateInterpolationInterval { time_step }
    }

    pub fn polar_singularity(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::PolarSingularity {
            operation,
            detail: detail.into(),
        }
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
