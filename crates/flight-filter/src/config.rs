//! Configuration for the Kalman estimator

use crate::error::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};

/// Default observation noise (standard deviation, meters)
pub const DEFAULT_OBSERVATION_NOISE: f64 = 30.0;

/// Default prediction noise scale
pub const DEFAULT_PREDICTION_NOISE: f64 = 1.0;

/// Noise parameters for the estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Squared onto the diagonal of the observation noise covariance
    pub observation_noise: f64,
    /// Scales the fixed process noise coupling matrix
    pub prediction_noise: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            observation_noise: DEFAULT_OBSERVATION_NOISE,
            prediction_noise: DEFAULT_PREDICTION_NOISE,
        }
    }
}

impl FilterConfig {
    pub fn new(observation_noise: f64, prediction_noise: f64) -> Self {
        Self {
            observation_noise,
            prediction_noise,
        }
    }

    /// Heavier smoothing, trusts the motion model more
    pub fn smooth() -> Self {
        Self {
            observation_noise: 60.0,
            ..Default::default()
        }
    }

    /// Follows observations closely
    pub fn responsive() -> Self {
        Self {
            observation_noise: 10.0,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> FilterResult<()> {
        if !(self.observation_noise.is_finite() && self.observation_noise >= 0.0) {
            return Err(FilterError::invalid_config(format!(
                "observation noise must be finite and non-negative, got {}",
                self.observation_noise
            )));
        }
        if !(self.prediction_noise.is_finite() && self.prediction_noise >= 0.0) {
            return Err(FilterError::invalid_config(format!(
                "prediction noise must be finite and non-negative, got {}",
                self.prediction_noise
            )));
        }
        Ok(())
    }
}
