//! Linear Kalman filter over projected flight positions
//!
//! State vector is `[x, vx, y, vy]`. Velocity is not estimated by the filter:
//! each prediction overwrites it with the externally measured velocity, and the
//! covariance is rebuilt from the process noise alone (`F·Q·Fᵀ + Q`).

use crate::config::FilterConfig;
use crate::error::{FilterError, FilterResult};
use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2, Vector4};
use tracing::trace;

/// Kalman estimator for a single flight
#[derive(Debug, Clone)]
pub struct KalmanEstimator {
    /// State vector [x, vx, y, vy]
    state: Vector4<f64>,
    /// Estimate covariance
    covariance: Matrix4<f64>,
    /// Selects (x, y) from the state
    observation_model: Matrix2x4<f64>,
    /// Observation noise covariance
    observation_noise: Matrix2<f64>,
    /// Process noise coupling matrix, scaled
    prediction_noise: Matrix4<f64>,
    /// Number of successful updates
    update_count: u64,
}

impl KalmanEstimator {
    /// Create a new estimator
    pub fn new(
        start_position: [f64; 2],
        start_velocity: [f64; 2],
        observation_noise: f64,
        prediction_noise: f64,
    ) -> Self {
        let state = Vector4::new(
            start_position[0],
            start_velocity[0],
            start_position[1],
            start_velocity[1],
        );

        #[rustfmt::skip]
        let observation_model = Matrix2x4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
        );

        #[rustfmt::skip]
        let coupling = Matrix4::new(
            0.0, 1.0, 0.0, 0.0,
            1.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 1.0,
        );

        trace!(
            "Kalman estimator initialized at ({}, {}) with velocity ({}, {})",
            start_position[0], start_position[1], start_velocity[0], start_velocity[1]
        );

        Self {
            state,
            covariance: Matrix4::identity(),
            observation_model,
            observation_noise: Matrix2::identity() * observation_noise.powi(2),
            prediction_noise: coupling * prediction_noise,
            update_count: 0,
        }
    }

    /// Create an estimator using noise values from a config
    pub fn with_config(start_position: [f64; 2], start_velocity: [f64; 2], config: &FilterConfig) -> Self {
        Self::new(
            start_position,
            start_velocity,
            config.observation_noise,
            config.prediction_noise,
        )
    }

    /// State transition for a time step
    #[rustfmt::skip]
    pub fn transition(dt: f64) -> Matrix4<f64> {
        Matrix4::new(
            1.0, dt,  0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, dt,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Advance by `dt` using the supplied velocity as a known control input
    pub fn predict(&mut self, dt: f64, velocity: [f64; 2]) -> (Vector4<f64>, Matrix4<f64>) {
        let f = Self::transition(dt);

        self.state[1] = velocity[0];
        self.state[3] = velocity[1];
        self.state = f * self.state;

        self.covariance = f * self.prediction_noise * f.transpose() + self.prediction_noise;

        trace!(
            "Predicted position: ({:.1}, {:.1}) after dt {}",
            self.state[0], self.state[2], dt
        );
        (self.state, self.covariance)
    }

    /// Correct the state with an observed (x, y) position.
    ///
    /// Fails without touching the filter if the innovation covariance cannot be
    /// inverted.
    pub fn update(&mut self, observation: [f64; 2], dt: f64) -> FilterResult<()> {
        let h = self.observation_model;
        let innovation_cov = h * self.covariance * h.transpose() + self.observation_noise;

        let inverse = innovation_cov
            .try_inverse()
            .filter(|inv| inv.iter().all(|v| v.is_finite()))
            .ok_or_else(|| FilterError::singular(innovation_cov.determinant()))?;

        let gain = self.covariance * h.transpose() * inverse;

        self.covariance = self.covariance - gain * h * self.covariance;

        let innovation = Vector2::new(observation[0], observation[1]) - h * self.state;
        self.state += gain * innovation;

        self.update_count += 1;
        trace!(
            "Updated position: ({:.1}, {:.1}), innovation ({:.2}, {:.2}), dt {}",
            self.state[0], self.state[2], innovation[0], innovation[1], dt
        );

        Ok(())
    }

    /// Current position estimate (x, y)
    pub fn position(&self) -> [f64; 2] {
        [self.state[0], self.state[2]]
    }

    /// Current velocity (vx, vy)
    pub fn velocity(&self) -> [f64; 2] {
        [self.state[1], self.state[3]]
    }

    /// Current state vector [x, vx, y, vy]
    pub fn state(&self) -> Vector4<f64> {
        self.state
    }

    pub fn covariance(&self) -> Matrix4<f64> {
        self.covariance
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

// ============================================================================
// TESTS
// ============================================================================
