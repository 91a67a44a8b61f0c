//! # Flight Filter
//!
//! Linear Kalman estimation over flight positions projected into the
//! Cartesian frame.
//! Features:
//! - 4-state constant-velocity model `[x, vx, y, vy]`
//! - Externally measured velocity used as a control input on every step
//! - Typed failure when the innovation covariance is singular

pub mod config;
pub mod error;
pub mod kalman;

pub use config::FilterConfig;
pub use error::{FilterError, FilterResult};
pub use kalman::KalmanEstimator;
