//! Error types for the filter module

use thiserror::Error;

/// Errors that can occur in filter operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Innovation covariance is singular (determinant {determinant})")]
    SingularCovariance { determinant: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FilterError {
    pub fn singular(determinant: f64) -> Self {
        Self::SingularCovariance { determinant }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
