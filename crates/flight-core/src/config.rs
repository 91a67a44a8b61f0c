//! Geodetic constants shared by the projector, dead reckoning and bounds

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Spherical Earth radius (WGS84 semi-major axis) in meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Offset between compass heading and the Cartesian frame axes, in degrees
pub const HEADING_FRAME_OFFSET_DEG: f64 = 110.0;

/// Fraction of each axis extent added around a flight's bounding box
pub const BOUNDS_MARGIN: f64 = 0.01;

/// Knots-style source speed to m/s
pub const SOURCE_SPEED_TO_MPS: f64 = 10.0 / 36.0;

/// Geodetic configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Sphere radius used by the projection and dead reckoning
    pub earth_radius_m: f64,
    /// Subtracted from compass heading before Cartesian displacement
    pub heading_offset_deg: f64,
    /// Bounding box margin fraction
    pub bounds_margin: f64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            earth_radius_m: EARTH_RADIUS_M,
            heading_offset_deg: HEADING_FRAME_OFFSET_DEG,
            bounds_margin: BOUNDS_MARGIN,
        }
    }
}

impl GeoConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.earth_radius_m.is_finite() && self.earth_radius_m > 0.0) {
            return Err(CoreError::configuration(format!(
                "earth radius must be positive, got {}",
                self.earth_radius_m
            )));
        }
        if !self.heading_offset_deg.is_finite() {
            return Err(CoreError::configuration("heading offset must be finite"));
        }
        if !(self.bounds_margin.is_finite() && self.bounds_margin >= 0.0) {
            return Err(CoreError::configuration(format!(
                "bounds margin must be non-negative, got {}",
                self.bounds_margin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.heading_offset_deg, 110.0);
    }

    #[test]
    fn test_rejects_bad_radius() {
        let config = GeoConfig {
            earth_radius_m: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
    }
}
