//! Constant-velocity dead reckoning
//!
//! Projects a position forward by `speed * dt` along a compass heading, either
//! in degrees (flat-Earth small-angle step) or directly on a cached Cartesian
//! position.

use crate::config::GeoConfig;
use crate::error::{CoreError, CoreResult};
use crate::geo::{CartPoint3, GeoPoint};
use std::f64::consts::PI;
use tracing::trace;

/// Stateless dead-reckoning predictor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadReckoner {
    earth_radius_m: f64,
    heading_offset_deg: f64,
}

impl DeadReckoner {
    pub fn new(earth_radius_m: f64, heading_offset_deg: f64) -> Self {
        Self {
            earth_radius_m,
            heading_offset_deg,
        }
    }

    pub fn from_config(config: &GeoConfig) -> Self {
        Self::new(config.earth_radius_m, config.heading_offset_deg)
    }

    /// Predict the geodetic position after `dt` from `(lat0, lon0)`.
    ///
    /// The longitude step divides by `sin(lat0)`, so an equatorial start point
    /// is rejected rather than producing an infinite longitude.
    pub fn predict(
        &self,
        lat0: f64,
        lon0: f64,
        speed: f64,
        heading: f64,
        dt: f64,
    ) -> CoreResult<GeoPoint> {
        let heading_rad = heading.to_radians();
        let delta_x = speed * heading_rad.sin() * dt;
        let delta_y = speed * heading_rad.cos() * dt;

        let sin_lat = lat0.to_radians().sin();
        if sin_lat == 0.0 {
            return Err(CoreError::polar_singularity(
                "dead_reckoning",
                format!("sin(latitude) is zero at latitude {}", lat0),
            ));
        }

        let lat = lat0 + 180.0 / PI * delta_y / self.earth_radius_m;
        let lon = lon0 + 180.0 / PI / sin_lat * delta_x / self.earth_radius_m;

        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoreError::polar_singularity(
                "dead_reckoning",
                format!("non-finite prediction from ({}, {})", lat0, lon0),
            ));
        }

        trace!("Dead reckoning ({:.6}, {:.6}) -> ({:.6}, {:.6})", lat0, lon0, lat, lon);
        Ok(GeoPoint::new(lat, lon))
    }

    /// `predict` starting from a `GeoPoint`
    pub fn predict_from(
        &self,
        origin: &GeoPoint,
        speed: f64,
        heading: f64,
        dt: f64,
    ) -> CoreResult<GeoPoint> {
        self.predict(origin.latitude, origin.longitude, speed, heading, dt)
    }

    /// Planar velocity in the Cartesian frame for a compass heading
    pub fn cartesian_velocity(&self, speed: f64, heading: f64) -> [f64; 2] {
        let corrected = (heading - self.heading_offset_deg).to_radians();
        [speed * corrected.sin(), speed * corrected.cos()]
    }

    /// Advance a cached Cartesian position by `dt`. Altitude axis is untouched.
    pub fn predict_cart(&self, cart: &CartPoint3, speed: f64, heading: f64, dt: f64) -> CartPoint3 {
        let [vx, vy] = self.cartesian_velocity(speed, heading);
        CartPoint3::new(cart.x + vx * dt, cart.y + vy * dt, cart.z)
    }
}

impl Default for DeadReckoner {
    fn default() -> Self {
        Self::from_config(&GeoConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
