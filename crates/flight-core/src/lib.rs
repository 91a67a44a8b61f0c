//! # Flight Core
//!
//! Core domain models for flight trajectory smoothing.
//! This crate provides the observation model, the spherical geodetic
//! projection, constant-velocity dead reckoning and time-indexed lookup over
//! an ordered trajectory. It performs no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod dead_reckoning;
pub mod error;
pub mod geo;
pub mod trajectory;

pub use config::GeoConfig;
pub use dead_reckoning::DeadReckoner;
pub use error::{CoreError, CoreResult};
pub use geo::{CartPoint3, GeoBounds, GeoPoint, GeoProjector};
pub use trajectory::{InterpolatedState, Trajectory};

// ============================================================================
// RECORD MODELS
// ============================================================================

/// One parsed row from the source feed, speed still in source units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Ground speed in source units (converted by `10/36` to m/s)
    pub ground_speed: f64,
    /// Compass heading in degrees (0 = north, clockwise)
    pub heading: f64,
    /// Feed timestamp
    pub time_step: u64,
}

impl FlightRecord {
    pub fn new(latitude: f64, longitude: f64, ground_speed: f64, heading: f64, time_step: u64) -> Self {
        Self {
            latitude,
            longitude,
            ground_speed,
            heading,
            time_step,
        }
    }

    /// Ground speed converted to meters per second
    pub fn speed_mps(&self) -> f64 {
        self.ground_speed * config::SOURCE_SPEED_TO_MPS
    }
}

// ============================================================================
// OBSERVATION MODELS
// ============================================================================

/// Timestamped geodetic and kinematic sample with its cached Cartesian
/// projection. Fields are read-only; the projection is computed once here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    latitude: f64,
    longitude: f64,
    speed: f64,
    heading: f64,
    time_step: u64,
    cart: CartPoint3,
}

impl Observation {
    /// Build an observation from a feed record. Non-finite fields and
    /// out-of-range coordinates are rejected.
    pub fn from_record(record: &FlightRecord, projector: &GeoProjector) -> CoreResult<Self> {
        let fields = [
            ("latitude", record.latitude),
            ("longitude", record.longitude),
            ("ground_speed", record.ground_speed),
            ("heading", record.heading),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CoreError::invalid_record(format!(
                "{} is not finite ({}) at time step {}",
                name, value, record.time_step
            )));
        }

        let position = GeoPoint::new(record.latitude, record.longitude);
        if !position.is_valid() {
            return Err(CoreError::invalid_record(format!(
                "position ({}, {}) out of range at time step {}",
                record.latitude, record.longitude, record.time_step
            )));
        }

        Ok(Self {
            latitude: record.latitude,
            longitude: record.longitude,
            speed: record.speed_mps(),
            heading: record.heading,
            time_step: record.time_step,
            cart: projector.to_local(record.latitude, record.longitude),
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Speed in m/s
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    /// Cached Cartesian position
    pub fn cart(&self) -> CartPoint3 {
        self.cart
    }

    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[latitude: {}, longitude: {}, speed: {}, heading: {}, time step: {}]",
            self.latitude, self.longitude, self.speed, self.heading, self.time_step
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_conversion() {
        let record = FlightRecord::new(50.0, 20.0, 360.0, 90.0, 1000);
        assert!((record.speed_mps() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_observation_caches_projection() {
        let projector = GeoProjector::default();
        let record = FlightRecord::new(50.0, 20.0, 360.0, 90.0, 1000);
        let obs = Observation::from_record(&record, &projector).unwrap();

        assert_eq!(obs.cart(), projector.to_local(50.0, 20.0));
        assert!((obs.speed() - 100.0).abs() < 1e-9);
        assert_eq!(obs.time_step(), 1000);
        assert_eq!(obs.geo(), GeoPoint::new(50.0, 20.0));
    }

    #[test]
    fn test_observation_rejects_nan() {
        let projector = GeoProjector::default();
        let record = FlightRecord::new(f64::NAN, 20.0, 360.0, 90.0, 1000);
        let err = Observation::from_record(&record, &projector).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord(_)));
    }

    #[test]
    fn test_observation_rejects_out_of_range_position() {
        let projector = GeoProjector::default();
        for (lat, lon) in [(90.5, 20.0), (-91.0, 20.0), (50.0, 180.1), (50.0, -200.0)] {
            let record = FlightRecord::new(lat, lon, 360.0, 90.0, 1000);
            let err = Observation::from_record(&record, &projector).unwrap_err();
            assert!(matches!(err, CoreError::InvalidRecord(_)), "({}, {})", lat, lon);
        }

        let edge = FlightRecord::new(-90.0, 180.0, 0.0, 0.0, 1);
        assert!(Observation::from_record(&edge, &projector).is_ok());
    }

    #[test]
    fn test_observation_display() {
        let projector = GeoProjector::default();
        let record = FlightRecord::new(50.0, 20.0, 36.0, 45.0, 7);
        let obs = Observation::from_record(&record, &projector).unwrap();
        assert_eq!(
            obs.to_string(),
            "[latitude: 50, longitude: 20, speed: 10, heading: 45, time step: 7]"
        );
    }
}
