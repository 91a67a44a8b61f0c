//! Geographic types and the spherical geodetic <-> Cartesian projection
//!
//! The projection maps latitude/longitude onto an Earth-centred Cartesian
//! frame so that motion math can use plain vector arithmetic. It is only
//! accurate over the small extent of a single flight.

use crate::config::GeoConfig;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Geographic position (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Convert to (latitude, longitude) tuple
    pub fn to_tuple(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Point in the Earth-centred Cartesian frame (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartPoint3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CartPoint3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Linear blend: `self * (1 - t) + other * t`
    pub fn lerp(&self, other: &CartPoint3, t: f64) -> CartPoint3 {
        CartPoint3::new(
            self.x * (1.0 - t) + other.x * t,
            self.y * (1.0 - t) + other.y * t,
            self.z * (1.0 - t) + other.z * t,
        )
    }

    /// Planar (x, y) components
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Spherical-Earth projector between geodetic and Cartesian coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoProjector {
    earth_radius_m: f64,
}

impl GeoProjector {
    pub fn new(earth_radius_m: f64) -> Self {
        Self { earth_radius_m }
    }

    pub fn from_config(config: &GeoConfig) -> Self {
        Self::new(config.earth_radius_m)
    }

    pub fn earth_radius(&self) -> f64 {
        self.earth_radius_m
    }

    /// Project latitude/longitude (degrees) to Cartesian meters
    pub fn to_local(&self, latitude: f64, longitude: f64) -> CartPoint3 {
        let lat = latitude.to_radians();
        let lon = longitude.to_radians();

        CartPoint3::new(
            self.earth_radius_m * lat.cos() * lon.cos(),
            self.earth_radius_m * lat.cos() * lon.sin(),
            self.earth_radius_m * lat.sin(),
        )
    }

    /// Recover latitude/longitude (degrees) from a Cartesian point.
    ///
    /// Longitude comes from `atan(y / x)`, not `atan2`, so it is only correct
    /// for `x > 0`. Points on the `x = 0` plane or at the origin are rejected.
    pub fn to_geodetic(&self, point: &CartPoint3) -> CoreResult<GeoPoint> {
        let r = point.norm();
        if r == 0.0 {
            return Err(CoreError::polar_singularity(
                "to_geodetic",
                "point is at the frame origin",
            ));
        }
        if point.x == 0.0 {
            return Err(CoreError::polar_singularity(
                "to_geodetic",
                format!("x = 0 (y = {}, z = {})", point.y, point.z),
            ));
        }

        let longitude = (point.y / point.x).atan().to_degrees();
        let latitude = (point.z / r).asin().to_degrees();

        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoreError::polar_singularity(
                "to_geodetic",
                format!("non-finite result for {:?}", point),
            ));
        }

        Ok(GeoPoint::new(latitude, longitude))
    }
}

impl Default for GeoProjector {
    fn default() -> Self {
        Self::from_config(&GeoConfig::default())
    }
}

/// Geographic bounding box, used by map renderers to frame a flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Tight bounds over a set of points. `None` for an empty set.
    pub fn enclosing(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(
            first.latitude,
            first.latitude,
            first.longitude,
            first.longitude,
        );

        for p in iter {
            bounds.min_lat = bounds.min_lat.min(p.latitude);
            bounds.max_lat = bounds.max_lat.max(p.latitude);
            bounds.min_lng = bounds.min_lng.min(p.longitude);
            bounds.max_lng = bounds.max_lng.max(p.longitude);
        }

        Some(bounds)
    }

    /// Expand each axis by `margin` times its extent on both sides
    pub fn with_margin(&self, margin: f64) -> Self {
        let lat_pad = (self.max_lat - self.min_lat) * margin;
        let lng_pad = (self.max_lng - self.min_lng) * margin;

        Self {
            min_lat: self.min_lat - lat_pad,
            max_lat: self.max_lat + lat_pad,
            min_lng: self.min_lng - lng_pad,
            max_lng: self.max_lng + lng_pad,
        }
    }

    /// Check if a position is within these bounds
    pub fn contains(&self, position: &GeoPoint) -> bool {
        position.latitude >= self.min_lat
            && position.latitude <= self.max_lat
            && position.longitude >= self.min_lng
            && position.longitude <= self.max_lng
    }

    /// Get the center of these bounds
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
