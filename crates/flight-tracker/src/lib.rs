//! # Flight Tracker - Track Building
//!
//! Drives the core components over a whole flight:
//! - Dead-reckoning overlay, one fresh step from each raw observation
//! - Kalman-filtered track stepped at a fixed cadence over resampled
//!   observations
//! - Bounding region and raw track for renderers

pub mod builder;
pub mod error;

pub use builder::{BuildStats, TrajectoryBuilder};
pub use error::{TrackerError, TrackerResult};

use flight_core::{CartPoint3, CoreResult, GeoBounds, GeoConfig, GeoPoint, GeoProjector};
use flight_filter::FilterConfig;
use serde::{Deserialize, Serialize};

/// Default Kalman cadence, in feed time units
pub const DEFAULT_CADENCE: u64 = 50;

/// Track building configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Fixed step between Kalman iterations
    pub cadence: u64,
    /// Projection and dead-reckoning constants
    pub geo: GeoConfig,
    /// Kalman noise parameters
    pub filter: FilterConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
            geo: GeoConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let cadence = env_parse("FLIGHT_CADENCE").unwrap_or(defaults.cadence);

        let observation_noise =
            env_parse("FLIGHT_OBS_NOISE").unwrap_or(defaults.filter.observation_noise);

        let prediction_noise =
            env_parse("FLIGHT_PRED_NOISE").unwrap_or(defaults.filter.prediction_noise);

        let earth_radius_m = env_parse("FLIGHT_EARTH_RADIUS").unwrap_or(defaults.geo.earth_radius_m);

        let heading_offset_deg =
            env_parse("FLIGHT_HEADING_OFFSET").unwrap_or(defaults.geo.heading_offset_deg);

        Self {
            cadence,
            geo: GeoConfig {
                earth_radius_m,
                heading_offset_deg,
                ..defaults.geo
            },
            filter: FilterConfig::new(observation_noise, prediction_noise),
        }
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if self.cadence == 0 {
            return Err(TrackerError::invalid_config("cadence must be positive"));
        }
        self.geo.validate()?;
        self.filter.validate()?;
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Everything a renderer needs for one flight
#[derive(Debug, Clone, Serialize)]
pub struct FlightTracks {
    /// Raw observed positions
    pub raw: Vec<GeoPoint>,
    /// One-step dead-reckoning predictions, seeded with the first observation
    pub dead_reckoning: Vec<GeoPoint>,
    /// Filtered (x, y) with the resampled z, in the Cartesian frame
    pub kalman: Vec<CartPoint3>,
    /// Map framing region
    pub bounds: GeoBounds,
    pub stats: BuildStats,
}

impl FlightTracks {
    /// Map the filtered track back to latitude/longitude.
    ///
    /// Inherits the projector's `x <= 0` longitude limitation.
    pub fn kalman_geodetic(&self, projector: &GeoProjector) -> CoreResult<Vec<GeoPoint>> {
        self.kalman.iter().map(|p| projector.to_geodetic(p)).collect()
    }

    pub fn to_json(&self, pretty: bool) -> TrackerResult<String> {
        self.to_json_with(pretty, None)
    }

    /// Serialize the tracks. With a projector, the filtered track is also
    /// emitted as `kalman_geodetic`.
    pub fn to_json_with(&self, pretty: bool, projector: Option<&GeoProjector>) -> TrackerResult<String> {
        let output = TracksOutput {
            tracks: self,
            kalman_geodetic: projector.map(|p| self.kalman_geodetic(p)).transpose()?,
        };

        let json = if pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        Ok(json)
    }
}

#[derive(Serialize)]
struct TracksOutput<'a> {
    #[serde(flatten)]
    tracks: &'a FlightTracks,
    #[serde(skip_serializing_if = "Option::is_none")]
    kalman_geodetic: Option<Vec<GeoPoint>>,
}

// ============================================================================
// TESTS
// ============================================================================
