//! Track builder: drives dead reckoning and the Kalman estimator over a flight

use crate::error::{TrackerError, TrackerResult};
use crate::{FlightTracks, TrackerConfig};
use flight_core::{CartPoint3, DeadReckoner, GeoPoint, Trajectory};
use flight_filter::{FilterConfig, KalmanEstimator};

use serde::Serialize;
use tracing::debug;

/// Counters from one build
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub observations: usize,
    pub dead_reckoning_points: usize,
    pub filter_steps: usize,
    /// Filter steps whose observation was interpolated between samples
    pub synthetic_samples: usize,
}

/// Builds prediction and filtered-estimate sequences for a flight
#[derive(Debug, Clone)]
pub struct TrajectoryBuilder {
    config: TrackerConfig,
    reckoner: DeadReckoner,
}

impl TrajectoryBuilder {
    /// Create a builder, validating the configuration
    pub fn new(config: TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reckoner: DeadReckoner::from_config(&config.geo),
        })
    }

    /// Dead-reckoning overlay.
    ///
    /// Every prediction starts from the previous raw observation, so errors do
    /// not accumulate across steps.
    pub fn build_dead_reckoning(&self, trajectory: &Trajectory) -> TrackerResult<Vec<GeoPoint>> {
        let observations = trajectory.observations();
        let mut points = Vec::with_capacity(observations.len());
        points.push(trajectory.first().geo());

        for pair in observations.windows(2) {
            let (prev, current) = (&pair[0], &pair[1]);
            let dt = (current.time_step() - prev.time_step()) as f64;
            let predicted = self.reckoner.predict_from(&prev.geo(), prev.speed(), prev.heading(), dt)?;
            points.push(predicted);
        }

        debug!("Dead reckoning produced {} points", points.len());
        Ok(points)
    }

    /// Kalman track using the configured cadence and noise
    pub fn build_kalman(&self, trajectory: &Trajectory) -> TrackerResult<Vec<CartPoint3>> {
        self.build_kalman_with(trajectory, self.config.cadence, &self.config.filter)
            .map(|(points, _)| points)
    }

    /// Kalman track with explicit cadence and noise. Also returns the number of
    /// interpolated samples used.
    pub fn build_kalman_with(
        &self,
        trajectory: &Trajectory,
        cadence: u64,
        filter: &FilterConfig,
    ) -> TrackerResult<(Vec<CartPoint3>, usize)> {
        if cadence == 0 {
            return Err(TrackerError::invalid_config("cadence must be positive"));
        }
        filter.validate()?;

        let first = trajectory.first();
        let start_velocity = self.reckoner.cartesian_velocity(first.speed(), first.heading());
        let mut estimator = KalmanEstimator::with_config(first.cart().xy(), start_velocity, filter);

        let (start, end) = trajectory.time_span();
        let dt = cadence as f64;
        let mut points = Vec::new();
        let mut synthetic = 0;

        let mut next_step = start.checked_add(cadence);
        while let Some(time_step) = next_step.filter(|t| *t <= end) {
            let sample = trajectory.at(time_step)?;
            if sample.is_synthetic() {
                synthetic += 1;
            }

            let velocity = self.reckoner.cartesian_velocity(sample.speed, sample.heading);
            estimator.predict(dt, velocity);
            estimator
                .update(sample.cart_xy(), dt)
                .map_err(|e| TrackerError::filter_step(time_step, e))?;

            let [x, y] = estimator.position();
            points.push(CartPoint3::new(x, y, sample.cart.z));

            next_step = time_step.checked_add(cadence);
        }

        debug!(
            "Kalman track produced {} points over {}..{} ({} interpolated)",
            points.len(),
            start,
            end,
            synthetic
        );
        Ok((points, synthetic))
    }

    /// Build every track for a flight
    pub fn build(&self, trajectory: &Trajectory) -> TrackerResult<FlightTracks> {
        let dead_reckoning = self.build_dead_reckoning(trajectory)?;
        let (kalman, synthetic_samples) =
            self.build_kalman_with(trajectory, self.config.cadence, &self.config.filter)?;

        let stats = BuildStats {
            observations: trajectory.len(),
            dead_reckoning_points: dead_reckoning.len(),
            filter_steps: kalman.len(),
            synthetic_samples,
        };

        Ok(FlightTracks {
            raw: trajectory.geo_points(),
            dead_reckoning,
            kalman,
            bounds: trajectory.bounds(),
            stats,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use flight_core::{CoreError, FlightRecord};

    fn trajectory(rows: &[(f64, f64, f64, f64, u64)]) -> Trajectory {
        let records: Vec<FlightRecord> = rows
            .iter()
            .map(|&(lat, lon, speed, heading, ts)| FlightRecord::new(lat, lon, speed, heading, ts))
            .collect();
        Trajectory::from_records(&records, &Default::default()).unwrap()
    }

    fn builder() -> TrajectoryBuilder {
        TrajectoryBuilder::new(TrackerConfig::default()).unwrap()
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = TrackerConfig {
            cadence: 0,
            ..Default::default()
        };
        assert!(TrajectoryBuilder::new(config).is_err());
    }

    #[test]
    fn test_dead_reckoning_single_observation() {
        let traj = trajectory(&[(50.0, 20.0, 360.0, 90.0, 1000)]);
        let points = builder().build_dead_reckoning(&traj).unwrap();
        assert_eq!(points, vec![GeoPoint::new(50.0, 20.0)]);
    }

    #[test]
    fn test_dead_reckoning_does_not_accumulate() {
        // Stationary aircraft: every prediction lands on the previous raw fix
        let traj = trajectory(&[
            (50.0, 20.0, 0.0, 0.0, 0),
            (50.1, 20.1, 0.0, 0.0, 100),
            (50.2, 20.2, 0.0, 0.0, 250),
        ]);
        let points = builder().build_dead_reckoning(&traj).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[1], GeoPoint::new(50.0, 20.0));
        assert_eq!(points[2], GeoPoint::new(50.1, 20.1));
    }

    #[test]
    fn test_dead_reckoning_equator_fails() {
        let traj = trajectory(&[(0.0, 20.0, 360.0, 90.0, 0), (0.0, 20.1, 360.0, 90.0, 100)]);
        let err = builder().build_dead_reckoning(&traj).unwrap_err();
        assert!(matches!(err, TrackerError::Core(CoreError::PolarSingularity { .. })));
    }

    #[test]
    fn test_kalman_step_count() {
        let traj = trajectory(&[
            (50.0, 20.0, 360.0, 90.0, 0),
            (50.01, 20.02, 360.0, 90.0, 240),
        ]);
        let (points, synthetic) = builder()
            .build_kalman_with(&traj, 50, &FilterConfig::default())
            .unwrap();

        // steps at 50, 100, 150, 200; 250 is past the last observation
        assert_eq!(points.len(), 4);
        assert_eq!(synthetic, 4);
    }

    #[test]
    fn test_kalman_huge_time_span_does_not_preallocate() {
        let traj = trajectory(&[
            (50.0, 20.0, 360.0, 90.0, 0),
            (50.01, 20.02, 360.0, 90.0, u64::MAX),
        ]);
        let (points, synthetic) = builder()
            .build_kalman_with(&traj, u64::MAX / 2, &FilterConfig::default())
            .unwrap();

        // steps at MAX/2 and 2*(MAX/2) = MAX - 1; the next step overflows
        assert_eq!(points.len(), 2);
        assert_eq!(synthetic, 2);
    }

    #[test]
    fn test_kalman_single_observation_is_empty() {
        let traj = trajectory(&[(50.0, 20.0, 360.0, 90.0, 1000)]);
        assert!(builder().build_kalman(&traj).unwrap().is_empty());
    }

    #[test]
    fn test_kalman_carries_resampled_altitude_axis() {
        let traj = trajectory(&[
            (50.0, 20.0, 360.0, 90.0, 0),
            (50.01, 20.02, 360.0, 90.0, 100),
        ]);
        let points = builder().build_kalman(&traj).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].z, traj.at(50).unwrap().cart.z);
        assert_eq!(points[1].z, traj.last().cart().z);
    }

    #[test]
    fn test_build_collects_stats() {
        let traj = trajectory(&[
            (50.0, 20.0, 360.0, 90.0, 0),
            (50.005, 20.01, 360.0, 90.0, 100),
            (50.01, 20.02, 360.0, 90.0, 200),
        ]);
        let tracks = builder().build(&traj).unwrap();

        assert_eq!(tracks.raw.len(), 3);
        assert_eq!(tracks.dead_reckoning.len(), 3);
        assert_eq!(tracks.kalman.len(), 4);
        assert_eq!(
            tracks.stats,
            BuildStats {
                observations: 3,
                dead_reckoning_points: 3,
                filter_steps: 4,
                synthetic_samples: 2,
            }
        );
        assert_eq!(tracks.bounds, traj.bounds());
    }
}
