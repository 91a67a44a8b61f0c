//! Ordered observation store with time-indexed lookup and interpolation

use crate::config::GeoConfig;
use crate::error::{CoreError, CoreResult};
use crate::geo::{CartPoint3, GeoBounds, GeoPoint, GeoProjector};
use crate::{FlightRecord, Observation};
use serde::Serialize;
use tracing::debug;

/// State of the flight at an arbitrary time step.
///
/// Only `cart` is meaningful for synthetic states; `geo` is `None` there
/// because the geodetic position is not recomputed after blending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterpolatedState {
    pub time_step: u64,
    pub cart: CartPoint3,
    /// Speed in m/s
    pub speed: f64,
    /// Compass heading in degrees
    pub heading: f64,
    /// Present only when this state is an actual observation
    pub geo: Option<GeoPoint>,
}

impl InterpolatedState {
    fn from_observation(obs: &Observation) -> Self {
        Self {
            time_step: obs.time_step(),
            cart: obs.cart(),
            speed: obs.speed(),
            heading: obs.heading(),
            geo: Some(obs.geo()),
        }
    }

    /// True when this state was blended between two observations
    pub fn is_synthetic(&self) -> bool {
        self.geo.is_none()
    }

    pub fn cart_xy(&self) -> [f64; 2] {
        self.cart.xy()
    }
}

/// Non-empty sequence of observations in feed order
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    observations: Vec<Observation>,
    bounds: GeoBounds,
}

impl Trajectory {
    /// Build from observations that are already in non-decreasing time order
    pub fn new(observations: Vec<Observation>, bounds_margin: f64) -> CoreResult<Self> {
        if let Some(pos) = observations
            .windows(2)
            .position(|w| w[1].time_step() < w[0].time_step())
        {
            return Err(CoreError::UnorderedTimeSteps {
                index: pos + 1,
                previous: observations[pos].time_step(),
                current: observations[pos + 1].time_step(),
            });
        }

        let bounds = GeoBounds::enclosing(observations.iter().map(Observation::geo))
            .ok_or(CoreError::EmptyTrajectory)?
            .with_margin(bounds_margin);

        debug!(
            "Trajectory built with {} observations, time steps {}..{}",
            observations.len(),
            observations[0].time_step(),
            observations[observations.len() - 1].time_step()
        );

        Ok(Self {
            observations,
            bounds,
        })
    }

    /// Project and collect feed records into a trajectory
    pub fn from_records(records: &[FlightRecord], config: &GeoConfig) -> CoreResult<Self> {
        let projector = GeoProjector::from_config(config);
        let observations = records
            .iter()
            .map(|r| Observation::from_record(r, &projector))
            .collect::<CoreResult<Vec<_>>>()?;

        Self::new(observations, config.bounds_margin)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; construction rejects empty input
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> &Observation {
        &self.observations[0]
    }

    pub fn last(&self) -> &Observation {
        &self.observations[self.observations.len() - 1]
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// First and last time step
    pub fn time_span(&self) -> (u64, u64) {
        (self.first().time_step(), self.last().time_step())
    }

    /// Bounding region including the configured margin
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Raw track in geodetic coordinates
    pub fn geo_points(&self) -> Vec<GeoPoint> {
        self.observations.iter().map(Observation::geo).collect()
    }

    /// Raw track in the cached Cartesian frame
    pub fn cart_points(&self) -> Vec<CartPoint3> {
        self.observations.iter().map(Observation::cart).collect()
    }

    /// Observation closest in time; ties go to the earlier index
    pub fn nearest(&self, time_step: u64) -> &Observation {
        &self.observations[self.nearest_index(time_step)]
    }

    fn nearest_index(&self, time_step: u64) -> usize {
        let obs = &self.observations;
        let above = obs.partition_point(|o| o.time_step() < time_step);
        if above == 0 {
            return 0;
        }

        let below_ts = obs[above - 1].time_step();
        let below = obs.partition_point(|o| o.time_step() < below_ts);
        if above == obs.len() {
            return below;
        }

        if time_step - below_ts <= obs[above].time_step() - time_step {
            below
        } else {
            above
        }
    }

    /// State at `time_step`. Observations are returned unchanged on an exact
    /// hit or outside the covered range; between samples the cached Cartesian
    /// positions are blended linearly.
    pub fn at(&self, time_step: u64) -> CoreResult<InterpolatedState> {
        let idx = self.nearest_index(time_step);
        let nearest = &self.observations[idx];
        let (first, last) = self.time_span();

        if nearest.time_step() == time_step || time_step < first || time_step > last {
            return Ok(InterpolatedState::from_observation(nearest));
        }

        let (prev_idx, next_idx) = if nearest.time_step() < time_step {
            (idx, idx + 1)
        } else {
            (idx - 1, idx)
        };
        let prev = &self.observations[prev_idx];
        let next = &self.observations[next_idx];

        if next.time_step() <= prev.time_step() {
            return Err(CoreError::degenerate_interval(prev.time_step()));
        }

        let t = (time_step - prev.time_step()) as f64
            / (next.time_step() - prev.time_step()) as f64;

        Ok(InterpolatedState {
            time_step,
            cart: prev.cart().lerp(&next.cart(), t),
            speed: prev.speed() * (1.0 - t) + next.speed() * t,
            heading: blend_heading(prev.heading(), next.heading(), t),
            geo: None,
        })
    }
}

/// Interpolate along the shorter arc, result in [0, 360)
fn blend_heading(from: f64, to: f64, t: f64) -> f64 {
    let delta = (to - from + 540.0).rem_euclid(360.0) - 180.0;
    (from + delta * t).rem_euclid(360.0)
}

// ============================================================================
// TESTS
// ============================================================================
