//! # Flight CLI
//!
//! Loads a tab-separated flight feed, builds the dead-reckoning and Kalman
//! tracks and writes them as JSON. Logs go to stderr so stdout stays clean.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flight_core::GeoProjector;
use flight_filter::FilterConfig;
use flight_ingest::load_trajectory;
use flight_tracker::{TrackerConfig, TrajectoryBuilder};

#[derive(Parser, Debug)]
#[command(name = "flight-cli")]
#[command(about = "Smooth a recorded flight with dead reckoning and a Kalman filter")]
#[command(version)]
struct Args {
    /// Tab-separated flight feed
    path: PathBuf,

    /// Kalman step in feed time units (overrides FLIGHT_CADENCE)
    #[arg(long)]
    cadence: Option<u64>,

    /// Noise preset applied before the individual noise flags
    #[arg(long, value_enum)]
    preset: Option<NoisePreset>,

    /// Observation noise (overrides FLIGHT_OBS_NOISE)
    #[arg(long)]
    obs_noise: Option<f64>,

    /// Prediction noise (overrides FLIGHT_PRED_NOISE)
    #[arg(long)]
    pred_noise: Option<f64>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,

    /// Also emit the Kalman track as latitude/longitude
    #[arg(long)]
    geodetic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NoisePreset {
    /// Trust the motion model more
    Smooth,
    /// Follow observations closely
    Responsive,
}

impl NoisePreset {
    fn filter_config(self) -> FilterConfig {
        match self {
            NoisePreset::Smooth => FilterConfig::smooth(),
            NoisePreset::Responsive => FilterConfig::responsive(),
        }
    }
}

impl Args {
    fn tracker_config(&self) -> TrackerConfig {
        let mut config = TrackerConfig::from_env();
        if let Some(cadence) = self.cadence {
            config.cadence = cadence;
        }
        if let Some(preset) = self.preset {
            config.filter = preset.filter_config();
        }
        config.filter = FilterConfig::new(
            self.obs_noise.unwrap_or(config.filter.observation_noise),
            self.pred_noise.unwrap_or(config.filter.prediction_noise),
        );
        config
    }
}

fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();
    let config = args.tracker_config();
    debug!("Configuration: {:?}", config);

    let builder = TrajectoryBuilder::new(config).context("invalid tracker configuration")?;

    let (trajectory, report) = load_trajectory(&args.path, &config.geo)
        .with_context(|| format!("failed to load {}", args.path.display()))?;
    info!(
        "Loaded {} observations from {} ({} rows skipped)",
        report.loaded,
        args.path.display(),
        report.skipped
    );

    let tracks = builder.build(&trajectory).context("failed to build tracks")?;
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("   Time span: {:?}", trajectory.time_span());
    info!("   Dead reckoning points: {}", tracks.stats.dead_reckoning_points);
    info!(
        "   Kalman steps: {} ({} interpolated)",
        tracks.stats.filter_steps, tracks.stats.synthetic_samples
    );
    info!("   Bounds: {:?}", tracks.bounds);

    let projector = args.geodetic.then(|| GeoProjector::from_config(&config.geo));
    let json = tracks
        .to_json_with(args.pretty, projector.as_ref())
        .context("failed to serialize tracks")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Tracks written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,flight_cli=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "flight-cli",
            "flight.tsv",
            "--cadence",
            "25",
            "--obs-noise",
            "60",
            "--pretty",
        ]);
        assert_eq!(args.path, PathBuf::from("flight.tsv"));
        assert_eq!(args.cadence, Some(25));
        assert_eq!(args.obs_noise, Some(60.0));
        assert_eq!(args.pred_noise, None);
        assert!(args.pretty);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["flight-cli", "f.tsv", "--cadence", "10", "--pred-noise", "2.5"]);
        let config = args.tracker_config();
        assert_eq!(config.cadence, 10);
        assert_eq!(config.filter.prediction_noise, 2.5);
    }

    #[test]
    fn test_preset_sets_noise_and_flags_still_override() {
        let args = Args::parse_from(["flight-cli", "f.tsv", "--preset", "smooth"]);
        assert_eq!(args.preset, Some(NoisePreset::Smooth));
        assert_eq!(args.tracker_config().filter, FilterConfig::smooth());

        let args = Args::parse_from(["flight-cli", "f.tsv", "--preset", "responsive", "--obs-noise", "5"]);
        let filter = args.tracker_config().filter;
        assert_eq!(filter.observation_noise, 5.0);
        assert_eq!(filter.prediction_noise, FilterConfig::responsive().prediction_noise);

        assert!(Args::try_parse_from(["flight-cli", "f.tsv", "--preset", "jittery"]).is_err());
    }
}
