//! # Flight Ingest
//!
//! Reads the tab-separated flight feed into `FlightRecord`s. Rows that do not
//! parse are skipped and counted; only I/O failures stop a load.

pub mod error;

pub use error::{IngestError, IngestResult};

use flight_core::{FlightRecord, GeoConfig, GeoPoint, Trajectory};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Column positions of the fields used from a feed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub latitude: usize,
    pub longitude: usize,
    pub ground_speed: usize,
    pub heading: usize,
    pub time_step: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            latitude: 0,
            longitude: 1,
            ground_speed: 4,
            heading: 9,
            time_step: 11,
        }
    }
}

/// Row counts from one load
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows: usize,
    pub loaded: usize,
    pub skipped: usize,
}

/// Feed reader
#[derive(Debug, Clone, Default)]
pub struct RecordLoader {
    layout: ColumnLayout,
}

impl RecordLoader {
    pub fn new(layout: ColumnLayout) -> Self {
        Self { layout }
    }

    /// Read all rows from a reader, skipping malformed ones
    pub fn read<R: Read>(&self, reader: R) -> IngestResult<(Vec<FlightRecord>, LoadReport)> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for (idx, row) in csv_reader.records().enumerate() {
            let row_number = idx + 1;
            report.rows += 1;

            let parsed = match row {
                Ok(row) => self.parse_row(row_number, &row),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => Err(IngestError::malformed(row_number, e.to_string())),
            };

            match parsed {
                Ok(record) => {
                    records.push(record);
                    report.loaded += 1;
                }
                Err(e) => {
                    debug!("Skipping row: {}", e);
                    report.skipped += 1;
                }
            }
        }

        if report.skipped > 0 {
            warn!(
                "Skipped {} of {} rows that did not parse",
                report.skipped, report.rows
            );
        }

        Ok((records, report))
    }

    /// Read all rows from a file
    pub fn load_path(&self, path: impl AsRef<Path>) -> IngestResult<(Vec<FlightRecord>, LoadReport)> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        debug!("Loading flight feed from {}", path.display());
        self.read(file)
    }

    /// Parse one row into a record
    pub fn parse_row(&self, row_number: usize, row: &csv::StringRecord) -> IngestResult<FlightRecord> {
        let time_raw = field(row, row_number, self.layout.time_step, "time step")?;
        let time_step = time_raw.parse::<u64>().map_err(|_| {
            IngestError::malformed(
                row_number,
                format!("time step is not a non-negative integer: {:?}", time_raw),
            )
        })?;

        let position = GeoPoint::new(
            finite(row, row_number, self.layout.latitude, "latitude")?,
            finite(row, row_number, self.layout.longitude, "longitude")?,
        );
        if !position.is_valid() {
            return Err(IngestError::malformed(
                row_number,
                format!("position {:?} out of range", position.to_tuple()),
            ));
        }

        Ok(FlightRecord::new(
            position.latitude,
            position.longitude,
            finite(row, row_number, self.layout.ground_speed, "ground speed")?,
            finite(row, row_number, self.layout.heading, "heading")?,
            time_step,
        ))
    }
}

fn field<'r>(
    row: &'r csv::StringRecord,
    row_number: usize,
    column: usize,
    name: &str,
) -> IngestResult<&'r str> {
    row.get(column).map(str::trim).ok_or_else(|| {
        IngestError::malformed(row_number, format!("missing {} (column {})", name, column))
    })
}

fn finite(row: &csv::StringRecord, row_number: usize, column: usize, name: &str) -> IngestResult<f64> {
    let raw = field(row, row_number, column, name)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(IngestError::malformed(
            row_number,
            format!("{} is not a finite number: {:?}", name, raw),
        )),
    }
}

/// Read a feed and build its trajectory. Fails with `EmptyTrajectory` if no row
/// survived parsing.
pub fn read_trajectory<R: Read>(reader: R, config: &GeoConfig) -> IngestResult<(Trajectory, LoadReport)> {
    let (records, report) = RecordLoader::default().read(reader)?;
    let trajectory = Trajectory::from_records(&records, config)?;
    Ok((trajectory, report))
}

/// Load a feed file and build its trajectory
pub fn load_trajectory(path: impl AsRef<Path>, config: &GeoConfig) -> IngestResult<(Trajectory, LoadReport)> {
    let (records, report) = RecordLoader::default().load_path(path)?;
    let trajectory = Trajectory::from_records(&records, config)?;
    Ok((trajectory, report))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use flight_core::CoreError;

    fn row(lat: &str, lon: &str, speed: &str, heading: &str, ts: &str) -> String {
        [lat, lon, "SP-ABC", "1200", speed, "0", "0", "EPML", "", heading, "x", ts].join("\t")
    }

    #[test]
    fn test_reads_feed_columns() {
        let data = [
            row("50.2", "21.4", "360", "90", "1000"),
            row("50.3", "21.5", "180", "95.5", "1100"),
        ]
        .join("\n");

        let (records, report) = RecordLoader::default().read(data.as_bytes()).unwrap();
        assert_eq!(report, LoadReport { rows: 2, loaded: 2, skipped: 0 });
        assert_eq!(records[0], FlightRecord::new(50.2, 21.4, 360.0, 90.0, 1000));
        assert_eq!(records[1].heading, 95.5);
        assert!((records[1].speed_mps() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_skips_malformed_rows() {
        let data = [
            "latitude\tlongitude\tcallsign".to_string(),
            row("50.2", "21.4", "360", "90", "1000"),
            row("abc", "21.4", "360", "90", "1050"),
            row("50.3", "21.5", "360", "90", "-4"),
            row("50.3", "21.5", "nan", "90", "1075"),
            "50.3\t21.5".to_string(),
            row("95.0", "21.5", "360", "90", "1080"),
            row("50.4", "21.6", "360", "90", "1100"),
        ]
        .join("\n");

        let (records, report) = RecordLoader::default().read(data.as_bytes()).unwrap();
        assert_eq!(report.rows, 8);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped, 6);
        assert_eq!(records[1].time_step, 1100);
    }

    #[test]
    fn test_all_malformed_is_empty_trajectory() {
        let data = "header\tonly\n\nfoo\tbar\tbaz\n";
        let err = read_trajectory(data.as_bytes(), &GeoConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::Core(CoreError::EmptyTrajectory)));
    }

    #[test]
    fn test_custom_layout() {
        let layout = ColumnLayout {
            latitude: 0,
            longitude: 1,
            ground_speed: 2,
            heading: 3,
            time_step: 4,
        };
        let data = "50.0\t20.0\t36\t180\t42\n";
        let (records, _) = RecordLoader::new(layout).read(data.as_bytes()).unwrap();
        assert_eq!(records, vec![FlightRecord::new(50.0, 20.0, 36.0, 180.0, 42)]);
    }

    #[test]
    fn test_load_trajectory_from_file() {
        let path = std::env::temp_dir().join(format!("flight-ingest-{}.tsv", std::process::id()));
        let data = [
            row("50.0", "20.0", "360", "90", "1000"),
            row("50.001", "20.002", "360", "90", "1100"),
        ]
        .join("\n");
        std::fs::write(&path, data).unwrap();

        let (trajectory, report) = load_trajectory(&path, &GeoConfig::default()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(report.loaded, 2);
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.time_span(), (1000, 1100));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RecordLoader::default()
            .load_path("/definitely/not/here.tsv")
            .unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
