//! CSV loading for reference datasets.
//!
//! This is a collaborator of the demo binary, not part of the analysis
//! core: the core operates purely on in-memory frames handed to it.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::info;

use crate::errors::{MonitorError, Result};
use crate::frame::{SensorRecord, TimeSeriesFrame};

/// Raw CSV row in the plant-data export schema.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "DATE_TIME")]
    date_time: String,
    #[serde(rename = "AMBIENT_TEMPERATURE")]
    ambient_temperature: f64,
    #[serde(rename = "MODULE_TEMPERATURE")]
    module_temperature: f64,
    #[serde(rename = "IRRADIATION")]
    irradiation: f64,
    #[serde(rename = "DC_POWER")]
    dc_power: f64,
}

/// Timestamp formats seen in plant exports, tried in order.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%d-%m-%Y %H:%M"];

/// Load a reference dataset from a CSV file into a sorted frame.
pub fn load_csv(path: &Path) -> Result<TimeSeriesFrame> {
    let file = File::open(path).map_err(|e| MonitorError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<RawRecord>().enumerate() {
        let raw = result.map_err(|e| MonitorError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        records.push(SensorRecord {
            timestamp: parse_timestamp(&raw.date_time, row)?,
            ambient_temperature: raw.ambient_temperature,
            module_temperature: raw.module_temperature,
            irradiation: raw.irradiation,
            dc_power: raw.dc_power,
        });
    }

    let frame = TimeSeriesFrame::from_records(records)?;
    info!(path = %path.display(), rows = frame.len(), "loaded reference dataset");
    Ok(frame)
}

fn parse_timestamp(value: &str, row: usize) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(MonitorError::TimestampParse {
        row,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use std::io::Write;

    fn write_temp_csv(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("solar_monitor_test_{}.csv", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_and_sorts_a_plant_export() {
        let path = write_temp_csv(
            "DATE_TIME,AMBIENT_TEMPERATURE,MODULE_TEMPERATURE,IRRADIATION,DC_POWER\n\
             2020-05-15 01:00:00,25.1,31.0,0.2,120.5\n\
             2020-05-15 00:00:00,24.8,30.2,0.0,0.0\n",
        );

        let frame = load_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.records()[0].dc_power, 0.0);
        assert_eq!(frame.records()[1].dc_power, 120.5);
    }

    #[test]
    fn parses_day_first_timestamps() {
        let ts = parse_timestamp("15-05-2020 06:30", 0).unwrap();
        assert_eq!(ts.hour(), 6);
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn unparseable_timestamp_is_a_structured_error() {
        let result = parse_timestamp("not-a-date", 3);
        assert!(matches!(
            result,
            Err(MonitorError::TimestampParse { row: 3, .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_csv(Path::new("/nonexistent/plant.csv"));
        assert!(matches!(result, Err(MonitorError::Io { .. })));
    }
}
