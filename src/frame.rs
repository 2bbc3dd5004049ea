use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MonitorError, Result};

/// Numeric sensor channels carried by every record, in canonical order.
pub const SENSOR_COLUMNS: [&str; 4] = [
    "ambient_temperature",
    "module_temperature",
    "irradiation",
    "dc_power",
];

/// One timestamped plant observation. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub timestamp: DateTime<Utc>,
    pub ambient_temperature: f64,
    pub module_temperature: f64,
    pub irradiation: f64,
    pub dc_power: f64,
}

impl SensorRecord {
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            "ambient_temperature" => Some(self.ambient_temperature),
            "module_temperature" => Some(self.module_temperature),
            "irradiation" => Some(self.irradiation),
            "dc_power" => Some(self.dc_power),
            _ => None,
        }
    }

    pub fn set_value(&mut self, column: &str, value: f64) -> Result<()> {
        match column {
            "ambient_temperature" => self.ambient_temperature = value,
            "module_temperature" => self.module_temperature = value,
            "irradiation" => self.irradiation = value,
            "dc_power" => self.dc_power = value,
            _ => return Err(MonitorError::UnknownColumn(column.to_string())),
        }
        Ok(())
    }
}

/// Ordered sequence of sensor records, unique and ascending by timestamp.
///
/// Missing timestamps are treated as absent, not zero: no gap filling
/// happens here or anywhere downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesFrame {
    records: Vec<SensorRecord>,
}

impl TimeSeriesFrame {
    /// Build a frame from raw records. Records are sorted ascending by
    /// timestamp; duplicate timestamps are rejected.
    pub fn from_records(mut records: Vec<SensorRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(MonitorError::EmptyDataset {
                which: "frame".to_string(),
            });
        }

        records.sort_by_key(|r| r.timestamp);

        for pair in records.windows(2) {
            if pair[0].timestamp == pair[1].timestamp {
                return Err(MonitorError::DuplicateTimestamp(pair[1].timestamp));
            }
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.records.iter().map(|r| r.timestamp)
    }

    /// Extract one named sensor channel as a dense column.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        if !SENSOR_COLUMNS.contains(&name) {
            return Err(MonitorError::UnknownColumn(name.to_string()));
        }
        Ok(self
            .records
            .iter()
            .filter_map(|r| r.value(name))
            .collect())
    }
}
