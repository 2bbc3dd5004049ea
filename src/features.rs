use std::f64::consts::PI;

use chrono::{DateTime, Timelike, Utc};
use tracing::debug;

use crate::config::FeatureConfig;
use crate::errors::{MonitorError, Result};
use crate::frame::TimeSeriesFrame;

/// Column-oriented matrix of derived features. Column set and order are
/// fixed by the builder configuration, independent of input size.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    timestamps: Vec<DateTime<Utc>>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn from_columns(
        timestamps: Vec<DateTime<Utc>>,
        names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(MonitorError::LengthMismatch {
                name: "columns".to_string(),
                expected: names.len(),
                actual: columns.len(),
            });
        }
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != timestamps.len() {
                return Err(MonitorError::LengthMismatch {
                    name: name.clone(),
                    expected: timestamps.len(),
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            timestamps,
            names,
            columns,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }
}

/// Deterministic, stateless transformation from a [`TimeSeriesFrame`] into a
/// [`FeatureMatrix`].
///
/// Rows at the start of the frame that lack full lag or rolling-window
/// history are dropped from the output, never null-filled. The same policy
/// applies to reference and current data so downstream comparisons stay
/// aligned.
pub struct FeatureBuilder {
    lag_steps: Vec<usize>,
    rolling_window: usize,
}

/// Source columns that get lagged copies.
const LAGGED_COLUMNS: [&str; 3] = ["ambient_temperature", "module_temperature", "dc_power"];

impl FeatureBuilder {
    pub fn new(config: &FeatureConfig) -> Result<Self> {
        config.validate()?;

        let mut lag_steps = config.lag_steps.clone();
        lag_steps.sort_unstable();
        lag_steps.dedup();

        Ok(Self {
            lag_steps,
            rolling_window: config.rolling_window,
        })
    }

    fn max_lag(&self) -> usize {
        // lag_steps is non-empty after validation
        *self.lag_steps.last().unwrap_or(&0)
    }

    /// Minimum number of records a frame must carry.
    pub fn required_history(&self) -> usize {
        self.max_lag() + self.rolling_window
    }

    /// Index of the first row with full lag and window history.
    fn first_valid_row(&self) -> usize {
        self.max_lag().max(self.rolling_window - 1)
    }

    /// Output column names, fixed for any input frame.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![
            "ambient_temperature".to_string(),
            "module_temperature".to_string(),
            "irradiation".to_string(),
            "hour_sin".to_string(),
            "hour_cos".to_string(),
        ];
        for &lag in &self.lag_steps {
            for column in LAGGED_COLUMNS {
                names.push(format!("{}_lag_{}", column, lag));
            }
        }
        names.push(format!("irradiation_roll_mean_{}", self.rolling_window));
        names
    }

    /// Build the feature matrix for a sorted frame.
    pub fn build(&self, frame: &TimeSeriesFrame) -> Result<FeatureMatrix> {
        self.check_history(frame)?;

        let records = frame.records();
        let start = self.first_valid_row();
        let out_rows = records.len() - start;

        let names = self.column_names();
        let mut columns: Vec<Vec<f64>> = names.iter().map(|_| Vec::with_capacity(out_rows)).collect();
        let mut timestamps = Vec::with_capacity(out_rows);

        for i in start..records.len() {
            let record = &records[i];
            timestamps.push(record.timestamp);

            let (hour_sin, hour_cos) = cyclic_hour(&record.timestamp);

            let mut col = 0;
            let mut push = |columns: &mut Vec<Vec<f64>>, value: f64| {
                columns[col].push(value);
                col += 1;
            };

            push(&mut columns, record.ambient_temperature);
            push(&mut columns, record.module_temperature);
            push(&mut columns, record.irradiation);
            push(&mut columns, hour_sin);
            push(&mut columns, hour_cos);

            for &lag in &self.lag_steps {
                let source = &records[i - lag];
                push(&mut columns, source.ambient_temperature);
                push(&mut columns, source.module_temperature);
                push(&mut columns, source.dc_power);
            }

            let window = &records[i + 1 - self.rolling_window..=i];
            let roll_mean =
                window.iter().map(|r| r.irradiation).sum::<f64>() / window.len() as f64;
            push(&mut columns, roll_mean);
        }

        debug!(
            rows_in = records.len(),
            rows_out = out_rows,
            columns = names.len(),
            "built feature matrix"
        );

        FeatureMatrix::from_columns(timestamps, names, columns)
    }

    /// The `dc_power` ground-truth series, trimmed to align row-for-row
    /// with [`FeatureBuilder::build`] output for the same frame.
    pub fn target(&self, frame: &TimeSeriesFrame) -> Result<Vec<f64>> {
        self.check_history(frame)?;
        let start = self.first_valid_row();
        Ok(frame.records()[start..].iter().map(|r| r.dc_power).collect())
    }

    fn check_history(&self, frame: &TimeSeriesFrame) -> Result<()> {
        let required = self.required_history();
        if frame.len() < required {
            return Err(MonitorError::InsufficientHistory {
                required,
                actual: frame.len(),
            });
        }
        Ok(())
    }
}

/// Sine/cosine encoding of the fractional hour of day, so hour 23 and hour
/// 0 stay adjacent in feature space.
fn cyclic_hour(timestamp: &DateTime<Utc>) -> (f64, f64) {
    let hour = timestamp.hour() as f64
        + timestamp.minute() as f64 / 60.0
        + timestamp.second() as f64 / 3600.0;
    let angle = 2.0 * PI * hour / 24.0;
    (angle.sin(), angle.cos())
}
