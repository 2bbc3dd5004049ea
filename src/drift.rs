//! Distribution-drift and regression-performance analysis.
//!
//! Every feature column is numeric `f64` by construction, so the per-column
//! drift test runs over the full schema; there is no non-numeric exclusion
//! path. The analysis itself is fully deterministic: identical inputs and
//! configuration reproduce the same report bit for bit (apart from the
//! generation timestamp).

use chrono::Utc;
use tracing::{debug, info};

use crate::config::DriftConfig;
use crate::errors::{MonitorError, Result};
use crate::features::FeatureMatrix;
use crate::report::{DatasetSummary, DriftColumnResult, MonitoringReport, PerformanceMetrics};

/// Compares a reference feature/target dataset against a current one and
/// produces a [`MonitoringReport`].
pub struct DriftAnalyzer {
    config: DriftConfig,
}

impl DriftAnalyzer {
    pub fn new(config: &DriftConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
        })
    }

    /// Run the full drift and performance assessment.
    ///
    /// `reference_target` and `current_target` are ground-truth series
    /// aligned row-for-row with their matrices; `predictions_current` is the
    /// model output for the current matrix. Supplying
    /// `predictions_reference` additionally yields reference-period metrics
    /// for delta comparison.
    pub fn analyze(
        &self,
        reference: &FeatureMatrix,
        reference_target: &[f64],
        current: &FeatureMatrix,
        current_target: &[f64],
        predictions_current: &[f64],
        predictions_reference: Option<&[f64]>,
    ) -> Result<MonitoringReport> {
        let reference_summary = summarize(reference, "reference")?;
        let current_summary = summarize(current, "current")?;

        if reference.n_cols() == 0 {
            return Err(MonitorError::EmptyDataset {
                which: "reference columns".to_string(),
            });
        }

        check_schema(reference, current)?;
        check_length("reference_target", reference_target, reference.n_rows())?;
        check_length("current_target", current_target, current.n_rows())?;
        check_length("predictions_current", predictions_current, current.n_rows())?;
        if let Some(predictions) = predictions_reference {
            check_length("predictions_reference", predictions, reference.n_rows())?;
        }

        let mut columns = Vec::with_capacity(reference.n_cols());
        for (name, reference_values) in reference.columns() {
            // schema check above guarantees the column exists on both sides
            let current_values = current.column(name).ok_or_else(|| {
                MonitorError::UnknownColumn(name.to_string())
            })?;

            let psi = self.population_stability_index(reference_values, current_values);
            let drifted = psi > self.config.psi_threshold;
            debug!(column = name, psi, drifted, "column drift test");

            columns.push(DriftColumnResult {
                column: name.to_string(),
                reference_mean: mean(reference_values),
                current_mean: mean(current_values),
                psi,
                threshold: self.config.psi_threshold,
                drifted,
            });
        }

        let flagged = columns.iter().filter(|c| c.drifted).count();
        let drifted_share = flagged as f64 / columns.len() as f64;
        let dataset_drifted = drifted_share > self.config.drift_share_threshold;

        let current_performance = regression_metrics(current_target, predictions_current)?;
        let reference_performance = predictions_reference
            .map(|predictions| regression_metrics(reference_target, predictions))
            .transpose()?;

        info!(
            columns = columns.len(),
            flagged,
            drifted_share,
            dataset_drifted,
            mae = current_performance.mae,
            rmse = current_performance.rmse,
            "drift analysis complete"
        );

        Ok(MonitoringReport {
            generated_at: Utc::now(),
            reference: reference_summary,
            current: current_summary,
            columns,
            drifted_share,
            dataset_drifted,
            current_performance,
            reference_performance,
        })
    }

    /// Population Stability Index between two samples.
    ///
    /// Both samples are binned over their pooled min/max range; empty bins
    /// are floored at `epsilon` to keep the log terms finite.
    ///
    /// PSI = sum over bins of (current% - reference%) * ln(current% / reference%)
    fn population_stability_index(&self, reference: &[f64], current: &[f64]) -> f64 {
        if reference.is_empty() || current.is_empty() {
            return 0.0;
        }

        let mut min_val = f64::INFINITY;
        let mut max_val = f64::NEG_INFINITY;
        for &v in reference.iter().chain(current.iter()) {
            min_val = min_val.min(v);
            max_val = max_val.max(v);
        }

        // all values identical on both sides: no distribution to shift
        if (max_val - min_val).abs() < self.config.epsilon {
            return 0.0;
        }

        let bins = self.config.psi_bins;
        let bin_width = (max_val - min_val) / bins as f64;

        let mut reference_counts = vec![0usize; bins];
        let mut current_counts = vec![0usize; bins];

        for &v in reference {
            let bin = (((v - min_val) / bin_width).floor() as usize).min(bins - 1);
            reference_counts[bin] += 1;
        }
        for &v in current {
            let bin = (((v - min_val) / bin_width).floor() as usize).min(bins - 1);
            current_counts[bin] += 1;
        }

        let reference_total = reference.len() as f64;
        let current_total = current.len() as f64;
        let mut psi = 0.0;

        for i in 0..bins {
            let reference_pct =
                (reference_counts[i] as f64 / reference_total).max(self.config.epsilon);
            let current_pct = (current_counts[i] as f64 / current_total).max(self.config.epsilon);
            psi += (current_pct - reference_pct) * (current_pct / reference_pct).ln();
        }

        psi.abs()
    }
}

/// MAE, RMSE and R² between a ground-truth series and predictions.
pub fn regression_metrics(truth: &[f64], predicted: &[f64]) -> Result<PerformanceMetrics> {
    if truth.is_empty() {
        return Err(MonitorError::EmptyDataset {
            which: "performance target".to_string(),
        });
    }
    if truth.len() != predicted.len() {
        return Err(MonitorError::LengthMismatch {
            name: "predictions".to_string(),
            expected: truth.len(),
            actual: predicted.len(),
        });
    }

    let n = truth.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    for (&t, &p) in truth.iter().zip(predicted) {
        let err = t - p;
        abs_sum += err.abs();
        sq_sum += err * err;
    }

    let truth_mean = mean(truth);
    let ss_tot: f64 = truth.iter().map(|&t| (t - truth_mean).powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        Some(1.0 - sq_sum / ss_tot)
    } else {
        None
    };

    Ok(PerformanceMetrics {
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        r2,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn summarize(matrix: &FeatureMatrix, which: &str) -> Result<DatasetSummary> {
    let start = matrix
        .timestamps()
        .first()
        .copied()
        .ok_or_else(|| MonitorError::EmptyDataset {
            which: which.to_string(),
        })?;
    let end = matrix
        .timestamps()
        .last()
        .copied()
        .ok_or_else(|| MonitorError::EmptyDataset {
            which: which.to_string(),
        })?;

    Ok(DatasetSummary {
        rows: matrix.n_rows(),
        start,
        end,
    })
}

fn check_schema(reference: &FeatureMatrix, current: &FeatureMatrix) -> Result<()> {
    if reference.names() == current.names() {
        return Ok(());
    }

    let missing = reference
        .names()
        .iter()
        .filter(|n| !current.names().contains(n))
        .cloned()
        .collect();
    let extra = current
        .names()
        .iter()
        .filter(|n| !reference.names().contains(n))
        .cloned()
        .collect();

    Err(MonitorError::SchemaMismatch { missing, extra })
}

fn check_length(name: &str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(MonitorError::LengthMismatch {
            name: name.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}
