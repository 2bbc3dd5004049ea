use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-column drift verdict. A `drifted` flag is a result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftColumnResult {
    pub column: String,
    pub reference_mean: f64,
    pub current_mean: f64,
    /// Population Stability Index between the two samples.
    pub psi: f64,
    pub threshold: f64,
    pub drifted: bool,
}

/// Aggregate regression-quality metrics over (truth, prediction) pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// `None` when the target series has zero variance.
    pub r2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Structured outcome of one monitoring invocation. Built fresh per call,
/// never mutated afterwards; rendering and archival happen elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringReport {
    pub generated_at: DateTime<Utc>,
    pub reference: DatasetSummary,
    pub current: DatasetSummary,
    pub columns: Vec<DriftColumnResult>,
    /// Fraction of columns flagged as drifted.
    pub drifted_share: f64,
    pub dataset_drifted: bool,
    pub current_performance: PerformanceMetrics,
    /// Present when reference-period predictions were supplied.
    pub reference_performance: Option<PerformanceMetrics>,
}

impl MonitoringReport {
    pub fn drifted_columns(&self) -> impl Iterator<Item = &DriftColumnResult> {
        self.columns.iter().filter(|c| c.drifted)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
