//! Synthetic "current" datasets for exercising the drift analyzer without
//! live traffic.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{MonitorError, Result};
use crate::frame::{TimeSeriesFrame, SENSOR_COLUMNS};

/// One column perturbation applied by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub column: String,
    pub kind: PerturbationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbationKind {
    /// Add a constant to every value.
    Offset { delta: f64 },
    /// Multiply every value by a constant.
    Scale { factor: f64 },
    /// Add zero-mean Gaussian noise with the given standard deviation.
    GaussianNoise { std_dev: f64 },
}

/// Produces a perturbed copy of a reference frame. The reference frame is
/// never mutated; schema, row count and sort order carry over unchanged.
pub struct DriftSimulator;

impl DriftSimulator {
    /// Apply `perturbations` to a copy of `reference`.
    ///
    /// A seed makes the run reproducible. Without one the generator is
    /// entropy-seeded and the run is non-deterministic, which is logged
    /// loudly rather than hidden.
    pub fn simulate(
        reference: &TimeSeriesFrame,
        perturbations: &[Perturbation],
        seed: Option<u64>,
    ) -> Result<TimeSeriesFrame> {
        for perturbation in perturbations {
            if !SENSOR_COLUMNS.contains(&perturbation.column.as_str()) {
                return Err(MonitorError::UnknownColumn(perturbation.column.clone()));
            }
            if let PerturbationKind::GaussianNoise { std_dev } = perturbation.kind {
                if !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(MonitorError::InvalidConfiguration(format!(
                        "gaussian noise std_dev must be non-negative, got {}",
                        std_dev
                    )));
                }
            }
        }

        let stochastic = perturbations
            .iter()
            .any(|p| matches!(p.kind, PerturbationKind::GaussianNoise { .. }));

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                if stochastic {
                    warn!("no seed supplied; simulated frame will not be reproducible");
                }
                StdRng::from_entropy()
            }
        };

        let mut records = reference.records().to_vec();

        for perturbation in perturbations {
            debug!(
                column = %perturbation.column,
                kind = ?perturbation.kind,
                "applying perturbation"
            );

            match perturbation.kind {
                PerturbationKind::Offset { delta } => {
                    for record in &mut records {
                        let value = record.value(&perturbation.column).unwrap_or(0.0);
                        record.set_value(&perturbation.column, value + delta)?;
                    }
                }
                PerturbationKind::Scale { factor } => {
                    for record in &mut records {
                        let value = record.value(&perturbation.column).unwrap_or(0.0);
                        record.set_value(&perturbation.column, value * factor)?;
                    }
                }
                PerturbationKind::GaussianNoise { std_dev } => {
                    let normal = Normal::new(0.0, std_dev).map_err(|e| {
                        MonitorError::InvalidConfiguration(format!("gaussian noise: {}", e))
                    })?;
                    for record in &mut records {
                        let value = record.value(&perturbation.column).unwrap_or(0.0);
                        record.set_value(&perturbation.column, value + normal.sample(&mut rng))?;
                    }
                }
            }
        }

        TimeSeriesFrame::from_records(records)
    }
}
