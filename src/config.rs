use serde::{Deserialize, Serialize};

use crate::errors::{MonitorError, Result};
use crate::simulate::Perturbation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub feature: FeatureConfig,
    pub drift: DriftConfig,
    pub perturbations: Vec<Perturbation>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Lag steps as row offsets within the sorted frame, not wall-clock
    /// durations. Must be non-empty, all positive.
    pub lag_steps: Vec<usize>,
    /// Trailing window length in rows, inclusive of the current row.
    pub rolling_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// PSI above this flags a column as drifted.
    pub psi_threshold: f64,
    /// Fraction of drifted columns above which the whole dataset is
    /// considered drifted.
    pub drift_share_threshold: f64,
    /// Number of histogram bins for the PSI computation.
    pub psi_bins: usize,
    /// Smoothing floor for empty bins.
    pub epsilon: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            feature: FeatureConfig::default(),
            drift: DriftConfig::default(),
            perturbations: Vec::new(),
            seed: None,
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lag_steps: vec![1],
            rolling_window: 1,
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            psi_threshold: 0.1,
            drift_share_threshold: 0.5,
            psi_bins: 10,
            epsilon: 1e-4,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        self.feature.validate()?;
        self.drift.validate()
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lag_steps.is_empty() {
            return Err(MonitorError::InvalidConfiguration(
                "lag_steps must not be empty".to_string(),
            ));
        }
        if self.lag_steps.contains(&0) {
            return Err(MonitorError::InvalidConfiguration(
                "lag steps must be positive row offsets".to_string(),
            ));
        }
        if self.rolling_window == 0 {
            return Err(MonitorError::InvalidConfiguration(
                "rolling_window must be at least 1 row".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest configured lag, in rows.
    pub fn max_lag(&self) -> usize {
        self.lag_steps.iter().copied().max().unwrap_or(0)
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.psi_threshold.is_finite() || self.psi_threshold <= 0.0 {
            return Err(MonitorError::InvalidConfiguration(
                "psi_threshold must be a positive number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.drift_share_threshold) {
            return Err(MonitorError::InvalidConfiguration(
                "drift_share_threshold must lie in [0, 1]".to_string(),
            ));
        }
        if self.psi_bins < 2 {
            return Err(MonitorError::InvalidConfiguration(
                "psi_bins must be at least 2".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(MonitorError::InvalidConfiguration(
                "epsilon must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}
