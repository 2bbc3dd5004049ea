use chrono::{Duration, TimeZone, Utc};

use crate::config::{DriftConfig, FeatureConfig};
use crate::drift::DriftAnalyzer;
use crate::features::FeatureBuilder;
use crate::frame::{SensorRecord, TimeSeriesFrame};
use crate::simulate::{DriftSimulator, Perturbation, PerturbationKind};

/// Two days of hourly records with constant irradiation and a diurnal
/// power curve.
fn reference_frame() -> TimeSeriesFrame {
    let start = Utc.with_ymd_and_hms(2020, 5, 15, 0, 0, 0).unwrap();

    let records = (0..48)
        .map(|i| SensorRecord {
            timestamp: start + Duration::hours(i as i64),
            ambient_temperature: 24.0 + (i % 24) as f64 * 0.3,
            module_temperature: 28.0 + (i % 24) as f64 * 0.5,
            irradiation: 500.0,
            dc_power: (i % 24) as f64 * 10.0,
        })
        .collect();

    TimeSeriesFrame::from_records(records).unwrap()
}

#[test]
fn irradiation_shift_is_detected_end_to_end() {
    let reference = reference_frame();

    // simulate a production period whose irradiation jumped from 500 to 800
    let current = DriftSimulator::simulate(
        &reference,
        &[Perturbation {
            column: "irradiation".to_string(),
            kind: PerturbationKind::Offset { delta: 300.0 },
        }],
        Some(11),
    )
    .unwrap();

    let builder = FeatureBuilder::new(&FeatureConfig {
        lag_steps: vec![1],
        rolling_window: 3,
    })
    .unwrap();

    let reference_matrix = builder.build(&reference).unwrap();
    let reference_target = builder.target(&reference).unwrap();
    let current_matrix = builder.build(&current).unwrap();
    let current_target = builder.target(&current).unwrap();

    // persistence forecast stands in for the externally-owned model
    let predictions: Vec<f64> = current_matrix.column("dc_power_lag_1").unwrap().to_vec();

    let analyzer = DriftAnalyzer::new(&DriftConfig {
        drift_share_threshold: 0.2,
        ..DriftConfig::default()
    })
    .unwrap();

    let report = analyzer
        .analyze(
            &reference_matrix,
            &reference_target,
            &current_matrix,
            &current_target,
            &predictions,
            None,
        )
        .unwrap();

    let by_name = |name: &str| {
        report
            .columns
            .iter()
            .find(|c| c.column == name)
            .unwrap_or_else(|| panic!("missing column {}", name))
    };

    assert!(by_name("irradiation").drifted);
    assert!(by_name("irradiation_roll_mean_3").drifted);
    assert!(!by_name("ambient_temperature").drifted);
    assert!(!by_name("hour_sin").drifted);
    assert!(!by_name("dc_power_lag_1").drifted);

    assert!(report.dataset_drifted);
    assert!(report.drifted_share > 0.2);

    // persistence is off by one diurnal step most of the time
    assert!(report.current_performance.mae > 0.0);
    assert_eq!(report.reference.rows, 46);
    assert_eq!(report.current.rows, 46);
}

#[test]
fn unperturbed_simulation_reports_no_drift() {
    let reference = reference_frame();
    let current = DriftSimulator::simulate(&reference, &[], Some(3)).unwrap();

    let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
    let reference_matrix = builder.build(&reference).unwrap();
    let reference_target = builder.target(&reference).unwrap();
    let current_matrix = builder.build(&current).unwrap();
    let current_target = builder.target(&current).unwrap();
    let predictions: Vec<f64> = current_matrix.column("dc_power_lag_1").unwrap().to_vec();

    let analyzer = DriftAnalyzer::new(&DriftConfig::default()).unwrap();
    let report = analyzer
        .analyze(
            &reference_matrix,
            &reference_target,
            &current_matrix,
            &current_target,
            &predictions,
            Some(&predictions),
        )
        .unwrap();

    assert!(!report.dataset_drifted);
    assert!(report.columns.iter().all(|c| !c.drifted));
    assert!(report.reference_performance.is_some());
}
