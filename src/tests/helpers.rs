use chrono::{Duration, TimeZone, Utc};

use crate::frame::{SensorRecord, TimeSeriesFrame};

/// Build an hourly frame with deterministic sensor channels. `dc_power` is
/// taken from the supplied closure; irradiation is the constant 0.5 and the
/// temperatures follow a mild diurnal ramp.
pub(crate) fn hourly_frame(rows: usize, dc_power: impl Fn(usize) -> f64) -> TimeSeriesFrame {
    let start = Utc.with_ymd_and_hms(2020, 5, 15, 0, 0, 0).unwrap();

    let records = (0..rows)
        .map(|i| SensorRecord {
            timestamp: start + Duration::hours(i as i64),
            ambient_temperature: 25.0 + (i % 24) as f64 * 0.1,
            module_temperature: 30.0 + (i % 24) as f64 * 0.2,
            irradiation: 0.5,
            dc_power: dc_power(i),
        })
        .collect();

    TimeSeriesFrame::from_records(records).unwrap()
}
