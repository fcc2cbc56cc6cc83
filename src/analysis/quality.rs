//! Water Quality Index (WQI) scoring.
//!
//! Each of the six parameters is normalized independently onto `[0, 100]`
//! with a piecewise-linear curve, then combined with fixed weights. The
//! weights sum to 1.0, so the aggregate stays on the same scale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{SensorReading, Severity, Snapshot};

// ---

const WEIGHT_PH: f64 = 0.25;
const WEIGHT_TURBIDITY: f64 = 0.20;
const WEIGHT_DISSOLVED_OXYGEN: f64 = 0.20;
const WEIGHT_TEMPERATURE: f64 = 0.15;
const WEIGHT_CONDUCTIVITY: f64 = 0.10;
const WEIGHT_NITRATES: f64 = 0.10;

/// Water Quality Index of one reading, rounded to an integer in `[0, 100]`.
pub fn wqi(reading: &SensorReading) -> u8 {
    // ---
    let score = normalize_ph(reading.ph) * WEIGHT_PH
        + normalize_turbidity(reading.turbidity) * WEIGHT_TURBIDITY
        + normalize_dissolved_oxygen(reading.dissolved_oxygen) * WEIGHT_DISSOLVED_OXYGEN
        + normalize_temperature(reading.temperature) * WEIGHT_TEMPERATURE
        + normalize_conductivity(reading.conductivity) * WEIGHT_CONDUCTIVITY
        + normalize_nitrates(reading.nitrates) * WEIGHT_NITRATES;

    // `as` saturates, and maps NaN to 0
    score.round().clamp(0.0, 100.0) as u8
}

/// WQI for every sensor in the snapshot.
pub fn score_snapshot(snapshot: &Snapshot) -> BTreeMap<String, u8> {
    // ---
    snapshot
        .iter()
        .map(|(id, reading)| {
            let score = wqi(reading);
            tracing::debug!(sensor = %id, wqi = score, "scored sensor");
            (id.clone(), score)
        })
        .collect()
}

/// Full score for 6.5–8.5; ramps to 0 at pH 4 and pH 12.
pub fn normalize_ph(ph: f64) -> f64 {
    if (6.5..=8.5).contains(&ph) {
        100.0
    } else if ph < 6.5 {
        ((ph - 4.0) / 2.5 * 100.0).max(0.0)
    } else {
        ((12.0 - ph) / 3.5 * 100.0).max(0.0)
    }
}

/// Full score up to 10 NTU; 40 at 50 NTU; 0 from 100 NTU.
pub fn normalize_turbidity(ntu: f64) -> f64 {
    if ntu <= 10.0 {
        100.0
    } else if ntu <= 50.0 {
        100.0 - (ntu - 10.0) / 40.0 * 60.0
    } else {
        (40.0 - (ntu - 50.0) / 50.0 * 40.0).max(0.0)
    }
}

/// Full score for 6–8 mg/L; linear from 0 below, decays toward 50 at 14 mg/L above.
pub fn normalize_dissolved_oxygen(mg_l: f64) -> f64 {
    if (6.0..=8.0).contains(&mg_l) {
        100.0
    } else if mg_l < 6.0 {
        (mg_l / 6.0 * 100.0).max(0.0)
    } else {
        (100.0 - (mg_l - 8.0) / 6.0 * 50.0).max(0.0)
    }
}

/// Full score for 15–25 °C; 0 at -5 °C; 40 at 40 °C.
pub fn normalize_temperature(celsius: f64) -> f64 {
    if (15.0..=25.0).contains(&celsius) {
        100.0
    } else if celsius < 15.0 {
        ((celsius + 5.0) / 20.0 * 100.0).max(0.0)
    } else {
        (100.0 - (celsius - 25.0) / 15.0 * 60.0).max(0.0)
    }
}

/// Full score for 150–800 µS/cm; linear from 0 below, 30 at 1800 above.
pub fn normalize_conductivity(us_cm: f64) -> f64 {
    if (150.0..=800.0).contains(&us_cm) {
        100.0
    } else if us_cm < 150.0 {
        (us_cm / 150.0 * 100.0).max(0.0)
    } else {
        (100.0 - (us_cm - 800.0) / 1000.0 * 70.0).max(0.0)
    }
}

/// Full score up to 10 mg/L; 20 at 45 mg/L; 0 from 55 mg/L.
pub fn normalize_nitrates(mg_l: f64) -> f64 {
    if mg_l <= 10.0 {
        100.0
    } else if mg_l <= 45.0 {
        100.0 - (mg_l - 10.0) / 35.0 * 80.0
    } else {
        (20.0 - (mg_l - 45.0) / 10.0 * 20.0).max(0.0)
    }
}

/// Severity band implied by a WQI alone, ignoring alerts.
pub fn severity_for_wqi(wqi: u8) -> Severity {
    match wqi {
        0..=24 => Severity::Critical,
        25..=49 => Severity::High,
        50..=74 => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Qualitative label for a WQI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WqiRating {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl WqiRating {
    pub fn from_wqi(wqi: u8) -> Self {
        match wqi {
            90.. => WqiRating::Excellent,
            75..=89 => WqiRating::Good,
            50..=74 => WqiRating::Fair,
            25..=49 => WqiRating::Poor,
            _ => WqiRating::VeryPoor,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::Coordinate;

    fn create_test_reading(
        ph: f64,
        turbidity: f64,
        dissolved_oxygen: f64,
        temperature: f64,
        conductivity: f64,
        nitrates: f64,
    ) -> SensorReading {
        // ---
        SensorReading {
            id: "WS_TEST".to_string(),
            location: Coordinate::new(37.77, -122.42),
            location_name: "Test Pond".to_string(),
            ph,
            turbidity,
            dissolved_oxygen,
            temperature,
            conductivity,
            nitrates,
            last_reading: None,
            alerts: Vec::new(),
        }
    }

    #[test]
    fn test_ideal_reading_scores_100() {
        // ---
        let ideal = create_test_reading(7.5, 5.0, 7.0, 20.0, 400.0, 5.0);
        assert_eq!(wqi(&ideal), 100);
    }

    #[test]
    fn test_sample_network_scores() {
        // ---
        let golden_gate = create_test_reading(7.2, 15.5, 6.8, 18.5, 320.0, 8.2);
        assert_eq!(wqi(&golden_gate), 98);

        let mission_bay = create_test_reading(5.8, 85.2, 3.2, 22.1, 850.0, 45.8);
        assert_eq!(wqi(&mission_bay), 58);

        let industrial = create_test_reading(4.2, 120.5, 2.1, 25.8, 1650.0, 78.3);
        assert_eq!(wqi(&industrial), 28);

        let coastal = create_test_reading(7.8, 12.2, 7.2, 17.5, 35000.0, 5.1);
        assert_eq!(wqi(&coastal), 89);
    }

    #[test]
    fn test_extreme_readings_stay_in_range() {
        // ---
        let values = [-1e9, -50.0, 0.0, 3.0, 7.0, 42.0, 500.0, 1e9];
        for &v in &values {
            let reading = create_test_reading(v, v, v, v, v, v);
            let score = wqi(&reading);
            assert!(score <= 100, "wqi {score} out of range for {v}");
        }

        let worst = create_test_reading(0.0, 1000.0, 0.0, -40.0, 0.0, 500.0);
        assert_eq!(wqi(&worst), 0);
    }

    #[test]
    fn test_ph_curve() {
        // ---
        assert_eq!(normalize_ph(6.5), 100.0);
        assert_eq!(normalize_ph(8.5), 100.0);
        assert_eq!(normalize_ph(4.0), 0.0);
        assert_eq!(normalize_ph(2.0), 0.0);
        assert!((normalize_ph(5.25) - 50.0).abs() < 1e-9);
        assert!((normalize_ph(10.25) - 50.0).abs() < 1e-9);
        assert_eq!(normalize_ph(12.0), 0.0);
        assert_eq!(normalize_ph(13.0), 0.0);
    }

    #[test]
    fn test_turbidity_curve() {
        // ---
        assert_eq!(normalize_turbidity(0.0), 100.0);
        assert_eq!(normalize_turbidity(10.0), 100.0);
        assert!((normalize_turbidity(30.0) - 70.0).abs() < 1e-9);
        assert!((normalize_turbidity(50.0) - 40.0).abs() < 1e-9);
        assert!((normalize_turbidity(75.0) - 20.0).abs() < 1e-9);
        assert_eq!(normalize_turbidity(100.0), 0.0);
        assert_eq!(normalize_turbidity(250.0), 0.0);
    }

    #[test]
    fn test_dissolved_oxygen_curve() {
        // ---
        assert_eq!(normalize_dissolved_oxygen(0.0), 0.0);
        assert!((normalize_dissolved_oxygen(3.0) - 50.0).abs() < 1e-9);
        assert_eq!(normalize_dissolved_oxygen(7.0), 100.0);
        assert!((normalize_dissolved_oxygen(14.0) - 50.0).abs() < 1e-9);
        assert_eq!(normalize_dissolved_oxygen(-2.0), 0.0);
    }

    #[test]
    fn test_temperature_curve() {
        // ---
        assert_eq!(normalize_temperature(-5.0), 0.0);
        assert!((normalize_temperature(5.0) - 50.0).abs() < 1e-9);
        assert_eq!(normalize_temperature(20.0), 100.0);
        assert!((normalize_temperature(40.0) - 40.0).abs() < 1e-9);
        assert_eq!(normalize_temperature(100.0), 0.0);
    }

    #[test]
    fn test_conductivity_curve() {
        // ---
        assert_eq!(normalize_conductivity(0.0), 0.0);
        assert!((normalize_conductivity(75.0) - 50.0).abs() < 1e-9);
        assert_eq!(normalize_conductivity(500.0), 100.0);
        assert!((normalize_conductivity(1800.0) - 30.0).abs() < 1e-9);
        assert_eq!(normalize_conductivity(35000.0), 0.0);
    }

    #[test]
    fn test_nitrates_curve() {
        // ---
        assert_eq!(normalize_nitrates(10.0), 100.0);
        assert!((normalize_nitrates(45.0) - 20.0).abs() < 1e-9);
        assert!((normalize_nitrates(50.0) - 10.0).abs() < 1e-9);
        assert_eq!(normalize_nitrates(55.0), 0.0);
        assert_eq!(normalize_nitrates(90.0), 0.0);
    }

    #[test]
    fn test_severity_bands() {
        // ---
        assert_eq!(severity_for_wqi(0), Severity::Critical);
        assert_eq!(severity_for_wqi(24), Severity::Critical);
        assert_eq!(severity_for_wqi(25), Severity::High);
        assert_eq!(severity_for_wqi(49), Severity::High);
        assert_eq!(severity_for_wqi(50), Severity::Medium);
        assert_eq!(severity_for_wqi(74), Severity::Medium);
        assert_eq!(severity_for_wqi(75), Severity::Low);
        assert_eq!(severity_for_wqi(100), Severity::Low);
    }

    #[test]
    fn test_ratings() {
        // ---
        assert_eq!(WqiRating::from_wqi(100), WqiRating::Excellent);
        assert_eq!(WqiRating::from_wqi(90), WqiRating::Excellent);
        assert_eq!(WqiRating::from_wqi(89), WqiRating::Good);
        assert_eq!(WqiRating::from_wqi(75), WqiRating::Good);
        assert_eq!(WqiRating::from_wqi(58), WqiRating::Fair);
        assert_eq!(WqiRating::from_wqi(28), WqiRating::Poor);
        assert_eq!(WqiRating::from_wqi(24), WqiRating::VeryPoor);
    }

    #[test]
    fn test_score_snapshot_covers_every_sensor() {
        // ---
        let mut snapshot = Snapshot::new();
        let mut a = create_test_reading(7.5, 5.0, 7.0, 20.0, 400.0, 5.0);
        a.id = "A".to_string();
        let mut b = create_test_reading(4.2, 120.5, 2.1, 25.8, 1650.0, 78.3);
        b.id = "B".to_string();
        snapshot.insert(a.id.clone(), a);
        snapshot.insert(b.id.clone(), b);

        let scores = score_snapshot(&snapshot);

        assert_eq!(scores.len(), 2);
        assert_eq!(scores["A"], 100);
        assert_eq!(scores["B"], 28);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_score_snapshot_logs_each_sensor_at_debug() {
        // ---
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut reading = create_test_reading(7.5, 5.0, 7.0, 20.0, 400.0, 5.0);
        reading.id = "WS_001".to_string();
        let snapshot: Snapshot = [(reading.id.clone(), reading)].into_iter().collect();

        tracing::subscriber::with_default(subscriber, || score_snapshot(&snapshot));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("DEBUG"), "{output}");
        assert!(output.contains("scored sensor"), "{output}");
        assert!(output.contains("sensor=WS_001"), "{output}");
    }
}
