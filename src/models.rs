//! Data models shared by every stage of the water quality engine.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Immutable view of the sensor network, keyed by sensor id.
///
/// A `BTreeMap` keeps iteration order stable, so a seeded optimizer run over
/// the same snapshot always sees the candidates in the same order.
pub type Snapshot = BTreeMap<String, SensorReading>;

/// Geographic point in decimal degrees.
///
/// Serialized as a `[lat, lon]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

/// Alert severity, totally ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Urgency contribution of one alert to the route fitness.
    pub fn urgency_weight(self) -> f64 {
        match self {
            Severity::Critical => 100.0,
            Severity::High => 75.0,
            Severity::Medium => 50.0,
            Severity::Low => 25.0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Alert tag vocabulary produced by the contamination rules.
///
/// Tags read from upstream data that the rules never emit map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertKind {
    PhExtreme,
    HighTurbidity,
    LowOxygen,
    HighNitrates,
    HighConductivity,
    Other,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::PhExtreme => "pH-extreme",
            AlertKind::HighTurbidity => "high-turbidity",
            AlertKind::LowOxygen => "low-oxygen",
            AlertKind::HighNitrates => "high-nitrates",
            AlertKind::HighConductivity => "high-conductivity",
            AlertKind::Other => "other",
        }
    }
}

impl From<String> for AlertKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "pH-extreme" => AlertKind::PhExtreme,
            "high-turbidity" => AlertKind::HighTurbidity,
            "low-oxygen" => AlertKind::LowOxygen,
            "high-nitrates" => AlertKind::HighNitrates,
            "high-conductivity" => AlertKind::HighConductivity,
            _ => AlertKind::Other,
        }
    }
}

impl From<AlertKind> for String {
    fn from(kind: AlertKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One active alert on a sensor. Derived from a reading, never historical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
}

impl Alert {
    pub fn new(kind: AlertKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

/// One sensor's latest reading as supplied by the ingestion layer.
///
/// Scalar readings are not range-checked here; out-of-range values are
/// meaningful input to scoring and detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    // ---
    pub id: String,
    pub location: Coordinate,
    #[serde(default)]
    pub location_name: String,
    pub ph: f64,
    /// NTU
    pub turbidity: f64,
    /// mg/L
    pub dissolved_oxygen: f64,
    /// °C
    pub temperature: f64,
    /// µS/cm
    pub conductivity: f64,
    /// mg/L
    pub nitrates: f64,
    #[serde(default)]
    pub last_reading: Option<DateTime<Utc>>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl SensorReading {
    /// Return a copy of this reading carrying `alerts` as its active set.
    ///
    /// Pairs with [`crate::analysis::recompute_alerts`]; the caller decides
    /// whether to store the result.
    pub fn with_alerts(&self, alerts: Vec<Alert>) -> Self {
        Self {
            alerts,
            ..self.clone()
        }
    }
}

/// Read-only projection of a sensor that needs attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationSite {
    pub sensor_id: String,
    pub location: Coordinate,
    pub wqi: u8,
    pub alerts: Vec<Alert>,
    pub severity: Severity,
}

/// Best route found by the optimizer.
///
/// `fitness` is `None` when no search ran (empty candidate pool).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub route: Vec<String>,
    /// km, closed loop from and back to the base.
    pub distance: f64,
    pub fitness: Option<f64>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_severity_ordering() {
        // ---
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(
            [Severity::Medium, Severity::Critical, Severity::Low]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn test_reading_deserializes_from_collaborator_json() {
        // ---
        let json = r#"{
            "id": "WS_002",
            "location": [37.7849, -122.4094],
            "location_name": "Mission Bay Water Treatment",
            "ph": 5.8,
            "turbidity": 85.2,
            "dissolved_oxygen": 3.2,
            "temperature": 22.1,
            "conductivity": 850,
            "nitrates": 45.8,
            "last_reading": "2024-07-10T14:28:00Z",
            "alerts": [
                { "type": "ph_low", "severity": "HIGH", "message": "pH below safe levels" },
                { "type": "high-turbidity", "severity": "CRITICAL", "message": "Excessive turbidity" }
            ]
        }"#;

        let reading: SensorReading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.location, Coordinate::new(37.7849, -122.4094));
        assert_eq!(reading.conductivity, 850.0);
        assert!(reading.last_reading.is_some());
        assert_eq!(reading.alerts.len(), 2);
        assert_eq!(reading.alerts[0].kind, AlertKind::Other);
        assert_eq!(reading.alerts[1].kind, AlertKind::HighTurbidity);
        assert_eq!(reading.alerts[1].severity, Severity::Critical);
    }

    #[test]
    fn test_optional_fields_default() {
        // ---
        let json = r#"{
            "id": "WS_009",
            "location": [0.0, 0.0],
            "ph": 7.0, "turbidity": 1.0, "dissolved_oxygen": 7.0,
            "temperature": 20.0, "conductivity": 300.0, "nitrates": 2.0
        }"#;

        let reading: SensorReading = serde_json::from_str(json).unwrap();

        assert!(reading.location_name.is_empty());
        assert!(reading.last_reading.is_none());
        assert!(reading.alerts.is_empty());
    }

    #[test]
    fn test_with_alerts_replaces_only_alerts() {
        // ---
        let json = r#"{
            "id": "WS_010", "location": [1.0, 2.0],
            "ph": 7.0, "turbidity": 1.0, "dissolved_oxygen": 7.0,
            "temperature": 20.0, "conductivity": 300.0, "nitrates": 2.0
        }"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        let alert = Alert::new(AlertKind::LowOxygen, Severity::High, "low");

        let updated = reading.with_alerts(vec![alert.clone()]);

        assert_eq!(updated.alerts, vec![alert]);
        assert_eq!(updated.id, reading.id);
        assert!(reading.alerts.is_empty());
    }

    #[test]
    fn test_coordinate_serializes_as_pair() {
        // ---
        let json = serde_json::to_string(&Coordinate::new(37.765, -122.42)).unwrap();
        assert_eq!(json, "[37.765,-122.42]");
    }
}
