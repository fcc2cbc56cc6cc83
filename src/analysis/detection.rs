//! Threshold rules that turn a reading into alerts and contamination sites.

use crate::analysis::quality::{self, severity_for_wqi};
use crate::{Alert, AlertKind, ContaminationSite, SensorReading, Severity};

// ---

/// A sensor is projected as a contamination site below this WQI, alerts or not.
pub const SITE_WQI_THRESHOLD: u8 = 50;

/// A sensor joins the route candidate pool below this WQI, alerts or not.
pub const AT_RISK_WQI_THRESHOLD: u8 = 75;

/// Evaluate the five threshold rules against `reading` and return a fresh alert list.
///
/// The reading's stored alerts are ignored. Callers wanting to persist the
/// result can use [`SensorReading::with_alerts`].
pub fn recompute_alerts(reading: &SensorReading) -> Vec<Alert> {
    // ---
    let mut alerts = Vec::new();

    if reading.ph < 6.0 || reading.ph > 9.0 {
        alerts.push(Alert::new(
            AlertKind::PhExtreme,
            Severity::High,
            "Extreme pH levels detected",
        ));
    }

    if reading.turbidity > 100.0 {
        alerts.push(Alert::new(
            AlertKind::HighTurbidity,
            Severity::Critical,
            "High turbidity - possible sediment contamination",
        ));
    }

    if reading.dissolved_oxygen < 4.0 {
        alerts.push(Alert::new(
            AlertKind::LowOxygen,
            Severity::High,
            "Low dissolved oxygen - potential organic pollution",
        ));
    }

    if reading.nitrates > 45.0 {
        alerts.push(Alert::new(
            AlertKind::HighNitrates,
            Severity::Critical,
            "High nitrates - agricultural runoff detected",
        ));
    }

    if reading.conductivity > 1500.0 {
        alerts.push(Alert::new(
            AlertKind::HighConductivity,
            Severity::Medium,
            "High conductivity - potential industrial contamination",
        ));
    }

    alerts
}

/// Overall severity of a sensor from its alerts and WQI.
///
/// The worse of the most severe alert and the WQI band wins; a sensor with
/// any alert is at least `Medium`.
pub fn overall_severity(alerts: &[Alert], wqi: u8) -> Severity {
    // ---
    let from_alerts = alerts
        .iter()
        .map(|a| a.severity)
        .max()
        .map(|worst| worst.max(Severity::Medium));

    let from_wqi = severity_for_wqi(wqi);

    from_alerts.map_or(from_wqi, |s| s.max(from_wqi))
}

/// Project every sensor that has a fired rule or a WQI below 50.
///
/// Each sensor is evaluated independently and the output follows input
/// order, so repeated calls over the same snapshot are identical.
pub fn detect<'a, I>(sensors: I) -> Vec<ContaminationSite>
where
    I: IntoIterator<Item = &'a SensorReading>,
{
    // ---
    let sites: Vec<ContaminationSite> = sensors
        .into_iter()
        .filter_map(|sensor| {
            let wqi = quality::wqi(sensor);
            let alerts = recompute_alerts(sensor);

            if alerts.is_empty() && wqi >= SITE_WQI_THRESHOLD {
                return None;
            }

            let severity = overall_severity(&alerts, wqi);
            tracing::debug!(
                sensor = %sensor.id,
                wqi,
                alerts = alerts.len(),
                %severity,
                "contamination site"
            );

            Some(ContaminationSite {
                sensor_id: sensor.id.clone(),
                location: sensor.location,
                wqi,
                alerts,
                severity,
            })
        })
        .collect();

    tracing::info!("Detected {} contamination sites", sites.len());
    sites
}

/// Candidate predicate for route optimization: WQI below 75 or any stored alert.
pub fn is_at_risk(reading: &SensorReading, wqi: u8) -> bool {
    wqi < AT_RISK_WQI_THRESHOLD || !reading.alerts.is_empty()
}
