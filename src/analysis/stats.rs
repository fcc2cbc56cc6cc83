//! Operational metrics derived from an optimized route and the network snapshot.

use serde::{Deserialize, Serialize};

use crate::analysis::detection::SITE_WQI_THRESHOLD;
use crate::analysis::quality;
use crate::{OptimizationResult, Snapshot};

// ---

const AVERAGE_SPEED_KMH: f64 = 30.0;
const MINUTES_PER_SAMPLE: f64 = 20.0;
const KM_PER_LITER: f64 = 12.0;
const FUEL_PRICE_PER_LITER: f64 = 1.45;
const CO2_KG_PER_KM: f64 = 2.1;
const EFFICIENCY_BASE: f64 = 75.0;
const EFFICIENCY_CAP: f64 = 98.0;

/// Efficiency reported when the optimizer produced no fitness.
pub const EFFICIENCY_FALLBACK: f64 = 85.0;

/// Flat record of route metrics for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStatistics {
    /// km
    pub distance: f64,
    /// Driving time plus a fixed sampling time per stop.
    pub estimated_minutes: u64,
    pub fuel_liters: f64,
    pub fuel_cost: f64,
    pub co2_kg: f64,
    pub sensors_visited: usize,
    /// Visited sensors with WQI below 50.
    pub critical_sites: usize,
    /// Sum of `50 - wqi` over the critical sites.
    pub contamination_score: u32,
    /// Percent.
    pub efficiency: f64,
}

/// Derive route metrics. Route ids missing from `snapshot` count as stops
/// but add nothing to the contamination figures.
pub fn route_statistics(result: &OptimizationResult, snapshot: &Snapshot) -> RouteStatistics {
    // ---
    let stops = result.route.len();
    let driving_minutes = result.distance / AVERAGE_SPEED_KMH * 60.0;
    let estimated_minutes = (driving_minutes + stops as f64 * MINUTES_PER_SAMPLE).round() as u64;

    let fuel_liters = result.distance / KM_PER_LITER;

    let critical_wqis: Vec<u8> = result
        .route
        .iter()
        .filter_map(|id| snapshot.get(id))
        .map(quality::wqi)
        .filter(|&wqi| wqi < SITE_WQI_THRESHOLD)
        .collect();

    let contamination_score: u32 = critical_wqis
        .iter()
        .map(|&wqi| u32::from(SITE_WQI_THRESHOLD - wqi))
        .sum();

    let efficiency = result.fitness.map_or(EFFICIENCY_FALLBACK, |fitness| {
        (EFFICIENCY_BASE + fitness / 100.0).min(EFFICIENCY_CAP)
    });

    RouteStatistics {
        distance: result.distance,
        estimated_minutes,
        fuel_liters,
        fuel_cost: fuel_liters * FUEL_PRICE_PER_LITER,
        co2_kg: result.distance * CO2_KG_PER_KM,
        sensors_visited: stops,
        critical_sites: critical_wqis.len(),
        contamination_score,
        efficiency,
    }
}

/// Network-wide headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub total_sensors: usize,
    /// Sensors that have reported at least once.
    pub active_sensors: usize,
    /// Sensors with WQI below 50 or any stored alert.
    pub critical_sensors: usize,
    /// Rounded mean WQI; 0 for an empty network.
    pub average_wqi: u8,
}

impl NetworkSummary {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        // ---
        let mut active_sensors = 0;
        let mut critical_sensors = 0;
        let mut wqi_sum = 0u64;

        for reading in snapshot.values() {
            let wqi = quality::wqi(reading);
            wqi_sum += u64::from(wqi);
            if reading.last_reading.is_some() {
                active_sensors += 1;
            }
            if wqi < SITE_WQI_THRESHOLD || !reading.alerts.is_empty() {
                critical_sensors += 1;
            }
        }

        let average_wqi = if snapshot.is_empty() {
            0
        } else {
            (wqi_sum as f64 / snapshot.len() as f64).round() as u8
        };

        Self {
            total_sensors: snapshot.len(),
            active_sensors,
            critical_sensors,
            average_wqi,
        }
    }
}
