//! Gateway for the water quality engine.
//!
//! Sibling modules stay private to this directory (EMBP); callers reach the
//! engine through the re-exports below and through [`evaluate`], which runs
//! the full data flow over one snapshot:
//!
//! snapshot → WQI per sensor → contamination sites → sampling route → route metrics
//!
//! Every stage is a pure function of its inputs. The only hidden input is the
//! random source, which the caller passes in.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Coordinate, ContaminationSite, EngineResult, OptimizationResult, Snapshot};

mod detection;
mod genetic;
mod geo;
mod optimizer;
mod quality;
mod stats;

pub use detection::{
    detect, is_at_risk, overall_severity, recompute_alerts, AT_RISK_WQI_THRESHOLD,
    SITE_WQI_THRESHOLD,
};
pub use genetic::{crossover, mutate, random_route, tournament_index, Mutation};
pub use geo::{distance, EARTH_RADIUS_KM};
pub use optimizer::{optimize, optimize_with, CandidatePool, OptimizerParams};
pub use quality::{
    normalize_conductivity, normalize_dissolved_oxygen, normalize_nitrates, normalize_ph,
    normalize_temperature, normalize_turbidity, score_snapshot, severity_for_wqi, wqi, WqiRating,
};
pub use stats::{route_statistics, NetworkSummary, RouteStatistics, EFFICIENCY_FALLBACK};

// ---

/// Everything the engine produces for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub scores: BTreeMap<String, u8>,
    pub sites: Vec<ContaminationSite>,
    pub result: OptimizationResult,
    pub statistics: RouteStatistics,
    pub summary: NetworkSummary,
}

/// Run scoring, detection, route search and metrics over `snapshot`.
pub fn evaluate<R>(
    snapshot: &Snapshot,
    base: Coordinate,
    capacity: usize,
    params: &OptimizerParams,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
) -> EngineResult<Evaluation>
where
    R: Rng + ?Sized,
{
    // ---
    let _span = tracing::info_span!("evaluate", sensors = snapshot.len(), capacity).entered();

    let scores = score_snapshot(snapshot);
    let sites = detect(snapshot.values());
    let result = optimize_with(snapshot.values(), base, capacity, params, rng, cancel)?;
    let statistics = route_statistics(&result, snapshot);
    let summary = NetworkSummary::from_snapshot(snapshot);

    tracing::info!(
        "Evaluation complete: {} sites, {} stops, {:.2} km",
        sites.len(),
        result.route.len(),
        result.distance
    );

    Ok(Evaluation {
        scores,
        sites,
        result,
        statistics,
        summary,
    })
}
