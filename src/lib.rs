//! Water quality engine for the `codemetal-waterflow` monitoring service.
//!
//! Scores each sensor on a 0–100 Water Quality Index, flags contamination
//! from threshold rules, and plans a capacity-bounded sampling route over the
//! at-risk sensors with a genetic search. The engine is synchronous and works
//! on an immutable [`Snapshot`] supplied by the caller; ingestion and
//! presentation live outside this crate.
//!
//! The crate follows the Explicit Module Boundary Pattern (EMBP): `models`
//! and `error` hold the shared types, `analysis` is the gateway to the
//! engine stages, and `config` serves the driver binary.

pub mod analysis;
pub mod config;
mod error;
mod models;

pub use analysis::{detect, evaluate, optimize, optimize_with, wqi, Evaluation, OptimizerParams};
pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use models::{
    Alert, AlertKind, ContaminationSite, Coordinate, OptimizationResult, SensorReading, Severity,
    Snapshot,
};
