//! Errors raised by the engine for caller contract violations.
//!
//! Data problems never surface here: extreme readings are absorbed by
//! normalization, unknown ids in a route are skipped, and an empty candidate
//! pool produces an empty result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("population size must be at least 1")]
    EmptyPopulation,

    #[error("generation count must be at least 1")]
    NoGenerations,

    #[error("vehicle capacity must be at least 1")]
    ZeroCapacity,

    #[error("elite fraction must be in [0, 1), got {0}")]
    InvalidElitism(f64),

    #[error("tournament size must be at least 1")]
    EmptyTournament,

    #[error("mutation rate must be in [0, 1], got {0}")]
    InvalidMutationRate(f64),
}

pub type EngineResult<T> = Result<T, EngineError>;
