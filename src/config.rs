//! Configuration loader for the `codemetal-waterflow` driver.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). The engine itself takes plain arguments; only the
//! binary reads the environment.
//!
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::{Coordinate, OptimizerParams};

/// Parse an optional environment variable of type `$ty` with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional environment variable with no default.
macro_rules! parse_env_opt {
    ($var_name:expr, $ty:ty) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Base station used when `BASE_LAT`/`BASE_LON` are not set.
pub const DEFAULT_BASE: Coordinate = Coordinate::new(37.7650, -122.4200);

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// JSON file holding the sensor snapshot (id → reading).
    pub snapshot_path: PathBuf,

    /// Where the sampling vehicle starts and returns.
    pub base: Coordinate,

    /// Maximum number of stops per route.
    pub vehicle_capacity: usize,

    /// Genetic search hyperparameters.
    pub optimizer: OptimizerParams,

    /// Fixed RNG seed for reproducible routes; entropy when absent.
    pub seed: Option<u64>,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `SNAPSHOT_PATH` – path to the sensor snapshot JSON
///
/// Optional:
/// - `BASE_LAT`, `BASE_LON` – base station (default: 37.7650, -122.4200)
/// - `VEHICLE_CAPACITY` – stops per route (default: 5)
/// - `GA_POPULATION` – population size (default: 50)
/// - `GA_GENERATIONS` – generation count (default: 100)
/// - `GA_SEED` – RNG seed (default: unset)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let snapshot_path = PathBuf::from(require_env!("SNAPSHOT_PATH"));
    let base = Coordinate::new(
        parse_env!("BASE_LAT", f64, DEFAULT_BASE.lat),
        parse_env!("BASE_LON", f64, DEFAULT_BASE.lon),
    );
    let vehicle_capacity = parse_env!("VEHICLE_CAPACITY", usize, 5);

    let defaults = OptimizerParams::default();
    let optimizer = OptimizerParams {
        population_size: parse_env!("GA_POPULATION", usize, defaults.population_size),
        generations: parse_env!("GA_GENERATIONS", usize, defaults.generations),
        ..defaults
    };
    optimizer.validate()?;

    let seed = parse_env_opt!("GA_SEED", u64);

    Ok(Config {
        snapshot_path,
        base,
        vehicle_capacity,
        optimizer,
        seed,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let seed = self
            .seed
            .map_or_else(|| "entropy".to_string(), |s| s.to_string());

        tracing::info!("Configuration loaded:");
        tracing::info!("  SNAPSHOT_PATH    : {}", self.snapshot_path.display());
        tracing::info!("  BASE             : {}, {}", self.base.lat, self.base.lon);
        tracing::info!("  VEHICLE_CAPACITY : {}", self.vehicle_capacity);
        tracing::info!("  GA_POPULATION    : {}", self.optimizer.population_size);
        tracing::info!("  GA_GENERATIONS   : {}", self.optimizer.generations);
        tracing::info!("  GA_SEED          : {}", seed);
    }
}
