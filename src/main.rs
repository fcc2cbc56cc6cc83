//! Driver binary for the `codemetal-waterflow` engine.
//!
//! Runs one evaluation pass end to end:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Reading the sensor snapshot JSON
//! - Scoring, detecting contamination, optimizing the sampling route
//! - Printing the evaluation as JSON on stdout
//!
//! # Environment Variables
//! - `SNAPSHOT_PATH` (**required**) – sensor snapshot, e.g. `data/sample_snapshot.json`
//! - `VEHICLE_CAPACITY`, `BASE_LAT`, `BASE_LON`, `GA_*` (optional) – see `config`
//! - `WATERFLOW_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `WATERFLOW_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! Logs go to stderr so stdout carries only the JSON result.
use std::{env, fs, io::IsTerminal};

use anyhow::{Context, Result};
use dotenvy::dotenv;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use uuid::Uuid;

use codemetal_waterflow::{analysis, config, Snapshot};

// ---

fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let raw = fs::read_to_string(&cfg.snapshot_path)
        .with_context(|| format!("Failed to read snapshot '{}'", cfg.snapshot_path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot '{}'", cfg.snapshot_path.display()))?;

    tracing::info!("Loaded {} sensors", snapshot.len());

    let mut rng = match cfg.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let run_id = Uuid::new_v4();
    let evaluation = tracing::info_span!("run", %run_id).in_scope(|| {
        analysis::evaluate(
            &snapshot,
            cfg.base,
            cfg.vehicle_capacity,
            &cfg.optimizer,
            &mut rng,
            None,
        )
    })?;

    for site in &evaluation.sites {
        tracing::info!(
            "Site {}: WQI {}, severity {}, {} alerts",
            site.sensor_id,
            site.wqi,
            site.severity,
            site.alerts.len()
        );
    }
    tracing::info!(
        "Route {:?}: {:.2} km, ~{} min, efficiency {:.1}%",
        evaluation.result.route,
        evaluation.statistics.distance,
        evaluation.statistics.estimated_minutes,
        evaluation.statistics.efficiency
    );

    let json = serde_json::to_string_pretty(&evaluation)?;
    println!("{json}");

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled, written to stderr
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `WATERFLOW_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `WATERFLOW_LOG_LEVEL` env var
///
/// This should be called once at startup before any logging or tracing
/// macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("WATERFLOW_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to WATERFLOW_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("WATERFLOW_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
