//! Runner entry point for one normsim simulation round.
//!
//! The runner asks the multi-agent service to react to an event (or replays
//! a captured transcript), streams the returned text through a fresh
//! transcript parser, and prints the typed records as JSON lines on stdout.
//!
//! # Architecture
//!
//! ```text
//! Agent service / transcript file --> StreamParser --> NormBoard --> stdout (JSON lines)
//! ```
//!
//! Logs go to stderr so stdout carries nothing but records and the closing
//! summary line. A round that yields no records at all exits with an error.

mod config;
mod error;
mod runner;
mod source;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, RunnerConfig};
use crate::runner::SimulationRun;
use crate::source::create_source;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// gates on the source's health check, then runs exactly one round.
///
/// # Errors
///
/// Returns an error if configuration, the source, or output fails, or if
/// the transcript produced no records.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init(),
    }

    info!("normsim-runner starting");

    // Load configuration from environment
    let config = RunnerConfig::from_env()?;
    let source = create_source(&config.source)?;
    info!(
        source = source.name(),
        skip_health_check = config.skip_health_check,
        "configuration loaded"
    );

    if !config.skip_health_check {
        source.check_health().await?;
    }

    let mut run = SimulationRun::new();
    info!(run_id = %run.id(), "run started");
    source.feed(&mut run).await?;

    let report = run.finish()?;
    report.write_json_lines(std::io::stdout().lock())?;

    info!(records = report.records.len(), "normsim-runner finished");
    Ok(())
}
