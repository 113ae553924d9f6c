//! patchcraft - update-tick simulator for server implementation handlers
//!
//! Loads a scenario, registers its handlers and runs the dispatcher for a
//! fixed number of ticks.

mod config;

use anyhow::Result;
use clap::Parser;
use config::{ScenarioConfig, DEFAULT_SCENARIO_PATH};
use patchcraft_testkit::{JsonlSink, MetricsReportBuilder, MetricsSink};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run server update handlers through simulated ticks", long_about = None)]
struct Args {
    /// Scenario file describing the handlers to register (default: config/scenario.toml)
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Number of ticks to run (overrides the scenario)
    #[arg(long)]
    ticks: Option<u64>,
    /// Write one JSON line per handler outcome to this file
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// Write an aggregated metrics report to this file
    #[arg(long)]
    metrics: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting patchcraft v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let scenario = ScenarioConfig::load(args.scenario.as_deref())?;
    let ticks = args.ticks.unwrap_or(scenario.ticks);
    let mut dispatcher = scenario.build_dispatcher()?;

    let mut events = args.event_log.as_deref().map(JsonlSink::create).transpose()?;
    let run_name = args
        .scenario
        .as_deref()
        .unwrap_or(Path::new(DEFAULT_SCENARIO_PATH))
        .display()
        .to_string();
    let mut metrics = MetricsReportBuilder::new(run_name);

    for _ in 0..ticks {
        let report = dispatcher.tick();
        for outcome in &report.outcomes {
            match outcome.error() {
                Some(error) => println!(
                    "tick {:>4}  {:<24} {:<12} FAILED  {error}",
                    report.tick.0,
                    outcome.id.to_string(),
                    outcome.kind.name()
                ),
                None => println!(
                    "tick {:>4}  {:<24} {:<12} ok      v{}",
                    report.tick.0,
                    outcome.id.to_string(),
                    outcome.kind.name(),
                    dispatcher.state(&outcome.id)?.patch_version
                ),
            }
        }
        if let Some(sink) = events.as_mut() {
            sink.write_report(&report)?;
        }
        metrics.record(&report);
    }

    if let Some(sink) = events.as_mut() {
        sink.flush()?;
    }

    let report = metrics.build();
    info!(ticks = report.ticks, result = ?report.result, "scenario finished");
    if let Some(path) = &args.metrics {
        MetricsSink::create(path)?.write(&report)?;
        info!(path = %path.display(), "wrote metrics");
    }

    Ok(())
}
