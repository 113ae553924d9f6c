//! Dispatch metrics collection and reporting for CI integration.
//!
//! Metrics are aggregated from tick reports and exported as pretty JSON.

use anyhow::{Context, Result};
use patchcraft_dispatch::{HandlerKind, OutcomeKind, TickReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level metrics report for one dispatcher run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Run identifier (scenario or test name)
    pub run_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// Overall result
    pub result: RunResult,

    /// Number of ticks processed
    pub ticks: u64,

    /// Aggregated outcomes per handler id, ordered by id
    pub handlers: BTreeMap<String, HandlerMetrics>,
}

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunResult {
    /// Every handler update succeeded
    Clean,
    /// At least one handler update failed
    Degraded,
}

/// Per-handler aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerMetrics {
    /// Handler behavior
    pub kind: HandlerKind,
    /// Updates applied
    pub succeeded: u64,
    /// Updates that failed
    pub failed: u64,
    /// Patch version after the last applied update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_patch_version: Option<u64>,
}

/// Builder that folds tick reports into a [`MetricsReport`]
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with run name
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                run_name: run_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: RunResult::Clean,
                ticks: 0,
                handlers: BTreeMap::new(),
            },
        }
    }

    /// Record one tick
    pub fn record(&mut self, report: &TickReport) -> &mut Self {
        self.report.ticks += 1;
        for outcome in &report.outcomes {
            let entry = self
                .report
                .handlers
                .entry(outcome.id.to_string())
                .or_insert(HandlerMetrics {
                    kind: outcome.kind,
                    succeeded: 0,
                    failed: 0,
                    final_patch_version: None,
                });
            match &outcome.result {
                OutcomeKind::Applied { patch_version } => {
                    entry.succeeded += 1;
                    entry.final_patch_version = Some(*patch_version);
                }
                OutcomeKind::Failed { .. } => {
                    entry.failed += 1;
                    self.report.result = RunResult::Degraded;
                }
            }
        }
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write metrics to {}", self.path.display()))
    }
}
