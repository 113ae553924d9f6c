#![warn(missing_docs)]
//! Headless testing surfaces: tick event stream, tick traces, metrics export.

mod metrics;
mod trace;

use anyhow::{Context, Result};
use patchcraft_core::{HandlerId, SimTick};
use patchcraft_dispatch::{HandlerKind, OutcomeKind, TickReport};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use metrics::*;
pub use trace::*;

/// One handler's outcome for one tick, as written to the event log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Tick the update ran in.
    pub tick: SimTick,
    /// Handler that ran.
    pub handler: &'a HandlerId,
    /// Its behavior.
    pub kind: HandlerKind,
    /// What happened.
    #[serde(flatten)]
    pub outcome: &'a OutcomeKind,
}

impl<'a> EventRecord<'a> {
    /// Flatten a tick report into per-handler records, in registration order.
    pub fn from_report(report: &'a TickReport) -> impl Iterator<Item = EventRecord<'a>> + 'a {
        report.outcomes.iter().map(move |outcome| EventRecord {
            tick: report.tick,
            handler: &outcome.id,
            kind: outcome.kind,
            outcome: &outcome.result,
        })
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("failed to create event log {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Append every outcome of a tick report.
    pub fn write_report(&mut self, report: &TickReport) -> Result<()> {
        for event in EventRecord::from_report(report) {
            self.write(&event)?;
        }
        Ok(())
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
