//! Tick-trace harness for deterministic, multi-tick dispatcher tests.
//!
//! A trace steps a dispatcher for a fixed number of ticks and captures a
//! snapshot of every handler's state after each step. The returned trace can
//! be asserted on directly or serialized for CI artifacts.

use anyhow::Result;
use patchcraft_core::{HandlerId, HandlerState};
use patchcraft_dispatch::{HandlerError, TickReport, UpdateDispatcher};
use serde::Serialize;

/// Snapshot of one handler between ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSnapshot {
    /// Handler id.
    pub id: HandlerId,
    /// State at capture time.
    pub state: HandlerState,
    /// Error from the most recent tick, if it failed.
    pub last_error: Option<HandlerError>,
}

/// All handlers captured at a given tick boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceFrame {
    /// Tick counter at capture time.
    pub tick: u64,
    /// Handler snapshots in registration order.
    pub handlers: Vec<HandlerSnapshot>,
}

/// A named sequence of frames plus the reports that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct TickTrace {
    /// Human-readable name.
    pub name: String,
    /// Frames; the first one is captured before any tick runs.
    pub frames: Vec<TraceFrame>,
    /// One report per tick.
    pub reports: Vec<TickReport>,
}

impl TickTrace {
    /// Final frame of the trace.
    pub fn last_frame(&self) -> Option<&TraceFrame> {
        self.frames.last()
    }

    /// Snapshots of one handler across every frame.
    pub fn history<'a>(
        &'a self,
        id: &'a HandlerId,
    ) -> impl Iterator<Item = &'a HandlerSnapshot> + 'a {
        self.frames
            .iter()
            .filter_map(move |frame| frame.handlers.iter().find(|h| &h.id == id))
    }
}

/// Capture every handler of `dispatcher` as a frame.
pub fn capture_frame(dispatcher: &UpdateDispatcher) -> Result<TraceFrame> {
    let handlers = dispatcher
        .handler_ids()
        .map(|id| -> Result<HandlerSnapshot> {
            Ok(HandlerSnapshot {
                id: id.clone(),
                state: dispatcher.state(id)?.clone(),
                last_error: dispatcher.last_error(id)?.cloned(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TraceFrame {
        tick: dispatcher.current_tick().0,
        handlers,
    })
}

/// Step `dispatcher` for `ticks` ticks, capturing a frame before the first
/// tick and after each one (so the trace holds `ticks + 1` frames).
pub fn run_tick_trace(
    name: impl Into<String>,
    dispatcher: &mut UpdateDispatcher,
    ticks: u64,
) -> Result<TickTrace> {
    let name = name.into();
    let mut frames = vec![capture_frame(dispatcher)?];
    let mut reports = Vec::new();

    for _ in 0..ticks {
        let report = dispatcher.tick();
        tracing::debug!(
            trace = %name,
            tick = report.tick.0,
            failed = report.failed().count(),
            "trace step"
        );
        reports.push(report);
        frames.push(capture_frame(dispatcher)?);
    }

    Ok(TickTrace {
        name,
        frames,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcraft_core::Patch;
    use patchcraft_dispatch::HandlerKind;

    #[test]
    fn trace_captures_initial_and_per_tick_frames() {
        let paper = HandlerId::parse("paper").unwrap();
        let mut dispatcher = UpdateDispatcher::new();
        dispatcher
            .register_with_state(
                paper.clone(),
                HandlerKind::Incremental,
                HandlerState::default().with_patches([Patch::new("p1", "x")]),
            )
            .unwrap();

        let trace = run_tick_trace("paper-three-ticks", &mut dispatcher, 3).unwrap();

        assert_eq!(trace.frames.len(), 4);
        assert_eq!(trace.reports.len(), 3);
        let versions: Vec<u64> = trace
            .history(&paper)
            .map(|snap| snap.state.patch_version)
            .collect();
        assert_eq!(versions, [0, 1, 2, 3]);
        assert_eq!(trace.frames[0].handlers[0].state.pending_patches.len(), 1);
        assert_eq!(trace.last_frame().map(|f| f.tick), Some(3));
    }

    #[test]
    fn zero_tick_trace_holds_only_the_initial_frame() {
        let mut dispatcher = UpdateDispatcher::new();
        dispatcher
            .register(HandlerId::parse("spigot").unwrap(), HandlerKind::NoOp)
            .unwrap();

        let trace = run_tick_trace("idle", &mut dispatcher, 0).unwrap();

        assert_eq!(trace.frames.len(), 1);
        assert!(trace.reports.is_empty());
        assert_eq!(dispatcher.current_tick().0, 0);
    }
}
