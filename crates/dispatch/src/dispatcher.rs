//! Tick loop over registered handlers.

use crate::error::{DispatchError, HandlerError};
use crate::handler::HandlerKind;
use patchcraft_core::{HandlerId, HandlerState, SimTick};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Cumulative per-handler tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HandlerStats {
    /// Ticks whose update was applied.
    pub succeeded: u64,
    /// Ticks whose update failed and was discarded.
    pub failed: u64,
}

struct HandlerEntry {
    id: HandlerId,
    kind: HandlerKind,
    state: HandlerState,
    last_error: Option<HandlerError>,
    stats: HandlerStats,
}

/// Result of one handler's update within a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The returned state replaced the previous one.
    Applied {
        /// Patch version after the update.
        patch_version: u64,
    },
    /// The update failed; the previous state was kept.
    Failed {
        /// Captured failure.
        error: HandlerError,
    },
}

/// One handler's entry in a [`TickReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerOutcome {
    /// Handler that ran.
    pub id: HandlerId,
    /// Its behavior.
    pub kind: HandlerKind,
    /// What happened.
    #[serde(flatten)]
    pub result: OutcomeKind,
}

impl HandlerOutcome {
    /// Captured failure, if the update failed.
    pub fn error(&self) -> Option<&HandlerError> {
        match &self.result {
            OutcomeKind::Failed { error } => Some(error),
            OutcomeKind::Applied { .. } => None,
        }
    }
}

/// Summary of a completed tick, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tick that was processed.
    pub tick: SimTick,
    /// Per-handler outcomes.
    pub outcomes: Vec<HandlerOutcome>,
}

impl TickReport {
    /// Outcomes whose update was applied.
    pub fn succeeded(&self) -> impl Iterator<Item = &HandlerOutcome> {
        self.outcomes.iter().filter(|o| o.error().is_none())
    }

    /// Outcomes whose update failed.
    pub fn failed(&self) -> impl Iterator<Item = &HandlerOutcome> {
        self.outcomes.iter().filter(|o| o.error().is_some())
    }

    /// True when every handler succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Holds registered handlers and drives them one tick at a time.
///
/// Handlers run strictly in registration order. Each owns its state; a failing
/// handler keeps its previous state and never stops the rest of the tick.
#[derive(Default)]
pub struct UpdateDispatcher {
    entries: Vec<HandlerEntry>,
    current_tick: SimTick,
}

impl UpdateDispatcher {
    /// Create an empty dispatcher at [`SimTick::ZERO`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler with the zero state.
    pub fn register(&mut self, id: HandlerId, kind: HandlerKind) -> Result<(), DispatchError> {
        self.register_with_state(id, kind, HandlerState::default())
    }

    /// Register a handler with an explicit initial state.
    pub fn register_with_state(
        &mut self,
        id: HandlerId,
        kind: HandlerKind,
        state: HandlerState,
    ) -> Result<(), DispatchError> {
        if self.position(&id).is_some() {
            return Err(DispatchError::DuplicateHandler(id));
        }
        info!(handler = %id, %kind, "registered handler");
        self.entries.push(HandlerEntry {
            id,
            kind,
            state,
            last_error: None,
            stats: HandlerStats::default(),
        });
        Ok(())
    }

    /// Remove a handler, returning its final state.
    pub fn deregister(&mut self, id: &HandlerId) -> Result<HandlerState, DispatchError> {
        let index = self
            .position(id)
            .ok_or_else(|| DispatchError::UnknownHandler(id.clone()))?;
        let entry = self.entries.remove(index);
        info!(handler = %entry.id, "deregistered handler");
        Ok(entry.state)
    }

    /// Run every handler once and advance the tick counter.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.current_tick;
        let mut outcomes = Vec::with_capacity(self.entries.len());

        for entry in &mut self.entries {
            let result = match entry.kind.handle_update(&entry.state) {
                Ok(next) => {
                    entry.state = next;
                    entry.last_error = None;
                    entry.stats.succeeded += 1;
                    debug!(
                        tick = tick.0,
                        handler = %entry.id,
                        patch_version = entry.state.patch_version,
                        "handler updated"
                    );
                    OutcomeKind::Applied {
                        patch_version: entry.state.patch_version,
                    }
                }
                Err(error) => {
                    warn!(tick = tick.0, handler = %entry.id, %error, "handler update failed");
                    entry.last_error = Some(error.clone());
                    entry.stats.failed += 1;
                    OutcomeKind::Failed { error }
                }
            };
            outcomes.push(HandlerOutcome {
                id: entry.id.clone(),
                kind: entry.kind,
                result,
            });
        }

        self.current_tick = tick.advance(1);
        TickReport { tick, outcomes }
    }

    /// Current state of a handler.
    pub fn state(&self, id: &HandlerId) -> Result<&HandlerState, DispatchError> {
        self.entry(id).map(|entry| &entry.state)
    }

    /// Error from the handler's most recent tick, if that tick failed.
    pub fn last_error(&self, id: &HandlerId) -> Result<Option<&HandlerError>, DispatchError> {
        self.entry(id).map(|entry| entry.last_error.as_ref())
    }

    /// Behavior a handler was registered with.
    pub fn kind(&self, id: &HandlerId) -> Result<HandlerKind, DispatchError> {
        self.entry(id).map(|entry| entry.kind)
    }

    /// Cumulative tick counters for a handler.
    pub fn stats(&self, id: &HandlerId) -> Result<HandlerStats, DispatchError> {
        self.entry(id).map(|entry| entry.stats)
    }

    /// Registered ids in registration order.
    pub fn handler_ids(&self) -> impl Iterator<Item = &HandlerId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tick that the next call to [`tick`](Self::tick) will process.
    pub fn current_tick(&self) -> SimTick {
        self.current_tick
    }

    fn position(&self, id: &HandlerId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    fn entry(&self, id: &HandlerId) -> Result<&HandlerEntry, DispatchError> {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| DispatchError::UnknownHandler(id.clone()))
    }
}
