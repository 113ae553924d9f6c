//! Handler variants and their update rules.

use crate::error::HandlerError;
use patchcraft_core::{Change, HandlerState, Patch};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Update behavior of a registered handler.
///
/// Scenario files may use the server names as aliases: `spigot` does nothing,
/// `paper` patches carefully, `yatopia` breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Leaves the state exactly as it was.
    #[serde(alias = "noop", alias = "spigot")]
    NoOp,
    /// Optimizes changes, validates every patch, then bumps the version.
    #[serde(alias = "paper")]
    Incremental,
    /// Always fails.
    #[serde(alias = "yatopia")]
    Unstable,
}

impl HandlerKind {
    /// All variants in declaration order.
    pub const ALL: [HandlerKind; 3] = [
        HandlerKind::NoOp,
        HandlerKind::Incremental,
        HandlerKind::Unstable,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::NoOp => "no_op",
            HandlerKind::Incremental => "incremental",
            HandlerKind::Unstable => "unstable",
        }
    }

    /// Compute the next state from `state`.
    ///
    /// The input is never modified; on error the caller keeps it as is.
    pub fn handle_update(self, state: &HandlerState) -> Result<HandlerState, HandlerError> {
        match self {
            HandlerKind::NoOp => Ok(state.clone()),
            HandlerKind::Incremental => incremental_update(state),
            HandlerKind::Unstable => Err(HandlerError::Chaos),
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn incremental_update(state: &HandlerState) -> Result<HandlerState, HandlerError> {
    for change in &state.pending_changes {
        optimize(change);
    }

    for patch in &state.pending_patches {
        test_thoroughly(patch)?;
    }

    let patch_version = state
        .patch_version
        .checked_add(1)
        .ok_or(HandlerError::VersionExhausted {
            version: state.patch_version,
        })?;

    debug!(
        optimized = state.pending_changes.len(),
        validated = state.pending_patches.len(),
        from_version = state.patch_version,
        "incremental update applied"
    );

    Ok(HandlerState {
        patch_version,
        pending_patches: Vec::new(),
        pending_changes: Vec::new(),
    })
}

/// Marks a change as processed. Identifiers are untouched, so running it twice
/// is the same as running it once.
fn optimize(change: &Change) {
    trace!(change = change.id(), "optimized change");
}

fn test_thoroughly(patch: &Patch) -> Result<(), HandlerError> {
    let reason = if patch.id().trim().is_empty() {
        "id is blank"
    } else if patch.payload().trim().is_empty() {
        "payload is blank"
    } else {
        return Ok(());
    };
    Err(HandlerError::PatchValidation {
        patch_id: patch.id().to_string(),
        reason: reason.to_string(),
    })
}
