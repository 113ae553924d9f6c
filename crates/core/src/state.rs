//! Per-handler update state and the work items it carries.

use serde::{Deserialize, Serialize};

/// A unit of change that must pass validation before it is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patch {
    id: String,
    payload: String,
}

impl Patch {
    /// Create a patch from an identifier and payload.
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Patch identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Patch payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// A pending modification awaiting optimization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    id: String,
    payload: String,
}

impl Change {
    /// Create a change from an identifier and payload.
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Change identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Change payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// State owned by a single registered handler.
///
/// The default value is the zero state: version 0 with nothing pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerState {
    /// Number of successfully applied update rounds.
    pub patch_version: u64,
    /// Patches waiting for validation, in arrival order.
    #[serde(default)]
    pub pending_patches: Vec<Patch>,
    /// Changes waiting for optimization, in arrival order.
    #[serde(default)]
    pub pending_changes: Vec<Change>,
}

impl HandlerState {
    /// Create a state from explicit parts.
    pub fn new(
        patch_version: u64,
        pending_patches: Vec<Patch>,
        pending_changes: Vec<Change>,
    ) -> Self {
        Self {
            patch_version,
            pending_patches,
            pending_changes,
        }
    }

    /// Replace the pending patches.
    pub fn with_patches(mut self, patches: impl IntoIterator<Item = Patch>) -> Self {
        self.pending_patches = patches.into_iter().collect();
        self
    }

    /// Replace the pending changes.
    pub fn with_changes(mut self, changes: impl IntoIterator<Item = Change>) -> Self {
        self.pending_changes = changes.into_iter().collect();
        self
    }

    /// True when no patches or changes are pending.
    pub fn is_settled(&self) -> bool {
        self.pending_patches.is_empty() && self.pending_changes.is_empty()
    }
}
