#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod handler_id;
pub mod state;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use handler_id::{HandlerId, HandlerIdError, DEFAULT_NAMESPACE};
pub use state::{Change, HandlerState, Patch};

/// Discrete update tick counter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}
