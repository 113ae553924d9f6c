//! Error taxonomy: dispatcher misuse and captured handler failures.

use patchcraft_core::HandlerId;
use serde::Serialize;
use thiserror::Error;

/// Caller misuse of the dispatcher, returned immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A handler with this id is already registered.
    #[error("handler {0} is already registered")]
    DuplicateHandler(HandlerId),
    /// No handler with this id is registered.
    #[error("handler {0} is not registered")]
    UnknownHandler(HandlerId),
}

/// Failure raised inside a handler's update.
///
/// The dispatcher captures these per handler during a tick; they never escape
/// [`UpdateDispatcher::tick`](crate::UpdateDispatcher::tick).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum HandlerError {
    /// A pending patch failed validation; nothing from the update was applied.
    #[error("patch `{patch_id}` failed validation: {reason}")]
    PatchValidation {
        /// Id of the first patch that failed.
        patch_id: String,
        /// Why it failed.
        reason: String,
    },
    /// The patch version cannot advance any further.
    #[error("patch version {version} cannot be incremented")]
    VersionExhausted {
        /// Version the handler is stuck at.
        version: u64,
    },
    /// The handler wreaked havoc instead of updating.
    #[error("handler wreaked havoc during update")]
    Chaos,
}
