#![warn(missing_docs)]
//! Update dispatch: handler variants and the tick loop that drives them.

mod dispatcher;
mod error;
mod handler;

pub use dispatcher::{HandlerOutcome, HandlerStats, OutcomeKind, TickReport, UpdateDispatcher};
pub use error::{DispatchError, HandlerError};
pub use handler::HandlerKind;
