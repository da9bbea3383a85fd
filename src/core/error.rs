//! Errors raised while dispatching events and committing transitions.

use crate::core::{Event, State};
use thiserror::Error;

/// Result type for state machine operations
pub type FsmResult<T> = Result<T, FsmError>;

/// Errors that can occur while a machine handles an event.
///
/// None of these are fatal: each one is local to the call that produced it
/// and the machine always keeps exactly one active state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FsmError {
    /// The hosting component has no binding for this `(event, state)` pair.
    #[error("Unhandled event '{event}' in state '{state}'")]
    UnhandledTransition { event: String, state: String },

    /// A handler, hook or subscriber reported a failure of its own.
    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    /// A mutating call was made on a machine from code it is currently running.
    ///
    /// Follow-up work has to go through [`Context`](crate::machine::Context).
    #[error("Re-entrant {operation} refused: queue follow-up work through the handler context")]
    Reentrant { operation: &'static str },

    /// More follow-up events or chained transitions than the machine allows per call.
    #[error("Follow-up limit ({limit}) exceeded")]
    FollowupLimitExceeded { limit: usize },

    /// One or more subscribers failed while being notified of an entry.
    #[error("{count} subscriber(s) failed on entry into '{state}'", count = .failures.len())]
    SubscribersFailed { state: String, failures: Vec<String> },
}

impl FsmError {
    /// Build the error a fallback binding reports for an unhandled pair.
    pub fn unhandled<E: Event, S: State>(event: &E, state: &S) -> Self {
        FsmError::UnhandledTransition {
            event: event.name().to_string(),
            state: state.name().to_string(),
        }
    }

    /// Wrap an arbitrary failure raised by host code.
    pub fn handler(message: impl Into<String>) -> Self {
        FsmError::HandlerFailed(message.into())
    }

    /// Whether this error is the fallback's `UnhandledTransition`.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, FsmError::UnhandledTransition { .. })
    }
}
