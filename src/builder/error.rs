//! Build errors for state machines.

use thiserror::Error;

/// Errors that can occur when building state machines.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Follow-up limit must be at least 1")]
    InvalidFollowupLimit,

    #[error("Invalid machine options: {0}")]
    InvalidOptions(String),
}
