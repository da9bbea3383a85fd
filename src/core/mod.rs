//! Core state machine types.
//!
//! This module contains the building blocks every machine is made of:
//! - State, shape and event definitions via the `State`, `Shape` and `Event` traits
//! - The single-value `StateCell` holding the active state
//! - The transition journal
//! - The error taxonomy shared by dispatch and notification

mod container;
mod error;
mod history;
mod state;

pub use container::StateCell;
pub use error::{FsmError, FsmResult};
pub use history::{Journal, StateHistory, TransitionRecord};
pub use state::{Event, Shape, State};
