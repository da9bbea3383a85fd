//! Builder API for ergonomic state machine construction.
//!
//! This module provides the fluent builder, machine options and the
//! `state_enum!` / `event_enum!` macros for declaring closed state and event
//! sets with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod options;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use options::{MachineOptions, DEFAULT_JOURNAL_CAPACITY, DEFAULT_MAX_FOLLOWUPS};
