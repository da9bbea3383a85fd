//! Event dispatch, transitions and the thread-safe machine runtime.
//!
//! # Key Concepts
//!
//! - **Handler**: the hosting component; binds every `(event, state)` pair and
//!   optionally hooks state entry and exit
//! - **Context**: lets handlers and hooks request transitions and queue
//!   follow-up events without re-entering the machine
//! - **StateMachine**: owns the active state behind a per-machine lock and
//!   runs the dispatch and transition protocol
//!
//! # Reentrancy
//!
//! The lock is reentrant, so a handler, hook or subscriber calling back into
//! its own machine on the same thread never deadlocks. Reads
//! ([`StateMachine::visit`]) from hooks and subscribers succeed; mutating calls
//! fail with [`FsmError::Reentrant`](crate::core::FsmError::Reentrant). Work
//! queued on the [`Context`] runs before the outermost call returns, inside the
//! same lock hold, so other threads never observe it half done.

mod handler;
mod runtime;

pub use handler::{Context, Handler};
pub use runtime::{NotifyingStateMachine, StateMachine};

use std::fmt;
use uuid::Uuid;

/// Unique identifier assigned to every machine at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MachineId(Uuid);

impl MachineId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of one `dispatch` or `transition_to` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome<K> {
    /// Shape active when the call started
    pub previous: K,
    /// Shape active when the call returned
    pub current: K,
    /// Transitions committed, including chained ones
    pub transitions: usize,
    /// Events handled, the dispatched one plus follow-ups
    pub events: usize,
}

impl<K> Outcome<K> {
    pub fn transitioned(&self) -> bool {
        self.transitions > 0
    }
}
