//! fsm-core: an embeddable finite state machine runtime
//!
//! A machine holds exactly one active state drawn from a closed set of state
//! shapes, routes each event to the hosting component's handler for the
//! `(event, active state)` pair, and commits transitions with exit and entry
//! hooks. Machines are safe to share between threads; the notifying variant
//! additionally broadcasts every entered state to subscribers registered per
//! shape.
//!
//! # Core Concepts
//!
//! - **State**: a sum type over the declared shapes, via the `State` trait
//! - **Handler**: exhaustive `(event, state)` bindings plus optional hooks
//! - **StateMachine**: dispatch, transitions and reads behind a reentrant lock
//! - **Subscribers**: per-shape observers for the notifying variant
//!
//! # Example
//!
//! ```rust
//! use fsm_core::core::{FsmError, FsmResult};
//! use fsm_core::machine::{Context, Handler, StateMachine};
//! use fsm_core::{event_enum, state_enum};
//!
//! state_enum! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub enum TaskState / TaskShape {
//!         Idle,
//!         Processing { task: String },
//!         Finished,
//!     }
//! }
//!
//! event_enum! {
//!     pub enum TaskEvent {
//!         Start,
//!         ChangeTask,
//!         Complete,
//!     }
//! }
//!
//! struct Pipeline;
//!
//! impl Handler for Pipeline {
//!     type State = TaskState;
//!     type Event = TaskEvent;
//!
//!     fn handle(&self, event: TaskEvent, state: &mut TaskState, ctx: &mut Context<Self>) -> FsmResult<()> {
//!         match (event, state) {
//!             (TaskEvent::Start, TaskState::Idle) => {
//!                 ctx.transition_to(TaskState::Processing { task: "Task1".into() })
//!             }
//!             (TaskEvent::ChangeTask, TaskState::Processing { task }) => *task = "Task2".into(),
//!             (TaskEvent::Complete, TaskState::Processing { .. }) => ctx.transition_to(TaskState::Finished),
//!             (event, state) => return Err(FsmError::unhandled(&event, state)),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let machine = StateMachine::new(Pipeline, TaskState::Idle);
//! machine.dispatch(TaskEvent::Start).unwrap();
//! machine.dispatch(TaskEvent::ChangeTask).unwrap();
//! assert_eq!(machine.snapshot().unwrap(), TaskState::Processing { task: "Task2".into() });
//!
//! machine.dispatch(TaskEvent::Complete).unwrap();
//! assert!(!machine.dispatch_safe(TaskEvent::Start));
//! assert_eq!(machine.shape().unwrap(), TaskShape::Finished);
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod notify;

// Re-export commonly used types
pub use builder::{BuildError, MachineOptions, StateMachineBuilder};
pub use crate::core::{Event, FsmError, FsmResult, Shape, State, StateHistory};
pub use machine::{Context, Handler, NotifyingStateMachine, Outcome, StateMachine};
pub use notify::{Notifier, Silent, Subscribers, SubscriptionId};
