//! Contract between a machine and its hosting component.

use crate::core::{Event, FsmResult, State};
use std::collections::VecDeque;

/// Event handlers and lifecycle hooks supplied by the hosting component.
///
/// `handle` receives every dispatched event together with mutable access to
/// the active state. Implement it as one exhaustive `match` over
/// `(event, state)`: the compiler then guarantees every pair is bound, and the
/// trailing catch-all arm is the fallback binding. The fallback should return
/// [`FsmError::unhandled`](crate::core::FsmError::unhandled).
///
/// `on_enter` and `on_exit` are optional. When left out they compile to
/// nothing.
///
/// Handlers and hooks must not call back into the machine that runs them;
/// follow-up events and transitions go through the [`Context`].
///
/// # Example
///
/// ```rust
/// use fsm_core::core::{FsmError, FsmResult};
/// use fsm_core::machine::{Context, Handler, StateMachine};
/// use fsm_core::{event_enum, state_enum};
///
/// state_enum! {
///     #[derive(Debug, PartialEq)]
///     pub enum Door / DoorShape {
///         Closed,
///         Open,
///     }
/// }
///
/// event_enum! {
///     pub enum DoorEvent {
///         Push,
///         Pull,
///     }
/// }
///
/// struct DoorLogic;
///
/// impl Handler for DoorLogic {
///     type State = Door;
///     type Event = DoorEvent;
///
///     fn handle(&self, event: DoorEvent, state: &mut Door, ctx: &mut Context<Self>) -> FsmResult<()> {
///         match (event, state) {
///             (DoorEvent::Push, Door::Closed) => ctx.transition_to(Door::Open),
///             (DoorEvent::Pull, Door::Open) => ctx.transition_to(Door::Closed),
///             (event, state) => return Err(FsmError::unhandled(&event, state)),
///         }
///         Ok(())
///     }
/// }
///
/// let door = StateMachine::new(DoorLogic, Door::Closed);
/// door.dispatch(DoorEvent::Push).unwrap();
/// assert_eq!(door.shape().unwrap(), DoorShape::Open);
/// assert!(door.dispatch(DoorEvent::Push).unwrap_err().is_unhandled());
/// ```
pub trait Handler: Send + Sync + Sized + 'static {
    type State: State;
    type Event: Event;

    /// Handle `event` while the machine is in `state`.
    ///
    /// The payload of `state` may be changed in place. A transition requested
    /// through `ctx` is committed once this returns `Ok`; it is discarded if
    /// this returns an error.
    fn handle(
        &self,
        event: Self::Event,
        state: &mut Self::State,
        ctx: &mut Context<Self>,
    ) -> FsmResult<()>;

    /// Called after `state` became the active state.
    fn on_enter(&self, _state: &Self::State, _ctx: &mut Context<Self>) -> FsmResult<()> {
        Ok(())
    }

    /// Called while `state` is still active, right before it is replaced.
    fn on_exit(&self, _state: &Self::State, _ctx: &mut Context<Self>) -> FsmResult<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Handler,
    Hook,
}

/// Follow-up work requested by handlers and hooks.
///
/// Everything queued here runs before the outermost `dispatch` or
/// `transition_to` returns, under the same lock hold: queued events in FIFO
/// order, each after the transition requested before it has completed.
pub struct Context<H: Handler> {
    pending: Option<H::State>,
    queue: VecDeque<H::Event>,
    followups: usize,
    phase: Phase,
}

impl<H: Handler> Context<H> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            queue: VecDeque::new(),
            followups: 0,
            phase: Phase::Handler,
        }
    }

    /// Request a transition to `state`.
    ///
    /// From a handler the transition is committed when the handler returns.
    /// From a hook it is committed once the current transition, including its
    /// entry hook and notifications, has completed. The last request wins.
    pub fn transition_to(&mut self, state: H::State) {
        if self.phase == Phase::Hook {
            self.followups += 1;
        }
        self.pending = Some(state);
    }

    /// Queue `event` to be dispatched after the current work completes.
    pub fn post(&mut self, event: H::Event) {
        self.followups += 1;
        self.queue.push_back(event);
    }

    pub fn has_pending_transition(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of events waiting to be dispatched.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn followups(&self) -> usize {
        self.followups
    }

    pub(crate) fn take_transition(&mut self) -> Option<H::State> {
        self.pending.take()
    }

    pub(crate) fn schedule(&mut self, state: H::State) {
        self.pending = Some(state);
    }

    pub(crate) fn next_event(&mut self) -> Option<H::Event> {
        self.queue.pop_front()
    }

    /// Drop all outstanding work, returning how many events were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        self.pending = None;
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }
}
