//! Thread-safe state machine runtime.

use crate::builder::MachineOptions;
use crate::core::{Event, FsmError, FsmResult, Journal, Shape, State, StateCell, StateHistory};
use crate::machine::handler::{Context, Handler, Phase};
use crate::machine::{MachineId, Outcome};
use crate::notify::{Notifier, Silent, Subscribers, SubscriptionId};
use parking_lot::{Mutex, ReentrantMutex};
use std::any::Any;
use std::cell::{Cell, Ref};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Machine that broadcasts every entered state to per-shape subscribers.
pub type NotifyingStateMachine<H> = StateMachine<H, Subscribers<<H as Handler>::State>>;

type ShapeOf<H> = <<H as Handler>::State as State>::Shape;

/// State guarded by the machine lock.
struct Guarded<S: State> {
    cell: StateCell<S>,
    busy: Cell<bool>,
    readers: Cell<usize>,
}

impl<S: State> Guarded<S> {
    /// Mark the machine as running a mutating call on this thread.
    ///
    /// Refused while a mutating call or a `visit` closure is already running.
    fn enter(&self, operation: &'static str) -> FsmResult<BusyGuard<'_>> {
        if self.readers.get() > 0 || self.busy.replace(true) {
            return Err(FsmError::Reentrant { operation });
        }
        Ok(BusyGuard(&self.busy))
    }

    /// Shared view of the active state, counted until dropped.
    fn read(&self) -> FsmResult<ReadGuard<'_, S>> {
        let state = self.cell.current()?;
        self.readers.set(self.readers.get() + 1);
        Ok(ReadGuard {
            state,
            readers: &self.readers,
        })
    }
}

struct ReadGuard<'a, S> {
    state: Ref<'a, S>,
    readers: &'a Cell<usize>,
}

impl<S> Drop for ReadGuard<'_, S> {
    fn drop(&mut self) {
        self.readers.set(self.readers.get() - 1);
    }
}

struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

enum Work<H: Handler> {
    Event(H::Event),
    Transition(H::State),
}

#[derive(Default)]
struct Tally {
    transitions: usize,
    events: usize,
}

/// Finite state machine over the closed state set of a [`Handler`].
///
/// All access to the active state is serialized by one reentrant lock per
/// machine. Events delivered from several threads are applied one at a time,
/// in lock acquisition order. Code running inside the machine (handlers,
/// hooks, subscribers) may read the state through [`visit`](Self::visit) but
/// mutating calls from it are refused with [`FsmError::Reentrant`]; it queues
/// follow-up work through its [`Context`] instead.
pub struct StateMachine<H: Handler, N: Notifier<H::State> = Silent> {
    id: MachineId,
    label: String,
    max_followups: usize,
    handler: H,
    notifier: N,
    guarded: ReentrantMutex<Guarded<H::State>>,
    journal: Mutex<Journal>,
}

impl<H: Handler> StateMachine<H> {
    /// Create a machine in `initial` with default options.
    ///
    /// No entry hook runs for the initial state.
    pub fn new(handler: H, initial: H::State) -> Self {
        Self::with_parts(handler, initial, Silent, &MachineOptions::default())
    }
}

impl<H: Handler> StateMachine<H, Subscribers<H::State>> {
    /// Create a notifying machine in `initial` with default options.
    pub fn notifying(handler: H, initial: H::State) -> Self {
        Self::with_parts(
            handler,
            initial,
            Subscribers::new(),
            &MachineOptions::default(),
        )
    }

    /// Call `callback` every time the machine enters `shape`.
    pub fn subscribe<F>(&self, shape: ShapeOf<H>, callback: F) -> SubscriptionId<ShapeOf<H>>
    where
        F: Fn(&H::State) -> FsmResult<()> + Send + Sync + 'static,
    {
        self.notifier.subscribe(shape, callback)
    }

    /// Remove a subscription. Returns `false` if it was unknown or already removed.
    pub fn unsubscribe(&self, id: SubscriptionId<ShapeOf<H>>) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Number of live subscriptions for `shape`.
    pub fn subscriber_count(&self, shape: ShapeOf<H>) -> usize {
        self.notifier.count(shape)
    }
}

impl<H: Handler, N: Notifier<H::State>> StateMachine<H, N> {
    pub(crate) fn with_parts(
        handler: H,
        initial: H::State,
        notifier: N,
        options: &MachineOptions,
    ) -> Self {
        let id = MachineId::new();
        let label = options.name.clone().unwrap_or_else(|| id.to_string());
        debug!(machine = %label, state = initial.name(), "machine created");
        Self {
            id,
            label,
            max_followups: options.max_followups,
            handler,
            notifier,
            guarded: ReentrantMutex::new(Guarded {
                cell: StateCell::new(initial),
                busy: Cell::new(false),
                readers: Cell::new(0),
            }),
            journal: Mutex::new(Journal::new(options.journal_capacity)),
        }
    }

    /// Identifier assigned at construction.
    pub fn id(&self) -> MachineId {
        self.id
    }

    /// Configured name, or the machine id when none was given.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The hosting component.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The notifier receiving every entered state.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Route `event` to the handler bound to the active state.
    ///
    /// Any transition the handler requests, and any follow-up work queued by
    /// it or by the hooks it triggers, completes before this returns.
    pub fn dispatch(&self, event: H::Event) -> FsmResult<Outcome<ShapeOf<H>>> {
        let guarded = self.guarded.lock();
        let _busy = guarded.enter("dispatch")?;
        self.run(&guarded, Work::Event(event))
    }

    /// Like [`dispatch`](Self::dispatch) but never fails.
    ///
    /// Errors and panics raised while handling are logged and reported as
    /// `false`, for event sources such as timers that cannot react to them.
    pub fn dispatch_safe(&self, event: H::Event) -> bool {
        let event_name = event.name();
        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(event))) {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(machine = %self.label, event = event_name, error = %e, "event dispatch failed");
                false
            }
            Err(payload) => {
                warn!(
                    machine = %self.label,
                    event = event_name,
                    panic = panic_message(payload.as_ref()),
                    "event handler panicked"
                );
                false
            }
        }
    }

    /// Commit `new_state`, running the exit hook of the active state before
    /// the swap and the entry hook and notifications of `new_state` after it.
    pub fn transition_to(&self, new_state: H::State) -> FsmResult<Outcome<ShapeOf<H>>> {
        let guarded = self.guarded.lock();
        let _busy = guarded.enter("transition")?;
        self.run(&guarded, Work::Transition(new_state))
    }

    /// Call `f` with a read-only reference to the active state.
    ///
    /// Allowed from hooks and subscribers; refused from inside a handler,
    /// which already has the state. Mutating calls made from `f` are refused.
    pub fn visit<R>(&self, f: impl FnOnce(&H::State) -> R) -> FsmResult<R> {
        let guarded = self.guarded.lock();
        let read = guarded.read()?;
        Ok(f(&read.state))
    }

    /// Shape of the active state.
    pub fn shape(&self) -> FsmResult<ShapeOf<H>> {
        self.guarded.lock().cell.shape()
    }

    pub fn is_final(&self) -> FsmResult<bool> {
        self.visit(|state| state.is_final())
    }

    /// Copy of the active state.
    pub fn snapshot(&self) -> FsmResult<H::State>
    where
        H::State: Clone,
    {
        self.visit(Clone::clone)
    }

    /// Most recent committed transitions.
    pub fn history(&self) -> StateHistory {
        self.journal.lock().snapshot()
    }

    /// Number of transitions committed since construction.
    pub fn transition_count(&self) -> u64 {
        self.journal.lock().total()
    }

    /// Exchange the active states of two machines.
    ///
    /// Neither hooks nor notifications run.
    pub fn swap(&self, other: &Self) -> FsmResult<()> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }
        // Fixed lock order keeps concurrent a.swap(b) / b.swap(a) from deadlocking.
        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };
        let first_guard = first.guarded.lock();
        let second_guard = second.guarded.lock();
        let _first_busy = first_guard.enter("swap")?;
        let _second_busy = second_guard.enter("swap")?;
        first_guard.cell.swap(&second_guard.cell)?;
        debug!(first = %first.label, second = %second.label, "states swapped");
        Ok(())
    }

    /// Independent machine starting from a copy of the active state.
    ///
    /// The fork gets a fresh id, an empty journal and an empty notifier.
    pub fn fork(&self) -> FsmResult<Self>
    where
        H: Clone,
        H::State: Clone,
        N: Default,
    {
        let state = self.snapshot()?;
        let options = MachineOptions {
            name: None,
            max_followups: self.max_followups,
            journal_capacity: self.journal.lock().capacity(),
        };
        Ok(Self::with_parts(
            self.handler.clone(),
            state,
            N::default(),
            &options,
        ))
    }

    /// Consume the machine, returning the active state.
    pub fn into_state(self) -> H::State {
        self.guarded.into_inner().cell.into_inner()
    }

    fn run(
        &self,
        guarded: &Guarded<H::State>,
        first: Work<H>,
    ) -> FsmResult<Outcome<ShapeOf<H>>> {
        let previous = guarded.cell.shape()?;
        let mut ctx = Context::new();
        let mut tally = Tally::default();

        if let Err(e) = self.drive(guarded, first, &mut ctx, &mut tally) {
            let dropped = ctx.clear();
            if dropped > 0 {
                debug!(machine = %self.label, dropped, error = %e, "discarding queued events");
            }
            return Err(e);
        }

        Ok(Outcome {
            previous,
            current: guarded.cell.shape()?,
            transitions: tally.transitions,
            events: tally.events,
        })
    }

    fn drive(
        &self,
        guarded: &Guarded<H::State>,
        first: Work<H>,
        ctx: &mut Context<H>,
        tally: &mut Tally,
    ) -> FsmResult<()> {
        let mut next = Some(first);
        while let Some(work) = next.take() {
            match work {
                Work::Event(event) => {
                    tally.events += 1;
                    self.handle_event(guarded, event, ctx)?;
                }
                Work::Transition(state) => ctx.schedule(state),
            }
            self.check_followups(ctx)?;

            while let Some(target) = ctx.take_transition() {
                self.commit(guarded, target, ctx)?;
                tally.transitions += 1;
                self.check_followups(ctx)?;
            }

            next = ctx.next_event().map(Work::Event);
        }
        Ok(())
    }

    fn handle_event(
        &self,
        guarded: &Guarded<H::State>,
        event: H::Event,
        ctx: &mut Context<H>,
    ) -> FsmResult<()> {
        let mut state = guarded.cell.current_mut()?;
        debug!(machine = %self.label, event = event.name(), state = state.name(), "dispatching");

        ctx.enter_phase(Phase::Handler);
        let result = self.handler.handle(event, &mut *state, ctx);
        if result.is_err() {
            ctx.take_transition();
        }
        result
    }

    fn commit(
        &self,
        guarded: &Guarded<H::State>,
        target: H::State,
        ctx: &mut Context<H>,
    ) -> FsmResult<()> {
        ctx.enter_phase(Phase::Hook);
        {
            let outgoing = guarded.cell.current()?;
            self.handler.on_exit(&outgoing, ctx)?;
        }

        let to = target.shape();
        let from = guarded.cell.replace(target)?;
        self.journal.lock().record(from.name(), to.name());
        debug!(machine = %self.label, from = from.name(), to = to.name(), "transition committed");

        let incoming = guarded.cell.current()?;
        self.handler.on_enter(&incoming, ctx)?;
        self.notifier.notify(&incoming)
    }

    fn check_followups(&self, ctx: &Context<H>) -> FsmResult<()> {
        if ctx.followups() > self.max_followups {
            return Err(FsmError::FollowupLimitExceeded {
                limit: self.max_followups,
            });
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
