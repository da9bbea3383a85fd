//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::options::MachineOptions;
use crate::machine::{Handler, StateMachine};
use crate::notify::{Notifier, Silent, Subscribers};

/// Builder for constructing state machines with a fluent API.
pub struct StateMachineBuilder<H: Handler, N: Notifier<H::State> = Silent> {
    handler: H,
    initial: Option<H::State>,
    notifier: N,
    options: MachineOptions,
}

impl<H: Handler> StateMachineBuilder<H> {
    /// Create a new builder around the hosting component.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            initial: None,
            notifier: Silent,
            options: MachineOptions::default(),
        }
    }
}

impl<H: Handler, N: Notifier<H::State>> StateMachineBuilder<H, N> {
    /// Set the initial state (required).
    pub fn initial(mut self, state: H::State) -> Self {
        self.initial = Some(state);
        self
    }

    /// Name used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    /// Bound on follow-up events and hook-requested transitions per call.
    pub fn max_followups(mut self, limit: usize) -> Self {
        self.options.max_followups = limit;
        self
    }

    /// Number of transitions kept in the journal.
    pub fn journal_capacity(mut self, capacity: usize) -> Self {
        self.options.journal_capacity = capacity;
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, options: MachineOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom notifier.
    pub fn notifier<M: Notifier<H::State>>(self, notifier: M) -> StateMachineBuilder<H, M> {
        StateMachineBuilder {
            handler: self.handler,
            initial: self.initial,
            notifier,
            options: self.options,
        }
    }

    /// Build a notifying machine with an empty subscriber registry.
    pub fn notifying(self) -> StateMachineBuilder<H, Subscribers<H::State>> {
        self.notifier(Subscribers::new())
    }

    /// Build the state machine.
    /// Returns an error if required fields are missing or options are invalid.
    pub fn build(self) -> Result<StateMachine<H, N>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        self.options.validate()?;

        Ok(StateMachine::with_parts(
            self.handler,
            initial,
            self.notifier,
            &self.options,
        ))
    }
}
