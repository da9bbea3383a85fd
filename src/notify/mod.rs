//! New-state notification.
//!
//! Every machine owns a [`Notifier`] that the transition engine calls right
//! after the entry hook of a newly committed state. Plain machines use the
//! zero-sized [`Silent`] notifier; the notifying variant uses a
//! [`Subscribers`] registry of callbacks keyed by state shape.

mod registry;

pub use registry::{Subscribers, SubscriptionId, SubscriberCallback};

use crate::core::{FsmResult, State};

/// Receives every state a machine enters.
pub trait Notifier<S: State>: Send + Sync {
    /// Called once per entry, after the entry hook, with the new state.
    fn notify(&self, state: &S) -> FsmResult<()>;
}

/// Notifier that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl<S: State> Notifier<S> for Silent {
    #[inline]
    fn notify(&self, _state: &S) -> FsmResult<()> {
        Ok(())
    }
}
