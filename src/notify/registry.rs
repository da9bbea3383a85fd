//! Per-shape subscriber registry.

use super::Notifier;
use crate::core::{FsmError, FsmResult, Shape, State};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{trace, warn};

/// Callback invoked with each newly entered state of the subscribed shape.
pub type SubscriberCallback<S> = Arc<dyn Fn(&S) -> FsmResult<()> + Send + Sync>;

/// Handle returned by [`Subscribers::subscribe`].
///
/// Sequence numbers are assigned per shape, increase monotonically and are
/// never reused, even after the subscription is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId<K: Shape> {
    shape: K,
    sequence: u64,
}

impl<K: Shape> SubscriptionId<K> {
    pub fn shape(&self) -> K {
        self.shape
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl<K: Shape> fmt::Display for SubscriptionId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.shape.name(), self.sequence)
    }
}

struct Slot<S> {
    next_sequence: u64,
    entries: Vec<(u64, SubscriberCallback<S>)>,
}

impl<S> Default for Slot<S> {
    fn default() -> Self {
        Self {
            next_sequence: 1,
            entries: Vec::new(),
        }
    }
}

/// Ordered subscriber lists, one per state shape.
///
/// Callbacks run outside the registry lock on a snapshot of the list, so a
/// callback may subscribe or unsubscribe (itself included) while being
/// notified; such changes take effect from the next entry.
///
/// A failing callback does not stop the others. All failures of one entry are
/// collected and reported together as [`FsmError::SubscribersFailed`].
pub struct Subscribers<S: State> {
    slots: Mutex<HashMap<S::Shape, Slot<S>>>,
}

impl<S: State> Subscribers<S> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Register `callback` for every future entry into `shape`.
    pub fn subscribe<F>(&self, shape: S::Shape, callback: F) -> SubscriptionId<S::Shape>
    where
        F: Fn(&S) -> FsmResult<()> + Send + Sync + 'static,
    {
        let mut slots = self.slots.lock();
        let slot = slots.entry(shape).or_default();
        let sequence = slot.next_sequence;
        slot.next_sequence += 1;
        slot.entries.push((sequence, Arc::new(callback)));

        let id = SubscriptionId { shape, sequence };
        trace!(subscription = %id, "subscribed");
        id
    }

    /// Remove a subscription. Returns `false` if it was unknown or already removed.
    pub fn unsubscribe(&self, id: SubscriptionId<S::Shape>) -> bool {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(&id.shape) else {
            return false;
        };
        let Some(index) = slot.entries.iter().position(|(seq, _)| *seq == id.sequence) else {
            return false;
        };
        slot.entries.remove(index);
        trace!(subscription = %id, "unsubscribed");
        true
    }

    /// Number of live subscriptions for `shape`.
    pub fn count(&self, shape: S::Shape) -> usize {
        self.slots
            .lock()
            .get(&shape)
            .map_or(0, |slot| slot.entries.len())
    }

    fn snapshot(&self, shape: S::Shape) -> Vec<(u64, SubscriberCallback<S>)> {
        self.slots
            .lock()
            .get(&shape)
            .map(|slot| slot.entries.clone())
            .unwrap_or_default()
    }
}

impl<S: State> Default for Subscribers<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Notifier<S> for Subscribers<S> {
    fn notify(&self, state: &S) -> FsmResult<()> {
        let callbacks = self.snapshot(state.shape());
        if callbacks.is_empty() {
            return Ok(());
        }
        trace!(state = state.name(), subscribers = callbacks.len(), "notifying");

        let outcomes: Vec<Validation<(), NonEmptyVec<String>>> = callbacks
            .iter()
            .map(|(sequence, callback)| match callback(state) {
                Ok(()) => Validation::success(()),
                Err(e) => {
                    warn!(state = state.name(), subscriber = sequence, error = %e, "subscriber failed");
                    Validation::fail(format!("subscriber {sequence}: {e}"))
                }
            })
            .collect();

        match Validation::all_vec(outcomes) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(FsmError::SubscribersFailed {
                state: state.name().to_string(),
                failures: errors.iter().cloned().collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    enum Light {
        Red,
        Green { lane: u8 },
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum LightShape {
        Red,
        Green,
    }

    impl Shape for LightShape {
        fn name(&self) -> &'static str {
            match self {
                Self::Red => "Red",
                Self::Green => "Green",
            }
        }
    }

    impl State for Light {
        type Shape = LightShape;

        fn shape(&self) -> LightShape {
            match self {
                Self::Red => LightShape::Red,
                Self::Green { .. } => LightShape::Green,
            }
        }
    }

    #[test]
    fn sequences_are_monotonic_per_shape() {
        let subscribers = Subscribers::<Light>::new();
        let a = subscribers.subscribe(LightShape::Red, |_| Ok(()));
        let b = subscribers.subscribe(LightShape::Red, |_| Ok(()));
        let c = subscribers.subscribe(LightShape::Green, |_| Ok(()));

        assert_eq!(a.sequence(), 1);
        assert_eq!(b.sequence(), 2);
        assert_eq!(c.sequence(), 1);
        assert_eq!(c.shape(), LightShape::Green);
        assert_eq!(a.to_string(), "Red#1");
    }

    #[test]
    fn sequences_are_not_reused_after_unsubscribe() {
        let subscribers = Subscribers::<Light>::new();
        let a = subscribers.subscribe(LightShape::Red, |_| Ok(()));
        assert!(subscribers.unsubscribe(a));
        let b = subscribers.subscribe(LightShape::Red, |_| Ok(()));

        assert!(b.sequence() > a.sequence());
    }

    #[test]
    fn unsubscribe_unknown_returns_false() {
        let subscribers = Subscribers::<Light>::new();
        let id = subscribers.subscribe(LightShape::Red, |_| Ok(()));

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(SubscriptionId {
            shape: LightShape::Green,
            sequence: 99,
        }));
    }

    #[test]
    fn notify_only_reaches_matching_shape_in_order() {
        let subscribers = Subscribers::<Light>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            subscribers.subscribe(LightShape::Green, move |state: &Light| {
                if let Light::Green { lane } = state {
                    seen.lock().push(format!("{tag}:{lane}"));
                }
                Ok(())
            });
        }
        let red_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&red_calls);
        subscribers.subscribe(LightShape::Red, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        subscribers.notify(&Light::Green { lane: 3 }).unwrap();

        assert_eq!(*seen.lock(), vec!["first:3", "second:3"]);
        assert_eq!(red_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failures_are_isolated_and_accumulated() {
        let subscribers = Subscribers::<Light>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        subscribers.subscribe(LightShape::Red, |_| Err(FsmError::handler("first broke")));
        let counter = Arc::clone(&calls);
        subscribers.subscribe(LightShape::Red, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        subscribers.subscribe(LightShape::Red, |_| Err(FsmError::handler("third broke")));

        let err = subscribers.notify(&Light::Red).unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match err {
            FsmError::SubscribersFailed { state, failures } => {
                assert_eq!(state, "Red");
                assert_eq!(failures.len(), 2);
                assert!(failures[0].contains("first broke"));
                assert!(failures[1].contains("third broke"));
            }
            other => panic!("Expected SubscribersFailed, got {other:?}"),
        }
    }

    #[test]
    fn callback_may_unsubscribe_itself_during_notify() {
        let subscribers = Arc::new(Subscribers::<Light>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let registry = Arc::clone(&subscribers);
        let slot = Arc::clone(&own_id);
        let counter = Arc::clone(&calls);
        let id = subscribers.subscribe(LightShape::Red, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *slot.lock() {
                registry.unsubscribe(id);
            }
            Ok(())
        });
        *own_id.lock() = Some(id);

        subscribers.notify(&Light::Red).unwrap();
        subscribers.notify(&Light::Red).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(subscribers.count(LightShape::Red), 0);
    }

    #[test]
    fn subscription_added_during_notify_waits_for_next_entry() {
        let subscribers = Arc::new(Subscribers::<Light>::new());
        let late_calls = Arc::new(AtomicUsize::new(0));

        let registry = Arc::clone(&subscribers);
        let counter = Arc::clone(&late_calls);
        subscribers.subscribe(LightShape::Red, move |_| {
            let counter = Arc::clone(&counter);
            registry.subscribe(LightShape::Red, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        });

        subscribers.notify(&Light::Red).unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        subscribers.notify(&Light::Red).unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }
}
