//! Machines shared between threads and async tasks.

use fsm_core::core::{FsmError, FsmResult};
use fsm_core::machine::{Context, Handler, StateMachine};
use fsm_core::{event_enum, state_enum};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

state_enum! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum Meter / MeterShape {
        Stopped,
        Running { count: u64 },
    }
}

event_enum! {
    pub enum MeterEvent {
        Power,
        Pulse,
    }
}

/// Fails loudly if two handlers or hooks ever overlap.
#[derive(Default)]
struct Exclusive {
    inside: AtomicBool,
    overlaps: AtomicUsize,
}

impl Exclusive {
    fn check<T>(&self, f: impl FnOnce() -> T) -> T {
        if self.inside.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::yield_now();
        let result = f();
        self.inside.store(false, Ordering::SeqCst);
        result
    }
}

impl Handler for Exclusive {
    type State = Meter;
    type Event = MeterEvent;

    fn handle(&self, event: MeterEvent, state: &mut Meter, ctx: &mut Context<Self>) -> FsmResult<()> {
        self.check(|| match (event, state) {
            (MeterEvent::Power, Meter::Stopped) => {
                ctx.transition_to(Meter::Running { count: 0 });
                Ok(())
            }
            (MeterEvent::Pulse, Meter::Running { count }) => {
                *count += 1;
                Ok(())
            }
            (MeterEvent::Power, Meter::Running { .. }) => {
                ctx.transition_to(Meter::Stopped);
                Ok(())
            }
            (event, state) => Err(FsmError::unhandled(&event, state)),
        })
    }

    fn on_enter(&self, _state: &Meter, _ctx: &mut Context<Self>) -> FsmResult<()> {
        self.check(|| Ok(()))
    }

    fn on_exit(&self, _state: &Meter, _ctx: &mut Context<Self>) -> FsmResult<()> {
        self.check(|| Ok(()))
    }
}

fn count(machine: &StateMachine<Exclusive>) -> u64 {
    machine
        .visit(|state| match state {
            Meter::Running { count } => *count,
            Meter::Stopped => 0,
        })
        .unwrap()
}

#[test]
fn concurrent_dispatch_is_serialized() {
    let machine = Arc::new(StateMachine::new(Exclusive::default(), Meter::Stopped));
    machine.dispatch(MeterEvent::Power).unwrap();

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let machine = Arc::clone(&machine);
            thread::spawn(move || {
                for _ in 0..250 {
                    assert!(machine.dispatch_safe(MeterEvent::Pulse));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(count(&machine), 2000);
    assert_eq!(machine.handler().overlaps.load(Ordering::SeqCst), 0);
}

#[test]
fn transitions_and_reads_race_without_tearing() {
    let machine = Arc::new(StateMachine::new(Exclusive::default(), Meter::Stopped));

    let toggler = {
        let machine = Arc::clone(&machine);
        thread::spawn(move || {
            for _ in 0..500 {
                machine.dispatch(MeterEvent::Power).unwrap();
            }
        })
    };
    let reader = {
        let machine = Arc::clone(&machine);
        thread::spawn(move || {
            for _ in 0..500 {
                let consistent = machine
                    .visit(|state| matches!(state, Meter::Stopped | Meter::Running { count: 0 }))
                    .unwrap();
                assert!(consistent);
            }
        })
    };
    toggler.join().unwrap();
    reader.join().unwrap();

    // An even number of toggles lands back where it started.
    assert_eq!(machine.shape().unwrap(), MeterShape::Stopped);
    assert_eq!(machine.transition_count(), 500);
    assert_eq!(machine.handler().overlaps.load(Ordering::SeqCst), 0);
}

#[test]
fn opposite_swaps_do_not_deadlock() {
    let left = Arc::new(StateMachine::new(Exclusive::default(), Meter::Stopped));
    let right = Arc::new(StateMachine::new(
        Exclusive::default(),
        Meter::Running { count: 7 },
    ));

    let forward = {
        let (left, right) = (Arc::clone(&left), Arc::clone(&right));
        thread::spawn(move || {
            for _ in 0..100 {
                left.swap(&right).unwrap();
            }
        })
    };
    let backward = {
        let (left, right) = (Arc::clone(&left), Arc::clone(&right));
        thread::spawn(move || {
            for _ in 0..100 {
                right.swap(&left).unwrap();
            }
        })
    };
    forward.join().unwrap();
    backward.join().unwrap();

    // 200 swaps in total: both machines hold their original states again.
    assert_eq!(left.shape().unwrap(), MeterShape::Stopped);
    assert_eq!(count(&right), 7);
}

#[tokio::test]
async fn background_timer_drives_machine() {
    let machine = Arc::new(StateMachine::new(Exclusive::default(), Meter::Stopped));
    machine.dispatch(MeterEvent::Power).unwrap();

    let timer = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(Duration::from_millis(1));
            for _ in 0..5 {
                ticks.tick().await;
                machine.dispatch_safe(MeterEvent::Pulse);
            }
            // Stop the meter, then pulse once more: that one is unhandled.
            machine.dispatch_safe(MeterEvent::Power);
            machine.dispatch_safe(MeterEvent::Pulse)
        })
    };

    let last_pulse_handled = timer.await.unwrap();

    assert!(!last_pulse_handled);
    assert_eq!(machine.shape().unwrap(), MeterShape::Stopped);
    assert_eq!(machine.transition_count(), 2);
}

#[tokio::test]
async fn blocking_tasks_share_one_machine() {
    let machine = Arc::new(StateMachine::new(Exclusive::default(), Meter::Stopped));
    machine.dispatch(MeterEvent::Power).unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let machine = Arc::clone(&machine);
            tokio::task::spawn_blocking(move || {
                (0..50).filter(|_| machine.dispatch_safe(MeterEvent::Pulse)).count()
            })
        })
        .collect();

    let mut handled = 0;
    for task in tasks {
        handled += task.await.unwrap();
    }

    assert_eq!(handled, 200);
    assert_eq!(count(&machine), 200);
}
