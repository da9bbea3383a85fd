//! Traffic Light
//!
//! This example demonstrates a cyclic notifying state machine.
//!
//! Key concepts:
//! - Cyclic state transitions (states repeat)
//! - Per-shape subscribers notified on every entry
//! - Unsubscribing mid-run
//!
//! Run with: cargo run --example traffic_light

use fsm_core::core::FsmResult;
use fsm_core::machine::{Context, Handler, StateMachine};
use fsm_core::{event_enum, state_enum};
use tracing_subscriber::EnvFilter;

state_enum! {
    #[derive(Debug)]
    enum TrafficLight / Lamp {
        Red,
        Green,
        Yellow,
    }
}

event_enum! {
    enum Signal {
        Timer,
    }
}

struct Controller;

impl Handler for Controller {
    type State = TrafficLight;
    type Event = Signal;

    fn handle(
        &self,
        event: Signal,
        state: &mut TrafficLight,
        ctx: &mut Context<Self>,
    ) -> FsmResult<()> {
        match (event, state) {
            (Signal::Timer, TrafficLight::Red) => ctx.transition_to(TrafficLight::Green),
            (Signal::Timer, TrafficLight::Green) => ctx.transition_to(TrafficLight::Yellow),
            (Signal::Timer, TrafficLight::Yellow) => ctx.transition_to(TrafficLight::Red),
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== Traffic Light ===\n");

    let machine = StateMachine::notifying(Controller, TrafficLight::Red);

    machine.subscribe(Lamp::Green, |_| {
        println!("  pedestrians: wait");
        Ok(())
    });
    let caution = machine.subscribe(Lamp::Yellow, |_| {
        println!("  caution sign lit");
        Ok(())
    });
    machine.subscribe(Lamp::Red, |_| {
        println!("  pedestrians: walk");
        Ok(())
    });

    for cycle in 1..=2 {
        println!("Cycle {cycle}");
        for _ in 0..3 {
            let outcome = machine.dispatch(Signal::Timer)?;
            println!("  {:?} -> {:?}", outcome.previous, outcome.current);
        }
        if cycle == 1 {
            println!("  (caution sign removed: {})", machine.unsubscribe(caution));
        }
        println!();
    }

    println!("Transitions committed: {}", machine.transition_count());

    println!("\n=== Example Complete ===");
    Ok(())
}
