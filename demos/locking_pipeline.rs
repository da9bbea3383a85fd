//! Locking Pipeline
//!
//! This example shares one machine between threads.
//!
//! Key concepts:
//! - Machines behind an `Arc`, driven from several threads
//! - Follow-up events posted from an entry hook
//! - Reads from other threads while work is in flight
//!
//! Run with: cargo run --example locking_pipeline

use fsm_core::core::{FsmError, FsmResult, State};
use fsm_core::machine::{Context, Handler};
use fsm_core::{event_enum, state_enum, StateMachineBuilder};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

state_enum! {
    #[derive(Debug, Clone)]
    enum TaskState / TaskShape {
        Idle,
        Ready,
        Processing { task: String },
        Finished,
    }
    final: [Finished]
}

event_enum! {
    #[derive(Debug)]
    enum TaskEvent {
        Init,
        Start,
        Complete,
    }
}

struct Worker;

impl Handler for Worker {
    type State = TaskState;
    type Event = TaskEvent;

    fn handle(
        &self,
        event: TaskEvent,
        state: &mut TaskState,
        ctx: &mut Context<Self>,
    ) -> FsmResult<()> {
        match (event, state) {
            (TaskEvent::Init, TaskState::Idle) => ctx.transition_to(TaskState::Ready),
            (TaskEvent::Start, TaskState::Ready) => ctx.transition_to(TaskState::Processing {
                task: "report".to_string(),
            }),
            (TaskEvent::Complete, TaskState::Processing { task }) => {
                info!(task = %task, "task complete");
                ctx.transition_to(TaskState::Finished)
            }
            (event, state) => return Err(FsmError::unhandled(&event, state)),
        }
        Ok(())
    }

    fn on_enter(&self, state: &TaskState, ctx: &mut Context<Self>) -> FsmResult<()> {
        println!("  [{:?}] entered {}", thread::current().id(), state.name());
        if let TaskState::Processing { .. } = state {
            // Runs before the Start dispatch returns.
            ctx.post(TaskEvent::Complete);
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    println!("=== Locking Pipeline ===\n");

    let machine = Arc::new(
        StateMachineBuilder::new(Worker)
            .initial(TaskState::Idle)
            .name("locking-pipeline")
            .build()?,
    );

    machine.dispatch(TaskEvent::Init)?;

    let starter = {
        let machine = Arc::clone(&machine);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            machine.dispatch_safe(TaskEvent::Start)
        })
    };

    let watcher = {
        let machine = Arc::clone(&machine);
        thread::spawn(move || {
            let mut seen = Vec::new();
            while !machine.is_final().unwrap_or(false) {
                if let Ok(shape) = machine.shape() {
                    if seen.last() != Some(&shape) {
                        seen.push(shape);
                    }
                }
                thread::sleep(Duration::from_millis(1));
            }
            seen
        })
    };

    let started = starter.join().map_err(|_| "starter thread panicked")?;
    let seen = watcher.join().map_err(|_| "watcher thread panicked")?;

    println!("\nStart handled: {started}");
    println!("Watcher observed: {seen:?}");
    println!("Final state: {:?}", machine.snapshot()?);
    println!("Path: {}", machine.history().get_path().join(" -> "));

    println!("\n=== Example Complete ===");
    Ok(())
}
