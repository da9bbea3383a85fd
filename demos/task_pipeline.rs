//! Task Pipeline
//!
//! This example walks a task through its lifecycle.
//!
//! Key concepts:
//! - Exhaustive (event, state) bindings with a fallback arm
//! - In-place payload updates that fire no hooks
//! - Exit and entry hooks around every committed transition
//! - Rejected events that leave the machine untouched
//!
//! Run with: cargo run --example task_pipeline

use fsm_core::core::{FsmError, FsmResult, State};
use fsm_core::machine::{Context, Handler};
use fsm_core::{event_enum, state_enum, StateMachineBuilder};
use tracing_subscriber::EnvFilter;

state_enum! {
    #[derive(Debug, Clone, PartialEq)]
    enum TaskState / TaskShape {
        Idle,
        Processing { task: String },
        Finished,
    }
    final: [Finished]
}

event_enum! {
    #[derive(Debug)]
    enum TaskEvent {
        Start,
        ChangeTask,
        Complete,
        Reset,
    }
}

struct Pipeline;

impl Handler for Pipeline {
    type State = TaskState;
    type Event = TaskEvent;

    fn handle(
        &self,
        event: TaskEvent,
        state: &mut TaskState,
        ctx: &mut Context<Self>,
    ) -> FsmResult<()> {
        match (event, state) {
            (TaskEvent::Start, TaskState::Idle) => ctx.transition_to(TaskState::Processing {
                task: "Task1".to_string(),
            }),
            (TaskEvent::ChangeTask, TaskState::Processing { task }) => {
                *task = "Task2".to_string();
            }
            (TaskEvent::Complete, TaskState::Processing { .. }) => {
                ctx.transition_to(TaskState::Finished)
            }
            (TaskEvent::Reset, TaskState::Finished) => ctx.transition_to(TaskState::Idle),
            (event, state) => return Err(FsmError::unhandled(&event, state)),
        }
        Ok(())
    }

    fn on_enter(&self, state: &TaskState, _ctx: &mut Context<Self>) -> FsmResult<()> {
        println!("  -> entered {}", state.name());
        Ok(())
    }

    fn on_exit(&self, state: &TaskState, _ctx: &mut Context<Self>) -> FsmResult<()> {
        println!("  <- leaving {}", state.name());
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("=== Task Pipeline ===\n");

    let machine = StateMachineBuilder::new(Pipeline)
        .initial(TaskState::Idle)
        .name("pipeline")
        .build()?;

    for event in [TaskEvent::Start, TaskEvent::ChangeTask, TaskEvent::Complete] {
        println!("dispatch {event:?}");
        machine.dispatch(event)?;
        println!("  state: {:?}\n", machine.snapshot()?);
    }

    println!("dispatch Start (not bound in Finished)");
    match machine.dispatch(TaskEvent::Start) {
        Ok(_) => println!("  unexpectedly handled"),
        Err(e) => println!("  rejected: {e}"),
    }
    println!("  state: {:?}\n", machine.shape()?);

    println!("dispatch_safe Reset -> {}", machine.dispatch_safe(TaskEvent::Reset));
    println!("  state: {:?}\n", machine.shape()?);

    println!("Path: {}", machine.history().get_path().join(" -> "));

    println!("\n=== Example Complete ===");
    Ok(())
}
