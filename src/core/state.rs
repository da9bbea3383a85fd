//! State, shape and event traits.
//!
//! A machine's states form a closed sum type: one enum whose variants are the
//! declared state shapes. Each state value reports its [`Shape`], a payload-free
//! tag used for lifecycle dispatch, subscriptions and diagnostics.

use std::fmt::Debug;
use std::hash::Hash;

/// Payload-free tag identifying one member of a closed set of state shapes.
///
/// Shapes are cheap to copy and hash so they can key subscriber lists.
pub trait Shape: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Name of the shape for display and logging.
    fn name(&self) -> &'static str;
}

/// Trait for state machine states.
///
/// Implemented by an enum whose variants are the declared state shapes.
/// Variants may carry payload; they carry no behaviour.
///
/// # Example
///
/// ```rust
/// use fsm_core::core::{Shape, State};
///
/// enum TaskState {
///     Idle,
///     Processing { task: String },
/// }
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum TaskShape {
///     Idle,
///     Processing,
/// }
///
/// impl Shape for TaskShape {
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Idle => "Idle",
///             Self::Processing => "Processing",
///         }
///     }
/// }
///
/// impl State for TaskState {
///     type Shape = TaskShape;
///
///     fn shape(&self) -> TaskShape {
///         match self {
///             Self::Idle => TaskShape::Idle,
///             Self::Processing { .. } => TaskShape::Processing,
///         }
///     }
/// }
///
/// let state = TaskState::Processing { task: "Task1".into() };
/// assert_eq!(state.name(), "Processing");
/// ```
pub trait State: Send + 'static {
    /// The closed set of shapes this state can take.
    type Shape: Shape;

    /// Shape of this value.
    fn shape(&self) -> Self::Shape;

    /// Get the state's name for display/logging.
    fn name(&self) -> &'static str {
        self.shape().name()
    }

    /// Check if this is a final (terminal) state.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

/// Trait for event types.
///
/// Events are transient: constructed by the caller and consumed by exactly
/// one handler invocation.
pub trait Event: Send + 'static {
    /// Name of the event shape, without payload.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestState {
        Initial,
        Working { job: u32 },
        Done,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestShape {
        Initial,
        Working,
        Done,
    }

    impl Shape for TestShape {
        fn name(&self) -> &'static str {
            match self {
                Self::Initial => "Initial",
                Self::Working => "Working",
                Self::Done => "Done",
            }
        }
    }

    impl State for TestState {
        type Shape = TestShape;

        fn shape(&self) -> TestShape {
            match self {
                Self::Initial => TestShape::Initial,
                Self::Working { .. } => TestShape::Working,
                Self::Done => TestShape::Done,
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Done)
        }
    }

    #[test]
    fn shape_ignores_payload() {
        assert_eq!(TestState::Working { job: 1 }.shape(), TestShape::Working);
        assert_eq!(
            TestState::Working { job: 1 }.shape(),
            TestState::Working { job: 2 }.shape()
        );
    }

    #[test]
    fn name_defaults_to_shape_name() {
        assert_eq!(TestState::Initial.name(), "Initial");
        assert_eq!(TestState::Working { job: 7 }.name(), "Working");
        assert_eq!(TestState::Done.name(), "Done");
    }

    #[test]
    fn is_final_identifies_terminal_states() {
        assert!(!TestState::Initial.is_final());
        assert!(!TestState::Working { job: 0 }.is_final());
        assert!(TestState::Done.is_final());
    }
}
