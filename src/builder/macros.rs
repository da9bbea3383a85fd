//! Macros for declaring closed state and event sets.

/// Declare a state enum together with its companion shape enum.
///
/// Variants may be unit-like or carry named fields. The shape enum gets one
/// unit variant per state variant, with the same name.
///
/// # Example
///
/// ```
/// use fsm_core::core::State;
/// use fsm_core::state_enum;
///
/// state_enum! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum TaskState / TaskShape {
///         Idle,
///         Processing { task: String },
///         Finished,
///     }
///     final: [Finished]
/// }
///
/// let state = TaskState::Processing { task: "Task1".into() };
/// assert_eq!(state.shape(), TaskShape::Processing);
/// assert!(TaskState::Finished.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident / $shape:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $($field:ident : $field_ty:ty),* $(,)? })?
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $({ $($field : $field_ty),* })?
            ),*
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $shape {
            $($variant),*
        }

        impl $crate::core::Shape for $shape {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl $crate::core::State for $name {
            type Shape = $shape;

            fn shape(&self) -> $shape {
                match self {
                    $(Self::$variant { .. } => $shape::$variant),*
                }
            }

            #[allow(unreachable_patterns)]
            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final { .. } => true,)*)?
                    _ => false,
                }
            }
        }
    };
}

/// Declare an event enum and implement [`Event`](crate::core::Event) for it.
///
/// # Example
///
/// ```
/// use fsm_core::core::Event;
/// use fsm_core::event_enum;
///
/// event_enum! {
///     pub enum TaskEvent {
///         Start,
///         Rename { task: String },
///         Complete,
///     }
/// }
///
/// assert_eq!(TaskEvent::Rename { task: "x".into() }.name(), "Rename");
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $($field:ident : $field_ty:ty),* $(,)? })?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $({ $($field : $field_ty),* })?
            ),*
        }

        impl $crate::core::Event for $name {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant { .. } => stringify!($variant)),*
                }
            }
        }
    };
}
