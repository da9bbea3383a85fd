//! Container holding the single active state of a machine.

use super::error::{FsmError, FsmResult};
use super::state::State;
use std::cell::{Ref, RefCell, RefMut};

/// Holds exactly one state value at all times.
///
/// The cell itself is not thread-safe; the owning machine only touches it
/// while holding its lock. Borrows are tracked so that code running inside a
/// handler cannot observe or swap the value it is currently mutating.
pub struct StateCell<S: State> {
    value: RefCell<S>,
}

impl<S: State> StateCell<S> {
    pub fn new(initial: S) -> Self {
        Self {
            value: RefCell::new(initial),
        }
    }

    /// Read-only view of the active state.
    ///
    /// Fails with [`FsmError::Reentrant`] while a handler holds mutable access.
    pub fn current(&self) -> FsmResult<Ref<'_, S>> {
        self.value
            .try_borrow()
            .map_err(|_| FsmError::Reentrant { operation: "read" })
    }

    /// Mutable view of the active state, used to run a handler.
    pub fn current_mut(&self) -> FsmResult<RefMut<'_, S>> {
        self.value
            .try_borrow_mut()
            .map_err(|_| FsmError::Reentrant { operation: "dispatch" })
    }

    /// Shape of the active state.
    pub fn shape(&self) -> FsmResult<S::Shape> {
        Ok(self.current()?.shape())
    }

    /// Swap in `new_state`, returning the shape of the value it replaced.
    ///
    /// The previous value is dropped after the cell is released.
    pub fn replace(&self, new_state: S) -> FsmResult<S::Shape> {
        let previous = {
            let mut slot = self
                .value
                .try_borrow_mut()
                .map_err(|_| FsmError::Reentrant {
                    operation: "transition",
                })?;
            std::mem::replace(&mut *slot, new_state)
        };
        Ok(previous.shape())
    }

    /// Exchange the values of two cells.
    pub fn swap(&self, other: &StateCell<S>) -> FsmResult<()> {
        let mut mine = self.current_mut()?;
        let mut theirs = other.current_mut()?;
        std::mem::swap(&mut *mine, &mut *theirs);
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.value.into_inner()
    }
}
