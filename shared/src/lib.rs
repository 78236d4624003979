#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod comms_hal;
pub mod fcu_hal;
pub mod fcu_mock;
pub mod logger;
pub mod persistence;
pub mod util;

use fcu_hal::Command;

pub use logger::DataPointLogger;

pub trait ControllerState<F, C> {
    fn update(&mut self, controller: &mut C, command: Command) -> Option<F>;
    fn enter_state(&mut self, controller: &mut C);
    fn exit_state(&mut self, controller: &mut C);
}

pub trait ControllerFsm<F, C, S> {
    fn to_controller_state(&mut self) -> &mut dyn ControllerState<F, C>;
    fn hal_state(&self) -> S;
}

/// Owns the active state of a controller FSM. The controller itself is passed
/// in on every call so states can act on it without holding a borrow.
pub struct ControllerEntity<F, C, S> {
    fsm_state: F,
    _controller_marker: core::marker::PhantomData<C>,
    _hal_state_marker: core::marker::PhantomData<S>,
}

impl<F, C, S> ControllerEntity<F, C, S>
where
    F: ControllerFsm<F, C, S>,
{
    pub fn new(controller: &mut C, mut fsm_state: F) -> Self {
        fsm_state.to_controller_state().enter_state(controller);

        Self {
            fsm_state,
            _controller_marker: core::marker::PhantomData,
            _hal_state_marker: core::marker::PhantomData,
        }
    }

    /// Runs one tick of the active state. Returns true if the state changed.
    pub fn update(&mut self, controller: &mut C, command: Command) -> bool {
        let new_state = self
            .fsm_state
            .to_controller_state()
            .update(controller, command);

        if let Some(new_state) = new_state {
            self.transition(controller, new_state);
            true
        } else {
            false
        }
    }

    /// Leaves the active state and enters `new_state`, regardless of guards.
    pub fn transition(&mut self, controller: &mut C, new_state: F) {
        let mut old_state = core::mem::replace(&mut self.fsm_state, new_state);
        old_state.to_controller_state().exit_state(controller);

        self.fsm_state.to_controller_state().enter_state(controller);
    }

    pub fn hal_state(&self) -> S {
        self.fsm_state.hal_state()
    }
}
