use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::FlightFsm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    Abort,
    IgnitionTimeout,
    /// Vehicle was already halted before a reset.
    Resumed,
}

impl HaltReason {
    pub fn message(&self) -> &'static str {
        match self {
            HaltReason::Abort => "abort",
            HaltReason::IgnitionTimeout => "ignition timeout",
            HaltReason::Resumed => "halted before reset",
        }
    }
}

/// Fail-safe sink. Nothing leaves this phase short of a reset with the
/// ground override set.
pub struct Halt {
    reason: HaltReason,
}

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Halt {
    fn update(&mut self, _fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        None
    }

    fn enter_state(&mut self, fcu: &mut Fcu<'f>) {
        silprintln!("Halting: {}", self.reason.message());

        fcu.all_outputs_off();
        fcu.report_error(self.reason.message());
    }

    fn exit_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }
}

impl Halt {
    pub fn new(reason: HaltReason) -> FlightFsm {
        FlightFsm::Halt(Self { reason })
    }
}
