use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{idle::Idle, FlightFsm};

pub struct Init;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Init {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        if let Some(phase) = fcu.resume_phase.take() {
            silprintln!("Resuming flight in {}", phase.name());
            return Some(FlightFsm::resume(phase));
        }

        Some(Idle::new())
    }

    fn enter_state(&mut self, fcu: &mut Fcu<'f>) {
        fcu.all_outputs_off();
    }

    fn exit_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }
}

impl Init {
    pub fn new() -> FlightFsm {
        FlightFsm::Init(Self)
    }
}
