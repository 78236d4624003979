use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{wait::Wait, FlightFsm};

pub struct Apogee;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Apogee {
    fn update(&mut self, _fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        Some(Wait::new())
    }

    fn enter_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }

    fn exit_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }
}

impl Apogee {
    pub fn new() -> FlightFsm {
        FlightFsm::Apogee(Self)
    }
}
