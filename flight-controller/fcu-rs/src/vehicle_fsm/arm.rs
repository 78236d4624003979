use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{idle::Idle, ignite::Ignite, FlightFsm};

pub struct Arm;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Arm {
    fn update(&mut self, _fcu: &mut Fcu<'f>, command: Command) -> Option<FlightFsm> {
        match command {
            Command::Ignite => Some(Ignite::new()),
            Command::Disarm => Some(Idle::new()),
            _ => None,
        }
    }

    fn enter_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }

    fn exit_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }
}

impl Arm {
    pub fn new() -> FlightFsm {
        FlightFsm::Arm(Self)
    }
}
