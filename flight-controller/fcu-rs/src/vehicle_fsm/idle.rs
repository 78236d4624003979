use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{arm::Arm, test::Test, FlightFsm};

pub struct Idle;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Idle {
    fn update(&mut self, _fcu: &mut Fcu<'f>, command: Command) -> Option<FlightFsm> {
        match command {
            Command::Test => Some(Test::new()),
            Command::Arm => Some(Arm::new()),
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

impl Idle {
    pub fn new() -> FlightFsm {
        FlightFsm::Idle(Self)
    }
}
