use shared::{
    fcu_hal::{Command, OutputChannel},
    ControllerState,
};

use crate::Fcu;

use super::{fall::Fall, FlightFsm};

pub struct Eject {
    entered_at: u64,
}

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Eject {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        let held_for = fcu.timestamp().saturating_sub(self.entered_at);

        if held_for >= fcu.config.parachute_delay_ms {
            return Some(Fall::new());
        }

        None
    }

    fn enter_state(&mut self, fcu: &mut Fcu<'f>) {
        fcu.driver.set_output_channel(OutputChannel::DrogueCharge, true);
        self.entered_at = fcu.timestamp();
    }

    fn exit_state(&mut self, fcu: &mut Fcu<'f>) {
        fcu.driver.set_output_channel(OutputChannel::DrogueCharge, false);
    }
}

impl Eject {
    pub fn new() -> FlightFsm {
        FlightFsm::Eject(Self { entered_at: 0 })
    }
}
