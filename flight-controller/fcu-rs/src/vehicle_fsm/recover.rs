use shared::{
    fcu_hal::{Command, OutputChannel},
    ControllerState,
};

use crate::Fcu;

use super::FlightFsm;

/// Main chute out. Terminal for the flight; the charge is released once the
/// hold time has passed.
pub struct Recover {
    entered_at: u64,
    charge_released: bool,
}

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Recover {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        let held_for = fcu.timestamp().saturating_sub(self.entered_at);

        if !self.charge_released && held_for >= fcu.config.parachute_delay_ms {
            silprintln!("Releasing main chute charge after {} ms", held_for);
            fcu.driver.set_output_channel(OutputChannel::MainChute, false);
            self.charge_released = true;
        }

        None
    }

    fn enter_state(&mut self, fcu: &mut Fcu<'f>) {
        fcu.driver.set_output_channel(OutputChannel::MainChute, true);
        self.entered_at = fcu.timestamp();
    }

    fn exit_state(&mut self, fcu: &mut Fcu<'f>) {
        fcu.driver.set_output_channel(OutputChannel::MainChute, false);
    }
}

impl Recover {
    pub fn new() -> FlightFsm {
        FlightFsm::Recover(Self {
            entered_at: 0,
            charge_released: false,
        })
    }
}
