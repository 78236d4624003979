use shared::{
    fcu_hal::{Command, OutputChannel},
    ControllerState,
};

use crate::Fcu;

use super::{
    burn::Burn,
    halt::{Halt, HaltReason},
    FlightFsm,
};

pub struct Ignite {
    elapsed_ticks: u32,
}

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Ignite {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        self.elapsed_ticks += 1;

        if self.timed_out(fcu) {
            silprintln!("No liftoff after {} ticks", self.elapsed_ticks);
            return Some(Halt::new(HaltReason::IgnitionTimeout));
        }

        if self.lifted_off(fcu) {
            return Some(Burn::new());
        }

        None
    }

    fn enter_state(&mut self, fcu: &mut Fcu<'f>) {
        fcu.driver.set_output_channel(OutputChannel::Ignition, true);
    }

    fn exit_state(&mut self, fcu: &mut Fcu<'f>) {
        fcu.driver.set_output_channel(OutputChannel::Ignition, false);
    }
}

impl Ignite {
    pub fn new() -> FlightFsm {
        FlightFsm::Ignite(Self { elapsed_ticks: 0 })
    }

    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    fn timed_out(&self, fcu: &Fcu) -> bool {
        self.elapsed_ticks >= fcu.config.max_ignite_ticks
    }

    fn lifted_off(&self, fcu: &Fcu) -> bool {
        fcu.sensor_data
            .map_or(false, |data| data.axial_acceleration() >= fcu.config.min_accel_g)
    }
}
