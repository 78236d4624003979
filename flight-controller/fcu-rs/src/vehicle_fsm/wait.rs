use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{eject::Eject, FlightFsm};

/// Holds the drogue until the pressure rate settles after apogee.
pub struct Wait;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Wait {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        let Some(data) = fcu.sensor_data else {
            return None;
        };

        if data.bar.pressure_rate_magnitude() < fcu.config.min_dpres {
            return Some(Eject::new());
        }

        None
    }

    fn enter_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }

    fn exit_state(&mut self, _fcu: &mut Fcu<'f>) {
        // Nothing
    }
}

impl Wait {
    pub fn new() -> FlightFsm {
        FlightFsm::Wait(Self)
    }
}
