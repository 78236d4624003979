use shared::{fcu_hal::Command, ControllerState};

use crate::Fcu;

use super::{apogee::Apogee, FlightFsm};

pub struct Coast;

impl<'f> ControllerState<FlightFsm, Fcu<'f>> for Coast {
    fn update(&mut self, fcu: &mut Fcu<'f>, _command: Command) -> Option<FlightFsm> {
        let Some(data) = fcu.sensor_data else {
            return None;
        };

        if data.bar.pressure_rate_magnitude() >= fcu.config.apogee_dpres {
            return Some(Apogee::new());
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

impl Coast {
    pub fn new() -> FlightFsm {
        FlightFsm::Coast(Self)
    }
}
